//! Equality and hashing of glob taps are defined by configuration only.

use anyhow::Result;
use globtap::testing::*;
use globtap::*;
use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(tap: &GlobTap) -> u64 {
    let mut hasher = DefaultHasher::new();
    tap.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_equal_regardless_of_resolution_state() -> Result<()> {
    let fs = memory_fs(&[("/logs/2024/01/events", "{}\n")]);
    let conf = memory_config(&fs);

    let resolved = GlobTap::new(Scheme::Jsonl, "/logs/2024/*/events")?;
    let unresolved = GlobTap::new(Scheme::Jsonl, "/logs/2024/*/events")?;
    resolved.members(&conf)?;

    assert_eq!(resolved, unresolved);
    assert_eq!(hash_of(&resolved), hash_of(&unresolved));
    assert_eq!(resolved.identity_hash(), unresolved.identity_hash());
    Ok(())
}

#[test]
fn test_pattern_difference_is_unequal() -> Result<()> {
    let a = GlobTap::new(Scheme::Jsonl, "/logs/2024/*")?;
    let b = GlobTap::new(Scheme::Jsonl, "/logs/2025/*")?;
    assert_ne!(a, b);
    assert_ne!(a.identity_hash(), b.identity_hash());
    Ok(())
}

#[test]
fn test_filter_difference_is_unequal() -> Result<()> {
    let plain = GlobTap::new(Scheme::Jsonl, "/logs/*")?;
    let gz = GlobTap::with_filter(Scheme::Jsonl, "/logs/*", PathFilter::suffix(".gz"))?;
    let zst = GlobTap::with_filter(Scheme::Jsonl, "/logs/*", PathFilter::suffix(".zst"))?;
    assert_ne!(plain, gz);
    assert_ne!(gz, zst);

    let gz_again = GlobTap::with_filter(Scheme::Jsonl, "/logs/*", PathFilter::suffix(".gz"))?;
    assert_eq!(gz, gz_again);
    assert_eq!(hash_of(&gz), hash_of(&gz_again));
    Ok(())
}

#[test]
fn test_scheme_difference_is_unequal() -> Result<()> {
    let jsonl = GlobTap::new(Scheme::Jsonl, "/logs/*")?;
    let csv = GlobTap::new(Scheme::Csv { has_headers: true }, "/logs/*")?;
    assert_ne!(jsonl, csv);
    Ok(())
}

#[test]
fn test_named_filters_compare_by_name() -> Result<()> {
    let a = GlobTap::with_filter(
        Scheme::Jsonl,
        "/logs/*",
        PathFilter::named("non-empty", |s| s.len > 0),
    )?;
    let b = GlobTap::with_filter(
        Scheme::Jsonl,
        "/logs/*",
        PathFilter::named("non-empty", |s| s.len > 0),
    )?;
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    Ok(())
}

#[test]
fn test_hash_set_deduplicates_taps() -> Result<()> {
    let taps = vec![
        GlobTap::new(Scheme::Jsonl, "/a/*")?,
        GlobTap::new(Scheme::Jsonl, "/a/*")?,
        GlobTap::with_filter(Scheme::Jsonl, "/a/*", PathFilter::FilesOnly)?,
        GlobTap::new(Scheme::Jsonl, "/b/*")?,
    ];
    let unique: HashSet<GlobTap> = taps.into_iter().collect();
    assert_eq!(unique.len(), 3);
    Ok(())
}

#[test]
fn test_clone_is_equal_with_fresh_cache() -> Result<()> {
    let fs = memory_fs(&[("/a/1", "{}\n")]);
    let conf = memory_config(&fs);
    let tap = GlobTap::new(Scheme::Jsonl, "/a/*")?;
    tap.members(&conf)?;

    let copy = tap.clone();
    assert_eq!(copy, tap);
    assert!(copy.cached_members().is_none());
    Ok(())
}

#[test]
fn test_display_shows_pattern() -> Result<()> {
    let tap = GlobTap::new(Scheme::Jsonl, "/logs/2024/*/events")?;
    assert_eq!(tap.to_string(), "GlobTap[\"/logs/2024/*/events\"]");
    Ok(())
}
