//! Integration tests for glob resolution, caching and composite delegation.

use anyhow::Result;
use globtap::fs::{FsError, FsErrorKind, MemoryFileSystem};
use globtap::testing::*;
use globtap::*;
use serde_json::json;
use std::sync::Arc;

fn partitioned() -> Arc<MemoryFileSystem> {
    memory_fs(&[
        ("/data/2024/01/part.csv", "id,month\n1,jan\n"),
        ("/data/2024/02/part.csv", "id,month\n2,feb\n"),
        ("/data/2024/03/part.csv", "id,month\n3,mar\n"),
        ("/data/2024/03/notes.txt", "not csv"),
    ])
}

fn paths(members: &[FileTap]) -> Vec<&str> {
    members.iter().map(FileTap::path).collect()
}

const CSV: Scheme = Scheme::Csv { has_headers: true };

#[test]
fn test_resolves_one_child_per_match_in_order() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2024/*/part.csv")?;

    let members = tap.members(&conf)?;
    assert_eq!(
        paths(&members),
        vec![
            "/data/2024/01/part.csv",
            "/data/2024/02/part.csv",
            "/data/2024/03/part.csv"
        ]
    );
    assert!(members.iter().all(|m| m.scheme() == CSV));
    Ok(())
}

#[test]
fn test_zero_matches_is_no_match_error() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2099/*/part.csv")?;

    let err = tap.members(&conf).unwrap_err();
    assert!(matches!(&err, TapError::NoMatch { pattern } if pattern == "/data/2099/*/part.csv"));
    assert!(err.to_string().contains("/data/2099/*/part.csv"));
    assert!(tap.cached_members().is_none());
    assert!(tap.read(&conf).is_err());
    Ok(())
}

#[test]
fn test_second_call_hits_cache() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2024/*/part.csv")?;

    let first = tap.members(&conf)?;
    let second = tap.members(&conf)?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fs.glob_calls(), 1);

    // Reads reuse the cached members too.
    assert_eq!(tap.read(&conf)?.len(), 3);
    assert_eq!(fs.glob_calls(), 1);
    Ok(())
}

#[test]
fn test_refresh_always_requeries_and_replaces() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2024/*/part.csv")?;

    let planned = tap.members(&conf)?;
    assert_eq!(planned.len(), 3);

    fs.put_file("/data/2024/04/part.csv", "id,month\n4,apr\n");
    fs.remove_file("/data/2024/01/part.csv");

    // Still cached until refreshed.
    assert_eq!(tap.members(&conf)?.len(), 3);
    assert_eq!(fs.glob_calls(), 1);

    let run = tap.refresh_members(&conf)?;
    assert_eq!(fs.glob_calls(), 2);
    assert_eq!(
        paths(&run),
        vec![
            "/data/2024/02/part.csv",
            "/data/2024/03/part.csv",
            "/data/2024/04/part.csv"
        ]
    );
    let cached = tap.cached_members().expect("refresh populates the cache");
    assert!(Arc::ptr_eq(&cached, &run));

    tap.refresh_members(&conf)?;
    assert_eq!(fs.glob_calls(), 3);
    Ok(())
}

#[test]
fn test_filesystem_failure_propagates_and_allows_retry() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2024/*/part.csv")?;

    fs.fail_next_glob(FsError::new(FsErrorKind::PermissionDenied, "list /data/2024"));
    let err = tap.members(&conf).unwrap_err();
    match &err {
        TapError::Resolve { pattern, source } => {
            assert_eq!(pattern, "/data/2024/*/part.csv");
            assert_eq!(source.kind, FsErrorKind::PermissionDenied);
        }
        other => panic!("expected Resolve, got {other:?}"),
    }
    let cause = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(cause.as_deref(), Some("PermissionDenied: list /data/2024"));
    assert!(tap.cached_members().is_none());

    assert_eq!(tap.members(&conf)?.len(), 3);
    assert_eq!(fs.glob_calls(), 2);
    Ok(())
}

#[test]
fn test_failed_refresh_clears_previous_cache() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2024/*/part.csv")?;
    tap.members(&conf)?;

    fs.fail_next_glob(FsError::new(FsErrorKind::Unavailable, "namenode restarting"));
    assert!(tap.refresh_members(&conf).is_err());
    assert!(tap.cached_members().is_none());
    Ok(())
}

#[test]
fn test_malformed_pattern_is_resolve_error() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/[2024/*")?;
    let err = tap.members(&conf).unwrap_err();
    assert!(matches!(
        err,
        TapError::Resolve { ref source, .. } if source.kind == FsErrorKind::InvalidPattern
    ));
    Ok(())
}

#[test]
fn test_unknown_scheme_is_resolve_error() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "hdfs://namenode/data/*")?;
    let err = tap.members(&conf).unwrap_err();
    assert!(matches!(
        err,
        TapError::Resolve { ref source, .. } if source.kind == FsErrorKind::Unsupported
    ));
    assert_eq!(fs.glob_calls(), 0);
    Ok(())
}

#[test]
fn test_empty_pattern_rejected() {
    assert!(matches!(
        GlobTap::new(Scheme::Jsonl, ""),
        Err(TapError::EmptyPattern)
    ));
    assert!(matches!(
        GlobTap::with_filter(Scheme::Jsonl, "  ", PathFilter::FilesOnly),
        Err(TapError::EmptyPattern)
    ));
}

#[test]
fn test_filter_removes_rejected_matches() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);

    let all = GlobTap::new(CSV, "/data/2024/03/*")?;
    assert_eq!(all.members(&conf)?.len(), 2);

    let only_csv = GlobTap::with_filter(CSV, "/data/2024/03/*", PathFilter::suffix(".csv"))?;
    assert_eq!(paths(&only_csv.members(&conf)?), vec!["/data/2024/03/part.csv"]);
    Ok(())
}

#[test]
fn test_filter_rejecting_everything_is_no_match() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::with_filter(CSV, "/data/2024/*/part.csv", PathFilter::suffix(".parquet"))?;
    assert!(matches!(tap.members(&conf), Err(TapError::NoMatch { .. })));
    Ok(())
}

#[test]
fn test_scheme_prefix_is_kept_on_children() -> Result<()> {
    let fs = partitioned();
    let conf = RunConfig::new().with_filesystem(fs.clone());
    let tap = GlobTap::new(CSV, "mem:///data/2024/0[12]/part.csv")?;
    assert_eq!(
        paths(&tap.members(&conf)?),
        vec!["mem:///data/2024/01/part.csv", "mem:///data/2024/02/part.csv"]
    );
    assert_eq!(
        tap.read(&conf)?,
        vec![
            json!({"id": "1", "month": "jan"}),
            json!({"id": "2", "month": "feb"})
        ]
    );
    Ok(())
}

#[test]
fn test_read_concatenates_children_in_order() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2024/*/part.csv")?;
    let ids: Vec<String> = tap
        .read(&conf)?
        .iter()
        .map(|r| r["id"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    #[cfg(feature = "parallel-io")]
    assert_eq!(tap.read_par(&conf)?, tap.read(&conf)?);
    Ok(())
}

#[test]
fn test_child_errors_pass_through() -> Result<()> {
    let fs = memory_fs(&[
        ("/logs/a.jsonl", "{\"n\":1}\n"),
        ("/logs/b.jsonl", "{broken\n"),
    ]);
    let conf = memory_config(&fs);
    let tap = GlobTap::new(Scheme::Jsonl, "/logs/*.jsonl")?;
    let err = tap.read(&conf).unwrap_err();
    assert!(matches!(&err, TapError::Child { action: "read", path, .. } if path == "/logs/b.jsonl"));
    // Resolution itself succeeded and stays cached.
    assert_eq!(tap.cached_members().map(|m| m.len()), Some(2));
    Ok(())
}

#[test]
fn test_write_fans_out_to_every_match() -> Result<()> {
    let fs = memory_fs(&[("/out/a/part-0.jsonl", ""), ("/out/b/part-0.jsonl", "")]);
    let conf = memory_config(&fs);
    let tap = GlobTap::new(Scheme::Jsonl, "/out/*/part-0.jsonl")?;

    let written = tap.write(&conf, &[json!({"k": "v"})])?;
    assert_eq!(written, 2);
    for path in ["/out/a/part-0.jsonl", "/out/b/part-0.jsonl"] {
        assert_eq!(fs.contents(path), Some(b"{\"k\":\"v\"}\n".to_vec()));
    }
    assert!(tap.exists(&conf)?);
    Ok(())
}

#[test]
fn test_matched_directories_read_their_files() -> Result<()> {
    let fs = memory_fs(&[
        ("/events/day=1/part-0", "{\"d\":1}\n"),
        ("/events/day=1/_SUCCESS", ""),
        ("/events/day=2/part-0", "{\"d\":2}\n"),
        ("/events/day=2/part-1", "{\"d\":3}\n"),
    ]);
    let conf = memory_config(&fs);
    let tap = GlobTap::new(Scheme::Jsonl, "/events/day=*")?;
    assert_eq!(tap.members(&conf)?.len(), 2);
    assert_eq!(
        tap.read(&conf)?,
        vec![json!({"d": 1}), json!({"d": 2}), json!({"d": 3})]
    );
    Ok(())
}

#[test]
fn test_concurrent_first_use_queries_once() -> Result<()> {
    let fs = partitioned();
    let conf = memory_config(&fs);
    let tap = GlobTap::new(CSV, "/data/2024/*/part.csv")?;

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| tap.members(&conf).map(|m| m.len()));
        }
    });
    assert_eq!(fs.glob_calls(), 1);
    assert_eq!(tap.cached_members().map(|m| m.len()), Some(3));
    Ok(())
}
