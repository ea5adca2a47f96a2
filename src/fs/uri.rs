//! Splitting tap paths into a filesystem scheme and a client-local path.

/// A path with an optional `scheme://authority` prefix.
///
/// `mem:///data/x.csv` has scheme `mem`, an empty authority and path
/// `/data/x.csv`; `file://localhost/tmp/x` has authority `localhost` and path
/// `/tmp/x`. A bare `/data/x.csv` has no scheme and is served by the
/// configured default filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsUri {
    scheme: Option<String>,
    authority: String,
    path: String,
}

impl FsUri {
    #[must_use]
    pub fn parse(uri: &str) -> Self {
        if let Some((scheme, rest)) = uri.split_once("://")
            && is_scheme(scheme)
        {
            let (authority, path) = match rest.find('/') {
                Some(i) => rest.split_at(i),
                None => (rest, "/"),
            };
            return Self {
                scheme: Some(scheme.to_ascii_lowercase()),
                authority: authority.to_string(),
                path: path.to_string(),
            };
        }
        Self {
            scheme: None,
            authority: String::new(),
            path: uri.to_string(),
        }
    }

    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Host part between `scheme://` and the path; empty when absent.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Put a client-local path back into the same form this URI was written in.
    #[must_use]
    pub fn qualify(&self, path: &str) -> String {
        match &self.scheme {
            Some(scheme) => format!("{scheme}://{}{path}", self.authority),
            None => path.to_string(),
        }
    }
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_scheme() {
        let uri = FsUri::parse("mem:///data/2024/*/part.csv");
        assert_eq!(uri.scheme(), Some("mem"));
        assert_eq!(uri.path(), "/data/2024/*/part.csv");
        assert_eq!(
            uri.qualify("/data/2024/01/part.csv"),
            "mem:///data/2024/01/part.csv"
        );
    }

    #[test]
    fn test_parse_bare_path() {
        let uri = FsUri::parse("/logs/*.jsonl");
        assert_eq!(uri.scheme(), None);
        assert_eq!(uri.path(), "/logs/*.jsonl");
        assert_eq!(uri.qualify("/logs/a.jsonl"), "/logs/a.jsonl");
    }

    #[test]
    fn test_authority_is_not_part_of_the_path() {
        let uri = FsUri::parse("file://localhost/tmp/x/*.csv");
        assert_eq!(uri.scheme(), Some("file"));
        assert_eq!(uri.authority(), "localhost");
        assert_eq!(uri.path(), "/tmp/x/*.csv");
        assert_eq!(uri.qualify("/tmp/x/a.csv"), "file://localhost/tmp/x/a.csv");

        let bucket = FsUri::parse("s3://bucket");
        assert_eq!(bucket.authority(), "bucket");
        assert_eq!(bucket.path(), "/");
    }

    #[test]
    fn test_scheme_is_normalized_and_validated() {
        assert_eq!(FsUri::parse("FILE:///tmp/x").scheme(), Some("file"));
        // Not a scheme: starts with a digit / contains a glob char
        assert_eq!(FsUri::parse("1x:///tmp").scheme(), None);
        assert_eq!(FsUri::parse("*://x").scheme(), None);
    }
}
