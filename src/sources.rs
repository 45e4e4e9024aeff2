//! Loading of the local exclude/include lists and the country feed file.

use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::SplitrouteError;
use crate::feed::{country_resource_url, parse_feed};
use crate::fs_abstraction::FileSystem;
use crate::parser::{parse_list, ParseOutcome};
use crate::planner::ParsedSource;

/// Read a list file.
///
/// A missing file is an empty list, logged at `warn`. Any other I/O failure
/// is a [`SplitrouteError::FileSystem`] error.
pub fn read_list(fs: &dyn FileSystem, path: &Path) -> Result<String, SplitrouteError> {
    match fs.read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("List file {:?} not found, treating it as empty", path);
            Ok(String::new())
        }
        Err(e) => Err(SplitrouteError::FileSystem(format!(
            "Failed to read {:?}: {}",
            path, e
        ))),
    }
}

fn log_outcome(name: &str, outcome: &ParseOutcome) {
    for reject in &outcome.rejected {
        warn!(
            "{}: skipping line {} '{}': {}",
            name, reject.line, reject.entry, reject.reason
        );
    }
    info!(
        "Loaded {}: {} entries ({} skipped)",
        name,
        outcome.accepted(),
        outcome.rejected.len()
    );
}

/// Load and parse a newline-delimited list file.
pub fn load_list_source(
    fs: &dyn FileSystem,
    name: &str,
    path: &Path,
) -> Result<ParsedSource, SplitrouteError> {
    let content = read_list(fs, path)?;
    let outcome = parse_list(&content);
    log_outcome(name, &outcome);
    Ok(ParsedSource::from_outcome(name, outcome))
}

/// Load the country feed from a file previously fetched by an external tool.
///
/// No path means no country exclusions. A file that exists but does not
/// decode, declares another country, or yields no usable entry at all is an
/// error: routing the whole country through the tunnel on a broken download
/// is never what the operator wants.
pub fn load_feed_source(
    fs: &dyn FileSystem,
    path: Option<&Path>,
    country_code: &str,
) -> Result<ParsedSource, SplitrouteError> {
    let Some(path) = path else {
        info!(
            "No country feed configured; fetch {} and set feed_file",
            country_resource_url(country_code)
        );
        return Ok(ParsedSource::empty("country"));
    };

    let content = read_list(fs, path)?;
    if content.trim().is_empty() {
        return Ok(ParsedSource::empty("country"));
    }

    let payload = parse_feed(&content)?;
    payload.ensure_country(country_code)?;
    debug!("Feed {:?}: {} raw entries", path, payload.raw_count());

    let outcome = payload.parse();
    log_outcome("country", &outcome);
    if outcome.accepted() == 0 && !outcome.rejected.is_empty() {
        return Err(SplitrouteError::Feed(format!(
            "no valid entries in {:?} ({} rejected)",
            path,
            outcome.rejected.len()
        )));
    }
    Ok(ParsedSource::from_outcome("country", outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_abstraction::{MockFileSystem, RealFileSystem};
    use std::io;

    fn not_found() -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, "no such file")
    }

    #[test]
    fn test_read_list_missing_is_empty() {
        let mut mock = MockFileSystem::new();
        mock.expect_read_to_string()
            .returning(|_| Err(not_found()));
        let content = read_list(&mock, Path::new("/etc/splitroute/exclude.txt")).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_read_list_unreadable_is_error() {
        let mut mock = MockFileSystem::new();
        mock.expect_read_to_string()
            .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));
        let err = read_list(&mock, Path::new("/root/secret.txt")).unwrap_err();
        assert!(matches!(err, SplitrouteError::FileSystem(_)));
    }

    #[test]
    fn test_load_list_source() {
        let mut mock = MockFileSystem::new();
        mock.expect_read_to_string().times(1).returning(|path| {
            assert_eq!(path, Path::new("/lists/exclude.txt"));
            Ok("# local\n10.0.0.0/8\n\n192.168.0.0/16 # lan\nnot-an-ip\n".to_string())
        });

        let source = load_list_source(&mock, "exclude", Path::new("/lists/exclude.txt")).unwrap();
        assert_eq!(source.name, "exclude");
        assert_eq!(source.accepted, 2);
        assert_eq!(source.rejected.len(), 1);
        assert_eq!(source.rejected[0].line, 5);
        assert_eq!(source.set.to_strings(), vec!["10.0.0.0/8", "192.168.0.0/16"]);
    }

    #[test]
    fn test_load_list_source_missing() {
        let mut mock = MockFileSystem::new();
        mock.expect_read_to_string()
            .returning(|_| Err(not_found()));
        let source = load_list_source(&mock, "include", Path::new("/nope")).unwrap();
        assert!(source.set.is_empty());
        assert_eq!(source.accepted, 0);
    }

    #[test]
    fn test_load_feed_source_none() {
        let mock = MockFileSystem::new();
        let source = load_feed_source(&mock, None, "RU").unwrap();
        assert!(source.set.is_empty());
        assert_eq!(source.name, "country");
    }

    #[test]
    fn test_load_feed_source_json() {
        let mut mock = MockFileSystem::new();
        let feed = r#"{"status":"ok","data":{"resource":"RU","resources":{"ipv4":[
            "5.1.2.0/24","77.88.0.0-77.88.0.255","bogus"]}}}"#;
        mock.expect_read_to_string()
            .returning(move |_| Ok(feed.to_string()));
        let source = load_feed_source(&mock, Some(Path::new("/var/cache/ru.json")), "RU").unwrap();
        assert_eq!(source.accepted, 2);
        assert_eq!(source.rejected.len(), 1);
        assert_eq!(source.set.to_strings(), vec!["5.1.2.0/24", "77.88.0.0/24"]);
    }

    #[test]
    fn test_load_feed_source_broken_json() {
        let mut mock = MockFileSystem::new();
        mock.expect_read_to_string()
            .returning(|_| Ok(r#"{"status":"error","data":null}"#.to_string()));
        let err = load_feed_source(&mock, Some(Path::new("/var/cache/ru.json")), "RU").unwrap_err();
        assert!(matches!(err, SplitrouteError::Feed(_)));
    }

    #[test]
    fn test_load_feed_source_plain_text_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("ru.txt");
        std::fs::write(&path, "5.1.2.0/24\n5.1.3.0/24\n").unwrap();

        let source = load_feed_source(&RealFileSystem, Some(&path), "RU").unwrap();
        assert_eq!(source.set.to_strings(), vec!["5.1.2.0/23"]);
    }

    #[test]
    fn test_load_feed_source_json_array() {
        let mut mock = MockFileSystem::new();
        mock.expect_read_to_string()
            .returning(|_| Ok(r#"["5.1.2.0/24", "77.88.0.0/16"]"#.to_string()));
        let source = load_feed_source(&mock, Some(Path::new("/var/cache/ru.json")), "RU").unwrap();
        assert_eq!(source.accepted, 2);
        assert!(source.rejected.is_empty());
        assert_eq!(source.set.to_strings(), vec!["5.1.2.0/24", "77.88.0.0/16"]);
    }

    #[test]
    fn test_load_feed_source_nothing_usable_is_error() {
        let mut mock = MockFileSystem::new();
        mock.expect_read_to_string()
            .returning(|_| Ok("<html>rate limited</html>\n".to_string()));
        let err = load_feed_source(&mock, Some(Path::new("/var/cache/ru.txt")), "RU").unwrap_err();
        assert!(matches!(err, SplitrouteError::Feed(_)));
    }

    #[test]
    fn test_load_feed_source_wrong_country() {
        let mut mock = MockFileSystem::new();
        let feed = r#"{"status":"ok","data":{"resource":"BY",
            "resources":{"ipv4":["5.1.2.0/24"]}}}"#;
        mock.expect_read_to_string()
            .returning(move |_| Ok(feed.to_string()));
        let err = load_feed_source(&mock, Some(Path::new("/var/cache/ru.json")), "RU").unwrap_err();
        assert!(matches!(err, SplitrouteError::Feed(_)));
        assert!(err.to_string().contains("BY"));
    }
}
