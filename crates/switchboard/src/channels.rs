//! Channel list loading.
//!
//! The channel-list collaborator boundary: a YAML document mapping each
//! canonical group name to its ordered candidate list. Playlist-format
//! parsing and name canonicalization happen upstream of this file; the
//! engine only ever sees the structured form.

use crate::types::ChannelGroups;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Channel list error types
#[derive(Debug, Error)]
pub enum ChannelsError {
    #[error("Failed to read channel list: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse channel list: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Load channel groups from a YAML file.
///
/// Every candidate must carry a `url`; any further fields ride along as
/// opaque metadata. Groups with no candidates are kept (and skipped later
/// at processing time), so a reload cannot silently drop a group name.
pub fn load_channels(path: impl AsRef<Path>) -> Result<ChannelGroups, ChannelsError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let groups = parse_channels(&contents)?;

    info!(
        path = %path.display(),
        groups = groups.len(),
        candidates = groups.values().map(Vec::len).sum::<usize>(),
        "channel list loaded"
    );
    Ok(groups)
}

/// Parse a channel list document
pub fn parse_channels(contents: &str) -> Result<ChannelGroups, ChannelsError> {
    let groups: ChannelGroups = serde_yaml::from_str(contents)?;

    for (name, candidates) in &groups {
        if candidates.is_empty() {
            debug!(group = %name, "group has no candidates");
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups_with_metadata() {
        let yaml = r#"
news:
  - url: "http://upstream-a/news.ts"
    name: "News HD"
    tvg-logo: "http://upstream-a/news.png"
  - url: "http://upstream-b/news.ts"
sports: []
"#;
        let groups = parse_channels(yaml).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["news"].len(), 2);
        assert!(groups["sports"].is_empty());
        assert_eq!(groups["news"][0].name.as_deref(), Some("News HD"));
        assert_eq!(
            groups["news"][0]
                .extra
                .get("tvg-logo")
                .and_then(|v| v.as_str()),
            Some("http://upstream-a/news.png")
        );
    }

    #[test]
    fn test_candidate_without_url_is_rejected() {
        let yaml = r#"
news:
  - name: "No URL here"
"#;
        assert!(parse_channels(yaml).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_channels("/nonexistent/channels.yaml"),
            Err(ChannelsError::IoError(_))
        ));
    }

    #[test]
    fn test_empty_document() {
        let groups = parse_channels("{}").unwrap();
        assert!(groups.is_empty());
    }
}
