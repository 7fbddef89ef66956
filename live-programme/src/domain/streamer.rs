//! Streamer entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A tracked content creator.
///
/// `handles` maps platform name to the creator's channel handle on that
/// platform. The map is ordered so platform iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streamer {
    pub id: String,
    pub name: String,
    pub handles: BTreeMap<String, String>,
}

impl Streamer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            handles: BTreeMap::new(),
        }
    }

    pub fn with_handle(mut self, platform: impl Into<String>, handle: impl Into<String>) -> Self {
        self.handles.insert(platform.into(), handle.into());
        self
    }

    /// Platforms the streamer broadcasts on, in name order.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    pub fn handle_for(&self, platform: &str) -> Option<&str> {
        self.handles.get(platform).map(String::as_str)
    }

    /// First platform in name order, if any.
    pub fn primary_platform(&self) -> Option<&str> {
        self.platforms().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platforms_are_ordered() {
        let streamer = Streamer::new("s1", "Someone")
            .with_handle("youtube", "@someone")
            .with_handle("kick", "someone_k")
            .with_handle("twitch", "someone");

        let platforms: Vec<&str> = streamer.platforms().collect();
        assert_eq!(platforms, vec!["kick", "twitch", "youtube"]);
        assert_eq!(streamer.primary_platform(), Some("kick"));
        assert_eq!(streamer.handle_for("twitch"), Some("someone"));
        assert_eq!(streamer.handle_for("afreeca"), None);
    }
}
