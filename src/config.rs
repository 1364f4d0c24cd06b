// Card manifest loading and persistence
// Describes what the card plays and shows. Defaults mirror the bundled
// resources/ layout so the app runs without a manifest at all.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub version: i32, // Manifest schema version for future migrations
    /// Explicit resource root; when absent the root is located next to
    /// the executable or under the working directory.
    pub resource_root: Option<PathBuf>,
    pub background_tracks: Vec<String>,
    pub test_tracks: Vec<String>,
    pub gift_track: String,
    pub gift_images: Vec<String>,
    pub message_file: String,
    pub thanks_file: String,
    pub inter_track_delay_ms: u64,
    pub narration_interval_ms: u64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            version: 1,
            resource_root: None,
            background_tracks: vec!["resources/background.wav".to_string()],
            test_tracks: vec![
                "resources/test1.wav".to_string(),
                "resources/test2.wav".to_string(),
            ],
            gift_track: "resources/gift_audio.wav".to_string(),
            gift_images: vec![
                "resources/gift_image1.png".to_string(),
                "resources/gift_image2.png".to_string(),
                "resources/gift_image3.png".to_string(),
            ],
            message_file: "resources/message.txt".to_string(),
            thanks_file: "resources/thanks.txt".to_string(),
            inter_track_delay_ms: 100,
            narration_interval_ms: 2000,
        }
    }
}

impl CardConfig {
    /// Load a manifest from file, or fall back to the defaults if it is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(?path, "no card manifest found, using defaults");
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => {
                debug!(?path, "loaded card manifest");
                config
            }
            Err(e) => {
                warn!(?path, error = %e, "could not load card manifest, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self).context("serialize card manifest")?;
        fs::write(path, content).with_context(|| format!("write card manifest to {path:?}"))?;
        Ok(())
    }

    pub fn inter_track_delay(&self) -> Duration {
        Duration::from_millis(self.inter_track_delay_ms)
    }

    pub fn narration_interval(&self) -> Duration {
        Duration::from_millis(self.narration_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_bundled_layout() {
        let config = CardConfig::default();
        assert_eq!(config.background_tracks, vec!["resources/background.wav"]);
        assert_eq!(config.gift_track, "resources/gift_audio.wav");
        assert_eq!(config.gift_images.len(), 3);
        assert_eq!(config.inter_track_delay(), Duration::from_millis(100));
        assert_eq!(config.narration_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn missing_manifest_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CardConfig::load(&dir.path().join("card.json"));
        assert_eq!(config.version, 1);
        assert_eq!(config.message_file, "resources/message.txt");
    }

    #[test]
    fn malformed_manifest_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        fs::write(&path, "{ not json").unwrap();
        let config = CardConfig::load(&path);
        assert_eq!(config.gift_track, "resources/gift_audio.wav");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");

        let mut config = CardConfig::default();
        config.background_tracks = vec!["resources/intro.wav".to_string()];
        config.narration_interval_ms = 1500;
        config.save(&path).unwrap();

        let loaded = CardConfig::load(&path);
        assert_eq!(loaded.background_tracks, vec!["resources/intro.wav"]);
        assert_eq!(loaded.narration_interval_ms, 1500);
    }
}
