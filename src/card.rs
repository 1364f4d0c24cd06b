// Card controller
// Owns the playback sessions and the card content. This is the surface a
// presentation layer calls: it never blocks on a player (except for the
// explicit pre-flight check) and it never sees a playback error, only
// logs and empty results.

use std::path::PathBuf;

use tracing::warn;

use crate::audio::{
    CpalSinkFactory, PlaybackControl, SequentialPlayer, SinkFactory, TransportControl,
    TransportPlayer, TransportSnapshot,
};
use crate::config::CardConfig;
use crate::resources::{self, ResourceDir};

const MESSAGE_FALLBACK: &str = "Could not read the message file.";
const THANKS_FALLBACK: &str = "Thank you for your support!";

pub struct GreetingCard<F = CpalSinkFactory> {
    config: CardConfig,
    resources: ResourceDir,
    factory: F,
    background: Option<SequentialPlayer>,
    gift: Option<TransportPlayer>,
}

impl GreetingCard<CpalSinkFactory> {
    pub fn new(config: CardConfig) -> Self {
        Self::with_factory(config, CpalSinkFactory)
    }
}

impl<F: SinkFactory + Clone + 'static> GreetingCard<F> {
    pub fn with_factory(config: CardConfig, factory: F) -> Self {
        let resources = ResourceDir::locate(config.resource_root.clone());
        Self {
            config,
            resources,
            factory,
            background: None,
            gift: None,
        }
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn narration_lines(&self) -> Vec<String> {
        let path = self.resources.resolve(&self.config.message_file);
        resources::load_lines(&path, MESSAGE_FALLBACK)
    }

    pub fn thanks_lines(&self) -> Vec<String> {
        let path = self.resources.resolve(&self.config.thanks_file);
        resources::load_lines(&path, THANKS_FALLBACK)
    }

    pub fn gift_images(&self) -> Vec<PathBuf> {
        self.config
            .gift_images
            .iter()
            .map(|image| self.resources.resolve(image))
            .collect()
    }

    /// Play the bundled test clips to completion so the user can confirm
    /// audio works before the card opens. Returns whether every test clip
    /// was present.
    pub fn audio_check(&self) -> bool {
        let paths: Vec<PathBuf> = self
            .config
            .test_tracks
            .iter()
            .map(|track| self.resources.resolve(track))
            .collect();
        let all_present = paths.iter().all(|path| path.is_file());
        if !all_present {
            warn!("some test clips are missing, the check may be silent");
        }

        let mut player = SequentialPlayer::start(
            paths,
            self.config.inter_track_delay(),
            self.factory.clone(),
        );
        player.wait();
        all_present
    }

    /// Start the background sequence, replacing any already running.
    pub fn start_background(&mut self) {
        self.stop_background();
        let paths = self
            .config
            .background_tracks
            .iter()
            .map(|track| self.resources.resolve(track))
            .collect();
        self.background = Some(SequentialPlayer::start(
            paths,
            self.config.inter_track_delay(),
            self.factory.clone(),
        ));
    }

    pub fn stop_background(&mut self) {
        if let Some(player) = self.background.take() {
            player.stop();
        }
    }

    pub fn background_active(&self) -> bool {
        self.background
            .as_ref()
            .map(|player| player.is_active())
            .unwrap_or(false)
    }

    /// Block until the background sequence finishes.
    pub fn wait_background(&mut self) {
        if let Some(player) = self.background.as_mut() {
            player.wait();
        }
    }

    /// Start the gift recording, replacing any already playing. An open
    /// failure is logged and leaves no session; nothing plays.
    pub fn open_gift(&mut self) {
        self.close_gift();
        let path = self.resources.resolve(&self.config.gift_track);
        match TransportPlayer::start(&path, self.factory.clone()) {
            Ok(player) => self.gift = Some(player),
            Err(e) => warn!(?path, error = %e, "could not start gift playback"),
        }
    }

    pub fn close_gift(&mut self) {
        if let Some(player) = self.gift.take() {
            player.stop();
        }
    }

    pub fn gift(&self) -> Option<&TransportPlayer> {
        self.gift.as_ref()
    }

    pub fn gift_status(&self) -> Option<TransportSnapshot> {
        self.gift.as_ref().map(|player| player.snapshot())
    }

    pub fn pause_gift(&self) {
        if let Some(player) = &self.gift {
            player.pause();
        }
    }

    pub fn resume_gift(&self) {
        if let Some(player) = &self.gift {
            player.resume();
        }
    }

    pub fn gift_fast_forward(&self, seconds: u32) {
        if let Some(player) = &self.gift {
            player.fast_forward(seconds);
        }
    }

    pub fn gift_rewind(&self, seconds: u32) {
        if let Some(player) = &self.gift {
            player.rewind(seconds);
        }
    }

    pub fn set_gift_position(&self, frame: u64) {
        if let Some(player) = &self.gift {
            player.set_position(frame);
        }
    }

    pub fn stop_all(&mut self) {
        self.stop_background();
        self.close_gift();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testutil::{wait_for, write_test_wav, CountingSinkFactory};
    use std::fs;
    use std::time::Duration;

    fn card_in(dir: &std::path::Path, factory: CountingSinkFactory) -> GreetingCard<CountingSinkFactory> {
        let config = CardConfig {
            resource_root: Some(dir.to_path_buf()),
            ..CardConfig::default()
        };
        GreetingCard::with_factory(config, factory)
    }

    #[test]
    fn narration_falls_back_when_message_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let card = card_in(dir.path(), CountingSinkFactory::new(None));
        assert_eq!(card.narration_lines(), vec![MESSAGE_FALLBACK]);
        assert_eq!(card.thanks_lines(), vec![THANKS_FALLBACK]);
    }

    #[test]
    fn narration_reads_the_message_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("resources")).unwrap();
        fs::write(
            dir.path().join("resources/message.txt"),
            "Happy birthday!\nWe made this for you.\n",
        )
        .unwrap();

        let card = card_in(dir.path(), CountingSinkFactory::new(None));
        assert_eq!(
            card.narration_lines(),
            vec!["Happy birthday!", "We made this for you."]
        );
    }

    #[test]
    fn gift_images_resolve_against_the_resource_root() {
        let dir = tempfile::tempdir().unwrap();
        let card = card_in(dir.path(), CountingSinkFactory::new(None));
        let images = card.gift_images();
        assert_eq!(images.len(), 3);
        assert_eq!(images[0], dir.path().join("resources/gift_image1.png"));
    }

    #[test]
    fn open_gift_with_missing_track_leaves_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut card = card_in(dir.path(), CountingSinkFactory::new(None));
        card.open_gift();
        assert!(card.gift().is_none());
        assert!(card.gift_status().is_none());
        // controls against the absent session are harmless no-ops
        card.pause_gift();
        card.gift_fast_forward(5);
    }

    #[test]
    fn open_gift_plays_the_gift_track() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("resources")).unwrap();
        write_test_wav(&dir.path().join("resources/gift_audio.wav"), 2_000, 1000, 1);

        let factory = CountingSinkFactory::new(None);
        let mut card = card_in(dir.path(), factory.clone());
        card.open_gift();
        assert!(card.gift().is_some());
        assert!(wait_for(|| factory.samples_written() == 2_000));
        card.close_gift();
        assert!(card.gift().is_none());
    }

    #[test]
    fn background_runs_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("resources")).unwrap();
        write_test_wav(
            &dir.path().join("resources/background.wav"),
            100_000,
            8000,
            1,
        );

        let factory = CountingSinkFactory::new(Some(Duration::from_millis(5)));
        let mut card = card_in(dir.path(), factory);
        card.start_background();
        assert!(card.background_active());
        card.stop_background();
        assert!(!card.background_active());
    }

    #[test]
    fn audio_check_reports_missing_clips() {
        let dir = tempfile::tempdir().unwrap();
        let card = card_in(dir.path(), CountingSinkFactory::new(None));
        assert!(!card.audio_check());

        fs::create_dir(dir.path().join("resources")).unwrap();
        write_test_wav(&dir.path().join("resources/test1.wav"), 100, 8000, 1);
        write_test_wav(&dir.path().join("resources/test2.wav"), 100, 8000, 1);
        let factory = CountingSinkFactory::new(None);
        let card = card_in(dir.path(), factory.clone());
        assert!(card.audio_check());
        assert_eq!(factory.samples_written(), 200);
    }
}
