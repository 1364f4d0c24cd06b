// Wishcard - Desktop greeting-card player
// Module declarations
pub mod audio;
pub mod card;
pub mod config;
pub mod resources;

pub use audio::{
    AudioError, PlaybackControl, SequentialPlayer, TransportControl, TransportPlayer,
    TransportSnapshot, TransportState,
};
pub use card::GreetingCard;
pub use config::CardConfig;
