// Headless driver for the greeting card
// Runs the audio pre-flight check, plays the card over the terminal and
// polls the gift transport the same way a windowed shell would.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use wishcard::{CardConfig, GreetingCard};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let manifest = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("card.json"));
    let config = CardConfig::load(&manifest);
    let mut card = GreetingCard::new(config);

    if !card.audio_check() {
        eprintln!("Audio check incomplete; continuing anyway.");
    }

    card.start_background();

    let interval = card.config().narration_interval();
    for line in card.narration_lines() {
        println!("{line}");
        thread::sleep(interval);
    }

    println!();
    println!("Special thanks:");
    for line in card.thanks_lines() {
        println!("  {line}");
    }

    println!();
    println!("Opening the gift...");
    card.open_gift();
    while let Some(status) = card.gift_status() {
        if !status.playing && !status.paused {
            break;
        }
        println!("  {} / {} ({}%)", status.elapsed, status.total, status.percent);
        thread::sleep(Duration::from_millis(500));
    }

    card.wait_background();
    card.stop_all();
    Ok(())
}
