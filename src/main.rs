mod alarm;
mod history;
mod recommend;
mod sound;
mod ui;

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::warn;

use crate::history::{FileBackend, HistoryStore};
use crate::recommend::YoutubeSearch;
use crate::sound::SoundPlayer;

const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

#[derive(Parser, Debug)]
#[command(
    name = "wakelink",
    version,
    about = "One-shot desktop alarm with a video link for every wake-up"
)]
struct Cli {
    #[arg(long, default_value = "alarm_log.json")]
    history: PathBuf,

    #[arg(long, default_value = "alarm.mp3")]
    sound: PathBuf,

    /// Print the persisted alarm log and exit without opening a window.
    #[arg(long)]
    inspect_log: bool,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let history = HistoryStore::load(Box::new(FileBackend::new(cli.history.clone())));

    if cli.inspect_log {
        print_log(&history);
        return Ok(());
    }

    let sound = SoundPlayer::load(&cli.sound);
    let search = match env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Some(YoutubeSearch::new(key.trim().to_string())?),
        _ => {
            warn!("{API_KEY_ENV} is not set; recommendation buttons will report an error");
            None
        }
    };

    ui::app::run_gui(history, sound, search)
}

fn print_log(history: &HistoryStore) {
    println!("Alarm log entries: {}", history.len());
    for entry in history.entries() {
        let link = if entry.video_link.is_empty() {
            "-"
        } else {
            entry.video_link.as_str()
        };
        println!("  {}  {}", entry.time, link);
    }
}
