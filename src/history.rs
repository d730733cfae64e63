use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RingLogEntry {
    pub time: String,
    #[serde(rename = "videoLink")]
    pub video_link: String,
}

pub trait HistoryBackend {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, payload: &str) -> Result<()>;
}

pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HistoryBackend for FileBackend {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("unable to read history file {}", self.path.display())),
        }
    }

    fn store(&self, payload: &str) -> Result<()> {
        fs::write(&self.path, payload)
            .with_context(|| format!("unable to write history file {}", self.path.display()))
    }
}

pub struct HistoryStore {
    entries: Vec<RingLogEntry>,
    backend: Box<dyn HistoryBackend>,
}

impl HistoryStore {
    pub fn load(backend: Box<dyn HistoryBackend>) -> Self {
        let entries = match backend.load() {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<RingLogEntry>>(&payload) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("history payload is malformed, starting with an empty log: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("could not read history, starting with an empty log: {err:#}");
                Vec::new()
            }
        };
        Self { entries, backend }
    }

    pub fn append(&mut self, time: impl Into<String>, video_link: impl Into<String>) {
        self.entries.push(RingLogEntry {
            time: time.into(),
            video_link: video_link.into(),
        });
        self.persist();
    }

    pub fn entries(&self) -> &[RingLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // The whole sequence is rewritten on every append.
    fn persist(&self) {
        let payload = match serde_json::to_string_pretty(&self.entries) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("could not serialize history: {err}");
                return;
            }
        };
        if let Err(err) = self.backend.store(&payload) {
            warn!("could not persist history: {err:#}");
        }
    }
}
