use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Key the high score is stored under
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Synchronous scalar store for the best score ever reached
pub trait HighScoreStore {
    /// Stored high score, 0 when nothing usable is stored
    fn get(&self) -> u32;

    /// Replace the stored high score
    fn set(&mut self, score: u32);
}

/// Keeps the high score for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self { value }
    }
}

impl HighScoreStore for MemoryStore {
    fn get(&self) -> u32 {
        self.value
    }

    fn set(&mut self, score: u32) {
        self.value = score;
    }
}

/// A JSON object of key/value pairs on disk, e.g. `{"snakeHighScore": 120}`.
///
/// Other keys present in the file are preserved on write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, HIGH_SCORE_KEY)
    }

    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Raw file contents, `None` when there is no file yet
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read high score from {:?}", self.path)),
        }
    }

    fn parse(&self, json: &str) -> Result<Map<String, Value>> {
        serde_json::from_str(json)
            .with_context(|| format!("Failed to parse high score file {:?}", self.path))
    }

    fn load(&self) -> Result<Map<String, Value>> {
        match self.read()? {
            Some(json) => self.parse(&json),
            None => Ok(Map::new()),
        }
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize high score")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))
    }
}

impl HighScoreStore for JsonFileStore {
    fn get(&self) -> u32 {
        let entries = match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("{:#}; using high score 0", err);
                return 0;
            }
        };

        match entries.get(&self.key) {
            None => 0,
            Some(value) => match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                Some(score) => score,
                None => {
                    warn!(
                        "Ignoring unusable high score {} under {:?} in {:?}",
                        value, self.key, self.path
                    );
                    0
                }
            },
        }
    }

    fn set(&mut self, score: u32) {
        // Malformed JSON is replaced; a file we cannot read is left alone
        let mut entries = match self.read() {
            Ok(None) => Map::new(),
            Ok(Some(json)) => self.parse(&json).unwrap_or_else(|err| {
                warn!("{:#}; replacing it", err);
                Map::new()
            }),
            Err(err) => {
                warn!("{:#}; high score {} not persisted", err, score);
                return;
            }
        };
        entries.insert(self.key.clone(), Value::from(score));

        match self.save(&entries) {
            Ok(()) => debug!("Saved high score {} to {:?}", score, self.path),
            Err(err) => warn!("{:#}; high score {} not persisted", err, score),
        }
    }
}
