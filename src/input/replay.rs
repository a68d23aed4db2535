// Input recording and replay
//
// A recording is the polled input byte of every frame. Because the bit
// positions of `Button` are fixed, a log recorded on one machine replays
// the same on another through the simulated-input byte.

use crate::error::{HalError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current input log format version
const INPUT_LOG_VERSION: u32 = 1;

/// Polled input bytes, one per frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLog {
    version: u32,
    pub frames: Vec<u8>,
}

impl InputLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            version: INPUT_LOG_VERSION,
            frames: Vec::new(),
        }
    }

    /// Format version of this log
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of recorded frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frames were recorded
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Parse a log from JSON, rejecting other format versions
    pub fn from_json(json: &str) -> Result<Self> {
        let log: InputLog = serde_json::from_str(json)?;
        if log.version != INPUT_LOG_VERSION {
            return Err(HalError::Config(format!(
                "Input log version mismatch: expected {}, found {}",
                INPUT_LOG_VERSION, log.version
            )));
        }
        Ok(log)
    }

    /// Serialize the log to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Save the log to a JSON file
    ///
    /// # Arguments
    /// * `path` - Destination file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        log::info!("Saved {} input frames to {}", self.frames.len(), path.display());
        Ok(())
    }

    /// Load a log from a JSON file
    ///
    /// # Arguments
    /// * `path` - Source file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for InputLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Captures the polled byte once per frame
#[derive(Debug, Clone, Default)]
pub struct InputRecorder {
    log: InputLog,
}

impl InputRecorder {
    /// Start an empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame
    pub fn record(&mut self, state: u8) {
        self.log.frames.push(state);
    }

    /// Frames recorded so far
    pub fn frame_count(&self) -> usize {
        self.log.len()
    }

    /// Current recording
    pub fn log(&self) -> &InputLog {
        &self.log
    }

    /// Stop recording and return the log
    pub fn finish(self) -> InputLog {
        self.log
    }
}

/// Feeds a recorded log back, one byte per frame
#[derive(Debug, Clone)]
pub struct InputPlayback {
    log: InputLog,
    position: usize,
}

impl InputPlayback {
    /// Play a log from its first frame
    pub fn new(log: InputLog) -> Self {
        Self { log, position: 0 }
    }

    /// Byte for the next frame, or None once the log is exhausted
    pub fn next_frame(&mut self) -> Option<u8> {
        let state = self.log.frames.get(self.position).copied()?;
        self.position += 1;
        Some(state)
    }

    /// Whether every frame has been played
    pub fn is_finished(&self) -> bool {
        self.position >= self.log.frames.len()
    }

    /// Frames played so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Restart from the first frame
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_then_play() {
        let mut recorder = InputRecorder::new();
        for state in [0b0000_0001, 0b0001_0001, 0] {
            recorder.record(state);
        }
        assert_eq!(recorder.frame_count(), 3);

        let mut playback = InputPlayback::new(recorder.finish());
        assert_eq!(playback.next_frame(), Some(0b0000_0001));
        assert_eq!(playback.next_frame(), Some(0b0001_0001));
        assert_eq!(playback.next_frame(), Some(0));
        assert!(playback.is_finished());
        assert_eq!(playback.next_frame(), None);

        playback.rewind();
        assert_eq!(playback.position(), 0);
        assert_eq!(playback.next_frame(), Some(0b0000_0001));
    }

    #[test]
    fn test_json_contains_version() {
        let mut log = InputLog::new();
        log.frames.push(0x40);
        let json = log.to_json().unwrap();
        assert!(json.contains("\"version\":1"));

        let restored = InputLog::from_json(&json).unwrap();
        assert_eq!(restored, log);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let result = InputLog::from_json(r#"{"version":99,"frames":[1,2]}"#);
        assert!(matches!(result, Err(HalError::Config(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(InputLog::from_json("not json").is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("fantasy_hal_replay_{}", std::process::id()));
        let path = dir.join("session.json");

        let mut log = InputLog::new();
        log.frames.extend_from_slice(&[1, 2, 4, 8]);
        log.save_to_file(&path).unwrap();

        let loaded = InputLog::load_from_file(&path).unwrap();
        assert_eq!(loaded.frames, vec![1, 2, 4, 8]);

        let _ = fs::remove_dir_all(&dir);
    }
}
