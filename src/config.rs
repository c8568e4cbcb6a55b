use crate::execution::DEFAULT_STEP_MS;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::snap::SNAP_THRESHOLD;
use crate::CurveStyle;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// How long a transient notice stays up
pub const DEFAULT_NOTICE_MS: u64 = 2500;

/// Editor tuning. Every field has a default, so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub snap_threshold: f64,
    pub snap_enabled: bool,
    pub history_capacity: usize,
    pub curve_style: CurveStyle,
    pub notice_ms: u64,
    pub playback_step_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            snap_enabled: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            curve_style: CurveStyle::default(),
            notice_ms: DEFAULT_NOTICE_MS,
            playback_step_ms: DEFAULT_STEP_MS,
        }
    }
}

impl EditorConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config from: {}", path.display()))?;
        info!(path = %path.display(), "editor config loaded");
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
