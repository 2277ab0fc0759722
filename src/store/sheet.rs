use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::{ScoreRow, ScoreStore};

const SHEET_VERSION: u32 = 1;

/// On-disk form of every submitted score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub version: u32,
    #[serde(default)]
    pub scores: Vec<ScoreRow>,
}

impl Default for ScoreSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreSheet {
    pub fn new() -> Self {
        Self {
            version: SHEET_VERSION,
            scores: Vec::new(),
        }
    }

    /// Snapshot the current contents of a store
    pub fn from_store(store: &dyn ScoreStore) -> Self {
        Self {
            version: SHEET_VERSION,
            scores: store.rows(),
        }
    }
}

/// Get the default score sheet path (~/.config/tabulator/scores.json)
pub fn get_scores_path() -> PathBuf {
    crate::config::get_config_dir().join("scores.json")
}

/// Load a score sheet from a JSON file
///
/// If the file doesn't exist, returns an empty sheet.
/// If the file has an unsupported version, returns an error.
pub fn load_score_sheet(path: &Path) -> Result<ScoreSheet> {
    if !path.exists() {
        return Ok(ScoreSheet::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open score sheet at {}", path.display()))?;

    let sheet: ScoreSheet = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse score sheet at {}", path.display()))?;

    if sheet.version != SHEET_VERSION {
        anyhow::bail!("Unsupported score sheet version: {}", sheet.version);
    }

    Ok(sheet)
}

/// Save a score sheet atomically, creating the parent directory if needed.
pub fn save_score_sheet(path: &Path, sheet: &ScoreSheet) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, sheet).context("Failed to serialize score sheet")?;

    file.commit().context("Failed to save score sheet")?;

    Ok(())
}
