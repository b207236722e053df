//! Persist the local best score to disk (XDG config or ~/.config/twenty48).

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

const FILENAME: &str = "best_score";

/// Data directory for the best-score file and the local leaderboard:
/// `override_dir` when given, otherwise `$XDG_CONFIG_HOME/twenty48` or
/// `~/.config/twenty48`.
pub fn data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("twenty48")
}

/// Load the best score; missing or unparseable file reads as 0.
pub fn load(dir: &Path) -> u32 {
    fs::read_to_string(dir.join(FILENAME))
        .ok()
        .and_then(|content| content.trim().parse().ok())
        .unwrap_or(0)
}

/// Save the best score, creating the directory if needed.
pub fn save(dir: &Path, best: u32) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(FILENAME), format!("{}\n", best))?;
    Ok(())
}
