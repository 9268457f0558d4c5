use anyhow::Result;
use std::path::PathBuf;

const LOG_FOLDER_NAME: &str = "sync-wizard-logs";
const CONFIG_FILE_NAME: &str = "sync-wizard.toml";

/// Resolve the folder the binary runs from (absolute path)
pub fn resolve_run_folder() -> Result<PathBuf> {
    // Prefer the folder where the executable lives (works in dev and deployed)
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(dir) = exe_path.parent() {
            return Ok(dir.to_path_buf());
        }
    }

    // Fallback: current working directory
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Ok(cwd)
}

/// Resolve log folder (absolute path)
///
/// Strategy:
/// - Walk up from CWD looking for an existing `sync-wizard-logs/` so nested
///   invocations (e.g. from `sync-wizard/src/`) reuse the workspace folder
/// - Otherwise use the platform data dir (`~/.local/share/sync-wizard/...`)
/// - Last resort: create next to the binary
pub fn resolve_log_folder() -> Result<PathBuf> {
    if let Ok(mut dir) = std::env::current_dir() {
        for _ in 0..8 {
            let candidate = dir.join(LOG_FOLDER_NAME);
            if candidate.exists() {
                return Ok(candidate);
            }
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            } else {
                break;
            }
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        let candidate = data_dir.join("sync-wizard").join("logs");
        std::fs::create_dir_all(&candidate)
            .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
        return Ok(candidate);
    }

    let base = resolve_run_folder()?;
    let log_dir = base.join(LOG_FOLDER_NAME);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}

/// Candidate locations for `sync-wizard.toml`, highest priority first:
/// explicit env override, CWD, then the platform config dir.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();

    if let Ok(p) = std::env::var("SYNC_WIZARD_CONFIG") {
        if !p.trim().is_empty() {
            out.push(PathBuf::from(p));
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        out.push(cwd.join(CONFIG_FILE_NAME));
    }

    if let Some(config_dir) = dirs::config_dir() {
        out.push(config_dir.join("sync-wizard").join(CONFIG_FILE_NAME));
    }

    out
}
