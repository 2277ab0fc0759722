pub mod init;
mod schema;

pub use schema::{CandidateConfig, Config, JudgeConfig, PairConfig, Profile, SegmentConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/tabulator/)
///
/// Falls back to the current directory when no home directory is known.
pub fn get_config_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".config").join("tabulator"),
        None => PathBuf::from(".tabulator"),
    }
}

/// Get the default competition file path (~/.config/tabulator/competition.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("competition.yaml")
}

/// Load a competition file from YAML
///
/// # Arguments
///
/// * `path` - Optional path to the file. If None, uses the default path
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Competition file not found at {}. Run `tabulator init` to create one",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read competition file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| {
            format!(
                "Failed to parse competition: invalid YAML in {}",
                config_path.display()
            )
        })?;

    Ok(config)
}

/// Serialize a competition to YAML and write it, creating parent directories.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize competition: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write competition to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tabulator-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(temp_path("missing.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Competition file not found"));
    }

    #[test]
    fn test_write_then_load() {
        let path = temp_path("starter.yaml");
        let starter = Config::starter();
        write_config(&path, &starter).unwrap();

        let loaded = load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded, starter);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let path = temp_path("unknown.yaml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "name: X\nsegmnets: []\n").unwrap();

        let err = load_config(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse competition"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_default_paths() {
        assert!(get_config_path().ends_with("tabulator/competition.yaml"));
    }
}
