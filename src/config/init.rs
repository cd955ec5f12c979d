use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::Config;
use crate::flags::{FlagConfig, FlagThresholds};
use crate::scoring::ScoringConfig;

/// The built-in configuration spelled out in full, as YAML.
pub fn default_config_yaml() -> Result<String> {
    let config = Config {
        scoring: Some(ScoringConfig::default()),
        flags: Some(FlagConfig::from(FlagThresholds::default())),
    };
    let body = serde_saphyr::to_string(&config).context("Failed to serialize default config")?;
    Ok(format!(
        "# offset-screener configuration\n# Every section is optional; omitted values use these built-ins.\n{}",
        body
    ))
}

/// Write the default config to `path` atomically.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }
    }

    let yaml = default_config_yaml()?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit().context("Failed to save config")?;

    Ok(())
}
