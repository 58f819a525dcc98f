use anyhow::Result;
use portalfx_portal::PortalConfig;
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/portal.toml";

/// Load settings from an explicit path, falling back to defaults on read/parse errors.
///
/// Values that parse but fail validation are not replaced here; construction
/// rejects them.
pub fn load_from_path(path: &Path) -> PortalConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<PortalConfig>(&contents) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                PortalConfig::default()
            }
        },
        Err(err) => {
            if path != Path::new(DEFAULT_CONFIG_PATH) || err.kind() != std::io::ErrorKind::NotFound
            {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
            } else {
                warn!(
                    "Portal config not found at {}. Using defaults",
                    path.display()
                );
            }
            PortalConfig::default()
        }
    }
}

/// Write settings as TOML, creating parent directories.
pub fn save_to_path(config: &PortalConfig, path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}
