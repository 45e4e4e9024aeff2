//! Init command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::fs_abstraction::{real_fs, FileSystem};

/// Write the commented default config to `config_path`.
pub fn run(force: bool, config_path: &Path) -> Result<()> {
    write_default_config(real_fs(), force, config_path)?;
    info!("Config written to {:?}", config_path);
    Ok(())
}

fn write_default_config(fs: &dyn FileSystem, force: bool, config_path: &Path) -> Result<()> {
    if fs.exists(config_path) && !force {
        anyhow::bail!(
            "Config file {:?} already exists. Use --force to overwrite",
            config_path
        );
    }

    if let Some(dir) = config_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
        }
    }

    fs.write(config_path, Config::generate_default_yaml().as_bytes())
        .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_abstraction::{MockFileSystem, RealFileSystem};
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.yaml");

        write_default_config(&RealFileSystem, false, &path).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.cutoff_prefix, 10);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let mut mock = MockFileSystem::new();
        mock.expect_exists().returning(|_| true);
        mock.expect_write().never();

        let err = write_default_config(&mock, false, Path::new("/etc/splitroute/config.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("--force"));
    }

    #[test]
    fn test_init_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "cutoff_prefix: 20\n").unwrap();

        write_default_config(&RealFileSystem, true, &path).unwrap();
        assert_eq!(Config::load(&path).unwrap().cutoff_prefix, 10);
    }
}
