use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub minecraft_dir: Option<PathBuf>,
    #[serde(default = "default_favourites_file")]
    pub favourites_file: String,
    #[serde(default = "default_downloads_file")]
    pub downloads_file: String,
    #[serde(skip)]
    config_dir: PathBuf,
}

impl AppConfig {
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_in(&base_data_dir()?)
    }

    pub fn load_or_create_in(config_dir: &Path) -> Result<Self> {
        fs::create_dir_all(config_dir).context("create app data dir")?;
        let path = config_dir.join("config.json");
        if path.exists() {
            let raw = fs::read_to_string(&path).context("read app config")?;
            let mut config: AppConfig = serde_json::from_str(&raw).context("parse app config")?;
            config.config_dir = config_dir.to_path_buf();
            if config.favourites_file.trim().is_empty() {
                config.favourites_file = default_favourites_file();
                config.save()?;
            }
            return Ok(config);
        }

        let config = AppConfig {
            minecraft_dir: None,
            favourites_file: default_favourites_file(),
            downloads_file: default_downloads_file(),
            config_dir: config_dir.to_path_buf(),
        };
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.config_dir).context("create app data dir")?;
        let path = self.config_dir.join("config.json");
        let raw = serde_json::to_string_pretty(self).context("serialize app config")?;
        fs::write(path, raw).context("write app config")?;
        Ok(())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn minecraft_root(&self) -> Result<PathBuf> {
        match &self.minecraft_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.clone()),
            _ => default_minecraft_dir(),
        }
    }

    pub fn mods_dir(&self) -> Result<PathBuf> {
        Ok(self.minecraft_root()?.join("mods"))
    }
}

pub fn default_minecraft_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    let dir = if cfg!(target_os = "windows") {
        base.data_dir().join(".minecraft")
    } else if cfg!(target_os = "macos") {
        base.data_dir().join("minecraft")
    } else {
        base.home_dir().join(".minecraft")
    };
    Ok(dir)
}

fn default_favourites_file() -> String {
    "favourite".to_string()
}

fn default_downloads_file() -> String {
    "downloads".to_string()
}

fn base_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    Ok(base.data_local_dir().join("modshelf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn creates_default_config() {
        let temp = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_create_in(temp.path()).unwrap();
        assert_eq!(config.favourites_file, "favourite");
        assert_eq!(config.downloads_file, "downloads");
        assert!(config.minecraft_dir.is_none());
        assert!(temp.path().join("config.json").exists());
    }

    #[test]
    fn reloads_saved_override() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = AppConfig::load_or_create_in(temp.path()).unwrap();
        config.minecraft_dir = Some(temp.path().join("mc"));
        config.save().unwrap();

        let reloaded = AppConfig::load_or_create_in(temp.path()).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.mods_dir().unwrap(), temp.path().join("mc").join("mods"));
    }

    #[test]
    fn fills_missing_fields() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("config.json"), r#"{"favourites_file": ""}"#).unwrap();
        let config = AppConfig::load_or_create_in(temp.path()).unwrap();
        assert_eq!(config.favourites_file, "favourite");
        assert_eq!(config.downloads_file, "downloads");
    }

    #[test]
    fn rejects_malformed_config() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("config.json"), "{ not json").unwrap();
        let err = AppConfig::load_or_create_in(temp.path()).unwrap_err();
        assert_eq!(err.to_string(), "parse app config");
    }
}
