use crate::model::MinecraftMod;
use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error};

pub trait ConfigPersister {
    fn save_mod(&self, entry: &MinecraftMod, list_name: &str) -> Result<()>;
}

/// Saves `entry` and logs any failure instead of returning it.
pub fn save_mod_logged<P>(persister: &P, entry: Option<&MinecraftMod>, list_name: &str)
where
    P: ConfigPersister + ?Sized,
{
    let Some(entry) = entry else {
        return;
    };
    if let Err(err) = persister.save_mod(entry, list_name) {
        error!(list = list_name, mod_name = %entry.name, "save mod failed: {err:#}");
    }
}

#[derive(Debug, Clone)]
pub struct ModListStore {
    root: PathBuf,
}

impl ModListStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, list_name: &str) -> PathBuf {
        let path = self.root.join(list_name);
        if path.extension().is_none() {
            path.with_extension("json")
        } else {
            path
        }
    }

    pub fn read(&self, list_name: &str) -> Result<Vec<MinecraftMod>> {
        let path = self.path_for(list_name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).context("read mod list")?;
        parse_mod_list(&raw, &path)
    }

    pub fn append(&self, list_name: &str, entry: &MinecraftMod) -> Result<()> {
        let mut mods = self.read(list_name)?;
        mods.push(entry.clone());
        self.write(list_name, &mods)
    }

    pub fn remove_by_name(&self, list_name: &str, name: &str) -> Result<usize> {
        let mut mods = self.read(list_name)?;
        let before = mods.len();
        mods.retain(|entry| entry.name != name);
        let removed = before - mods.len();
        if removed == 0 {
            return Ok(0);
        }
        self.write(list_name, &mods)?;
        debug!(list = list_name, removed, "mod list entries removed");
        Ok(removed)
    }

    fn write(&self, list_name: &str, mods: &[MinecraftMod]) -> Result<()> {
        fs::create_dir_all(&self.root).context("create mod list dir")?;
        let path = self.path_for(list_name);
        let raw = serde_json::to_string_pretty(mods).context("serialize mod list")?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, raw).context("write mod list temp")?;
        fs::rename(&temp, &path).context("finalize mod list")?;
        Ok(())
    }
}

impl ConfigPersister for ModListStore {
    fn save_mod(&self, entry: &MinecraftMod, list_name: &str) -> Result<()> {
        self.append(list_name, entry)
    }
}

fn parse_mod_list(raw: &str, path: &Path) -> Result<Vec<MinecraftMod>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    if let Ok(mods) = serde_json::from_str::<Vec<MinecraftMod>>(raw) {
        return Ok(mods);
    }
    if let Ok(single) = serde_json::from_str::<MinecraftMod>(raw) {
        return Ok(vec![single]);
    }
    bail!("Invalid mod list format in {}", path.display())
}
