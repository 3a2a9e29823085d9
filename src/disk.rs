use crate::model::ModDependency;
use anyhow::{bail, Context, Result};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;
use walkdir::WalkDir;

/// Source of the filenames currently present in the mods folder.
///
/// Every matcher call asks for a fresh listing; implementations must not
/// assume their results are cached between calls.
pub trait ModLister {
    fn list_mod_files(&self) -> Result<Vec<String>>;
}

impl<F> ModLister for F
where
    F: Fn() -> Result<Vec<String>>,
{
    fn list_mod_files(&self) -> Result<Vec<String>> {
        self()
    }
}

#[derive(Debug, Clone)]
pub struct ModsDir {
    root: PathBuf,
}

impl ModsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn delete_saved_mod(&self, file_name: &str) -> Result<()> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            bail!("Invalid mod file name: {file_name}");
        }
        let path = self.root.join(file_name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(file = %path.display(), "removed saved mod");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
        }
    }
}

impl ModLister for ModsDir {
    fn list_mod_files(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.context("read mods dir")?;
            if !entry.file_type().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

pub fn normalize_mod_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// First file in listing order whose lowercased name starts with the
/// normalized mod name, so "Mod" also matches "modpack_extra.jar".
pub fn matching_file<'a>(name: &str, files: &'a [String]) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }
    let wanted = normalize_mod_name(name);
    files
        .iter()
        .find(|file| file.to_lowercase().starts_with(&wanted))
        .map(String::as_str)
}

pub fn filter_disk_mod_depends<'a, L>(
    deps: &'a [ModDependency],
    lister: &L,
) -> Result<Vec<&'a ModDependency>>
where
    L: ModLister + ?Sized,
{
    partition_by_presence(deps, lister, true)
}

pub fn filter_no_disk_mod_depends<'a, L>(
    deps: &'a [ModDependency],
    lister: &L,
) -> Result<Vec<&'a ModDependency>>
where
    L: ModLister + ?Sized,
{
    partition_by_presence(deps, lister, false)
}

pub fn pair_disk_files<'a, L>(
    deps: &'a [ModDependency],
    lister: &L,
) -> Result<Vec<(&'a ModDependency, String)>>
where
    L: ModLister + ?Sized,
{
    let files = lister.list_mod_files()?;
    Ok(deps
        .iter()
        .filter_map(|dep| matching_file(&dep.name, &files).map(|file| (dep, file.to_string())))
        .collect())
}

pub fn is_mod_on_disk<L>(name: &str, lister: &L) -> Result<bool>
where
    L: ModLister + ?Sized,
{
    let files = lister.list_mod_files()?;
    Ok(matching_file(name, &files).is_some())
}

fn partition_by_presence<'a, L>(
    deps: &'a [ModDependency],
    lister: &L,
    present: bool,
) -> Result<Vec<&'a ModDependency>>
where
    L: ModLister + ?Sized,
{
    let files = lister.list_mod_files()?;
    let selected: Vec<&ModDependency> = deps
        .iter()
        .filter(|dep| dep.has_name())
        .filter(|dep| matching_file(&dep.name, &files).is_some() == present)
        .collect();
    debug!(
        deps = deps.len(),
        files = files.len(),
        selected = selected.len(),
        present,
        "disk presence scan"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn dep(name: &str) -> ModDependency {
        ModDependency {
            name: name.to_string(),
            mod_page_link: format!("https://example.test/{}", normalize_mod_name(name)),
            ..Default::default()
        }
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn fixed(names: &'static [&'static str]) -> impl Fn() -> Result<Vec<String>> {
        move || Ok(files(names))
    }

    fn names<'a>(deps: &[&'a ModDependency]) -> Vec<&'a str> {
        deps.iter().map(|dep| dep.name.as_str()).collect()
    }

    #[test]
    fn present_and_absent_partitions() {
        let deps = vec![dep("Some Mod"), dep("Other Mod"), dep("")];
        let lister = fixed(&["some_mod_1.20.jar"]);

        let on_disk = filter_disk_mod_depends(&deps, &lister).unwrap();
        let missing = filter_no_disk_mod_depends(&deps, &lister).unwrap();

        assert_eq!(names(&on_disk), vec!["Some Mod"]);
        assert_eq!(names(&missing), vec!["Other Mod"]);
    }

    #[test]
    fn partitions_are_complementary_for_named_deps() {
        let deps = vec![
            dep("Fabric API"),
            dep("Cloth Config"),
            dep(""),
            dep("Iris"),
            dep("Sodium"),
        ];
        let lister = fixed(&["README.txt", "fabric_api-0.92.jar", "Sodium-Fabric-0.5.jar"]);
        let on_disk = filter_disk_mod_depends(&deps, &lister).unwrap();
        let missing = filter_no_disk_mod_depends(&deps, &lister).unwrap();

        for dep in deps.iter().filter(|dep| dep.has_name()) {
            let in_present = on_disk.iter().any(|d| std::ptr::eq(*d, dep));
            let in_missing = missing.iter().any(|d| std::ptr::eq(*d, dep));
            assert!(in_present ^ in_missing, "{} must land in one side", dep.name);
        }
        assert_eq!(on_disk.len() + missing.len(), 4);
        assert_eq!(names(&on_disk), vec!["Fabric API", "Sodium"]);
    }

    #[test]
    fn prefix_match_keeps_false_positives() {
        let deps = vec![dep("Mod")];
        let lister = fixed(&["modpack_extra.jar"]);
        let on_disk = filter_disk_mod_depends(&deps, &lister).unwrap();
        assert_eq!(names(&on_disk), vec!["Mod"]);
    }

    #[test]
    fn first_matching_file_is_paired() {
        let deps = vec![dep("Jei")];
        let lister = fixed(&["other.jar", "jei-1.19.jar", "jei-1.20.jar"]);
        let pairs = pair_disk_files(&deps, &lister).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "jei-1.19.jar");
    }

    #[test]
    fn each_call_fetches_a_fresh_listing() {
        let calls = Cell::new(0);
        let lister = || -> Result<Vec<String>> {
            calls.set(calls.get() + 1);
            Ok(files(&["a.jar"]))
        };
        let deps = vec![dep("A")];
        filter_disk_mod_depends(&deps, &lister).unwrap();
        filter_no_disk_mod_depends(&deps, &lister).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn lister_failure_propagates() {
        let lister = || -> Result<Vec<String>> { Err(anyhow!("mods dir unreadable")) };
        let deps = vec![dep("A")];
        let err = filter_disk_mod_depends(&deps, &lister).unwrap_err();
        assert_eq!(err.to_string(), "mods dir unreadable");
        assert!(is_mod_on_disk("A", &lister).is_err());
    }

    #[test]
    fn mods_dir_lists_top_level_files_only() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("b_mod.jar"), b"").unwrap();
        fs::write(temp.path().join("a_mod.jar"), b"").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("c_mod.jar"), b"").unwrap();

        let dir = ModsDir::new(temp.path());
        assert_eq!(
            dir.list_mod_files().unwrap(),
            vec!["a_mod.jar".to_string(), "b_mod.jar".to_string()]
        );
        assert!(is_mod_on_disk("A Mod", &dir).unwrap());
        assert!(!is_mod_on_disk("C Mod", &dir).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_jars_are_listed() {
        let temp = tempfile::tempdir().unwrap();
        let store = temp.path().join("store");
        let mods = temp.path().join("mods");
        fs::create_dir_all(&store).unwrap();
        fs::create_dir_all(&mods).unwrap();
        let target = store.join("fabric_api-0.92.jar");
        fs::write(&target, b"").unwrap();
        std::os::unix::fs::symlink(&target, mods.join("fabric_api-0.92.jar")).unwrap();

        let dir = ModsDir::new(&mods);
        assert_eq!(dir.list_mod_files().unwrap(), vec!["fabric_api-0.92.jar".to_string()]);
        let deps = vec![dep("Fabric API")];
        assert!(filter_no_disk_mod_depends(&deps, &dir).unwrap().is_empty());
    }

    #[test]
    fn missing_mods_dir_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let dir = ModsDir::new(temp.path().join("mods"));
        assert!(dir.list_mod_files().unwrap().is_empty());
    }

    #[test]
    fn delete_saved_mod_removes_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sodium.jar");
        fs::write(&path, b"jar").unwrap();
        let dir = ModsDir::new(temp.path());

        dir.delete_saved_mod("sodium.jar").unwrap();
        assert!(!path.exists());
        dir.delete_saved_mod("sodium.jar").unwrap();
        assert!(dir.delete_saved_mod("../escape.jar").is_err());
    }
}
