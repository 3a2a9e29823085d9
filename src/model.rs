use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MinecraftMod {
    pub name: String,
    pub icon: String,
    pub mod_page_link: String,
    pub description: String,
    pub versions: Vec<String>,
    pub screenshots: Vec<String>,
    pub loaders: Vec<String>,
    pub dependency: Vec<ModDependency>,
    pub details: Vec<DownloadInfo>,
}

impl MinecraftMod {
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }

    pub fn has_loader(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.details
            .iter()
            .any(|detail| detail.loader.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModDependency {
    pub mod_page_link: String,
    #[serde(rename = "URL")]
    pub url: String,
    pub name: String,
    pub version: String,
    pub loader: String,
    pub dependency: Vec<ModDependency>,
    pub details: Vec<DownloadInfo>,
}

impl ModDependency {
    pub fn needs_details(&self) -> bool {
        self.details.is_empty()
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

// Rebuilt bottom-up on an explicit stack: copying a deep chain must not
// recurse once per level.
impl Clone for ModDependency {
    fn clone(&self) -> Self {
        let mut current = CloneFrame::new(self);
        let mut parents: Vec<CloneFrame<'_>> = Vec::new();
        loop {
            let source = current.source;
            if let Some(child) = source.dependency.get(current.children.len()) {
                parents.push(std::mem::replace(&mut current, CloneFrame::new(child)));
                continue;
            }
            let node = current.finish();
            match parents.pop() {
                Some(mut parent) => {
                    parent.children.push(node);
                    current = parent;
                }
                None => return node,
            }
        }
    }
}

struct CloneFrame<'a> {
    source: &'a ModDependency,
    children: Vec<ModDependency>,
}

impl<'a> CloneFrame<'a> {
    fn new(source: &'a ModDependency) -> Self {
        Self {
            source,
            children: Vec::with_capacity(source.dependency.len()),
        }
    }

    fn finish(self) -> ModDependency {
        ModDependency {
            mod_page_link: self.source.mod_page_link.clone(),
            url: self.source.url.clone(),
            name: self.source.name.clone(),
            version: self.source.version.clone(),
            loader: self.source.loader.clone(),
            dependency: self.children,
            details: self.source.details.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DownloadInfo {
    #[serde(rename = "URL")]
    pub url: String,
    pub version: String,
    pub loader: String,
    pub loader_type: String,
    pub downloads: String,
    pub screenshots: Vec<String>,
}

pub fn walk_dependencies(roots: &[ModDependency]) -> DependencyWalk<'_> {
    DependencyWalk {
        stack: roots.iter().rev().map(|dep| (0, dep)).collect(),
    }
}

pub struct DependencyWalk<'a> {
    stack: Vec<(usize, &'a ModDependency)>,
}

impl<'a> Iterator for DependencyWalk<'a> {
    type Item = (usize, &'a ModDependency);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, dep) = self.stack.pop()?;
        self.stack
            .extend(dep.dependency.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, dep))
    }
}

pub fn download_file_name(mod_name: &str, versions: &[String]) -> String {
    let name = mod_name.to_lowercase().replace(' ', "_");
    let versions = versions.join("_").to_lowercase();
    format!("{name}_{versions}.jar")
}
