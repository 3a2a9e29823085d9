use crate::model::MinecraftMod;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    pub current_mod: Option<MinecraftMod>,
    pub all_mods: Vec<MinecraftMod>,
    pub parse_page: Option<u32>,
    pub version_filter: Option<String>,
    pub loader_filter: Option<String>,
    pub search_filter: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCommand {
    SetAllMods(Vec<MinecraftMod>),
    AddMods(Vec<MinecraftMod>),
    SetCurrentMod(MinecraftMod),
    ClearCurrentMod,
    ClearAllMods,
    SetParsePage(u32),
    SetVersionFilter(String),
    SetLoaderFilter(String),
    SetSearchFilter(String),
    SetLoading(bool),
    SetError(Option<String>),
}

#[derive(Debug, Clone, Default)]
pub struct ModStore {
    state: CatalogState,
    version: u64,
}

impl ModStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replay(commands: impl IntoIterator<Item = CatalogCommand>) -> Self {
        let mut store = Self::new();
        for command in commands {
            store.apply(command);
        }
        store
    }

    pub fn apply(&mut self, command: CatalogCommand) {
        let state = &mut self.state;
        match command {
            CatalogCommand::SetAllMods(mods) => state.all_mods = mods,
            CatalogCommand::AddMods(mods) => {
                let existing: HashSet<String> = state
                    .all_mods
                    .iter()
                    .map(|existing| existing.mod_page_link.clone())
                    .collect();
                let incoming = mods.len();
                let fresh: Vec<MinecraftMod> = mods
                    .into_iter()
                    .filter(|candidate| !existing.contains(&candidate.mod_page_link))
                    .collect();
                debug!(incoming, added = fresh.len(), "catalog append");
                state.all_mods.extend(fresh);
            }
            CatalogCommand::SetCurrentMod(selected) => state.current_mod = Some(selected),
            CatalogCommand::ClearCurrentMod => state.current_mod = None,
            CatalogCommand::ClearAllMods => {
                state.all_mods.clear();
                state.current_mod = None;
            }
            CatalogCommand::SetParsePage(page) => state.parse_page = Some(page),
            CatalogCommand::SetVersionFilter(version) => state.version_filter = Some(version),
            CatalogCommand::SetLoaderFilter(loader) => state.loader_filter = Some(loader),
            CatalogCommand::SetSearchFilter(query) => state.search_filter = Some(query),
            CatalogCommand::SetLoading(loading) => state.is_loading = loading,
            CatalogCommand::SetError(message) => state.error = message,
        }
        self.version += 1;
    }

    /// Replaces the catalog as given. No deduplication happens here.
    pub fn set_all_mods(&mut self, mods: Vec<MinecraftMod>) {
        self.apply(CatalogCommand::SetAllMods(mods));
    }

    pub fn add_mods(&mut self, mods: Vec<MinecraftMod>) {
        self.apply(CatalogCommand::AddMods(mods));
    }

    pub fn set_current_mod(&mut self, selected: MinecraftMod) {
        self.apply(CatalogCommand::SetCurrentMod(selected));
    }

    pub fn clear_current_mod(&mut self) {
        self.apply(CatalogCommand::ClearCurrentMod);
    }

    pub fn clear_all_mods(&mut self) {
        self.apply(CatalogCommand::ClearAllMods);
    }

    pub fn set_parse_page(&mut self, page: u32) {
        self.apply(CatalogCommand::SetParsePage(page));
    }

    pub fn set_version_filter(&mut self, version: impl Into<String>) {
        self.apply(CatalogCommand::SetVersionFilter(version.into()));
    }

    pub fn set_loader_filter(&mut self, loader: impl Into<String>) {
        self.apply(CatalogCommand::SetLoaderFilter(loader.into()));
    }

    pub fn set_search_filter(&mut self, query: impl Into<String>) {
        self.apply(CatalogCommand::SetSearchFilter(query.into()));
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.apply(CatalogCommand::SetLoading(loading));
    }

    pub fn set_error(&mut self, message: Option<String>) {
        self.apply(CatalogCommand::SetError(message));
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn current_mod(&self) -> Option<&MinecraftMod> {
        self.state.current_mod.as_ref()
    }

    pub fn all_mods(&self) -> &[MinecraftMod] {
        &self.state.all_mods
    }

    pub fn mods_count(&self) -> usize {
        self.state.all_mods.len()
    }

    pub fn parse_page(&self) -> Option<u32> {
        self.state.parse_page
    }

    pub fn version_filter(&self) -> Option<&str> {
        self.state.version_filter.as_deref()
    }

    pub fn loader_filter(&self) -> Option<&str> {
        self.state.loader_filter.as_deref()
    }

    pub fn search_filter(&self) -> Option<&str> {
        self.state.search_filter.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn search_mods(&self, query: &str) -> Vec<&MinecraftMod> {
        self.state
            .all_mods
            .iter()
            .filter(|entry| entry.matches_name(query))
            .collect()
    }

    pub fn mods_by_loader(&self, loader: &str) -> Vec<&MinecraftMod> {
        self.state
            .all_mods
            .iter()
            .filter(|entry| entry.has_loader(loader))
            .collect()
    }

    pub fn mods_with_version(&self, version: &str) -> Vec<MinecraftMod> {
        self.state
            .all_mods
            .iter()
            .filter(|entry| entry.versions.iter().any(|value| value == version))
            .map(|entry| {
                let mut entry = entry.clone();
                entry.versions.sort();
                entry
            })
            .collect()
    }

    pub fn mods_with_loader_tag(&self, loader: &str) -> Vec<&MinecraftMod> {
        self.state
            .all_mods
            .iter()
            .filter(|entry| entry.loaders.iter().any(|value| value == loader))
            .collect()
    }

    pub fn filtered_mods(&self) -> Vec<&MinecraftMod> {
        let state = &self.state;
        state
            .all_mods
            .iter()
            .filter(|entry| match &state.search_filter {
                Some(query) => entry.matches_name(query),
                None => true,
            })
            .filter(|entry| match &state.loader_filter {
                Some(loader) => entry.has_loader(loader),
                None => true,
            })
            .filter(|entry| match &state.version_filter {
                Some(version) => entry.versions.iter().any(|value| value == version),
                None => true,
            })
            .collect()
    }
}
