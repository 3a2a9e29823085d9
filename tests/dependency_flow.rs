use anyhow::{anyhow, Result};
use modshelf::{
    disk, enrich_dependencies, DetailProvider, DownloadInfo, MinecraftMod, ModDependency,
    ModStore, ModsDir,
};
use pretty_assertions::assert_eq;
use std::{cell::RefCell, collections::HashMap, fs};

struct CannedDetails {
    pages: HashMap<String, Vec<DownloadInfo>>,
    calls: RefCell<Vec<String>>,
}

impl DetailProvider for CannedDetails {
    fn mod_details(&self, page_link: &str) -> Result<MinecraftMod> {
        self.calls.borrow_mut().push(page_link.to_string());
        let details = self
            .pages
            .get(page_link)
            .cloned()
            .ok_or_else(|| anyhow!("no page {page_link}"))?;
        Ok(MinecraftMod {
            mod_page_link: page_link.to_string(),
            details,
            ..Default::default()
        })
    }
}

fn dependency(name: &str, link: &str) -> ModDependency {
    ModDependency {
        name: name.to_string(),
        mod_page_link: link.to_string(),
        ..Default::default()
    }
}

#[test]
fn missing_dependencies_are_enriched_and_cataloged() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("fabric_api-0.92.2.jar"), b"").unwrap();
    let mods_dir = ModsDir::new(temp.path());

    let deps = vec![
        dependency("Fabric API", "https://example.test/fabric-api"),
        dependency("Cloth Config", "https://example.test/cloth-config"),
        dependency("", "https://example.test/unnamed"),
    ];

    let missing: Vec<ModDependency> = disk::filter_no_disk_mod_depends(&deps, &mods_dir)
        .unwrap()
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(missing, vec![deps[1].clone()]);

    let cloth = DownloadInfo {
        url: "https://example.test/cloth-config.jar".to_string(),
        version: "1.20.1".to_string(),
        loader: "Fabric".to_string(),
        downloads: "1800".to_string(),
        ..Default::default()
    };
    let provider = CannedDetails {
        pages: HashMap::from([("https://example.test/cloth-config".to_string(), vec![cloth.clone()])]),
        calls: RefCell::new(Vec::new()),
    };
    let enriched = enrich_dependencies(&missing, &provider).unwrap();
    assert_eq!(enriched[0].details, vec![cloth.clone()]);
    assert_eq!(enrich_dependencies(&enriched, &provider).unwrap(), enriched);
    assert_eq!(provider.calls.borrow().len(), 1);

    let mut store = ModStore::new();
    store.add_mods(vec![MinecraftMod {
        name: enriched[0].name.clone(),
        mod_page_link: enriched[0].mod_page_link.clone(),
        details: enriched[0].details.clone(),
        ..Default::default()
    }]);
    assert_eq!(store.mods_by_loader("fabric").len(), 1);
    assert_eq!(store.search_mods("cloth").len(), 1);
}
