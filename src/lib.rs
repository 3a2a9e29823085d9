pub mod catalog;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod disk;
pub mod enrich;
pub mod links;
pub mod mod_list;
pub mod model;

pub use catalog::{CatalogCommand, CatalogState, ModStore};
pub use dedup::unique_by;
pub use disk::{filter_disk_mod_depends, filter_no_disk_mod_depends, ModLister, ModsDir};
pub use enrich::{enrich_dependencies, DetailProvider, EnrichError};
pub use model::{DownloadInfo, MinecraftMod, ModDependency};
