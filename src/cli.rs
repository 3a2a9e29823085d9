use crate::{
    catalog::ModStore,
    config::AppConfig,
    dedup::unique_by,
    disk::{self, ModLister, ModsDir},
    links::{self, SystemLinkOpener},
    mod_list::ModListStore,
    model::{MinecraftMod, ModDependency},
};
use anyhow::{bail, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Normal,
    Verbose,
    Debug,
}

#[derive(Debug)]
struct GlobalOptions {
    format: OutputFormat,
    verbosity: Verbosity,
}

#[derive(Debug, PartialEq, Eq)]
enum CliCommand {
    SavedList,
    SavedDelete(String),
    DepsCheck(Vec<String>),
    FavouritesList(FavouriteFilters),
    FavouritesRemove(String),
    DownloadsList,
    Paths,
    Open(String),
    Help,
    Version,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct FavouriteFilters {
    search: Option<String>,
    loader: Option<String>,
    version: Option<String>,
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (global, tokens) = parse_global_options(&args);
    init_tracing(global.verbosity);

    match parse_command(&tokens)? {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            println!("modshelf v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::Open(url) => {
            links::open_link(&SystemLinkOpener, &url);
            Ok(())
        }
        command => {
            let config = AppConfig::load_or_create()?;
            run_command(&config, command, global.format)
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let default_level = match verbosity {
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info",
        Verbosity::Debug => "debug",
    };
    let filter = EnvFilter::try_from_env("MODSHELF_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("modshelf={default_level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_global_options(args: &[String]) -> (GlobalOptions, Vec<String>) {
    let mut format = OutputFormat::Text;
    let mut verbosity = Verbosity::Normal;
    let mut tokens = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--format=") {
            if let Some(parsed) = OutputFormat::parse(value) {
                format = parsed;
            }
            continue;
        }
        if arg == "--format" {
            if let Some(value) = iter.next() {
                if let Some(parsed) = OutputFormat::parse(value) {
                    format = parsed;
                }
            }
            continue;
        }
        if arg.starts_with("-v") && !arg.starts_with("--") && arg.chars().skip(1).all(|ch| ch == 'v')
        {
            let count = arg.chars().filter(|ch| *ch == 'v').count();
            verbosity = if count >= 2 {
                Verbosity::Debug
            } else {
                Verbosity::Verbose
            };
            continue;
        }
        if arg == "--verbose" {
            verbosity = Verbosity::Verbose;
            continue;
        }
        tokens.push(arg.to_string());
    }

    (GlobalOptions { format, verbosity }, tokens)
}

fn parse_command(tokens: &[String]) -> Result<CliCommand> {
    let Some(head) = tokens.first() else {
        return Ok(CliCommand::Help);
    };
    let rest = tokens.get(1..).unwrap_or(&[]);
    match head.as_str() {
        "--help" | "-h" | "help" => Ok(CliCommand::Help),
        "--version" | "-V" | "version" => Ok(CliCommand::Version),
        "saved" => match rest.first().map(|value| value.as_str()).unwrap_or("list") {
            "list" => Ok(CliCommand::SavedList),
            "delete" => {
                let file = rest
                    .get(1)
                    .ok_or_else(|| anyhow::anyhow!("saved delete requires a file name"))?;
                Ok(CliCommand::SavedDelete(file.to_string()))
            }
            other => bail!("Unknown saved command: {other} (use 'list' or 'delete')"),
        },
        "deps" => match rest.first().map(|value| value.as_str()) {
            Some("check") => {
                let names: Vec<String> = rest[1..].to_vec();
                if names.is_empty() {
                    bail!("deps check requires one or more mod names");
                }
                Ok(CliCommand::DepsCheck(names))
            }
            Some(other) => bail!("Unknown deps command: {other} (use 'check')"),
            None => bail!("deps requires a subcommand (use 'check')"),
        },
        "favourites" | "favorites" => {
            match rest.first().map(|value| value.as_str()).unwrap_or("list") {
                "list" => Ok(CliCommand::FavouritesList(parse_favourite_filters(
                    rest.get(1..).unwrap_or(&[]),
                )?)),
                "remove" => {
                    let name = rest
                        .get(1)
                        .ok_or_else(|| anyhow::anyhow!("favourites remove requires a mod name"))?;
                    Ok(CliCommand::FavouritesRemove(name.to_string()))
                }
                other => bail!("Unknown favourites command: {other} (use 'list' or 'remove')"),
            }
        }
        "downloads" => match rest.first().map(|value| value.as_str()).unwrap_or("list") {
            "list" => Ok(CliCommand::DownloadsList),
            other => bail!("Unknown downloads command: {other} (use 'list')"),
        },
        "paths" => Ok(CliCommand::Paths),
        "open" => {
            let url = rest
                .first()
                .ok_or_else(|| anyhow::anyhow!("open requires a url"))?;
            Ok(CliCommand::Open(url.to_string()))
        }
        other => bail!("Unknown command: {other} (see --help)"),
    }
}

fn parse_favourite_filters(args: &[String]) -> Result<FavouriteFilters> {
    let mut filters = FavouriteFilters::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (key, inline) = match arg.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => (arg.as_str(), None),
        };
        let slot = match key {
            "--search" => &mut filters.search,
            "--loader" => &mut filters.loader,
            "--version" => &mut filters.version,
            _ => bail!("Unknown favourites option: {arg}"),
        };
        let value = match inline {
            Some(value) => value,
            None => match iter.next() {
                Some(value) => value.to_string(),
                None => bail!("{key} requires a value"),
            },
        };
        *slot = Some(value);
    }
    Ok(filters)
}

fn run_command(config: &AppConfig, command: CliCommand, format: OutputFormat) -> Result<()> {
    match command {
        CliCommand::SavedList => list_saved(config, format),
        CliCommand::SavedDelete(file) => {
            ModsDir::new(config.mods_dir()?).delete_saved_mod(&file)?;
            println!("Removed {file}");
            Ok(())
        }
        CliCommand::DepsCheck(names) => check_dependencies(config, names, format),
        CliCommand::FavouritesList(filters) => list_favourites(config, filters, format),
        CliCommand::FavouritesRemove(name) => {
            let lists = ModListStore::new(config.minecraft_root()?);
            let removed = lists.remove_by_name(&config.favourites_file, &name)?;
            if removed == 0 {
                println!("{name} is not in favourites");
            } else {
                println!("Removed {name} from favourites");
            }
            Ok(())
        }
        CliCommand::DownloadsList => list_downloads(config, format),
        CliCommand::Paths => list_paths(config, format),
        CliCommand::Open(_) | CliCommand::Help | CliCommand::Version => Ok(()),
    }
}

fn list_saved(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let files = ModsDir::new(config.mods_dir()?).list_mod_files()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
        OutputFormat::Text => {
            if files.is_empty() {
                println!("No saved mods.");
            }
            for file in files {
                println!("{file}");
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DependencyCheckOutput {
    present: Vec<PresentDependency>,
    missing: Vec<String>,
}

#[derive(Serialize)]
struct PresentDependency {
    name: String,
    file: String,
}

fn check_dependencies(config: &AppConfig, names: Vec<String>, format: OutputFormat) -> Result<()> {
    let deps: Vec<ModDependency> = names
        .into_iter()
        .map(|name| ModDependency {
            name,
            ..Default::default()
        })
        .collect();
    let mods_dir = ModsDir::new(config.mods_dir()?);
    let present = disk::pair_disk_files(&deps, &mods_dir)?
        .into_iter()
        .map(|(dep, file)| PresentDependency {
            name: dep.name.clone(),
            file,
        })
        .collect();
    let missing = disk::filter_no_disk_mod_depends(&deps, &mods_dir)?
        .into_iter()
        .map(|dep| dep.name.clone())
        .collect();
    let output = DependencyCheckOutput { present, missing };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => {
            for item in &output.present {
                println!("present  {} ({})", item.name, item.file);
            }
            for name in &output.missing {
                println!("missing  {name}");
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct FavouriteItem<'a> {
    name: &'a str,
    link: &'a str,
    versions: &'a [String],
    loaders: &'a [String],
}

fn list_favourites(
    config: &AppConfig,
    filters: FavouriteFilters,
    format: OutputFormat,
) -> Result<()> {
    let lists = ModListStore::new(config.minecraft_root()?);
    let mut store = ModStore::new();
    store.set_loading(true);
    store.set_all_mods(unique_links(lists.read(&config.favourites_file)?));
    store.set_loading(false);
    if let Some(query) = filters.search {
        store.set_search_filter(query);
    }
    if let Some(loader) = filters.loader {
        store.set_loader_filter(loader);
    }
    if let Some(version) = filters.version {
        store.set_version_filter(version);
    }

    let items: Vec<FavouriteItem> = store
        .filtered_mods()
        .into_iter()
        .map(|entry| FavouriteItem {
            name: &entry.name,
            link: &entry.mod_page_link,
            versions: &entry.versions,
            loaders: &entry.loaders,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No favourites match.");
            }
            for item in &items {
                println!("{}  {}  [{}]", item.name, item.link, item.versions.join(", "));
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DownloadItem {
    name: String,
    link: String,
    file: Option<String>,
}

fn list_downloads(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let downloads = unique_links(
        ModListStore::new(config.minecraft_root()?).read(&config.downloads_file)?,
    );
    let files = ModsDir::new(config.mods_dir()?).list_mod_files()?;
    let items: Vec<DownloadItem> = downloads
        .into_iter()
        .map(|entry| DownloadItem {
            file: disk::matching_file(&entry.name, &files).map(str::to_string),
            name: entry.name,
            link: entry.mod_page_link,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No downloads recorded.");
            }
            for item in &items {
                match &item.file {
                    Some(file) => println!("{}  {}", item.name, file),
                    None => println!("{}  (not on disk)", item.name),
                }
            }
        }
    }
    Ok(())
}

fn unique_links(mods: Vec<MinecraftMod>) -> Vec<MinecraftMod> {
    unique_by(mods, |entry| entry.mod_page_link.clone())
}

#[derive(Serialize)]
struct PathsOutput {
    config_dir: String,
    minecraft_dir: String,
    mods_dir: String,
    favourites: String,
    downloads: String,
}

fn list_paths(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let root = config.minecraft_root()?;
    let lists = ModListStore::new(&root);
    let output = PathsOutput {
        config_dir: config.config_dir().display().to_string(),
        minecraft_dir: root.display().to_string(),
        mods_dir: config.mods_dir()?.display().to_string(),
        favourites: lists.path_for(&config.favourites_file).display().to_string(),
        downloads: lists.path_for(&config.downloads_file).display().to_string(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => {
            println!("Config dir: {}", output.config_dir);
            println!("Minecraft dir: {}", output.minecraft_dir);
            println!("Mods dir: {}", output.mods_dir);
            println!("Favourites: {}", output.favourites);
            println!("Downloads: {}", output.downloads);
        }
    }
    Ok(())
}

fn print_help() {
    println!("modshelf v{}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  modshelf saved list                 List mod files on disk");
    println!("  modshelf saved delete <file>        Delete a mod file");
    println!("  modshelf deps check <name...>       Check which dependencies are on disk");
    println!("  modshelf favourites list            List favourite mods");
    println!("      --search <text> --loader <name> --version <version>");
    println!("  modshelf favourites remove <name>   Remove a favourite by name");
    println!("  modshelf downloads list             List recorded downloads and their files");
    println!("  modshelf paths                      Show resolved paths");
    println!("  modshelf open <url>                 Open a mod page in the browser");
    println!();
    println!("Global options:");
    println!("  --format <json|text>                Output format");
    println!("  -v, -vv                             Increase log verbosity");
    println!("  -h, --help                          Show help");
    println!("  -V, --version                       Show version");
}
