use crate::model::{DownloadInfo, MinecraftMod, ModDependency};
use anyhow::Result;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

pub trait DetailProvider {
    fn mod_details(&self, page_link: &str) -> Result<MinecraftMod>;
}

/// A detail lookup failed part way through a pass.
///
/// `partial` holds every dependency as it stood when the pass stopped:
/// entries enriched before the failure keep their new details.
#[derive(Debug, Error)]
#[error("fetch details for {page_link}")]
pub struct EnrichError {
    pub page_link: String,
    pub partial: Vec<ModDependency>,
    #[source]
    pub source: anyhow::Error,
}

pub fn enrich_dependencies<P>(
    deps: &[ModDependency],
    provider: &P,
) -> Result<Vec<ModDependency>, EnrichError>
where
    P: DetailProvider + ?Sized,
{
    let mut enriched = deps.to_vec();
    match enrich_in_place(&mut enriched, provider) {
        Ok(_) => Ok(enriched),
        Err((page_link, source)) => Err(EnrichError {
            page_link,
            partial: enriched,
            source,
        }),
    }
}

pub fn enrich_in_place<P>(
    deps: &mut [ModDependency],
    provider: &P,
) -> Result<usize, (String, anyhow::Error)>
where
    P: DetailProvider + ?Sized,
{
    let mut fetched = 0;
    for dep in deps.iter_mut().filter(|dep| dep.needs_details()) {
        dep.details = fetch_details(provider, &dep.mod_page_link)?;
        fetched += 1;
    }
    debug!(total = deps.len(), fetched, "dependency enrichment pass");
    Ok(fetched)
}

pub fn enrich_dependency_tree<P>(
    deps: &[ModDependency],
    provider: &P,
) -> Result<Vec<ModDependency>, EnrichError>
where
    P: DetailProvider + ?Sized,
{
    let mut enriched = deps.to_vec();
    let mut fetched: HashMap<String, Vec<DownloadInfo>> = HashMap::new();
    let mut failure = None;

    let mut stack: Vec<&mut ModDependency> = enriched.iter_mut().rev().collect();
    while let Some(node) = stack.pop() {
        if node.needs_details() {
            if let Some(details) = fetched.get(&node.mod_page_link) {
                node.details = details.clone();
            } else {
                match fetch_details(provider, &node.mod_page_link) {
                    Ok(details) => {
                        fetched.insert(node.mod_page_link.clone(), details.clone());
                        node.details = details;
                    }
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
        }
        stack.extend(node.dependency.iter_mut().rev());
    }
    drop(stack);

    match failure {
        None => Ok(enriched),
        Some((page_link, source)) => Err(EnrichError {
            page_link,
            partial: enriched,
            source,
        }),
    }
}

fn fetch_details<P>(
    provider: &P,
    page_link: &str,
) -> Result<Vec<DownloadInfo>, (String, anyhow::Error)>
where
    P: DetailProvider + ?Sized,
{
    match provider.mod_details(page_link) {
        Ok(record) => Ok(record.details),
        Err(err) => {
            warn!(page_link, "detail lookup failed: {err:#}");
            Err((page_link.to_string(), err))
        }
    }
}
