use anyhow::{bail, Result};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

pub trait LinkOpener {
    fn open(&self, url: &str) -> Result<()>;
}

pub fn open_link<O>(opener: &O, url: &str)
where
    O: LinkOpener + ?Sized,
{
    if let Err(err) = opener.open(url) {
        warn!(url, "failed to open link: {err:#}");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) -> Result<()> {
        let mut errors = Vec::new();
        for (command, args) in candidates(url) {
            match Command::new(command)
                .args(&args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                Ok(status) if status.success() => {
                    debug!(url, command, "opened link");
                    return Ok(());
                }
                Ok(status) => errors.push(format!("{command} exited {status}")),
                Err(err) => errors.push(format!("{command} failed: {err}")),
            }
        }
        bail!("no opener succeeded: {}", errors.join("; "))
    }
}

fn candidates(url: &str) -> Vec<(&'static str, Vec<&str>)> {
    if cfg!(target_os = "windows") {
        vec![("cmd", vec!["/C", "start", "", url])]
    } else if cfg!(target_os = "macos") {
        vec![("open", vec![url])]
    } else {
        vec![
            ("xdg-open", vec![url]),
            ("gio", vec!["open", url]),
            ("kde-open5", vec![url]),
        ]
    }
}
