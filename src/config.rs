// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CLI surface and log-file setup (spec.md §6). Subcommands are typed,
//! repeatable/defaulted `clap` derive options, replacing a hand-rolled
//! `match args[1]` dispatch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

#[derive(Debug, Parser)]
#[command(name = "auto-csp", version, about = "Derives a minimal working CSP by crawling a proxied origin")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the rewriting proxy only; no report endpoint, no policy evolution.
    Proxy {
        #[arg(long)]
        proxy_port: u16,
        #[arg(long)]
        target_domain: String,
    },
    /// Run both the proxy and the report endpoint; endpoint on an OS-chosen port.
    EndpointAndProxy {
        #[arg(long)]
        proxy_port: u16,
        #[arg(long)]
        target_domain: String,
    },
    /// Run the full crawl pipeline per target domain, in sequence.
    AutomatedBrowser {
        #[arg(long)]
        proxy_port: u16,
        #[arg(long = "target-domain", required = true)]
        target_domains: Vec<String>,
        #[arg(long = "alternate-start", default_values_t = vec!["/".to_string()])]
        alternate_start: Vec<String>,
        #[arg(long, value_enum, default_value_t = BrowserKind::Chrome)]
        browser: BrowserKind,
        #[arg(long, default_value_t = 2)]
        delay: u64,
        #[arg(long, default_value_t = 10)]
        timeout: u64,
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

/// If `path` names an existing file, rename it to `<stem>-old.txt` in the
/// same directory, then open a fresh, empty file at `path`.
fn rotate(path: &Path) -> Result<fs::File> {
    if path.exists() {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
        let old_name = format!("{stem}-old.txt");
        let old_path = path.with_file_name(old_name);
        fs::rename(path, &old_path)?;
    }
    Ok(fs::OpenOptions::new().create(true).write(true).truncate(true).open(path)?)
}

/// Initialize `tracing` with an `EnvFilter` (default `auto_csp=info`) to
/// stderr, plus — when `log` is given — a rotated file sink.
pub fn init_logging(log: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        "auto_csp=info"
            .parse()
            .expect("static directive always parses"),
    );

    match log {
        Some(path) => {
            let file = rotate(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn rotates_existing_file_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"previous run").unwrap();

        let mut file = rotate(&path).unwrap();
        use std::io::Write;
        write!(file, "fresh run").unwrap();

        let old_path = dir.path().join("app-old.txt");
        let mut old_contents = String::new();
        fs::File::open(&old_path).unwrap().read_to_string(&mut old_contents).unwrap();
        assert_eq!(old_contents, "previous run");

        let mut new_contents = String::new();
        fs::File::open(&path).unwrap().read_to_string(&mut new_contents).unwrap();
        assert_eq!(new_contents, "fresh run");
    }

    #[test]
    fn no_rotation_needed_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.log");
        assert!(rotate(&path).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn parses_automated_browser_with_repeatable_flags() {
        let cli = Cli::parse_from([
            "auto-csp",
            "automated-browser",
            "--proxy-port",
            "8080",
            "--target-domain",
            "example.com",
            "--target-domain",
            "other.example",
        ]);
        match cli.command {
            Command::AutomatedBrowser { target_domains, alternate_start, browser, delay, timeout, .. } => {
                assert_eq!(target_domains, vec!["example.com", "other.example"]);
                assert_eq!(alternate_start, vec!["/".to_string()]);
                assert_eq!(browser, BrowserKind::Chrome);
                assert_eq!(delay, 2);
                assert_eq!(timeout, 10);
            }
            _ => panic!("expected AutomatedBrowser"),
        }
    }
}
