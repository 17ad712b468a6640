//! Layered configuration for the simulator: defaults, then an optional
//! `config.toml` from the config directory, then CLI flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use config::{Config, File};
use directories::ProjectDirs;
use serde::Deserialize;
use serpnav::NavConfig;

use crate::cli::CliArgs;

const DEFAULT_FEED_INTERVAL_MS: u64 = 400;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    nav: NavConfig,
    demo: DemoSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DemoSection {
    page: Option<PathBuf>,
    feed_interval_ms: Option<u64>,
}

pub(crate) struct ResolvedConfig {
    pub nav: NavConfig,
    pub page: Option<PathBuf>,
    pub feed_interval: Duration,
}

impl ResolvedConfig {
    pub fn print_summary(&self) {
        println!("Effective configuration:");
        println!("  Container id: #{}", self.nav.container_id);
        println!("  Heading tag: <{}>", self.nav.heading_tag);
        println!("  Block tags: {}", self.nav.block_tags.join(", "));
        println!("  Marker class: {}", self.nav.marker_class);
        println!("  Motion: {:?}", self.nav.motion);
        println!("  Rehighlight: {:?}", self.nav.rehighlight);
        println!("  Double-press window: {} ms", self.nav.double_press_ms);
        println!("  Dedupe blocks: {}", self.nav.dedupe_blocks);
        match &self.page {
            Some(page) => println!("  Page fixture: {}", page.display()),
            None => println!("  Page fixture: built-in sample"),
        }
        println!("  Feed interval: {} ms", self.feed_interval.as_millis());
    }
}

/// Resolve the effective configuration for this invocation.
pub(crate) fn load(cli: &CliArgs) -> Result<ResolvedConfig> {
    let file = config_file(cli.config_dir.as_deref());
    let raw = load_raw(file.as_deref())?;

    let mut nav = raw.nav;
    if let Some(motion) = cli.motion {
        nav.motion = motion.into();
    }

    ensure!(!nav.container_id.is_empty(), "container id must not be empty");
    ensure!(!nav.heading_tag.is_empty(), "heading tag must not be empty");
    ensure!(!nav.block_tags.is_empty(), "at least one block tag is required");
    ensure!(nav.double_press_ms > 0, "double-press window must be positive");

    let page = cli.page.clone().or(raw.demo.page);
    let feed_interval = Duration::from_millis(
        cli.feed_interval
            .or(raw.demo.feed_interval_ms)
            .unwrap_or(DEFAULT_FEED_INTERVAL_MS),
    );

    Ok(ResolvedConfig {
        nav,
        page,
        feed_interval,
    })
}

fn config_file(dir_override: Option<&Path>) -> Option<PathBuf> {
    let dir = match dir_override {
        Some(dir) => dir.to_path_buf(),
        None => ProjectDirs::from("io", "serpnav", "serpnav")?
            .config_dir()
            .to_path_buf(),
    };
    Some(dir.join("config.toml"))
}

fn load_raw(file: Option<&Path>) -> Result<RawConfig> {
    let Some(file) = file else {
        return Ok(RawConfig::default());
    };
    let settings = Config::builder()
        .add_source(File::from(file.to_path_buf()).required(false))
        .build()
        .with_context(|| format!("failed to read {}", file.display()))?;
    settings
        .try_deserialize()
        .with_context(|| format!("invalid configuration in {}", file.display()))
}
