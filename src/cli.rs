use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde_json::json;
use serpnav::MotionPolicy;

use crate::demo::NavOutcome;

#[derive(Parser, Debug)]
#[command(
    name = "serpnav",
    version,
    about = "Simulate vim-style keyboard navigation over a streamed search-results page"
)]
pub(crate) struct CliArgs {
    /// JSON fixture describing the simulated results feed.
    #[arg(long, value_name = "FILE")]
    pub page: Option<PathBuf>,

    /// Output format for the final navigation outcome.
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Milliseconds between simulated feed insertions.
    #[arg(long, value_name = "MS")]
    pub feed_interval: Option<u64>,

    /// Cursor behavior at the list boundary.
    #[arg(long, value_enum)]
    pub motion: Option<MotionArg>,

    /// Print the effective configuration before starting.
    #[arg(long)]
    pub print_config: bool,

    /// Directory holding config.toml.
    #[arg(long, env = "SERPNAV_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum MotionArg {
    Clamp,
    Wrap,
}

impl From<MotionArg> for MotionPolicy {
    fn from(arg: MotionArg) -> Self {
        match arg {
            MotionArg::Clamp => MotionPolicy::Clamp,
            MotionArg::Wrap => MotionPolicy::Wrap,
        }
    }
}

/// Parse command line arguments into the strongly typed [`CliArgs`] structure.
pub(crate) fn parse_cli() -> CliArgs {
    CliArgs::parse()
}

/// Print a plain-text representation of the navigation outcome.
pub(crate) fn print_plain(outcome: &NavOutcome) {
    match &outcome.href {
        Some(href) if outcome.new_tab => println!("{href} (new tab)"),
        Some(href) => println!("{href}"),
        None => println!("Navigation cancelled"),
    }
}

/// Format the navigation outcome as a JSON string.
pub(crate) fn format_outcome_json(outcome: &NavOutcome) -> Result<String> {
    let payload = json!({
        "activated": outcome.href.is_some(),
        "href": outcome.href,
        "new_tab": outcome.new_tab,
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Print the JSON representation of the navigation outcome.
pub(crate) fn print_json(outcome: &NavOutcome) -> Result<()> {
    println!("{}", format_outcome_json(outcome)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn json_format_carries_the_activated_link() {
        let outcome = NavOutcome {
            href: Some("https://example.com/result".into()),
            new_tab: true,
        };

        let json = format_outcome_json(&outcome).expect("json");
        let value: Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["activated"], true);
        assert_eq!(value["href"], "https://example.com/result");
        assert_eq!(value["new_tab"], true);
    }

    #[test]
    fn json_format_marks_a_cancelled_session() {
        let outcome = NavOutcome {
            href: None,
            new_tab: false,
        };

        let json = format_outcome_json(&outcome).expect("json");
        let value: Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["activated"], false);
        assert_eq!(value["href"], Value::Null);
    }
}
