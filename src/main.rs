mod cli;
mod demo;
mod logging;
mod settings;

use anyhow::Result;
use cli::{OutputFormat, parse_cli, print_json, print_plain};
use settings::ResolvedConfig;

fn main() -> Result<()> {
    let cli = parse_cli();
    let resolved = settings::load(&cli)?;
    let _log_guard = logging::init();

    if cli.print_config {
        resolved.print_summary();
    }

    run_demo(cli.output, resolved)
}

/// Run the simulator and print the outcome in the chosen format.
fn run_demo(format: OutputFormat, settings: ResolvedConfig) -> Result<()> {
    let outcome = demo::run(settings)?;

    match format {
        OutputFormat::Plain => print_plain(&outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }

    Ok(())
}
