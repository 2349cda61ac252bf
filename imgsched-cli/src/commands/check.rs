//! Check command - validate the feed and inputs without processing.

use imgsched::feed::{check_feed, TaskFeed};
use tracing::warn;

use super::common::{resolve_config, Overrides};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the check command.
pub struct CheckArgs {
    pub data_dirs: String,
    pub overrides: Overrides,
}

/// Run the check command.
pub fn run(runner: &CliRunner, args: CheckArgs) -> Result<(), CliError> {
    runner.log_startup("check");

    let config = resolve_config(&args.data_dirs, &args.overrides, runner.config_file())?;
    let effects_file = config.effects_file();
    let feed = TaskFeed::open(&effects_file, config.feed_policy())?;
    let report = check_feed(feed, &config.layout())?;

    println!("Feed:        {}", effects_file.display());
    println!("Tasks:       {}", report.descriptors);
    println!("Work items:  {}", report.work_items);
    println!("Effects:     {}", report.effect_applications);

    if report.is_complete() {
        println!("All inputs present.");
        return Ok(());
    }

    println!("Missing inputs:");
    for path in &report.missing_inputs {
        warn!(input = %path.display(), "Missing input");
        println!("  {}", path.display());
    }
    Err(CliError::MissingInputs(report.missing_inputs.len()))
}
