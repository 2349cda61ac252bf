//! Run command - process every task of the feed with the selected model.

use tracing::info;

use super::common::{resolve_config, Overrides};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
pub struct RunArgs {
    pub data_dirs: String,
    pub overrides: Overrides,
}

/// Run the batch and print the elapsed seconds.
pub fn run(runner: &CliRunner, args: RunArgs) -> Result<(), CliError> {
    runner.log_startup("run");

    let config = resolve_config(&args.data_dirs, &args.overrides, runner.config_file())?;
    info!(
        model = %config.model(),
        workers = config.worker_count(),
        data_root = %config.data_root().display(),
        effects_file = %config.effects_file().display(),
        "Resolved configuration"
    );

    let stats = imgsched::run(&config)?;
    info!(%stats, "Batch finished");
    println!("{:.2}", stats.elapsed.as_secs_f64());
    Ok(())
}
