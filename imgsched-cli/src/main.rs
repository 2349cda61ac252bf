//! imgsched CLI - command-line interface
//!
//! ```text
//! imgsched [OPTIONS] <DATA_DIRS> [MODE] [THREADS]
//! imgsched check [OPTIONS] <DATA_DIRS>
//! ```

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use commands::check::CheckArgs;
use commands::common::{ModeArg, Overrides};
use commands::run::RunArgs;
use error::CliError;
use runner::{CliRunner, RunnerOptions};

#[derive(Parser)]
#[command(name = "imgsched")]
#[command(version = imgsched::VERSION)]
#[command(about = "Apply image effects in batch with sequential, pipeline or BSP scheduling", long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    batch: BatchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Config file (default: <config dir>/imgsched/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding effects.txt, in/ and out/
    #[arg(long, global = true, value_name = "DIR")]
    data_root: Option<PathBuf>,

    /// Fail on malformed feed entries instead of stopping at them
    #[arg(long, global = true)]
    strict_feed: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Data directories, '+'-separated (e.g. small+big)
    #[arg(required = true)]
    data_dirs: Option<String>,

    /// Execution model
    #[arg(value_enum)]
    mode: Option<ModeArg>,

    /// Worker threads (default: config file, then CPU count)
    threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the task feed and check that every input exists
    Check {
        /// Data directories, '+'-separated
        data_dirs: String,
    },
}

impl GlobalArgs {
    fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            config: self.config.clone(),
            log_file: self.log_file.clone(),
            verbose: self.verbose,
        }
    }

    fn overrides(&self, mode: Option<ModeArg>, threads: Option<usize>) -> Overrides {
        Overrides {
            mode,
            threads,
            data_root: self.data_root.clone(),
            strict_feed: self.strict_feed,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let runner = match CliRunner::new(&cli.global.runner_options()) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let result = match cli.command {
        Some(Commands::Check { data_dirs }) => commands::check::run(
            &runner,
            CheckArgs {
                data_dirs,
                overrides: cli.global.overrides(None, None),
            },
        ),
        None => commands::run::run(
            &runner,
            RunArgs {
                data_dirs: cli.batch.data_dirs.unwrap_or_default(),
                overrides: cli.global.overrides(cli.batch.mode, cli.batch.threads),
            },
        ),
    };

    if let Err(e) = result {
        report_failure(&e);
        // `exit` skips destructors; the log guard must flush first.
        drop(runner);
        std::process::exit(e.exit_code());
    }
}

/// Logs a fatal error while the log file is still attached, and echoes it.
fn report_failure(error: &CliError) {
    tracing::error!(error = %error, exit_code = error.exit_code(), "imgsched failed");
    eprintln!("Error: {}", error);
}
