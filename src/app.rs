//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the
//! appropriate command handlers.

use crate::commands;
use crate::config::AxisMode;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal oscilloscope for the default microphone
#[derive(Parser)]
#[command(name = "oscope")]
#[command(version)]
#[command(about = "Live waveform visualization of the default audio input")]
#[command(
    long_about = "A terminal oscilloscope: captures 44.1 kHz mono 16-bit PCM from the\nsystem default input device and renders it as a continuously updating\ntime-domain waveform.\n\nDEFAULT COMMAND:\n    If no command is specified, 'monitor' is used by default.\n    Monitor options (--seconds, --axis) can be used without explicitly\n    saying 'monitor'.\n\nEXAMPLES:\n    # Monitor the default input\n    $ oscope\n\n    # Keep only the last half second of waveform on screen\n    $ oscope --seconds 0.5\n\n    # Rescale the amplitude axis to the signal\n    $ oscope --axis fit\n\n    # See which device is the system default\n    $ oscope list-devices"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/oscope/oscope.toml\n    Logs:               ~/.local/state/oscope/oscope.log.*"
)]
struct Cli {
    /// Seconds of waveform history to retain (0 = unbounded; monitor default command)
    #[arg(short, long, global = true, value_name = "SECONDS")]
    seconds: Option<f64>,

    /// Amplitude axis policy (monitor default command)
    #[arg(short, long, global = true, value_enum)]
    axis: Option<AxisMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor the default input with a live waveform (default)
    ///
    /// Press Space to pause/resume the display, 'a' to toggle the axis
    /// policy, Escape/q to quit.
    #[command(visible_alias = "m")]
    Monitor {
        /// Seconds of waveform history to retain (0 = unbounded)
        #[arg(short, long, value_name = "SECONDS")]
        seconds: Option<f64>,

        /// Amplitude axis policy
        #[arg(short, long, value_enum)]
        axis: Option<AxisMode>,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations, and marks the system
    /// default device that monitoring will capture from.
    #[command(name = "list-devices")]
    ListDevices,

    /// Open configuration file in your preferred editor
    ///
    /// Edit retention, axis, and refresh settings. Uses the $EDITOR
    /// environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate a completion script for your shell. Save the output to
    /// your shell's completion directory or source it directly.
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "oscope", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Monitor { .. }) => {
            // Default command is monitor. Explicit monitor options take
            // precedence over the global top-level ones.
            let (seconds, axis) = match cli.command {
                Some(Commands::Monitor { seconds, axis }) => {
                    (seconds.or(cli.seconds), axis.or(cli.axis))
                }
                None => (cli.seconds, cli.axis),
                _ => unreachable!(),
            };
            commands::handle_monitor(seconds, axis)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
