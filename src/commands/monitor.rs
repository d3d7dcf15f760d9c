//! Live waveform monitoring.
//!
//! Runs the capture pipeline against the default input device and renders
//! the waveform until the user quits. One logical task drives everything:
//! each tick polls input, drains the capture source, decodes, appends,
//! and redraws; the tick is never re-entered.

use crate::capture::{CaptureError, CaptureFormat, Pipeline};
use crate::config::{AxisMode, OscopeConfig};
use crate::monitor::{MonitorCommand, MonitorStatus, MonitorTui};
use crate::ui::ErrorScreen;

/// Handles the `monitor` command (the default command).
///
/// `seconds` and `axis` override the configured retention and axis policy.
pub fn handle_monitor(seconds: Option<f64>, axis: Option<AxisMode>) -> anyhow::Result<()> {
    tracing::info!("=== oscope monitor started ===");

    let mut config = match OscopeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/oscope/oscope.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    if let Some(seconds) = seconds {
        config.display.retain_seconds = seconds;
    }
    let mut axis = axis.unwrap_or(config.display.axis);

    let retention = config
        .display
        .retention(CaptureFormat::TARGET.sample_rate_hz);
    tracing::info!(
        "Configuration: retention={:?}, axis={}, fps={}",
        retention,
        axis,
        config.display.fps
    );

    // Negotiate and open before any UI state changes, so startup errors
    // abort with nothing on screen and nothing allocated.
    let mut pipeline = Pipeline::new(retention);
    let format = match pipeline.negotiate() {
        Ok(format) => format,
        Err(e) => return fail_startup("Format Negotiation Failed", e),
    };
    tracing::info!("Negotiated capture format: {format}");

    if let Err(e) = pipeline.start() {
        return fail_startup("Capture Failed to Start", e);
    }

    let mut tui = MonitorTui::new(config.display.fps)
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let mut paused = false;
    let mut interrupted: Option<CaptureError> = None;

    loop {
        match tui.handle_input() {
            Ok(MonitorCommand::Quit) => break,
            Ok(MonitorCommand::TogglePause) => paused = !paused,
            Ok(MonitorCommand::ToggleAxis) => {
                axis = match axis {
                    AxisMode::Fixed => AxisMode::Fit,
                    AxisMode::Fit => AxisMode::Fixed,
                };
            }
            Ok(MonitorCommand::Continue) => {}
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                pipeline.stop();
                tui.cleanup().ok();
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }

        if interrupted.is_none() {
            let result = if paused {
                pipeline.poll_discard()
            } else {
                pipeline.poll().map(|_| ())
            };
            if let Err(e) = result {
                // Fatal to the session. The device is released; the last
                // rendered waveform stays frozen until the user quits.
                tracing::error!("Capture interrupted: {}", e);
                interrupted = Some(e);
            }
        }

        let samples = pipeline.snapshot();
        let status = MonitorStatus {
            sample_count: pipeline.sample_count(),
            paused,
            interrupted: interrupted.is_some(),
        };
        tui.render(&samples, axis, &status)
            .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
    }

    pipeline.stop();
    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    match interrupted {
        Some(e) => Err(anyhow::anyhow!("Capture interrupted: {e}")),
        None => {
            tracing::info!("=== oscope monitor exited successfully ===");
            Ok(())
        }
    }
}

/// Shows a startup error full-screen and converts it for the caller.
/// Nothing was opened at this point, so there is no pipeline to tear down.
fn fail_startup(title: &str, e: CaptureError) -> anyhow::Result<()> {
    tracing::error!("{title}: {e}");
    let message = format!("{title}:\n\n{e}\n\nPlease check your audio setup and try again.");
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(&message)?;
    error_screen.cleanup()?;
    Err(anyhow::Error::new(e))
}
