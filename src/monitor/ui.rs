//! Terminal user interface for the live waveform monitor.
//!
//! Owns the terminal, the chart layout, and user input handling. The
//! acquisition pipeline hands over a sample snapshot each tick; nothing
//! here touches the audio device.

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::Paragraph,
};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

use crate::config::AxisMode;
use crate::monitor::waveform::render_waveform;

/// User input command during monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Keep monitoring (no key pressed)
    Continue,
    /// Exit the monitor (Escape, 'q' or Ctrl+C)
    Quit,
    /// Pause/resume the display (Space key)
    TogglePause,
    /// Switch between fixed and fit axis bounds ('a' key)
    ToggleAxis,
}

/// Per-frame status line content, computed by the monitor loop.
pub struct MonitorStatus {
    pub sample_count: usize,
    pub paused: bool,
    /// Set once capture failed; the frozen waveform stays visible.
    pub interrupted: bool,
}

/// Terminal UI for waveform monitoring.
pub struct MonitorTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    start_time: Instant,
    poll_timeout: Duration,
}

impl MonitorTui {
    /// Creates the TUI and enters alternate screen raw mode.
    ///
    /// `fps` sets the input poll timeout and with it the render cadence.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    /// - If raw mode or the alternate screen cannot be entered
    pub fn new(fps: u16) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let poll_timeout = Duration::from_millis(1000 / u64::from(fps.max(1)));

        Ok(MonitorTui {
            terminal,
            start_time: Instant::now(),
            poll_timeout,
        })
    }

    /// Draws the waveform chart plus a one-line footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(
        &mut self,
        samples: &[f64],
        axis: AxisMode,
        status: &MonitorStatus,
    ) -> anyhow::Result<()> {
        let elapsed = self.start_time.elapsed();
        let peak = samples.iter().fold(0.0_f64, |acc, &s| acc.max(s.abs()));

        self.terminal.draw(|frame| {
            let area = frame.area();

            let footer_height = 1;
            let chart_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            render_waveform(frame, chart_area, samples, axis);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let indicator = if status.interrupted {
                Span::styled("✕ interrupted ", Style::default().fg(Color::Red))
            } else if status.paused {
                Span::styled("⏸ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("● ", Style::default().fg(Color::Red))
            };

            let secs = elapsed.as_secs();
            let line = Line::from(vec![
                indicator,
                Span::raw(format!("{}:{:02}", secs / 60, secs % 60)),
                Span::raw(format!(" / {} samples", status.sample_count)),
                Span::raw(format!(" / peak {:.3}", peak)),
                Span::raw(format!(" / axis {}", axis)),
                Span::styled(
                    "   q quit · space pause · a axis",
                    Style::default().fg(Color::DarkGray),
                ),
            ]);

            let footer = Paragraph::new(line).style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Waits up to one frame interval for input and maps it to a command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> anyhow::Result<MonitorCommand> {
        if event::poll(self.poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Quit requested");
                        MonitorCommand::Quit
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        tracing::debug!("Ctrl+C pressed: quitting");
                        MonitorCommand::Quit
                    }
                    KeyCode::Char(' ') => {
                        tracing::debug!("Space pressed: toggling pause");
                        MonitorCommand::TogglePause
                    }
                    KeyCode::Char('a') => {
                        tracing::debug!("Toggling axis mode");
                        MonitorCommand::ToggleAxis
                    }
                    _ => MonitorCommand::Continue,
                });
            }
        }
        Ok(MonitorCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If the cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
