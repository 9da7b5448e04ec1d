// SPDX-License-Identifier: GPL-3.0-only

//! Terminal photo booth
//!
//! Renders the filtered camera feed to the terminal using Unicode half-block
//! characters for improved vertical resolution. The render loop is stepped
//! from the UI loop, so the feed only refreshes while the terminal is drawn.

use crate::app::{CountdownEvent, PhotoBooth};
use crate::backends::camera::{CameraFrame, DeviceSelector, SharedSource};
use crate::config::Config;
use crate::constants::timing;
use crate::filters::FilterKind;
use crate::notify::{NotificationLog, Severity};
use crate::render::ManualScheduler;

use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long the screen stays white for the flash cue
const FLASH_DURATION: Duration = Duration::from_millis(150);

/// Run the terminal booth
///
/// The camera is opened before the terminal switches to raw mode so that
/// acquisition errors print normally. Returns the configuration as changed
/// during the session (mirror mode, last camera) for the caller to persist.
pub fn run(
    config: Config,
    source: SharedSource,
    camera: Option<DeviceSelector>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let scheduler = ManualScheduler::new();
    let notifications = NotificationLog::default();
    let store = config.library_store();

    let mut booth = PhotoBooth::new(
        config,
        source,
        scheduler.clone(),
        store,
        Box::new(notifications.clone()),
    );
    booth.start_preferred_camera(camera)?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the booth
    let result = run_app(&mut terminal, &mut booth, &scheduler, &notifications);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result?;
    booth.shutdown();
    Ok(booth.config().clone())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    booth: &mut PhotoBooth,
    scheduler: &ManualScheduler,
    notifications: &NotificationLog,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut frame_widget = FrameWidget::new();
    let mut show_help = false;
    let mut last_countdown_step = Instant::now();
    let mut flash_until: Option<Instant> = None;

    loop {
        // One live frame per UI refresh
        scheduler.step();

        if booth.countdown_remaining().is_some()
            && last_countdown_step.elapsed() >= timing::COUNTDOWN_STEP
        {
            last_countdown_step = Instant::now();
            match booth.countdown_tick() {
                Some(CountdownEvent::Flash) => {
                    flash_until = Some(Instant::now() + FLASH_DURATION);
                }
                Some(event) => debug!(?event, "Countdown step"),
                None => {}
            }
        }

        frame_widget.flash = flash_until.is_some_and(|until| Instant::now() < until);
        frame_widget.frame = match booth.session() {
            Some(session) => Some(session.preview().frame.clone()),
            None => booth.surface().latest(),
        };
        frame_widget.countdown = booth.countdown_remaining();

        let status_message = if show_help {
            build_help_message()
        } else {
            build_status_message(booth, notifications)
        };

        // Draw
        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let camera_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };

            f.render_widget(&frame_widget, camera_area);

            // Render status bar
            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };

            let status = StatusBar {
                message: &status_message,
                error: !show_help
                    && notifications
                        .latest()
                        .is_some_and(|n| n.severity == Severity::Error),
            };
            f.render_widget(status, status_area);
        })?;

        // Handle input with timeout for frame updates
        if !event::poll(timing::REFRESH_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::FocusLost => booth.suspend(),
            Event::FocusGained => booth.resume(),
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }

                if key.code != KeyCode::Char('h') {
                    show_help = false;
                }

                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('h') => show_help = !show_help,
                    KeyCode::Char(digit @ '0'..='9') => {
                        let index = digit as usize - '0' as usize;
                        if let Some(kind) = FilterKind::from_index(index) {
                            let _ = booth.select_filter(kind);
                        }
                    }
                    KeyCode::Char('f') => {
                        let next = (booth.current_filter().index() + 1) % FilterKind::ALL.len();
                        if let Some(kind) = FilterKind::from_index(next) {
                            let _ = booth.select_filter(kind);
                        }
                    }
                    KeyCode::Char('m') => {
                        booth.toggle_mirror();
                    }
                    KeyCode::Char('t') if booth.countdown_remaining().is_none() => {
                        booth.cycle_countdown();
                    }
                    KeyCode::Char(' ') | KeyCode::Char('p') => {
                        if booth.session().is_none() && booth.start_countdown() {
                            last_countdown_step = Instant::now();
                        }
                    }
                    KeyCode::Esc => {
                        booth.cancel_countdown();
                    }
                    KeyCode::Enter | KeyCode::Char('s') => {
                        if booth.session().is_some()
                            && let Ok(id) = booth.save_photo()
                        {
                            info!(id, "Photo saved from terminal");
                        }
                    }
                    KeyCode::Char('r') => booth.retake(),
                    KeyCode::Char('c') => {
                        let _ = booth.switch_camera();
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn build_status_message(booth: &PhotoBooth, notifications: &NotificationLog) -> String {
    let mut msg = format!(
        "{} | mirror {} | timer {}s",
        booth.current_filter().display_name(),
        if booth.is_mirrored() { "on" } else { "off" },
        booth.config().countdown_seconds
    );

    if let Some(remaining) = booth.countdown_remaining() {
        msg.push_str(&format!(" | {}...", remaining));
    } else if booth.session().is_some() {
        msg.push_str(" | 'enter' save | 'r' retake");
    } else {
        msg.push_str(" | 'space' photo");
    }
    msg.push_str(&format!(" | {} saved", booth.library().len()));

    if let Some(latest) = notifications.latest() {
        msg.push_str(" | ");
        msg.push_str(&latest.message);
    }
    msg.push_str(" | 'h' help");
    msg
}

fn build_help_message() -> String {
    let filters: Vec<String> = FilterKind::ALL
        .iter()
        .map(|k| format!("{}:{}", k.index(), k.display_name()))
        .collect();
    format!(
        "{} | f: Next filter | m: Mirror | t: Timer | space: Photo | esc: Cancel | enter: Save | r: Retake | c: Switch camera | q/Ctrl+C: Quit",
        filters.join(" ")
    )
}

/// Widget that renders a frame using half-block characters
struct FrameWidget {
    frame: Option<CameraFrame>,
    countdown: Option<u32>,
    flash: bool,
}

impl FrameWidget {
    fn new() -> Self {
        Self {
            frame: None,
            countdown: None,
            flash: false,
        }
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.flash {
            buf.set_style(area, Style::default().bg(Color::White));
            return;
        }

        let Some(frame) = self.frame.as_ref().filter(|f| f.validate().is_ok()) else {
            render_centered(area, buf, "Waiting for camera...");
            return;
        };

        // '▀' paints the upper pixel as foreground and the lower one as background
        let grid = fit_cells(frame.width, frame.height, area);
        let pixel_rows = f64::from(grid.height) * 2.0;
        for row in 0..grid.height {
            let upper = (f64::from(row) * 2.0 + 0.5) / pixel_rows;
            let lower = (f64::from(row) * 2.0 + 1.5) / pixel_rows;
            for column in 0..grid.width {
                let u = (f64::from(column) + 0.5) / f64::from(grid.width);
                if let Some(cell) = buf.cell_mut((grid.x + column, grid.y + row)) {
                    cell.set_char('▀')
                        .set_fg(rgb(frame.sample(u, upper)))
                        .set_bg(rgb(frame.sample(u, lower)));
                }
            }
        }

        if let Some(remaining) = self.countdown {
            render_centered(area, buf, &format!("  {}  ", remaining));
        }
    }
}

/// Largest centred block of cells that shows a `width` x `height` frame
/// without distorting it
///
/// A cell holds two pixels stacked vertically, so `rows` cells cover twice as
/// many frame rows.
fn fit_cells(width: u32, height: u32, area: Rect) -> Rect {
    let scale = (f64::from(area.width) / f64::from(width))
        .min(f64::from(area.height) * 2.0 / f64::from(height));
    let columns = ((f64::from(width) * scale) as u16).min(area.width);
    let rows = ((f64::from(height) * scale / 2.0) as u16).min(area.height);
    Rect::new(
        area.x + (area.width - columns) / 2,
        area.y + (area.height - rows) / 2,
        columns,
        rows,
    )
}

fn rgb(pixel: Option<[u8; 4]>) -> Color {
    let [r, g, b, _] = pixel.unwrap_or([0, 0, 0, 255]);
    Color::Rgb(r, g, b)
}

fn render_centered(area: Rect, buf: &mut Buffer, msg: &str) {
    let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
    let y = area.y + area.height / 2;
    if y < area.y + area.height && x < area.x + area.width {
        buf.set_string(x, y, msg, Style::default().fg(Color::White).bg(Color::Black));
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
    error: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let background = if self.error {
            Color::Red
        } else {
            Color::DarkGray
        };

        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(background);
            }
        }

        // Render text, truncated on a char boundary
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(background),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_cells_keeps_aspect_and_centres() {
        // Wide terminal: height limits, 480 pixel rows in 24 cells
        assert_eq!(
            fit_cells(640, 480, Rect::new(0, 0, 80, 24)),
            Rect::new(8, 0, 64, 24)
        );
        // Tall terminal: width limits
        assert_eq!(
            fit_cells(640, 480, Rect::new(2, 1, 40, 50)),
            Rect::new(2, 18, 40, 15)
        );
    }

    #[test]
    fn test_frame_widget_stacks_two_rows_per_cell() {
        let rows = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [9, 9, 9, 255]];
        let data: Vec<u8> = rows.iter().flat_map(|px| px.repeat(4)).collect();
        let widget = FrameWidget {
            frame: Some(CameraFrame::new(4, 4, data).unwrap()),
            countdown: None,
            flash: false,
        };

        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let top = buf.cell((1, 0)).unwrap();
        assert_eq!(top.symbol(), "▀");
        assert_eq!(top.fg, Color::Rgb(255, 0, 0));
        assert_eq!(top.bg, Color::Rgb(0, 255, 0));
        let bottom = buf.cell((3, 1)).unwrap();
        assert_eq!(bottom.fg, Color::Rgb(0, 0, 255));
        assert_eq!(bottom.bg, Color::Rgb(9, 9, 9));
    }

    #[test]
    fn test_frame_widget_without_frame_shows_placeholder() {
        let widget = FrameWidget::new();
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let line: String = (0..30)
            .map(|x| buf.cell((x, 1)).unwrap().symbol().to_string())
            .collect();
        assert!(line.contains("Waiting for camera..."));
    }
}
