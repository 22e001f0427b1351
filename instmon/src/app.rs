//! App state and main loop: input handling, consuming the stream, updating
//! history, and drawing.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Color,
    Terminal,
};
use tokio::time::sleep;
use url::Url;

use crate::history::Dashboard;
use crate::types::MetricSample;
use crate::ui::{disk::draw_disk, header::draw_header, spark::draw_window_spark};
use crate::ws::{connect, next_sample, WsStream};

// Redraw cadence when no samples arrive
const FRAME: Duration = Duration::from_millis(50);

pub struct App {
    instance_id: String,
    dashboard: Dashboard,
    connected: bool,
    should_quit: bool,
}

impl App {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            dashboard: Dashboard::new(),
            connected: false,
            should_quit: false,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn apply(&mut self, sample: MetricSample) {
        self.dashboard.apply(sample);
    }

    pub async fn run(&mut self, url: &Url) -> anyhow::Result<()> {
        // Connect to agent
        let mut ws = connect(url).await?;
        self.connected = true;

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, &mut ws).await;

        // Teardown
        let _ = ws.close(None).await;
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        ws: &mut WsStream,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(k) = event::read()? {
                    let ctrl_c = k.code == KeyCode::Char('c')
                        && k.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl_c
                        || matches!(
                            k.code,
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
                        )
                    {
                        self.should_quit = true;
                    }
                }
            }
            if self.should_quit {
                break;
            }

            if self.connected {
                tokio::select! {
                    s = next_sample(ws) => match s {
                        Some(s) => self.dashboard.apply(s),
                        None => self.connected = false,
                    },
                    _ = sleep(FRAME) => {}
                }
            } else {
                // Keep the last picture up until the user quits
                sleep(FRAME).await;
            }

            terminal.draw(|f| self.draw(f))?;
        }

        Ok(())
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, cpu, gpu, memory + disk
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Min(5),
            ])
            .split(area);

        draw_header(
            f,
            rows[0],
            &self.instance_id,
            self.connected,
            &self.dashboard,
        );
        draw_window_spark(
            f,
            rows[1],
            "CPU",
            "%",
            100.0,
            &self.dashboard.cpu,
            Color::Cyan,
        );
        draw_window_spark(
            f,
            rows[2],
            "GPU",
            "%",
            100.0,
            &self.dashboard.gpu,
            Color::Magenta,
        );

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(rows[3]);
        draw_window_spark(
            f,
            bottom[0],
            "Memory",
            " GB",
            64.0,
            &self.dashboard.memory,
            Color::Green,
        );
        draw_disk(f, bottom[1], self.dashboard.disk.as_ref());
    }
}
