//! Sparkline panel for one rolling window (cpu, gpu, memory).

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
};

use crate::history::RollingWindow;

pub fn draw_window_spark(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    label: &str,
    unit: &str,
    max: f64,
    hist: &RollingWindow,
    color: Color,
) {
    let title = match hist.latest() {
        Some(p) => format!("{label} (now: {:>6.2}{unit} / {max:.0}{unit})", p.value),
        None => format!("{label} (waiting)"),
    };
    let max_points = area.width.saturating_sub(2) as usize;
    let data = hist.tail_percent(max_points, max);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data)
        .max(100)
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}
