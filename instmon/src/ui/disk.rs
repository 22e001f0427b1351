//! Disk used/free gauge.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};

use crate::history::DiskSnapshot;

pub fn draw_disk(f: &mut ratatui::Frame<'_>, area: Rect, d: Option<&DiskSnapshot>) {
    let block = Block::default().borders(Borders::ALL).title("Disk");
    let Some(d) = d else {
        let g = Gauge::default().block(block).percent(0).label("Loading disk usage...");
        f.render_widget(g, area);
        return;
    };

    let pct = d.used_percent();
    let color = if pct < 70 {
        Color::Green
    } else if pct < 90 {
        Color::Yellow
    } else {
        Color::Red
    };
    let g = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(color))
        .percent(pct)
        .label(format!("{pct}%  {:.1} GB used / {:.1} GB free", d.used, d.free));
    f.render_widget(g, area);
}
