//! Top header with instance id, connection state and last update time.

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};

use crate::history::Dashboard;
use crate::ui::util::clock;

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    instance_id: &str,
    connected: bool,
    d: &Dashboard,
) {
    let state = if !connected {
        "disconnected".to_string()
    } else if let Some(ts) = d.last_ts {
        format!("live, last sample {} ({} received)", clock(ts), d.received)
    } else {
        "connecting...".to_string()
    };
    let title = format!("instmon - instance {instance_id} | {state}  (press 'q' to quit)");
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}
