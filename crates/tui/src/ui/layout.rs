use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::panel::{Panel, PanelType};

const TOPBAR_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;

#[derive(Default)]
pub struct LayoutState {
    cached_panels: Vec<Panel>,
}

impl LayoutState {
    pub fn calculate_layout(&mut self, area: Rect) -> &[Panel] {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TOPBAR_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(INPUT_HEIGHT),
            ])
            .split(area);

        self.cached_panels = vec![
            Panel {
                panel_type: PanelType::Topbar,
                rect: rows[0],
            },
            Panel {
                panel_type: PanelType::Transcript,
                rect: rows[1],
            },
            Panel {
                panel_type: PanelType::InputBar,
                rect: rows[2],
            },
        ];
        &self.cached_panels
    }

    pub fn get_panels(&self) -> &[Panel] {
        &self.cached_panels
    }
}
