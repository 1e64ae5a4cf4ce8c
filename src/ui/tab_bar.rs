//! Wrapping tab bar above the editor.

use crate::session::Tab;
use eframe::egui::{self, Color32, FontId, Ui};

const TAB_HEIGHT: f32 = 24.0;
const TAB_SPACING: f32 = 4.0;
const CLOSE_BTN_WIDTH: f32 = 18.0;

/// What the user did with the tab bar this frame.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TabBarOutput {
    /// Tab clicked to become active
    pub activate: Option<String>,
    /// Tab whose close button was clicked
    pub close: Option<String>,
}

/// Position each tab left to right, wrapping to a new row when the next one
/// would overflow. Returns `(x, row)` per tab.
fn layout_tabs(widths: &[f32], available_width: f32) -> Vec<(f32, usize)> {
    let mut x = 0.0;
    let mut row = 0;
    let mut positions = Vec::with_capacity(widths.len());

    for &width in widths {
        if x + width > available_width && x > 0.0 {
            x = 0.0;
            row += 1;
        }
        positions.push((x, row));
        x += width + TAB_SPACING;
    }
    positions
}

fn tab_width(ui: &Ui, label: &str) -> f32 {
    let text_width = ui
        .fonts(|f| f.glyph_width(&FontId::default(), 'M') * label.chars().count() as f32 * 0.6)
        .max(60.0);
    text_width + CLOSE_BTN_WIDTH + 16.0
}

/// Render the tabs and report clicks.
pub fn show_tab_bar(ui: &mut Ui, tabs: &[Tab]) -> TabBarOutput {
    let mut output = TabBarOutput::default();
    if tabs.is_empty() {
        return output;
    }

    let labels: Vec<String> = tabs
        .iter()
        .map(|tab| format!("{} {}", tab.icon(), tab.title()))
        .collect();
    let widths: Vec<f32> = labels.iter().map(|l| tab_width(ui, l)).collect();

    let available_width = ui.available_width();
    let positions = layout_tabs(&widths, available_width);
    let rows = positions.last().map_or(1, |(_, row)| row + 1);

    let (bar_rect, _) = ui.allocate_exact_size(
        egui::vec2(available_width, rows as f32 * (TAB_HEIGHT + 2.0)),
        egui::Sense::hover(),
    );

    let is_dark = ui.visuals().dark_mode;
    let selected_bg = ui.visuals().selection.bg_fill;
    let hover_bg = if is_dark {
        Color32::from_rgb(60, 60, 70)
    } else {
        Color32::from_rgb(220, 220, 230)
    };
    let text_color = ui.visuals().text_color();

    for (idx, (tab, (label, (width, (x, row))))) in tabs
        .iter()
        .zip(labels.iter().zip(widths.iter().zip(positions.iter())))
        .enumerate()
    {
        let tab_rect = egui::Rect::from_min_size(
            bar_rect.min + egui::vec2(*x, *row as f32 * (TAB_HEIGHT + 2.0)),
            egui::vec2(*width, TAB_HEIGHT),
        );
        let tab_response = ui
            .interact(tab_rect, egui::Id::new("tab").with(idx), egui::Sense::click())
            .on_hover_text(&tab.path);

        if tab.is_active {
            ui.painter().rect_filled(tab_rect, 4.0, selected_bg);
        } else if tab_response.hovered() {
            ui.painter().rect_filled(tab_rect, 4.0, hover_bg);
        }

        ui.painter().text(
            tab_rect.left_center() + egui::vec2(8.0, 0.0),
            egui::Align2::LEFT_CENTER,
            label,
            FontId::default(),
            text_color,
        );

        let close_rect = egui::Rect::from_min_size(
            egui::pos2(tab_rect.right() - CLOSE_BTN_WIDTH - 4.0, tab_rect.top() + 4.0),
            egui::vec2(CLOSE_BTN_WIDTH, TAB_HEIGHT - 8.0),
        );
        let close_response = ui.interact(
            close_rect,
            egui::Id::new("tab_close").with(idx),
            egui::Sense::click(),
        );
        let close_color = if close_response.hovered() {
            Color32::from_rgb(220, 80, 80)
        } else {
            text_color
        };
        ui.painter().text(
            close_rect.center(),
            egui::Align2::CENTER_CENTER,
            "×",
            FontId::default(),
            close_color,
        );

        if close_response.clicked() {
            output.close = Some(tab.path.clone());
        } else if tab_response.clicked() && !tab.is_active {
            output.activate = Some(tab.path.clone());
        }
        if close_response.hovered() || tab_response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
    }

    output
}
