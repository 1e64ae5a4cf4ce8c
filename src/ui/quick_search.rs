//! Search-as-you-type overlay over the document list.
//!
//! Ctrl+P opens it. The query is owned here; matching happens in
//! [`crate::search`] and the hits are handed back in on every frame.

use crate::search::SearchHit;
use crate::session::DocumentKind;
use eframe::egui::{self, text::LayoutJob, Color32, FontId, Key, RichText, Sense, TextFormat};

/// Maximum number of results to show.
const MAX_RESULTS: usize = 15;

/// Output from the quick search overlay.
#[derive(Debug, Default)]
pub struct QuickSearchOutput {
    /// The query text changed and the search should run again
    pub query_changed: bool,
    /// Document chosen by the user (should be opened)
    pub selected: Option<String>,
    /// Whether the overlay was closed
    pub closed: bool,
}

/// Quick search overlay state.
#[derive(Debug, Default)]
pub struct QuickSearch {
    is_open: bool,
    query: String,
    selected_index: usize,
}

impl QuickSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Open the overlay with an empty query.
    pub fn open(&mut self) {
        self.is_open = true;
        self.query.clear();
        self.selected_index = 0;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.query.clear();
        self.selected_index = 0;
    }

    /// Move the highlighted row, wrapping at both ends.
    fn step_selection(&mut self, forward: bool, count: usize) {
        if count == 0 {
            return;
        }
        self.selected_index = if forward {
            (self.selected_index + 1) % count
        } else if self.selected_index == 0 {
            count - 1
        } else {
            self.selected_index - 1
        };
    }

    /// Render the overlay and return any output.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        hits: &[SearchHit],
        is_dark: bool,
    ) -> QuickSearchOutput {
        let mut output = QuickSearchOutput::default();

        if !self.is_open {
            return output;
        }

        let results = &hits[..hits.len().min(MAX_RESULTS)];
        if self.selected_index >= results.len() {
            self.selected_index = 0;
        }

        let bg_color = if is_dark {
            Color32::from_rgb(35, 35, 40)
        } else {
            Color32::from_rgb(255, 255, 255)
        };

        let border_color = if is_dark {
            Color32::from_rgb(80, 80, 90)
        } else {
            Color32::from_rgb(180, 180, 190)
        };

        let text_color = if is_dark {
            Color32::from_rgb(220, 220, 220)
        } else {
            Color32::from_rgb(40, 40, 40)
        };

        let secondary_color = if is_dark {
            Color32::from_rgb(140, 140, 150)
        } else {
            Color32::from_rgb(100, 100, 110)
        };

        let match_color = if is_dark {
            Color32::from_rgb(255, 200, 90)
        } else {
            Color32::from_rgb(200, 110, 0)
        };

        let selected_bg = if is_dark {
            Color32::from_rgb(55, 65, 85)
        } else {
            Color32::from_rgb(220, 230, 245)
        };

        ctx.input(|i| {
            if i.key_pressed(Key::Escape) {
                output.closed = true;
            }
            if i.key_pressed(Key::ArrowDown) {
                self.step_selection(true, results.len());
            }
            if i.key_pressed(Key::ArrowUp) {
                self.step_selection(false, results.len());
            }
            if i.key_pressed(Key::Enter) {
                if let Some(hit) = results.get(self.selected_index) {
                    output.selected = Some(hit.path.clone());
                    output.closed = true;
                }
            }
        });

        egui::Area::new(egui::Id::new("quick_search_overlay"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 100.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(bg_color)
                    .stroke(egui::Stroke::new(1.0, border_color))
                    .rounding(8.0)
                    .shadow(egui::epaint::Shadow {
                        offset: [0.0, 4.0].into(),
                        blur: 12.0,
                        spread: 0.0,
                        color: Color32::from_black_alpha(60),
                    })
                    .show(ui, |ui| {
                        ui.set_width(500.0);
                        ui.add_space(8.0);

                        ui.horizontal(|ui| {
                            ui.add_space(12.0);
                            ui.label(RichText::new("🔍").size(16.0));
                            ui.add_space(4.0);

                            let response = ui.add(
                                egui::TextEdit::singleline(&mut self.query)
                                    .hint_text("Search notes...")
                                    .frame(false)
                                    .desired_width(450.0)
                                    .font(egui::TextStyle::Body),
                            );
                            response.request_focus();

                            if response.changed() {
                                self.selected_index = 0;
                                output.query_changed = true;
                            }
                        });

                        ui.add_space(4.0);
                        ui.separator();
                        ui.add_space(4.0);

                        if results.is_empty() {
                            if !self.query.is_empty() {
                                ui.horizontal(|ui| {
                                    ui.add_space(16.0);
                                    ui.label(
                                        RichText::new("No matching notes")
                                            .color(secondary_color)
                                            .italics(),
                                    );
                                });
                                ui.add_space(8.0);
                            }
                        } else {
                            for (idx, hit) in results.iter().enumerate() {
                                let response = ui
                                    .horizontal(|ui| {
                                        let row = ui.interact(
                                            ui.available_rect_before_wrap(),
                                            ui.id().with(idx),
                                            Sense::click(),
                                        );
                                        if idx == self.selected_index || row.hovered() {
                                            ui.painter().rect_filled(
                                                row.rect.expand2(egui::vec2(8.0, 2.0)),
                                                4.0,
                                                selected_bg,
                                            );
                                        }

                                        ui.add_space(16.0);
                                        let icon = DocumentKind::from_path(&hit.path).icon();
                                        ui.label(RichText::new(icon).size(14.0));
                                        ui.add_space(8.0);
                                        ui.label(
                                            RichText::new(&hit.display_name)
                                                .color(text_color)
                                                .strong(),
                                        );
                                        ui.add_space(8.0);
                                        ui.label(highlighted_path(
                                            hit,
                                            secondary_color,
                                            match_color,
                                        ));
                                        row
                                    })
                                    .inner;

                                if response.clicked() {
                                    output.selected = Some(hit.path.clone());
                                    output.closed = true;
                                }
                                ui.add_space(2.0);
                            }
                            ui.add_space(4.0);
                        }

                        ui.separator();
                        ui.horizontal(|ui| {
                            ui.add_space(12.0);
                            ui.label(
                                RichText::new("↑↓ Navigate  ⏎ Open  Esc Close")
                                    .color(secondary_color)
                                    .small(),
                            );
                        });
                        ui.add_space(6.0);
                    });
            });

        if output.closed {
            self.close();
        }

        output
    }
}

/// The hit's path with the matched characters picked out.
fn highlighted_path(hit: &SearchHit, color: Color32, match_color: Color32) -> LayoutJob {
    let mut job = LayoutJob::default();
    let font = FontId::proportional(11.0);
    let mut matched = hit.positions.iter().peekable();

    for (index, ch) in hit.path.chars().enumerate() {
        let is_match = matched.peek() == Some(&&index);
        if is_match {
            matched.next();
        }
        let mut buf = [0u8; 4];
        job.append(
            ch.encode_utf8(&mut buf),
            0.0,
            TextFormat::simple(font.clone(), if is_match { match_color } else { color }),
        );
    }
    job
}
