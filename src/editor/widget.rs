//! Text editor widget for Folio
//!
//! A markdown source editor built on egui's `TextEdit`, with an optional
//! formatting toolbar. One instance exists per bound document; dropping it
//! destroys the editor.

use super::toolbar::{apply_format, FormatCommand};
use super::{EditorFactory, EditorInstance, EditorOptions};
use eframe::egui::{self, FontId, ScrollArea, TextEdit, Ui};
use log::debug;

/// Live editor for one document.
pub struct MarkdownEditor {
    /// Buffer being edited
    text: String,
    /// Dark or light visuals
    dark: bool,
    /// Whether the formatting toolbar is shown
    toolbar: bool,
    /// Last known selection (character indices)
    selection: (usize, usize),
    /// Request keyboard focus on next frame
    needs_focus: bool,
    /// Distinguishes instances so egui state never leaks between documents
    generation: u64,
}

impl MarkdownEditor {
    fn new(text: String, options: &EditorOptions, generation: u64) -> Self {
        Self {
            text,
            dark: options.is_dark(),
            toolbar: options.toolbar,
            selection: (0, 0),
            needs_focus: true,
            generation,
        }
    }

    /// Show the editor. Returns `true` when the buffer was edited this frame.
    pub fn show(&mut self, ui: &mut Ui, font_size: f32) -> bool {
        let id = ui.id().with(("markdown_editor", self.generation));
        let mut changed = false;

        // Theme is fixed when the editor is built
        if ui.visuals().dark_mode != self.dark {
            *ui.visuals_mut() = if self.dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            };
        }

        if self.toolbar {
            if let Some(command) = self.show_toolbar(ui) {
                let result = apply_format(&self.text, self.selection, command);
                debug!("Applied {:?}", command);
                self.text = result.text;
                self.selection = (result.cursor, result.cursor);
                if let Some(mut state) = TextEdit::load_state(ui.ctx(), id) {
                    let ccursor = egui::text::CCursor::new(result.cursor);
                    state
                        .cursor
                        .set_char_range(Some(egui::text::CCursorRange::one(ccursor)));
                    state.store(ui.ctx(), id);
                }
                self.needs_focus = true;
                changed = true;
            }
            ui.separator();
        }

        let output = ScrollArea::vertical()
            .id_source(id.with("scroll"))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                TextEdit::multiline(&mut self.text)
                    .id(id)
                    .frame(false)
                    .code_editor()
                    .font(FontId::monospace(font_size))
                    .desired_width(f32::INFINITY)
                    .show(ui)
            })
            .inner;

        if self.needs_focus {
            output.response.request_focus();
            self.needs_focus = false;
        }

        if let Some(range) = output.cursor_range {
            self.selection = (range.primary.ccursor.index, range.secondary.ccursor.index);
        }

        changed || output.response.changed()
    }

    fn show_toolbar(&self, ui: &mut Ui) -> Option<FormatCommand> {
        let mut clicked = None;
        ui.horizontal(|ui| {
            for command in FormatCommand::ALL {
                if ui
                    .small_button(command.label())
                    .on_hover_text(command.tooltip())
                    .clicked()
                {
                    clicked = Some(command);
                }
            }
        });
        clicked
    }
}

impl EditorInstance for MarkdownEditor {
    fn text(&self) -> &str {
        &self.text
    }
}

/// Builds [`MarkdownEditor`]s.
#[derive(Debug, Default)]
pub struct MarkdownEditorFactory {
    generation: u64,
}

impl EditorFactory for MarkdownEditorFactory {
    type Editor = MarkdownEditor;

    fn create(&mut self, content: String, options: &EditorOptions) -> MarkdownEditor {
        self.generation += 1;
        MarkdownEditor::new(content, options, self.generation)
    }
}
