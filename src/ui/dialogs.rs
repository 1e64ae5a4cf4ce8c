//! Modal dialogs for creating and moving notes.
//!
//! The dialogs only collect input. The document store does the work and its
//! answer comes back through the application state.

use crate::session::display_name;
use eframe::egui::{self, Color32, Key, RichText};

/// Characters never allowed in a note or folder name.
const FORBIDDEN_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// State for an open node dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeDialog {
    /// Create a note (or a folder) inside `parent`
    Create {
        parent: String,
        name_input: String,
        folder: bool,
    },
    /// Move `source` into one of `destinations`
    Move {
        source: String,
        destinations: Vec<String>,
        selected: usize,
    },
}

/// Result from showing a node dialog.
#[derive(Debug, PartialEq, Eq)]
pub enum NodeDialogResult {
    /// Dialog still open
    None,
    /// Dialog was cancelled
    Cancelled,
    /// Ask the store to create `name` under `parent`
    Create { parent: String, name: String },
    /// Ask the store to move `source` into `dest_dir`
    Move { source: String, dest_dir: String },
}

/// Why a name cannot be submitted, or `None` if it can.
pub fn name_problem(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        Some("Name cannot be empty")
    } else if name == "." || name == ".." {
        Some("Name is reserved")
    } else if name.contains(FORBIDDEN_CHARS) {
        Some("Name contains a character that is not allowed")
    } else {
        None
    }
}

impl NodeDialog {
    pub fn new_note(parent: String) -> Self {
        Self::Create {
            parent,
            name_input: String::new(),
            folder: false,
        }
    }

    pub fn new_folder(parent: String) -> Self {
        Self::Create {
            parent,
            name_input: String::new(),
            folder: true,
        }
    }

    /// Move dialog for `source`. Folders that cannot receive it (itself, its
    /// current parent and anything inside it) are left out.
    pub fn move_node(source: String, all_dirs: &[String]) -> Self {
        let inside = format!("{}/", source);
        let current_parent = std::path::Path::new(&source)
            .parent()
            .map(|p| p.to_string_lossy().to_string());
        let destinations = all_dirs
            .iter()
            .filter(|d| **d != source && !d.starts_with(&inside))
            .filter(|d| current_parent.as_deref() != Some(d.as_str()))
            .cloned()
            .collect();
        Self::Move {
            source,
            destinations,
            selected: 0,
        }
    }

    /// The request this dialog would submit right now, if its input is valid.
    fn submission(&self) -> Option<NodeDialogResult> {
        match self {
            NodeDialog::Create {
                parent,
                name_input,
                folder,
            } => {
                if name_problem(name_input).is_some() {
                    return None;
                }
                let name = name_input.trim();
                // The store treats a trailing slash as "create a folder"
                let name = if *folder {
                    format!("{}/", name)
                } else {
                    name.to_string()
                };
                Some(NodeDialogResult::Create {
                    parent: parent.clone(),
                    name,
                })
            }
            NodeDialog::Move {
                source,
                destinations,
                selected,
            } => destinations
                .get(*selected)
                .map(|dest_dir| NodeDialogResult::Move {
                    source: source.clone(),
                    dest_dir: dest_dir.clone(),
                }),
        }
    }

    /// Show the dialog and return the result.
    pub fn show(&mut self, ctx: &egui::Context, is_dark: bool) -> NodeDialogResult {
        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            return NodeDialogResult::Cancelled;
        }

        let bg_color = if is_dark {
            Color32::from_rgb(40, 40, 45)
        } else {
            Color32::from_rgb(250, 250, 250)
        };

        let border_color = if is_dark {
            Color32::from_rgb(70, 70, 80)
        } else {
            Color32::from_rgb(180, 180, 190)
        };

        let secondary_color = if is_dark {
            Color32::from_rgb(150, 150, 160)
        } else {
            Color32::from_rgb(100, 100, 110)
        };

        let title = match self {
            NodeDialog::Create { folder: false, .. } => "📝 New Note",
            NodeDialog::Create { folder: true, .. } => "📁 New Folder",
            NodeDialog::Move { .. } => "➡ Move",
        };

        let mut submit = false;
        let mut cancel = false;

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(
                egui::Frame::window(&ctx.style())
                    .fill(bg_color)
                    .stroke(egui::Stroke::new(1.0, border_color))
                    .rounding(8.0),
            )
            .show(ctx, |ui| {
                ui.set_min_width(350.0);
                ui.add_space(8.0);

                match self {
                    NodeDialog::Create {
                        parent,
                        name_input,
                        folder,
                    } => {
                        ui.label(if *folder {
                            "Enter folder name:"
                        } else {
                            "Enter note name:"
                        });
                        ui.add_space(4.0);

                        let response = ui.add(
                            egui::TextEdit::singleline(name_input)
                                .hint_text(if *folder { "folder-name" } else { "note" })
                                .desired_width(330.0),
                        );
                        if name_input.is_empty() {
                            response.request_focus();
                        }
                        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                            submit = true;
                        }

                        if let Some(problem) = name_problem(name_input) {
                            if !name_input.is_empty() {
                                ui.add_space(4.0);
                                ui.colored_label(Color32::from_rgb(220, 80, 80), problem);
                            }
                        } else if !*folder && !name_input.trim().ends_with(".md") {
                            ui.add_space(4.0);
                            ui.label(
                                RichText::new(format!("Creates {}.md", name_input.trim()))
                                    .small()
                                    .color(secondary_color),
                            );
                        }

                        ui.add_space(12.0);
                        ui.label(
                            RichText::new(format!("Location: {}", parent))
                                .small()
                                .color(secondary_color),
                        );
                    }
                    NodeDialog::Move {
                        source,
                        destinations,
                        selected,
                    } => {
                        ui.label(format!("Move {} to:", display_name(source)));
                        ui.add_space(4.0);

                        if destinations.is_empty() {
                            ui.label(
                                RichText::new("There is no other folder to move to")
                                    .italics()
                                    .color(secondary_color),
                            );
                        } else {
                            egui::ComboBox::from_id_source("move_destination")
                                .width(330.0)
                                .selected_text(
                                    destinations.get(*selected).map_or("", String::as_str),
                                )
                                .show_ui(ui, |ui| {
                                    for (index, dir) in destinations.iter().enumerate() {
                                        ui.selectable_value(selected, index, dir.as_str());
                                    }
                                });
                        }
                    }
                }

                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = match self {
                            NodeDialog::Create { .. } => "Create",
                            NodeDialog::Move { .. } => "Move",
                        };
                        if ui
                            .add_enabled(self.submission().is_some(), egui::Button::new(label))
                            .clicked()
                        {
                            submit = true;
                        }

                        ui.add_space(8.0);

                        if ui.button("Cancel").clicked() {
                            cancel = true;
                        }
                    });
                });

                ui.add_space(4.0);
            });

        if cancel {
            return NodeDialogResult::Cancelled;
        }
        if submit {
            if let Some(result) = self.submission() {
                return result;
            }
        }
        NodeDialogResult::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_problem() {
        assert!(name_problem("todo").is_none());
        assert!(name_problem("  todo.md ").is_none());
        assert!(name_problem("").is_some());
        assert!(name_problem("   ").is_some());
        assert!(name_problem("..").is_some());
        assert!(name_problem("a/b").is_some());
        assert!(name_problem("what?").is_some());
    }

    #[test]
    fn test_create_note_submission() {
        let mut dialog = NodeDialog::new_note("/n".to_string());
        assert_eq!(dialog.submission(), None);

        if let NodeDialog::Create { name_input, .. } = &mut dialog {
            name_input.push_str("  ideas ");
        }
        assert_eq!(
            dialog.submission(),
            Some(NodeDialogResult::Create {
                parent: "/n".to_string(),
                name: "ideas".to_string(),
            })
        );
    }

    #[test]
    fn test_create_folder_submission_gets_trailing_slash() {
        let mut dialog = NodeDialog::new_folder("/n".to_string());
        if let NodeDialog::Create { name_input, .. } = &mut dialog {
            name_input.push_str("archive");
        }
        assert_eq!(
            dialog.submission(),
            Some(NodeDialogResult::Create {
                parent: "/n".to_string(),
                name: "archive/".to_string(),
            })
        );
    }

    #[test]
    fn test_move_destinations_exclude_self_parent_and_descendants() {
        let dirs: Vec<String> = ["/n", "/n/a", "/n/a/deep", "/n/ab", "/n/b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let dialog = NodeDialog::move_node("/n/a".to_string(), &dirs);

        match &dialog {
            NodeDialog::Move { destinations, .. } => {
                assert_eq!(destinations, &vec!["/n/ab".to_string(), "/n/b".to_string()]);
            }
            other => panic!("unexpected dialog {:?}", other),
        }
        assert_eq!(
            dialog.submission(),
            Some(NodeDialogResult::Move {
                source: "/n/a".to_string(),
                dest_dir: "/n/ab".to_string(),
            })
        );
    }

    #[test]
    fn test_move_without_destinations_cannot_submit() {
        let dialog = NodeDialog::move_node("/n/a.md".to_string(), &["/n".to_string()]);
        assert_eq!(dialog.submission(), None);
    }
}
