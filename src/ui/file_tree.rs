//! Document tree sidebar panel.
//!
//! Displays the notes folder with icons, expand/collapse, click-to-open and a
//! context menu for creating and moving notes. Expansion state is read
//! through a callback so the panel itself stays stateless about folders.

use crate::config::Settings;
use crate::tree::{DocumentNode, NodeKind};
use eframe::egui::{self, Color32, RichText, Sense, Ui, Vec2};

/// Indentation per tree level.
const INDENT_PER_LEVEL: f32 = 16.0;

/// Height of each tree item row.
const ROW_HEIGHT: f32 = 20.0;

/// Output from the file tree panel.
#[derive(Debug, Default)]
pub struct FileTreeOutput {
    /// Note that was clicked (should be opened in a tab)
    pub file_clicked: Option<String>,

    /// Folder that was toggled, with its new expansion state
    pub path_toggled: Option<(String, bool)>,

    /// New panel width if resized
    pub new_width: Option<f32>,

    /// Context menu action requested
    pub context_action: Option<FileTreeContextAction>,
}

/// Actions from the file tree context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeContextAction {
    /// Create a note in the given folder
    NewNote(String),
    /// Create a folder in the given folder
    NewFolder(String),
    /// Move the given note or folder elsewhere
    MoveTo(String),
    /// Rescan the notes folder
    Refresh,
}

/// Document tree sidebar panel.
pub struct FileTreePanel {
    /// Current panel width
    width: f32,
}

impl FileTreePanel {
    pub fn new(width: f32) -> Self {
        Self {
            width: width.clamp(Settings::MIN_FILE_TREE_WIDTH, Settings::MAX_FILE_TREE_WIDTH),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Render the panel and return any output.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        tree: &DocumentNode,
        is_expanded: &dyn Fn(&str) -> bool,
        active_path: Option<&str>,
        is_dark: bool,
    ) -> FileTreeOutput {
        let mut output = FileTreeOutput::default();

        let panel_bg = if is_dark {
            Color32::from_rgb(30, 30, 30)
        } else {
            Color32::from_rgb(245, 245, 245)
        };

        let border_color = if is_dark {
            Color32::from_rgb(60, 60, 60)
        } else {
            Color32::from_rgb(200, 200, 200)
        };

        egui::SidePanel::left("file_tree_panel")
            .resizable(true)
            .default_width(self.width)
            .width_range(Settings::MIN_FILE_TREE_WIDTH..=Settings::MAX_FILE_TREE_WIDTH)
            .frame(
                egui::Frame::none()
                    .fill(panel_bg)
                    .stroke(egui::Stroke::new(1.0, border_color)),
            )
            .show(ctx, |ui| {
                let panel_width = ui.available_width();
                if (panel_width - self.width).abs() > 1.0 {
                    self.width = panel_width;
                    output.new_width = Some(panel_width);
                }

                // Header with the notes folder name and a "new note" button
                ui.horizontal(|ui| {
                    ui.add_space(4.0);
                    ui.label(RichText::new("📁").size(14.0));
                    ui.add(
                        egui::Label::new(RichText::new(&tree.name).size(12.0).strong())
                            .truncate()
                            .sense(Sense::click()),
                    )
                    .context_menu(|ui| render_context_menu(ui, tree, false, &mut output));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(egui::Button::new("+").frame(false))
                            .on_hover_text("New note (Ctrl+I)")
                            .clicked()
                        {
                            output.context_action =
                                Some(FileTreeContextAction::NewNote(tree.path.clone()));
                        }
                    });
                });

                ui.add_space(2.0);
                ui.separator();

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add_space(4.0);
                        match tree.children() {
                            Some(children) if !children.is_empty() => {
                                for child in children {
                                    render_node(
                                        ui,
                                        child,
                                        0,
                                        is_expanded,
                                        active_path,
                                        is_dark,
                                        &mut output,
                                    );
                                }
                            }
                            _ => {
                                ui.label(RichText::new("No notes yet").italics().weak());
                            }
                        }
                        ui.add_space(4.0);
                    });
            });

        output
    }
}

/// Render a single tree node and its children (if expanded).
fn render_node(
    ui: &mut Ui,
    node: &DocumentNode,
    depth: usize,
    is_expanded: &dyn Fn(&str) -> bool,
    active_path: Option<&str>,
    is_dark: bool,
    output: &mut FileTreeOutput,
) {
    let indent = depth as f32 * INDENT_PER_LEVEL;

    let text_color = if is_dark {
        Color32::from_rgb(220, 220, 220)
    } else {
        Color32::from_rgb(40, 40, 40)
    };

    let hover_bg = if is_dark {
        Color32::from_rgb(50, 50, 60)
    } else {
        Color32::from_rgb(220, 225, 235)
    };

    let selected_bg = if is_dark {
        Color32::from_rgb(45, 55, 75)
    } else {
        Color32::from_rgb(200, 210, 230)
    };

    let is_dir = node.is_directory();
    let expanded = is_dir && is_expanded(&node.path);

    let row_width = ui.available_width();
    let (row_rect, row_response) =
        ui.allocate_exact_size(Vec2::new(row_width, ROW_HEIGHT), Sense::click());

    // Background first, then the row content on top
    if active_path == Some(node.path.as_str()) {
        ui.painter().rect_filled(row_rect, 2.0, selected_bg);
    } else if row_response.hovered() {
        ui.painter().rect_filled(row_rect, 2.0, hover_bg);
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    let mut content_pos = row_rect.left_top() + Vec2::new(indent + 4.0, 2.0);

    if is_dir {
        let arrow = if expanded { "▼" } else { "▶" };
        ui.painter().text(
            content_pos,
            egui::Align2::LEFT_TOP,
            arrow,
            egui::FontId::proportional(10.0),
            text_color,
        );
    }
    content_pos.x += 14.0;

    ui.painter().text(
        content_pos,
        egui::Align2::LEFT_TOP,
        node.icon(expanded),
        egui::FontId::proportional(14.0),
        text_color,
    );
    content_pos.x += 18.0;

    ui.painter().text(
        content_pos,
        egui::Align2::LEFT_TOP,
        &node.name,
        egui::FontId::proportional(12.0),
        text_color,
    );

    if row_response.clicked() {
        if is_dir {
            output.path_toggled = Some((node.path.clone(), !expanded));
        } else {
            output.file_clicked = Some(node.path.clone());
        }
    }

    row_response.context_menu(|ui| render_context_menu(ui, node, true, output));

    if let NodeKind::Directory { children } = &node.kind {
        if expanded {
            for child in children {
                render_node(
                    ui,
                    child,
                    depth + 1,
                    is_expanded,
                    active_path,
                    is_dark,
                    output,
                );
            }
        }
    }
}

/// Render the context menu for a tree node.
fn render_context_menu(
    ui: &mut Ui,
    node: &DocumentNode,
    movable: bool,
    output: &mut FileTreeOutput,
) {
    if node.is_directory() {
        if ui.button("📝 New Note").clicked() {
            output.context_action = Some(FileTreeContextAction::NewNote(node.path.clone()));
            ui.close_menu();
        }
        if ui.button("📁 New Folder").clicked() {
            output.context_action = Some(FileTreeContextAction::NewFolder(node.path.clone()));
            ui.close_menu();
        }
        ui.separator();
    }

    if movable {
        if ui.button("➡ Move to…").clicked() {
            output.context_action = Some(FileTreeContextAction::MoveTo(node.path.clone()));
            ui.close_menu();
        }
        ui.separator();
    }

    if ui.button("🔄 Refresh").clicked() {
        output.context_action = Some(FileTreeContextAction::Refresh);
        ui.close_menu();
    }
}
