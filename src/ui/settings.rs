//! Settings Panel Component for Folio
//!
//! A modal window for two kinds of options. Editor preferences live in the
//! notes folder's durable store and take effect the next time an editor is
//! built. Application settings live in the config file.

use crate::config::Settings;
use crate::editor::options::THEMES;
use crate::editor::EditorOptions;
use crate::remote::RetryPolicy;
use eframe::egui::{self, Color32, RichText, Ui};

/// Settings panel sections for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Appearance,
    Markdown,
    Saving,
}

impl SettingsSection {
    const ALL: [SettingsSection; 3] = [
        SettingsSection::Appearance,
        SettingsSection::Markdown,
        SettingsSection::Saving,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsSection::Appearance => "Appearance",
            SettingsSection::Markdown => "Markdown",
            SettingsSection::Saving => "Saving",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SettingsSection::Appearance => "🎨",
            SettingsSection::Markdown => "📝",
            SettingsSection::Saving => "💾",
        }
    }
}

/// Result of showing the settings panel.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanelOutput {
    /// Editor preferences were modified.
    pub options_changed: bool,
    /// Application settings were modified.
    pub settings_changed: bool,
    /// Whether the panel should be closed.
    pub close_requested: bool,
}

/// Settings panel state and rendering.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    active_section: SettingsSection,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the settings panel as a modal window, editing `options` and
    /// `settings` in place.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        options: &mut EditorOptions,
        settings: &mut Settings,
        is_dark: bool,
    ) -> SettingsPanelOutput {
        let mut output = SettingsPanelOutput::default();

        // Semi-transparent overlay
        let screen_rect = ctx.screen_rect();
        let overlay_color = if is_dark {
            Color32::from_rgba_unmultiplied(0, 0, 0, 180)
        } else {
            Color32::from_rgba_unmultiplied(0, 0, 0, 120)
        };

        egui::Area::new(egui::Id::new("settings_overlay"))
            .order(egui::Order::Middle)
            .fixed_pos(screen_rect.min)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen_rect.size(), egui::Sense::click());
                ui.painter().rect_filled(screen_rect, 0.0, overlay_color);
                if response.clicked() {
                    output.close_requested = true;
                }
            });

        egui::Window::new("⚙ Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(500.0)
            .max_width(600.0)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    output.close_requested = true;
                }

                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.set_min_width(120.0);
                        for section in SettingsSection::ALL {
                            let selected = self.active_section == section;
                            let text = format!("{} {}", section.icon(), section.label());
                            if ui
                                .add_sized(
                                    [110.0, 32.0],
                                    egui::SelectableLabel::new(
                                        selected,
                                        RichText::new(text).size(14.0),
                                    ),
                                )
                                .clicked()
                            {
                                self.active_section = section;
                            }
                        }
                    });

                    ui.separator();

                    ui.vertical(|ui| {
                        ui.set_min_width(350.0);
                        ui.set_min_height(320.0);

                        match self.active_section {
                            SettingsSection::Appearance => {
                                let (opts, sets) = show_appearance_section(ui, options, settings);
                                output.options_changed |= opts;
                                output.settings_changed |= sets;
                            }
                            SettingsSection::Markdown => {
                                output.options_changed |= show_markdown_section(ui, options);
                            }
                            SettingsSection::Saving => {
                                output.settings_changed |= show_saving_section(ui, settings);
                            }
                        }
                    });
                });

                ui.separator();

                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            output.close_requested = true;
                        }
                        ui.label(
                            RichText::new("Editor changes apply when a note is next opened")
                                .small()
                                .weak(),
                        );
                    });
                });
            });

        output
    }
}

/// Returns `(options_changed, settings_changed)`.
fn show_appearance_section(
    ui: &mut Ui,
    options: &mut EditorOptions,
    settings: &mut Settings,
) -> (bool, bool) {
    let mut options_changed = false;
    let mut settings_changed = false;

    ui.heading("Appearance");
    ui.add_space(8.0);

    ui.label(RichText::new("Theme").strong());
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        for theme in THEMES {
            let label = match *theme {
                "light" => "☀ Light",
                _ => "🌙 Dark",
            };
            if ui
                .selectable_label(options.theme == *theme, label)
                .clicked()
                && options.theme != *theme
            {
                options.theme = theme.to_string();
                options_changed = true;
            }
        }
    });

    ui.add_space(8.0);
    options_changed |= ui
        .checkbox(&mut options.toolbar, "Show formatting toolbar")
        .changed();

    ui.add_space(16.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label(RichText::new("Font Size").strong());
        ui.add_space(8.0);
        ui.label(format!("{}px", settings.font_size as u32));
    });
    ui.add_space(4.0);
    settings_changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.font_size,
                Settings::MIN_FONT_SIZE..=Settings::MAX_FONT_SIZE,
            )
            .show_value(false)
            .step_by(1.0),
        )
        .changed();

    (options_changed, settings_changed)
}

fn show_markdown_section(ui: &mut Ui, options: &mut EditorOptions) -> bool {
    let mut changed = false;

    ui.heading("Markdown");
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label("Preview theme");
        changed |= ui
            .add(egui::TextEdit::singleline(&mut options.preview_theme).desired_width(160.0))
            .changed();
    });
    ui.horizontal(|ui| {
        ui.label("Editor theme");
        changed |= ui
            .add(egui::TextEdit::singleline(&mut options.editor_theme).desired_width(160.0))
            .changed();
    });

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    for (flag, label) in [
        (&mut options.task_lists, "Task lists"),
        (&mut options.code_folding, "Code folding"),
        (&mut options.charts, "Charts"),
        (&mut options.sequences, "Sequence diagrams"),
        (&mut options.katex, "KaTeX math"),
        (&mut options.emoji, "Emoji"),
    ] {
        changed |= ui.checkbox(flag, label).changed();
        ui.add_space(2.0);
    }

    changed
}

fn show_saving_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Saving");
    ui.add_space(8.0);

    ui.label(RichText::new("Autosave delay").strong());
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.autosave_delay_ms,
                Settings::MIN_AUTOSAVE_DELAY_MS..=Settings::MAX_AUTOSAVE_DELAY_MS,
            )
            .logarithmic(true)
            .suffix(" ms"),
        )
        .on_hover_text("Quiet time after the last keystroke before the note is saved")
        .changed();

    ui.add_space(8.0);
    ui.label(RichText::new("Request timeout").strong());
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.request_timeout_ms,
                Settings::MIN_REQUEST_TIMEOUT_MS..=Settings::MAX_REQUEST_TIMEOUT_MS,
            )
            .logarithmic(true)
            .suffix(" ms"),
        )
        .changed();

    ui.add_space(8.0);
    ui.label(RichText::new("Save attempts").strong());
    changed |= ui
        .add(egui::Slider::new(
            &mut settings.persist_retry.max_attempts,
            1..=RetryPolicy::MAX_ATTEMPTS_LIMIT,
        ))
        .on_hover_text("Applies the next time the notes folder is opened")
        .changed();

    changed
}
