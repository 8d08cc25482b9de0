use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use table_explorer::data::loader::load_file;
use table_explorer::data::{AggregateFn, ExportFormat, Kind};

use crate::state::{Action, AppState, ExportSource, FilterControl};
use crate::ui::table::data_table;

// ---------------------------------------------------------------------------
// Left side panel – sort and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: sort controls, then one filter widget per column.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(original) = &state.original else {
        ui.heading("Filters");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    };
    let columns: Vec<String> = original.column_names().map(str::to_string).collect();

    let mut changed = false;
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Sort ----
            ui.heading("Sort");
            let current = state
                .sort_column
                .clone()
                .unwrap_or_else(|| "Select to sort".to_string());
            egui::ComboBox::from_id_salt("sort_by")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    changed |= ui.selectable_value(&mut state.sort_column, None, "none").changed();
                    for col in &columns {
                        changed |= ui
                            .selectable_value(&mut state.sort_column, Some(col.clone()), col)
                            .changed();
                    }
                });
            if state.sort_column.is_some() {
                ui.horizontal(|ui: &mut Ui| {
                    changed |= ui.radio_value(&mut state.sort_ascending, true, "Ascending").changed();
                    changed |= ui
                        .radio_value(&mut state.sort_ascending, false, "Descending")
                        .changed();
                });
            }
            ui.separator();

            // ---- Per-column filter widgets ----
            ui.horizontal(|ui: &mut Ui| {
                ui.heading("Filters");
                reset = ui.small_button("Reset").clicked();
            });

            for filter in &mut state.filters {
                let col = filter.column.clone();
                match &mut filter.control {
                    FilterControl::Range { lo, hi, min, max } => {
                        ui.strong(&col);
                        let step = ((*max - *min) / 100.0).max(f64::EPSILON);
                        changed |= ui
                            .add(egui::Slider::new(lo, *min..=*max).text("min").step_by(step))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(hi, *min..=*max).text("max").step_by(step))
                            .changed();
                        ui.add_space(4.0);
                    }
                    FilterControl::Dates { start, end, .. } => {
                        ui.strong(&col);
                        ui.horizontal(|ui: &mut Ui| {
                            changed |= ui
                                .add(DatePickerButton::new(start).id_salt(&format!("{col}_start")))
                                .changed();
                            ui.label("to");
                            changed |= ui
                                .add(DatePickerButton::new(end).id_salt(&format!("{col}_end")))
                                .changed();
                        });
                        ui.add_space(4.0);
                    }
                    FilterControl::Choice { options, selected } => {
                        // Show count of selected / total in the header
                        let header_text = format!("{col}  ({}/{})", selected.len(), options.len());
                        egui::CollapsingHeader::new(RichText::new(header_text).strong())
                            .id_salt(&col)
                            .default_open(false)
                            .show(ui, |ui: &mut Ui| {
                                if ui.small_button("Clear").clicked() {
                                    selected.clear();
                                    changed = true;
                                }
                                for val in options.iter() {
                                    let mut checked = selected.contains(val);
                                    if ui.checkbox(&mut checked, val.to_string()).changed() {
                                        if checked {
                                            selected.insert(val.clone());
                                        } else {
                                            selected.remove(val);
                                        }
                                        changed = true;
                                    }
                                }
                            });
                    }
                    FilterControl::None => {}
                }
            }
        });

    // Recompute the view after any widget change.
    if reset {
        state.reset_filters();
    } else if changed {
        state.refresh();
    }
}

// ---------------------------------------------------------------------------
// Bottom panel – group-by
// ---------------------------------------------------------------------------

/// Render the group-by controls and the grouped table.
pub fn group_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Group by");
    let Some(original) = &state.original else {
        ui.label("No dataset loaded.");
        return;
    };
    let keys: Vec<String> = original
        .columns()
        .iter()
        .filter(|c| matches!(c.kind, Kind::Categorical | Kind::Text))
        .map(|c| c.name.clone())
        .collect();
    let numeric: Vec<String> = original
        .columns()
        .iter()
        .filter(|c| c.kind == Kind::Numeric)
        .map(|c| c.name.clone())
        .collect();

    let mut changed = false;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Column:");
        let current = state.group.column.clone().unwrap_or_default();
        egui::ComboBox::from_id_salt("group_by")
            .selected_text(current)
            .show_ui(ui, |ui: &mut Ui| {
                for key in &keys {
                    changed |= ui
                        .selectable_value(&mut state.group.column, Some(key.clone()), key)
                        .changed();
                }
            });

        ui.separator();
        ui.label("Function:");
        egui::ComboBox::from_id_salt("group_fn")
            .selected_text(state.group.function.name())
            .show_ui(ui, |ui: &mut Ui| {
                for function in AggregateFn::ALL {
                    changed |= ui
                        .selectable_value(&mut state.group.function, function, function.name())
                        .changed();
                }
            });

        ui.separator();
        ui.label("Aggregate:");
        for col in &numeric {
            let mut checked = state.group.targets.contains(col);
            if ui.checkbox(&mut checked, col).changed() {
                if checked {
                    state.group.targets.insert(col.clone());
                } else {
                    state.group.targets.remove(col);
                }
                changed = true;
            }
        }
    });

    if changed {
        state.regroup();
    }

    ui.separator();
    match &state.grouped {
        Some(grouped) => data_table(ui, "group_table", grouped),
        None => {
            ui.label("Pick a column and at least one numeric column to aggregate.");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let loaded = state.original.is_some();
            for format in [ExportFormat::Csv, ExportFormat::Xlsx] {
                let label = format!("Export view as {}…", format.extension().to_uppercase());
                if ui.add_enabled(loaded, egui::Button::new(label)).clicked() {
                    save_file_dialog(state, ExportSource::View, format);
                    ui.close_menu();
                }
            }
            let grouped = state.grouped.is_some();
            for format in [ExportFormat::Csv, ExportFormat::Xlsx] {
                let label = format!("Export grouping as {}…", format.extension().to_uppercase());
                if ui.add_enabled(grouped, egui::Button::new(label)).clicked() {
                    save_file_dialog(state, ExportSource::Grouped, format);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let Some(original) = &state.original {
            ui.label(format!(
                "{} rows loaded, {} visible",
                original.len(),
                state.view.len()
            ));
        }

        if let Some(status) = &state.status {
            ui.separator();
            ui.label(RichText::new(&status.text).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open table")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        open_path(state, &path);
    }
}

pub fn open_path(state: &mut AppState, path: &Path) {
    match load_file(path, &state.config.inference) {
        Ok(table) => {
            log::info!(
                "Opened {} with columns {:?}",
                path.display(),
                table.column_names().collect::<Vec<_>>()
            );
            state.set_table(table);
        }
        Err(e) => {
            log::error!("Failed to load file: {e}");
            state.report(Action::Load, format!("Error: {e}"));
        }
    }
}

fn save_file_dialog(state: &mut AppState, source: ExportSource, format: ExportFormat) {
    let default_name = match source {
        ExportSource::View => "filtered_data",
        ExportSource::Grouped => "grouped_data",
    };
    let file = rfd::FileDialog::new()
        .set_title("Export table")
        .set_file_name(format!("{default_name}.{}", format.extension()))
        .add_filter(format.extension().to_uppercase(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export(source, format, &path) {
            log::error!("Export failed: {e:#}");
            state.report(Action::Export, format!("Error: {e:#}"));
        }
    }
}
