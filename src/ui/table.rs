use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use table_explorer::data::{Kind, Table};

// ---------------------------------------------------------------------------
// Table view
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// Render a table in a striped, scrollable grid. Only visible rows are laid out.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    let columns = table.columns();
    if columns.is_empty() {
        ui.label("No columns.");
        return;
    }

    TableBuilder::new(ui)
        .id_salt(id)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(TableColumn::auto().at_least(60.0).clip(true), columns.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for column in columns {
                header.col(|ui| {
                    ui.strong(&column.name)
                        .on_hover_text(format!("{} column", column.kind));
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.len(), |mut row| {
                let r = row.index();
                for column in columns {
                    row.col(|ui| {
                        let text = column.values[r].to_string();
                        if column.kind == Kind::Numeric {
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                ui.label(text);
                            });
                        } else {
                            ui.label(text);
                        }
                    });
                }
            });
        });
}
