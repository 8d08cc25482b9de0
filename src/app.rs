use eframe::egui;

use table_explorer::config::AppConfig;

use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TableExplorerApp {
    pub state: AppState,
}

impl TableExplorerApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for TableExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: sort + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: group-by ----
        egui::TopBottomPanel::bottom("group_panel")
            .default_height(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::group_panel(ui, &mut self.state);
            });

        // ---- Central panel: filtered view ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.original.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a file to explore it  (File → Open…)");
                });
                return;
            }
            table::data_table(ui, "view_table", &self.state.view);
        });
    }
}
