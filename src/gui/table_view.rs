//! Raw table display for the discharge datasets.

use crate::data::RawTable;
use egui::{RichText, ScrollArea};

pub struct TableView;

impl TableView {
    /// Draw a striped grid with a bold header row.
    pub fn show(ui: &mut egui::Ui, id: &str, table: &RawTable) {
        if table.columns.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ui.label(
            RichText::new(format!(
                "{} rows, {} columns",
                table.row_count(),
                table.columns.len()
            ))
            .size(11.0),
        );
        ui.add_space(5.0);

        ScrollArea::both()
            .id_salt(id)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("raw_table_{}", id)))
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for column in &table.columns {
                            ui.label(RichText::new(column).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in &table.rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(12.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
