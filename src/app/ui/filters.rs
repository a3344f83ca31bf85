use std::collections::BTreeSet;

use eframe::egui::{self, RichText, Ui};

use crate::data::{FilterOptions, FilterSelection};

use super::super::ViewModel;

fn toggle_list(ui: &mut Ui, id: &str, options: &[String], selected: &mut BTreeSet<String>) {
    if options.is_empty() && selected.is_empty() {
        ui.small("No values in the current data.");
        return;
    }

    // Keep selected values listed even when other filters exclude them.
    let mut values = options.iter().cloned().collect::<BTreeSet<_>>();
    values.extend(selected.iter().cloned());

    egui::ScrollArea::vertical()
        .id_salt(id)
        .max_height(160.0)
        .show(ui, |ui| {
            for value in values {
                let mut checked = selected.contains(&value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    if checked {
                        selected.insert(value);
                    } else {
                        selected.remove(&value);
                    }
                }
            }
        });
}

impl ViewModel {
    pub(in crate::app) fn filter_options(&mut self) -> FilterOptions {
        if let Some((key, options)) = &self.options_cache
            && *key == self.filters.selection
        {
            return options.clone();
        }

        let options = FilterOptions::derive(&self.catalog, &self.filters.selection);
        self.options_cache = Some((self.filters.selection.clone(), options.clone()));
        options
    }

    /// Draws the filter panel; returns the selection to load when the user
    /// applies changes.
    pub(in crate::app) fn draw_filters(&mut self, ui: &mut Ui, is_loading: bool) -> Option<FilterSelection> {
        ui.heading("Filters");
        ui.add_space(6.0);

        let options = self.filter_options();
        let selection = &mut self.filters.selection;

        if self.visibility.product {
            ui.label(RichText::new("Product").strong());
            toggle_list(ui, "product_filter", &options.products, &mut selection.products);
            ui.add_space(6.0);
        } else {
            ui.small(format!("Product scope is fixed for the {} role.", self.role));
        }

        if self.visibility.country {
            ui.label(RichText::new("Country").strong());
            toggle_list(ui, "country_filter", &options.countries, &mut selection.countries);
            ui.add_space(6.0);
        } else {
            ui.small(format!("Country scope is fixed for the {} role.", self.role));
        }

        ui.label(RichText::new("Period").strong());
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("quarter_filter")
                .selected_text(selection.quarter.map_or("Any quarter".to_owned(), |q| format!("Q{q}")))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selection.quarter, None, "Any quarter");
                    for quarter in 1..=4u8 {
                        let enabled = options.quarters.contains(&quarter);
                        ui.add_enabled_ui(enabled, |ui| {
                            ui.selectable_value(&mut selection.quarter, Some(quarter), format!("Q{quarter}"));
                        });
                    }
                });

            egui::ComboBox::from_id_salt("year_filter")
                .selected_text(selection.year.map_or("Any year".to_owned(), |y| y.to_string()))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selection.year, None, "Any year");
                    for &year in &options.years {
                        ui.selectable_value(&mut selection.year, Some(year), year.to_string());
                    }
                });
        });

        ui.add_space(10.0);
        let pending = self.filters.has_pending_changes();
        if pending {
            ui.label(
                RichText::new("Pending changes")
                    .color(egui::Color32::from_rgb(214, 120, 40))
                    .small(),
            );
        }

        let mut applied = None;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(pending && !is_loading, egui::Button::new("Apply"))
                .clicked()
            {
                applied = Some(self.filters.apply());
            }
            if ui.add_enabled(pending, egui::Button::new("Discard")).clicked() {
                self.filters.discard();
            }
            if ui
                .add_enabled(!self.filters.selection.is_empty(), egui::Button::new("Clear"))
                .clicked()
            {
                self.filters.clear();
            }
        });

        if self.loaded.dataset.questions.is_empty() {
            ui.add_space(8.0);
            ui.label("No questions match the applied filters.");
        }

        applied
    }
}
