use eframe::egui::{self, RichText};
use crate::gui::app::Intent;
use crate::parsing::Meter;
use crate::utils::time::{format_elapsed, now_ms};

#[derive(Debug, Default)]
pub struct SessionWindowState {
    pub new_item_name: String,
    pub new_item_target: String,
    pub new_item_price: String,
}

fn display_session(ui: &mut egui::Ui, meter: &Meter, intents: &mut Vec<Intent>) {
    let Some(stats) = meter.session_stats() else {
        ui.label(RichText::new("Session tracking disabled").color(egui::Color32::GRAY));
        return;
    };

    let elapsed = stats
        .elapsed_ms(now_ms())
        .map(format_elapsed)
        .unwrap_or_else(|| "--:--:--".to_string());
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("Session {}", elapsed)).strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Reset").clicked() {
                intents.push(Intent::ResetSession);
            }
        });
    });

    egui::Grid::new("session_totals").num_columns(2).show(ui, |ui| {
        ui.label("Kamas earned");
        ui.label(RichText::new(stats.kamas.earned.to_string()).color(egui::Color32::from_rgb(255, 215, 0)));
        ui.end_row();
        ui.label("Kamas spent");
        ui.label(stats.kamas.spent.to_string());
        ui.end_row();
        ui.label("Net");
        ui.label(stats.kamas.net().to_string());
        ui.end_row();
        ui.label("Quests");
        ui.label(stats.quests.to_string());
        ui.end_row();
        ui.label("Challenges");
        ui.label(stats.challenges.to_string());
        ui.end_row();
    });

    let rows = stats.xp_rows();
    if !rows.is_empty() {
        ui.separator();
        egui::Grid::new("session_xp").num_columns(2).show(ui, |ui| {
            for (category, amount) in rows {
                ui.label(category);
                ui.label(format!("{} XP", amount));
                ui.end_row();
            }
        });
    }
}

fn display_tracker(ui: &mut egui::Ui, meter: &Meter, state: &mut SessionWindowState, intents: &mut Vec<Intent>) {
    ui.label(RichText::new("Tracked items").strong());

    for item in meter.tracker().items() {
        ui.horizontal(|ui| {
            let color = if item.is_complete() { egui::Color32::from_rgb(120, 220, 120) } else { ui.visuals().text_color() };
            ui.label(RichText::new(&item.name).color(color));
            ui.add(egui::ProgressBar::new(item.progress())
                .desired_width(120.0)
                .text(format!("{}/{}", item.current, item.target)));
            if ui.small_button("✖").clicked() {
                intents.push(Intent::UntrackItem(item.name.clone()));
            }
        });
    }

    let (current_value, target_value) = meter.tracker().value_totals();
    if target_value > 0 {
        ui.label(format!("Value: {} / {} kamas", current_value, target_value));
    }

    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(&mut state.new_item_name).hint_text("Item").desired_width(120.0));
        ui.add(egui::TextEdit::singleline(&mut state.new_item_target).hint_text("Goal").desired_width(50.0));
        ui.add(egui::TextEdit::singleline(&mut state.new_item_price).hint_text("Price").desired_width(50.0));
        if ui.button("Track").clicked() {
            let name = state.new_item_name.trim().to_string();
            if let (false, Ok(target)) = (name.is_empty(), state.new_item_target.trim().parse::<u64>()) {
                intents.push(Intent::TrackItem { name: name.clone(), target });
                if let Ok(price) = state.new_item_price.trim().parse::<u64>() {
                    intents.push(Intent::SetPrice { name, price });
                }
                state.new_item_name.clear();
                state.new_item_target.clear();
                state.new_item_price.clear();
            }
        }
    });
}

/// Session tally and item goals. Returns the intents raised this frame.
pub fn show_session_window(
    ctx: &egui::Context,
    meter: &Meter,
    state: &mut SessionWindowState,
    is_open: &mut bool,
) -> Vec<Intent> {
    let mut intents = Vec::new();
    if !*is_open {
        return intents;
    }

    ctx.show_viewport_immediate(
        egui::ViewportId::from_hash_of("session_window"),
        egui::ViewportBuilder::default()
            .with_inner_size([360.0, 420.0])
            .with_min_inner_size([280.0, 200.0])
            .with_resizable(true)
            .with_always_on_top()
            .with_title("Session"),
        |ctx, _class| {
            ctx.set_visuals(egui::Visuals::dark());
            egui::CentralPanel::default().show(ctx, |ui| {
                egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    display_session(ui, meter, &mut intents);
                    ui.separator();
                    display_tracker(ui, meter, state, &mut intents);
                });
            });

            if ctx.input(|i| i.viewport().close_requested()) {
                *is_open = false;
            }
        },
    );

    intents
}
