use eframe::egui;
use crate::gui::app::{BarRow, Intent, MeterApp};
use crate::gui::chat_window::show_chat_window;
use crate::gui::helpers::{element_color, ALLY_BAR, ENEMY_BAR};
use crate::gui::session_window::show_session_window;
use crate::models::{Allegiance, StoreKind};
use crate::parsing::MeterView;
use crate::utils::time::{format_compact, now_ms};

impl MeterApp {
    /// Helper function to create a custom collapsible header with full click area
    pub fn custom_collapsing_header(
        &self,
        ui: &mut egui::Ui,
        id: egui::Id,
        text: &str,
        content: impl FnOnce(&mut egui::Ui),
    ) {
        let mut state = egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, false);

        let header_height = 20.0;
        let available_width = ui.available_width();
        let header_rect = ui.allocate_space(egui::Vec2::new(available_width, header_height)).1;
        let header_response = ui.allocate_rect(header_rect, egui::Sense::click());

        let text_painter = ui.painter();
        let arrow_text = if state.is_open() { "▼" } else { "▶" };
        let arrow_pos = egui::Pos2::new(header_rect.min.x + 8.0, header_rect.center().y);
        text_painter.text(arrow_pos, egui::Align2::LEFT_CENTER, arrow_text, egui::FontId::default(), ui.visuals().text_color());
        let text_pos = egui::Pos2::new(header_rect.min.x + 25.0, header_rect.center().y);
        text_painter.text(text_pos, egui::Align2::LEFT_CENTER, text,
            egui::FontId::proportional(13.0), ui.visuals().text_color());

        if header_response.clicked() {
            state.toggle(ui);
        }
        state.store(ui.ctx());

        if state.is_open() {
            ui.indent(id, |ui| {
                content(ui);
            });
        }
    }

    fn display_bars(&self, ui: &mut egui::Ui, rows: &[BarRow], bar_color: egui::Color32, intents: &mut Vec<Intent>) {
        let max_total = rows.iter().map(|r| r.total).max().unwrap_or(1).max(1);
        let live = self.view == MeterView::Live;

        for row in rows {
            let percentage = if self.rows_total > 0 {
                (row.total as f32 / self.rows_total as f32 * 100.0) as u32
            } else {
                0
            };
            let id = egui::Id::new(("bar", self.store_kind.label(), &row.name));
            let mut state = egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, false);

            let header_height = 24.0;
            let available_width = ui.available_width();
            let header_rect = ui.allocate_space(egui::Vec2::new(available_width, header_height)).1;

            let bar_width = available_width * (row.total as f32 / max_total as f32);
            if bar_width > 0.0 {
                let bar_rect = egui::Rect::from_min_size(header_rect.min, egui::Vec2::new(bar_width, header_height));
                ui.painter().rect_filled(bar_rect, 2.0, bar_color);
            }

            let header_response = ui.allocate_rect(header_rect, egui::Sense::click());
            let text_painter = ui.painter();
            let arrow_text = if state.is_open() { "▼" } else { "▶" };
            let arrow_pos = egui::Pos2::new(header_rect.min.x + 8.0, header_rect.center().y);
            text_painter.text(arrow_pos, egui::Align2::LEFT_CENTER, arrow_text, egui::FontId::default(), egui::Color32::WHITE);
            let name_pos = egui::Pos2::new(header_rect.min.x + 25.0, header_rect.center().y);
            text_painter.text(name_pos, egui::Align2::LEFT_CENTER, &row.label,
                egui::FontId::proportional(14.0), egui::Color32::WHITE);
            let value_pos = egui::Pos2::new(header_rect.max.x - 8.0, header_rect.center().y);
            text_painter.text(value_pos, egui::Align2::RIGHT_CENTER,
                format!("{} ({}%)", format_compact(row.total), percentage),
                egui::FontId::proportional(14.0), egui::Color32::WHITE);

            if header_response.clicked() {
                state.toggle(ui);
            }
            state.store(ui.ctx());

            if state.is_open() {
                ui.indent(id, |ui| {
                    for (ability, element, value) in &row.abilities {
                        let share = if row.total > 0 { *value as f32 / row.total as f32 * 100.0 } else { 0.0 };
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(ability).color(element_color(*element)));
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(format!("{} ({:.0}%)", value, share));
                            });
                        });
                    }

                    if live {
                        self.custom_collapsing_header(ui, id.with("manage"), "Manage", |ui| {
                            self.display_actor_controls(ui, &row.name, intents);
                        });
                    }
                });
            }
        }
    }

    fn display_actor_controls(&self, ui: &mut egui::Ui, actor: &str, intents: &mut Vec<Intent>) {
        let current = self.meter.roster().overrides.get(actor).copied();
        ui.horizontal(|ui| {
            ui.label("Side:");
            for (label, allegiance) in [("Auto", None), ("Ally", Some(Allegiance::Ally)), ("Enemy", Some(Allegiance::Enemy))] {
                if ui.add(egui::Button::new(label).selected(current == allegiance)).clicked() && current != allegiance {
                    intents.push(Intent::SetOverride { actor: actor.to_string(), allegiance });
                }
            }
        });

        let masters: Vec<&BarRow> = self.ally_rows.iter().filter(|r| r.name != actor).collect();
        if masters.is_empty() {
            return;
        }
        let bound = self.meter.roster().master_of(actor).unwrap_or("None").to_string();
        ui.horizontal(|ui| {
            ui.label("Summon of:");
            egui::ComboBox::from_id_salt(("bind", actor))
                .selected_text(bound)
                .show_ui(ui, |ui| {
                    for master in masters {
                        if ui.selectable_label(false, master.label.as_str()).clicked() {
                            intents.push(Intent::BindSummon {
                                summon: actor.to_string(),
                                master: master.name.clone(),
                            });
                        }
                    }
                });
        });
    }

    fn display_header(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let header_rect = ui.allocate_space(egui::Vec2::new(ui.available_width(), 35.0)).1;

        // Everything left of the buttons drags the window
        let draggable_rect = egui::Rect::from_min_size(
            header_rect.min,
            egui::Vec2::new(header_rect.width() - 140.0, header_rect.height()),
        );
        let drag_response = ui.allocate_rect(draggable_rect, egui::Sense::click_and_drag());
        if drag_response.drag_started() {
            ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
        }

        let duration = self.meter.fight_duration(now_ms());
        ui.scope_builder(egui::UiBuilder::new().max_rect(header_rect), |ui| {
            ui.horizontal(|ui| {
                let title_pos = egui::Pos2::new(header_rect.min.x + 15.0, header_rect.center().y);
                ui.painter().text(title_pos, egui::Align2::LEFT_CENTER, format!("Wakfu Meter  {}", duration),
                    egui::FontId::proportional(16.0), ui.visuals().text_color());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(egui::Button::new(egui::RichText::new("✕").size(12.0))
                        .min_size(egui::Vec2::new(25.0, 25.0))).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.add(egui::Button::new(egui::RichText::new("−").size(12.0))
                        .min_size(egui::Vec2::new(25.0, 25.0))).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
                    }

                    ui.add_space(10.0);

                    if ui.add(egui::Button::new(egui::RichText::new("A").size(8.0))
                        .min_size(egui::Vec2::new(18.0, 18.0))).clicked() {
                        self.text_scale = (self.text_scale - 0.1).max(0.5);
                        ctx.set_zoom_factor(ctx.zoom_factor() * 0.9);
                    }
                    if ui.add(egui::Button::new(egui::RichText::new("A").size(16.0))
                        .min_size(egui::Vec2::new(20.0, 20.0))).clicked() {
                        self.text_scale = (self.text_scale + 0.1).min(2.0);
                        ctx.set_zoom_factor(ctx.zoom_factor() * 1.1);
                    }
                });
            });
        });
    }

    fn display_controls(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for kind in StoreKind::ALL {
                if ui.add_sized([80.0, 20.0], egui::Button::new(kind.label()).selected(self.store_kind == kind)).clicked() {
                    self.select_store(kind);
                }
            }
            ui.separator();
            if ui.button("Reset").clicked() {
                self.pending_intents.push(Intent::Reset);
            }
            let mut auto_reset = self.meter.settings().auto_reset;
            if ui.checkbox(&mut auto_reset, "Auto").changed() {
                self.pending_intents.push(Intent::SetAutoReset(auto_reset));
            }
            if ui.button("Copy").clicked() {
                ctx.copy_text(self.format_rows_for_copy());
            }
        });

        ui.horizontal(|ui| {
            if ui.add_sized([60.0, 20.0], egui::Button::new("Live").selected(self.view == MeterView::Live)).clicked() {
                self.select_view(MeterView::Live);
            }
            let stamps: Vec<String> = self.meter.history().iter().map(|s| s.timestamp.clone()).collect();
            for (index, stamp) in stamps.into_iter().enumerate() {
                let selected = self.view == MeterView::History(index);
                if ui.add(egui::Button::new(stamp).selected(selected)).clicked() {
                    self.select_view(MeterView::History(index));
                }
            }
        });

        ui.horizontal(|ui| {
            if ui.add(egui::Button::new("Chat").selected(self.chat_window_open)).clicked() {
                self.chat_window_open = !self.chat_window_open;
            }
            if ui.add(egui::Button::new("Session").selected(self.session_window_open)).clicked() {
                self.session_window_open = !self.session_window_open;
            }
            if self.driver.is_stopped() && ui.button("Reconnect").clicked() {
                self.pending_intents.push(Intent::Reconnect);
            }
            if let Some(secs) = self.meter.cooldown_remaining_secs(now_ms()) {
                ui.label(egui::RichText::new(format!("Wait {}s", secs)).color(egui::Color32::YELLOW));
            }
        });

        if let Some(status) = &self.status {
            ui.label(egui::RichText::new(status).small().color(egui::Color32::GRAY));
        }
    }
}

impl eframe::App for MeterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump(std::time::Instant::now());
        self.refresh_rows();
        ctx.request_repaint_after(std::time::Duration::from_millis(self.meter.settings().poll_interval_ms));

        let mut intents = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_min_size(egui::Vec2::new(300.0, 200.0));
            self.display_header(ctx, ui);
            ui.separator();
            self.display_controls(ctx, ui);
            ui.separator();

            let available_height = ui.available_height().max(120.0);
            egui::ScrollArea::vertical()
                .max_height(available_height - 10.0)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    if self.ally_rows.is_empty() && self.enemy_rows.is_empty() {
                        ui.label(egui::RichText::new("Waiting for combat...").color(egui::Color32::GRAY));
                    }
                    if !self.ally_rows.is_empty() {
                        ui.label(egui::RichText::new("Allies").strong());
                        self.display_bars(ui, &self.ally_rows, ALLY_BAR, &mut intents);
                    }
                    if !self.enemy_rows.is_empty() {
                        ui.add_space(6.0);
                        ui.label(egui::RichText::new("Enemies").strong());
                        self.display_bars(ui, &self.enemy_rows, ENEMY_BAR, &mut intents);
                    }
                });
        });

        show_chat_window(ctx, &self.meter, &mut self.chat_state, &mut self.chat_window_open);
        intents.extend(show_session_window(ctx, &self.meter, &mut self.session_state, &mut self.session_window_open));

        self.pending_intents.extend(intents);
        self.apply_intents();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.meter.save_live();
    }

    /// Keep window background opaque and visible.
    fn clear_color(&self, visuals: &egui::Visuals) -> [f32; 4] {
        let color = visuals.panel_fill;
        [
            color.r() as f32 / 255.0,
            color.g() as f32 / 255.0,
            color.b() as f32 / 255.0,
            color.a() as f32 / 255.0,
        ]
    }
}
