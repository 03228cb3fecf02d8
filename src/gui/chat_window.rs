use eframe::egui::{self, RichText};
use crate::gui::helpers::{category_color, highlight_color};
use crate::models::{ChatCategory, ChatFilter, ChatMessage, Highlight};
use crate::parsing::Meter;

pub struct ChatWindowState {
    pub filter: ChatFilter,
    pub search_text: String,
    pub scroll_to_bottom: bool,
    pub show_timestamps: bool,
}

impl Default for ChatWindowState {
    fn default() -> Self {
        Self {
            filter: ChatFilter::All,
            search_text: String::new(),
            scroll_to_bottom: true,
            show_timestamps: true,
        }
    }
}

fn filter_label(filter: ChatFilter) -> &'static str {
    match filter {
        ChatFilter::All => "All",
        ChatFilter::Only(category) => category.label(),
    }
}

fn display_message(ui: &mut egui::Ui, message: &ChatMessage, show_timestamps: bool) {
    let base_color = category_color(message.category);
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        if show_timestamps {
            ui.label(RichText::new(format!("{} ", message.time)).color(egui::Color32::GRAY));
        }
        ui.label(RichText::new(format!("[{}] ", message.channel)).color(base_color));
        if !message.author.is_empty() {
            ui.label(RichText::new(format!("{} : ", message.author)).color(base_color).strong());
        }
        for span in &message.spans {
            let mut text = RichText::new(&span.text).color(highlight_color(span.highlight, base_color));
            if span.highlight != Highlight::Plain {
                text = text.strong();
            }
            ui.label(text);
        }
    });
}

pub fn show_chat_window(
    ctx: &egui::Context,
    meter: &Meter,
    chat_state: &mut ChatWindowState,
    is_open: &mut bool,
) {
    if !*is_open {
        return;
    }

    ctx.show_viewport_immediate(
        egui::ViewportId::from_hash_of("chat_window"),
        egui::ViewportBuilder::default()
            .with_inner_size([600.0, 400.0])
            .with_min_inner_size([400.0, 300.0])
            .with_resizable(true)
            .with_decorations(false)
            .with_always_on_top()
            .with_title("Chat"),
        |ctx, _class| {
            ctx.set_visuals(egui::Visuals::dark());

            egui::CentralPanel::default().show(ctx, |ui| {
                let header_rect = ui.allocate_space(egui::Vec2::new(ui.available_width(), 35.0)).1;
                let draggable_rect = egui::Rect::from_min_size(
                    header_rect.min,
                    egui::Vec2::new(header_rect.width() - 60.0, header_rect.height()),
                );
                let drag_response = ui.allocate_rect(draggable_rect, egui::Sense::click_and_drag());
                if drag_response.drag_started() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
                }

                ui.scope_builder(egui::UiBuilder::new().max_rect(header_rect), |ui| {
                    ui.horizontal(|ui| {
                        let title_pos = egui::Pos2::new(header_rect.min.x + 15.0, header_rect.center().y);
                        ui.painter().text(title_pos, egui::Align2::LEFT_CENTER, "Chat",
                            egui::FontId::proportional(16.0), ui.visuals().text_color());

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.add(egui::Button::new(RichText::new("X").size(12.0))
                                .min_size(egui::Vec2::new(25.0, 25.0))).clicked() {
                                *is_open = false;
                            }
                            if ui.add(egui::Button::new(RichText::new("−").size(12.0))
                                .min_size(egui::Vec2::new(25.0, 25.0))).clicked() {
                                ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
                            }
                        });
                    });
                });

                ui.separator();

                ui.horizontal(|ui| {
                    ui.label("Search:");
                    ui.add(egui::TextEdit::singleline(&mut chat_state.search_text)
                        .hint_text("Filter by text...")
                        .desired_width(200.0));
                    if !chat_state.search_text.is_empty() && ui.small_button("✖").clicked() {
                        chat_state.search_text.clear();
                    }

                    ui.separator();

                    egui::ComboBox::from_id_salt("chat_filter")
                        .selected_text(filter_label(chat_state.filter))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut chat_state.filter, ChatFilter::All, "All");
                            for category in ChatCategory::ALL {
                                ui.selectable_value(&mut chat_state.filter, ChatFilter::Only(category), category.label());
                            }
                        });
                });

                ui.horizontal(|ui| {
                    ui.checkbox(&mut chat_state.show_timestamps, "Timestamps");
                    ui.checkbox(&mut chat_state.scroll_to_bottom, "Auto-scroll");
                });

                ui.separator();

                let visible: Vec<&ChatMessage> = meter
                    .chat()
                    .filter(|m| chat_state.filter.is_visible(m, &chat_state.search_text))
                    .collect();

                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .stick_to_bottom(chat_state.scroll_to_bottom)
                    .show(ui, |ui| {
                        if visible.is_empty() {
                            ui.centered_and_justified(|ui| {
                                ui.label(RichText::new("No messages").color(egui::Color32::GRAY));
                            });
                        }
                        for message in visible {
                            display_message(ui, message, chat_state.show_timestamps);
                        }
                    });
            });

            if ctx.input(|i| i.viewport().close_requested()) {
                *is_open = false;
            }
        },
    );
}
