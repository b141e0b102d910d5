use crate::backend::{BackendStatus, ChatClient};
use crate::event::AppEvent;
use crate::session::{SessionHandle, Speaker, Transcript};
use crate::theme::Theme;
use crate::turn::{Settlement, TurnController};
use crate::ui::composer::{Composer, MAX_COMPOSER_HEIGHT};
use crate::ui::format::Segment;
use crate::ui::view::{project, transcript_html, BubbleView, RowView};
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

const COMPOSER_ID: &str = "composer_input";

/// Plain Enter sends; any modifier (Shift in particular) leaves the key to
/// the text edit so it can insert a newline.
fn is_send_shortcut(modifiers: egui::Modifiers) -> bool {
    modifiers.is_none()
}

/// Removes a pressed send-shortcut Enter from this frame's input.
///
/// `InputState::consume_key` matches logically and ignores Shift, so it
/// would swallow Shift+Enter too.
fn take_send_shortcut(input: &mut egui::InputState) -> bool {
    let mut found = false;
    input.events.retain(|event| match event {
        egui::Event::Key {
            key: egui::Key::Enter,
            pressed: true,
            modifiers,
            ..
        } if is_send_shortcut(*modifiers) => {
            found = true;
            false
        }
        _ => true,
    });
    found
}

pub struct HelpdeskApp {
    rx: Receiver<AppEvent>,
    client: ChatClient,
    theme: Theme,
    backend_status: BackendStatus,
    transcript: Transcript,
    session: SessionHandle,
    controller: TurnController,
    composer: Composer,
    confirm_clear: bool,
    diagnostics_log: Vec<String>,
}

impl HelpdeskApp {
    pub fn new(rx: Receiver<AppEvent>, client: ChatClient, ctx: &egui::Context) -> Self {
        let theme = Theme::default();
        theme.apply_visuals(ctx);

        Self {
            rx,
            client,
            theme,
            backend_status: BackendStatus::Checking,
            transcript: Transcript::new(),
            session: SessionHandle::default(),
            controller: TurnController::new(),
            composer: Composer::default(),
            confirm_clear: false,
            diagnostics_log: Vec::new(),
        }
    }

    fn timestamp() -> String {
        chrono::Local::now().format("%H:%M:%S").to_string()
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn status_label(&self) -> (&'static str, Color32) {
        match self.backend_status {
            BackendStatus::Online => ("Assistant Online", self.theme.success),
            BackendStatus::Checking => ("Checking...", self.theme.warning),
            BackendStatus::Offline => ("Assistant Unreachable", self.theme.danger),
        }
    }

    fn submit_turn(&mut self, ctx: &egui::Context) {
        let Some(request) =
            self.controller
                .begin(&mut self.transcript, &mut self.composer, &self.session)
        else {
            return;
        };

        tracing::debug!(session_id = ?request.session_id, "dispatching turn");
        self.client.send(request);
        ctx.request_repaint();
    }

    fn clear_transcript(&mut self) {
        self.session = self.transcript.clear();
        self.composer.clear();
        self.log_diagnostic("transcript cleared, new conversation");
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    let settled = matches!(event, AppEvent::TurnSettled(_));
                    self.apply_event(event);
                    if settled {
                        let composer_id = egui::Id::new(COMPOSER_ID);
                        ctx.memory_mut(|memory| memory.request_focus(composer_id));
                    }
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TurnSettled(result) => {
                let session = std::mem::take(&mut self.session);
                let (session, settlement) =
                    self.controller
                        .settle(&mut self.transcript, session, result);
                self.session = session;
                match settlement {
                    Settlement::Answered { replies } => {
                        self.log_diagnostic(format!("turn answered with {replies} message(s)"));
                    }
                    Settlement::Rejected => self.log_diagnostic("turn rejected by backend"),
                    Settlement::Failed(detail) => {
                        self.log_diagnostic(format!("turn failed: {detail}"));
                    }
                }
            }
            AppEvent::BackendStatusChanged(status) => {
                self.backend_status = status;
                tracing::info!(status = status.name(), "backend status changed");
                self.log_diagnostic(format!("backend status changed: {}", status.name()));
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let (status_label, status_color) = self.status_label();
        let conversation = match self.session.conversation_id() {
            Some(id) => format!("Conversation {}", id.chars().take(8).collect::<String>()),
            None => "New conversation".to_string(),
        };
        let locked = self.controller.is_locked();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Customer Support");
                ui.separator();
                ui.label(RichText::new(status_label).color(status_color));
                ui.separator();
                ui.label(RichText::new(conversation).color(self.theme.text_muted));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!locked, egui::Button::new("Clear chat"))
                        .clicked()
                    {
                        self.confirm_clear = true;
                    }
                    if ui.button("Copy as HTML").clicked() {
                        ctx.copy_text(transcript_html(&self.transcript));
                        self.log_diagnostic("transcript copied as HTML");
                    }
                });
            });
        });
    }

    fn render_clear_dialog(&mut self, ctx: &egui::Context) {
        if !self.confirm_clear {
            return;
        }

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Clear chat")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Are you sure you want to clear the chat history?");
                ui.horizontal(|ui| {
                    confirmed = ui.button("Clear").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });

        if confirmed && !self.controller.is_locked() {
            self.clear_transcript();
        }
        if confirmed || cancelled {
            self.confirm_clear = false;
        }
    }

    fn render_bubble(ui: &mut egui::Ui, theme: &Theme, bubble: &BubbleView) {
        let (fill, layout) = match bubble.speaker {
            Speaker::User => (
                theme.user_bubble,
                egui::Layout::right_to_left(egui::Align::TOP),
            ),
            Speaker::Agent => (
                theme.agent_bubble,
                egui::Layout::left_to_right(egui::Align::TOP),
            ),
        };
        let max_width = ui.available_width() * 0.75;

        ui.with_layout(layout, |ui| {
            let response = theme
                .bubble_frame(fill)
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    ui.vertical(|ui| {
                        ui.label(RichText::new(bubble.author).small().color(theme.text_muted));
                        ui.horizontal_wrapped(|ui| {
                            ui.spacing_mut().item_spacing.x = 0.0;
                            for segment in bubble.body.segments() {
                                match segment {
                                    Segment::Text(text) => {
                                        ui.label(text.as_str());
                                    }
                                    Segment::Bold(text) => {
                                        ui.label(
                                            RichText::new(text.as_str())
                                                .strong()
                                                .color(theme.text_strong),
                                        );
                                    }
                                    Segment::LineBreak => ui.end_row(),
                                }
                            }
                        });
                        ui.label(RichText::new(&bubble.time).small().color(theme.text_muted));
                    });
                })
                .response
                .interact(egui::Sense::click());

            response.context_menu(|ui| {
                if ui.button("Copy").clicked() {
                    ui.ctx().copy_text(bubble.body.plain_text());
                    ui.close_menu();
                }
                if ui.button("Copy as HTML").clicked() {
                    ui.ctx().copy_text(bubble.body.to_html());
                    ui.close_menu();
                }
            });
        });
    }

    fn render_typing_indicator(ui: &mut egui::Ui, theme: &Theme) {
        ui.with_layout(egui::Layout::left_to_right(egui::Align::TOP), |ui| {
            theme.bubble_frame(theme.agent_bubble).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label(RichText::new("Assistant is typing").color(theme.text_muted));
                });
            });
        });
    }

    fn render_composer(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let input_enabled = !self.controller.is_locked();
        let hint = if input_enabled {
            "Type your message... (Shift+Enter for a new line)"
        } else {
            "Waiting for response..."
        };

        let composer_id = egui::Id::new(COMPOSER_ID);
        let mut send_now = input_enabled
            && ui.memory(|memory| memory.has_focus(composer_id))
            && ui.input_mut(take_send_shortcut);

        let row_height = ui.text_style_height(&egui::TextStyle::Body);
        let rows = self.composer.desired_rows(row_height);

        self.theme.composer_frame().show(ui, |ui| {
            ui.horizontal(|ui| {
                let send_width = 72.0;
                ScrollArea::vertical()
                    .id_salt("composer_scroll")
                    .max_height(MAX_COMPOSER_HEIGHT)
                    .max_width(ui.available_width() - send_width)
                    .show(ui, |ui| {
                        ui.add_enabled(
                            input_enabled,
                            egui::TextEdit::multiline(&mut self.composer.text)
                                .id(composer_id)
                                .desired_rows(rows)
                                .desired_width(f32::INFINITY)
                                .hint_text(hint),
                        );
                    });

                let clicked = ui
                    .add_enabled(
                        input_enabled && self.composer.has_sendable_text(),
                        egui::Button::new("Send"),
                    )
                    .clicked();
                send_now |= clicked;
            });
        });

        if send_now && input_enabled {
            self.submit_turn(ctx);
        }
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer_panel").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_8);
            self.render_composer(ctx, ui);

            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(RichText::new(entry).monospace());
                            }
                        });
                });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let scroll_to_bottom = self.transcript.take_scroll_request();
            let rows = project(&self.transcript);
            let theme = &self.theme;

            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for row in &rows {
                        match row {
                            RowView::Bubble(bubble) => Self::render_bubble(ui, theme, bubble),
                            RowView::Typing => Self::render_typing_indicator(ui, theme),
                        }
                    }

                    if scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
        });
    }
}

impl eframe::App for HelpdeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.render_top_bar(ctx);
        self.render_center_panel(ctx);
        self.render_clear_dialog(ctx);

        // Background results arrive over a channel; keep polling while idle.
        let poll = if self.controller.is_locked() {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(1)
        };
        ctx.request_repaint_after(poll);
    }
}
