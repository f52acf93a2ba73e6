use std::{collections::HashMap, time::Duration};

use client_core::{GalleryBody, GalleryView, PhotoCard, IMAGE_EXTENSIONS};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use shared::domain::PhotoId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{GalleryModel, ThumbnailState};
use crate::ui::upload_control::UploadControl;

const CARD_WIDTH: f32 = 220.0;
const CARD_IMAGE_HEIGHT: f32 = 165.0;

pub struct GalleryApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    model: GalleryModel,
    upload_control: UploadControl,
    textures: HashMap<PhotoId, TextureHandle>,
}

impl GalleryApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            model: GalleryModel {
                status: "Starting...".to_string(),
                ..GalleryModel::default()
            },
            upload_control: UploadControl::default(),
            textures: HashMap::new(),
        };
        app.dispatch(BackendCommand::LoadPhotos);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
            self.model.banner = Some(err);
        }
    }

    fn process_ui_events(&mut self) {
        let mut received = false;
        while let Ok(event) = self.ui_rx.try_recv() {
            self.model.apply(event);
            received = true;
        }
        if received {
            let thumbnails = &self.model.thumbnails;
            self.textures.retain(|id, _| {
                matches!(thumbnails.get(id), Some(ThumbnailState::Ready(_)))
            });
        }
    }

    fn pick_and_upload(&mut self) {
        self.upload_control.select(
            rfd::FileDialog::new()
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file(),
        );
        if let Some(path) = self.upload_control.take_selection() {
            tracing::info!(path = %path.display(), "file selected for upload");
            self.dispatch(BackendCommand::UploadPhoto { path });
        }
    }

    fn show_header(&mut self, ctx: &egui::Context, view: &GalleryView) {
        let mut upload_clicked = false;
        let mut refresh_clicked = false;

        egui::TopBottomPanel::top("gallery_header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(view.title);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    upload_clicked = ui
                        .add_enabled(view.upload_enabled, egui::Button::new(view.upload_label))
                        .clicked();
                    refresh_clicked = ui.button("Refresh").clicked();
                });
            });
            if let Some(error) = &view.error {
                ui.colored_label(ui.visuals().error_fg_color, error.as_str());
            }
            self.show_status_banner(ui);
            ui.add_space(8.0);
        });

        if refresh_clicked {
            self.dispatch(BackendCommand::LoadPhotos);
        }
        if upload_clicked {
            self.pick_and_upload();
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.model.banner.clone() else {
            return;
        };
        let hint = match banner.context() {
            UiErrorContext::BackendStartup => " Check the configured backend URL and restart.",
            UiErrorContext::CommandQueue => "",
        };

        egui::Frame::new()
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{}: {}{hint}",
                            err_label(banner.category()),
                            banner.message()
                        ))
                        .color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.model.banner = None;
                        }
                    });
                });
            });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("gallery_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.model.status).small().weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("{} photos", self.model.gallery.photos.len()))
                            .small()
                            .weak(),
                    );
                });
            });
        });
    }

    fn show_gallery(&mut self, ctx: &egui::Context, view: &GalleryView) {
        let mut wanted = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| match &view.body {
            GalleryBody::Grid(cards) => {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.horizontal_wrapped(|ui| {
                            ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
                            for card in cards {
                                render_card(
                                    ui,
                                    card,
                                    &self.model.thumbnails,
                                    &mut self.textures,
                                    &mut wanted,
                                );
                            }
                        });
                    });
            }
            body => {
                ui.add_space(24.0);
                ui.vertical_centered(|ui| {
                    if matches!(body, GalleryBody::Loading) {
                        ui.spinner();
                    }
                    if let Some(text) = body.status_text() {
                        ui.label(text);
                    }
                });
            }
        });

        for card in wanted {
            if !self.model.request_thumbnail(&card.id) {
                continue;
            }
            let photo_id = card.id.clone();
            let cmd = BackendCommand::FetchThumbnail {
                photo_id: card.id,
                image: card.image,
            };
            if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
                self.model.thumbnail_dispatch_failed(&photo_id, err);
            }
        }
    }
}

/// Draws one card. Thumbnails are only requested for cards on screen.
fn render_card(
    ui: &mut egui::Ui,
    card: &PhotoCard,
    thumbnails: &HashMap<PhotoId, ThumbnailState>,
    textures: &mut HashMap<PhotoId, TextureHandle>,
    wanted: &mut Vec<PhotoCard>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(CARD_WIDTH);
        ui.vertical(|ui| {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(CARD_WIDTH, CARD_IMAGE_HEIGHT),
                egui::Sense::hover(),
            );
            if ui.is_rect_visible(rect) {
                match thumbnails.get(&card.id) {
                    None => {
                        wanted.push(card.clone());
                        ui.put(rect, egui::Spinner::new());
                    }
                    Some(ThumbnailState::Loading) => {
                        ui.put(rect, egui::Spinner::new());
                    }
                    Some(ThumbnailState::Ready(image)) => {
                        let texture = textures.entry(card.id.clone()).or_insert_with(|| {
                            ui.ctx().load_texture(
                                format!("gallery_photo_{}", card.id),
                                egui::ColorImage::from_rgba_unmultiplied(
                                    [image.width, image.height],
                                    &image.rgba,
                                ),
                                egui::TextureOptions::LINEAR,
                            )
                        });
                        ui.put(rect, egui::Image::new(&*texture).max_size(rect.size()));
                    }
                    Some(ThumbnailState::Failed(reason)) => {
                        ui.put(
                            rect,
                            egui::Label::new(egui::RichText::new("Image unavailable").weak()),
                        )
                        .on_hover_text(reason.as_str());
                    }
                }
            }
            response.on_hover_text(card.alt.as_str());

            if let Some(meta) = &card.meta {
                if let Some(title) = &meta.title {
                    ui.label(egui::RichText::new(title).strong());
                }
                if let Some(uploaded_at) = &meta.uploaded_at {
                    ui.label(egui::RichText::new(uploaded_at).small().weak());
                }
            }
        });
    });
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let view = GalleryView::from_state(&self.model.gallery);
        self.show_header(ctx, &view);
        self.show_status_bar(ctx);
        self.show_gallery(ctx, &view);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
