use eframe::egui;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::camera::Camera;
use crate::catalog::{item_for_drop, Catalog};
use crate::config::AppConfig;
use crate::drag::MoveController;
use crate::geo::{GeoPos, GeoRect, ProjPoint};
use crate::item::{MapItem, SymbolItem};
use crate::layer::{ItemId, LayerId};
use crate::map::MapModel;
use crate::projection::{Projection, WebMercator, EARTH_RADIUS};
use crate::raster::ItemImage;
use crate::render::{Color4, CommandList, DrawCommand};
use crate::session::SessionFile;

const GRATICULE_STEPS: [f64; 10] = [10.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.1, 0.05, 0.02, 0.01];

// ── App ─────────────────────────────────────────────────────────────────────

pub struct MapApp {
    config: AppConfig,
    map: MapModel,
    drop_layer: LayerId,
    camera: Camera,
    catalog: Catalog,
    mover: MoveController,
    textures: HashMap<u64, egui::TextureHandle>,

    needs_initial_view: bool,
    panning: bool,
    drag_pans: bool,

    new_layer_name: String,
    status: String,
}

impl MapApp {
    pub fn new(config: AppConfig) -> Self {
        let mut map = MapModel::new(Rc::new(WebMercator));
        let catalog = Catalog::builtin();

        let symbols = map.add_layer("Symbols");
        let center = GeoPos::new(config.initial_view.lat, config.initial_view.lon);
        let demo = SymbolItem::from_geo_rect(
            GeoRect::around(GeoPos::new(center.lat + 0.1, center.lon - 0.1), 0.03),
            Color4::RED,
            config.palette.clone(),
        );
        if let Some(layer) = map.layer_mut(symbols) {
            layer.add(Box::new(demo));
        }

        let drop_layer = map.add_layer("Icons");
        let mut status = String::new();
        match SessionFile::load(&config.session_file) {
            Ok(session) => {
                if let Some(layer) = map.layer_mut(drop_layer) {
                    let n = session.restore(layer, &catalog, &config.palette);
                    if n > 0 {
                        status = format!("Restored {} items", n);
                    }
                }
            }
            Err(e) => log::warn!("could not restore {}: {}", config.session_file.display(), e),
        }

        let camera = Camera::new(config.min_scale, config.max_scale);
        Self {
            config,
            map,
            drop_layer,
            camera,
            catalog,
            mover: MoveController::new(),
            textures: HashMap::new(),
            needs_initial_view: true,
            panning: false,
            drag_pans: false,
            new_layer_name: String::new(),
            status,
        }
    }

    fn target_area(&mut self) {
        let area = self.config.initial_view.target_area();
        let rect = self.map.projection().geo_rect_to_proj(area);
        self.camera.scale_to(rect);
    }

    fn auto_save(&mut self) {
        let Some(layer) = self.map.layer(self.drop_layer) else {
            return;
        };
        if let Err(e) = SessionFile::from_layer(layer).save(&self.config.session_file) {
            log::error!("failed to save session: {}", e);
            self.status = format!("Save failed: {}", e);
        }
    }

    fn load_session(&mut self, path: &Path) {
        match SessionFile::load(path) {
            Ok(session) => {
                let layer = self.ensure_drop_layer();
                if let Some(layer) = self.map.layer_mut(layer) {
                    layer.clear();
                    let n = session.restore(layer, &self.catalog, &self.config.palette);
                    self.status = format!("Loaded {} items from {}", n, path.display());
                }
            }
            Err(e) => {
                log::error!("failed to load {}: {}", path.display(), e);
                self.status = format!("Load failed: {}", e);
            }
        }
    }

    fn ensure_drop_layer(&mut self) -> LayerId {
        if self.map.layer(self.drop_layer).is_none() {
            self.drop_layer = self.map.add_layer("Icons");
        }
        self.drop_layer
    }

    fn handle_drop(&mut self, index: usize, screen_pos: egui::Pos2) {
        let Some(entry) = self.catalog.get(index) else {
            return;
        };
        let geo = self
            .map
            .projection()
            .proj_to_geo(self.camera.from_screen(screen_pos));
        let Some(item) = item_for_drop(entry, geo, self.map.projection(), &self.config) else {
            log::warn!("'{}' cannot be dropped on the map", entry.name);
            return;
        };
        self.status = format!("{} (lat, lon): {}", entry.name, geo);
        let layer = self.ensure_drop_layer();
        if let Some(layer) = self.map.layer_mut(layer) {
            layer.add(item);
        }
        self.auto_save();
    }

    fn handle_click(&mut self, screen_pos: egui::Pos2, double: bool) {
        let proj = self.camera.from_screen(screen_pos);
        let Some((layer_id, item_id)) = self.map.item_at(&self.camera, screen_pos) else {
            self.map.select(None);
            return;
        };
        let Some(layer) = self.map.layer_mut(layer_id) else {
            return;
        };
        let selectable = layer
            .with_item_mut(item_id, |item| {
                if item.base().flags.clickable {
                    if double {
                        item.on_double_click(proj);
                    } else {
                        item.on_click(proj);
                    }
                }
                item.base().flags.selectable
            })
            .unwrap_or(false);
        if selectable {
            self.map.select(Some((layer_id, item_id)));
        }
    }

    fn delete_selected(&mut self) {
        let Some((layer_id, item_id)) = self.map.selected() else {
            return;
        };
        if let Some(layer) = self.map.layer_mut(layer_id) {
            layer.remove(item_id);
        }
        self.auto_save();
    }

    fn load_image_into(&mut self, target: (LayerId, ItemId)) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "gif", "webp"])
            .pick_file()
        else {
            return;
        };
        let result = self
            .map
            .layer_mut(target.0)
            .and_then(|layer| layer.with_item_mut(target.1, |item| item.load_image_file(&path)));
        self.status = match result {
            Some(Ok(())) => format!("Loaded image {}", path.display()),
            Some(Err(e)) => format!("{}: {}", path.display(), e),
            None => "Item no longer exists".to_string(),
        };
        if target.0 == self.drop_layer {
            self.auto_save();
        }
    }

    // ── Drawing ─────────────────────────────────────────────────────────────

    fn draw_graticule(&self, painter: &egui::Painter) {
        let projection = self.map.projection();
        let viewport = self.camera.viewport();
        let top_left = projection.proj_to_geo(self.camera.from_screen(viewport.left_top()));
        let bottom_right = projection.proj_to_geo(self.camera.from_screen(viewport.right_bottom()));

        let degree_px = self.camera.scale() * EARTH_RADIUS * std::f64::consts::PI / 180.0;
        let step = GRATICULE_STEPS
            .iter()
            .rev()
            .copied()
            .find(|s| s * degree_px >= 80.0)
            .unwrap_or(GRATICULE_STEPS[0]);
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(190));

        let mut lon = (top_left.lon / step).floor() * step;
        while lon <= bottom_right.lon && lon <= 180.0 {
            let x = self
                .camera
                .to_screen(projection.geo_to_proj(GeoPos::new(0.0, lon)))
                .x;
            painter.vline(x, viewport.y_range(), stroke);
            lon += step;
        }

        let mut lat = (bottom_right.lat / step).floor() * step;
        while lat <= top_left.lat && lat <= 90.0 {
            let y = self
                .camera
                .to_screen(projection.geo_to_proj(GeoPos::new(lat, 0.0)))
                .y;
            painter.hline(viewport.x_range(), y, stroke);
            lat += step;
        }
    }

    fn draw_items(&mut self, ctx: &egui::Context, painter: &egui::Painter) {
        for layer in self.map.layers().iter().filter(|l| l.visible) {
            for (_, item) in layer.items() {
                let mut commands = CommandList::new();
                item.paint(&mut commands);
                let transform = item.transform();
                let to_screen = |p: ProjPoint| self.camera.item_to_screen(p, &transform);

                for command in commands.commands {
                    match command {
                        DrawCommand::Image {
                            rect,
                            image,
                            opacity,
                        } => {
                            let texture = texture_for(&mut self.textures, ctx, &image);
                            let mut mesh = egui::Mesh::with_texture(texture);
                            let tint = egui::Color32::WHITE.gamma_multiply(opacity);
                            let uvs = [
                                egui::pos2(0.0, 0.0),
                                egui::pos2(1.0, 0.0),
                                egui::pos2(1.0, 1.0),
                                egui::pos2(0.0, 1.0),
                            ];
                            for (corner, uv) in rect.corners().into_iter().zip(uvs) {
                                mesh.vertices.push(egui::epaint::Vertex {
                                    pos: to_screen(corner),
                                    uv,
                                    color: tint,
                                });
                            }
                            mesh.add_triangle(0, 1, 2);
                            mesh.add_triangle(0, 2, 3);
                            painter.add(egui::Shape::mesh(mesh));
                        }
                        DrawCommand::FilledRect { rect, fill, stroke } => {
                            let points = rect.corners().into_iter().map(to_screen).collect();
                            painter.add(egui::Shape::convex_polygon(
                                points,
                                fill.to_egui(),
                                egui::Stroke::new(stroke.width, stroke.color.to_egui()),
                            ));
                        }
                        DrawCommand::Line { from, to, stroke } => {
                            painter.line_segment(
                                [to_screen(from), to_screen(to)],
                                egui::Stroke::new(stroke.width, stroke.color.to_egui()),
                            );
                        }
                    }
                }
            }
        }
    }
}

fn texture_for(
    textures: &mut HashMap<u64, egui::TextureHandle>,
    ctx: &egui::Context,
    image: &ItemImage,
) -> egui::TextureId {
    textures
        .entry(image.key())
        .or_insert_with(|| {
            let rgba = image.pixels();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            ctx.load_texture(
                format!("item-{}", image.key()),
                color_image,
                egui::TextureOptions::LINEAR,
            )
        })
        .id()
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keyboard shortcuts
        let (delete, save, escape) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Delete),
                i.modifiers.ctrl && i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if delete && !ctx.wants_keyboard_input() {
            self.delete_selected();
        }
        if save {
            self.auto_save();
            self.status = format!("Saved {}", self.config.session_file.display());
        }
        if escape {
            self.map.select(None);
        }

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Save session").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Session", &["json"])
                        .save_file()
                    {
                        if let Some(layer) = self.map.layer(self.drop_layer) {
                            if let Err(e) = SessionFile::from_layer(layer).save(&path) {
                                self.status = format!("Save failed: {}", e);
                            }
                        }
                    }
                }
                if ui.button("Load session").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Session", &["json"])
                        .pick_file()
                    {
                        self.load_session(&path);
                    }
                }
                ui.separator();
                let selected = self.map.selected();
                if ui
                    .add_enabled(selected.is_some(), egui::Button::new("Load image…"))
                    .clicked()
                {
                    if let Some(target) = selected {
                        self.load_image_into(target);
                    }
                }
                if ui
                    .add_enabled(selected.is_some(), egui::Button::new("Delete"))
                    .clicked()
                {
                    self.delete_selected();
                }
                ui.separator();
                if ui.button("Reset view").clicked() {
                    self.target_area();
                }
                ui.label(format!("Scale: {:.5} px/m", self.camera.scale()));
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(pos) = ctx.pointer_hover_pos() {
                    if self.camera.viewport().contains(pos) {
                        let geo = self
                            .map
                            .projection()
                            .proj_to_geo(self.camera.from_screen(pos));
                        ui.monospace(geo.to_string());
                        ui.separator();
                    }
                }
                ui.label(&self.status);
            });
        });

        // Sample tree and layer list
        egui::SidePanel::left("samples")
            .min_width(200.0)
            .max_width(250.0)
            .show(ctx, |ui| {
                ui.heading("Sample items");
                ui.label("Drag an item onto the map");
                for (index, entry) in self.catalog.entries().iter().enumerate() {
                    let id = egui::Id::new(("catalog", index));
                    ui.dnd_drag_source(id, index, |ui| {
                        ui.horizontal(|ui| {
                            if let Some(icon) = &entry.icon {
                                let texture = texture_for(&mut self.textures, ctx, icon);
                                ui.add(egui::Image::new(egui::load::SizedTexture::new(
                                    texture,
                                    egui::vec2(16.0, 16.0),
                                )));
                            }
                            ui.label(&entry.name);
                        });
                    });
                }

                ui.separator();
                ui.heading("Layers");
                let mut toggled = Vec::new();
                let mut removed = None;
                for layer in self.map.layers() {
                    ui.horizontal(|ui| {
                        let mut visible = layer.visible;
                        let label = format!("{} ({})", layer.name(), layer.len());
                        if ui.checkbox(&mut visible, label).changed() {
                            toggled.push((layer.id(), visible));
                        }
                        if ui.small_button("Remove").clicked() {
                            removed = Some(layer.id());
                        }
                    });
                }
                for (id, visible) in toggled {
                    self.map.set_visible(id, visible);
                }
                if let Some(id) = removed {
                    self.map.remove_layer(id);
                }
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.new_layer_name);
                    let name = self.new_layer_name.trim().to_string();
                    if ui
                        .add_enabled(!name.is_empty(), egui::Button::new("Add"))
                        .clicked()
                    {
                        self.map.add_layer(name);
                        self.new_layer_name.clear();
                    }
                });
            });

        // Map canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;
            self.camera.set_viewport(canvas_rect);
            if self.needs_initial_view {
                self.target_area();
                self.needs_initial_view = false;
            }

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_rgb(232, 236, 240));
            self.draw_graticule(&painter);

            // Hover highlight and tooltip
            let hovered = response
                .hover_pos()
                .and_then(|pos| self.map.item_at(&self.camera, pos));
            self.map.set_highlighted(hovered);
            if let (Some((layer, item)), Some(pos)) = (hovered, response.hover_pos()) {
                let proj = self.camera.from_screen(pos);
                let tip = self
                    .map
                    .layer(layer)
                    .and_then(|l| l.get(item))
                    .and_then(|it| it.tooltip(proj));
                if let Some(tip) = tip {
                    if !self.mover.is_dragging() {
                        response.clone().on_hover_text_at_pointer(tip);
                    }
                }
            }

            // Drops from the sample tree
            if let Some(index) = response.dnd_release_payload::<usize>() {
                if let Some(pos) = response.hover_pos() {
                    self.handle_drop(*index, pos);
                }
            }

            // Handle pan (middle mouse button)
            let middle_down = ctx.input(|i| i.pointer.middle_down());
            if middle_down {
                let delta = ctx.input(|i| i.pointer.delta());
                self.camera.pan(delta);
                self.panning = true;
            } else {
                self.panning = false;
            }

            // Handle zoom (scroll wheel)
            let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 && response.hovered() {
                if let Some(cursor) = response.hover_pos() {
                    let zoom_factor = 1.0 + scroll_delta as f64 * 0.002;
                    self.camera.zoom_at(cursor, zoom_factor);
                }
            }

            // Move items with the primary button, or pan when grabbing the map
            if !self.panning {
                if response.drag_started_by(egui::PointerButton::Primary) {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let proj = self.camera.from_screen(pos);
                        let started = match self.map.item_at(&self.camera, pos) {
                            Some((layer, item)) => self.mover.start(&mut self.map, layer, item, proj),
                            None => false,
                        };
                        self.drag_pans = !started;
                    }
                }

                if response.dragged_by(egui::PointerButton::Primary) {
                    if self.mover.is_dragging() {
                        if let Some(pos) = response.interact_pointer_pos() {
                            let proj = self.camera.from_screen(pos);
                            self.mover.update(&mut self.map, proj);
                        }
                    } else if self.drag_pans {
                        self.camera.pan(response.drag_delta());
                    }
                }

                if response.drag_stopped_by(egui::PointerButton::Primary) {
                    let pos = response
                        .interact_pointer_pos()
                        .or(ctx.input(|i| i.pointer.latest_pos()));
                    if let Some(pos) = pos {
                        let proj = self.camera.from_screen(pos);
                        if self.mover.stop(&mut self.map, proj).is_some() {
                            self.auto_save();
                        }
                    }
                    self.drag_pans = false;
                }
            }

            if response.double_clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.handle_click(pos, true);
                }
            } else if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.handle_click(pos, false);
                }
            }

            self.draw_items(ctx, &painter);
        });

        if self.map.take_changed() > 0 {
            ctx.request_repaint();
        }
    }
}
