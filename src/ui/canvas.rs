// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live preview canvas for the keyframe editor.
//!
//! The filtered bitmap is drawn as a subdivided textured mesh so tilt and
//! perspective look right; the vignette is baked into the bitmap, while
//! rotation, tilt and shake only move the mesh.

use egui::epaint::{Mesh, Vertex};

use crate::render::editor::KeyframeEditor;
use crate::util::geometry::fit_within;

/// Grid cells per side; enough to hide the affine seams of a tilted quad.
const MESH_SUBDIVISIONS: u32 = 16;

/// Draw the editor's filtered bitmap with its presentation transform.
pub fn show(
    ui: &mut egui::Ui,
    editor: &KeyframeEditor,
    texture: &egui::TextureHandle,
    shake_offset: [f32; 2],
) {
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);
    let available = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        let (rect, _response) = ui.allocate_exact_size(available, egui::Sense::hover());

        let (width, height) = editor.source_dimensions();
        let (width, height) = (width as f32, height as f32);
        let transform = editor.preview_transform();
        let extent = transform.projected_extent(width, height);

        // leave a margin so shake never pushes the surface off the canvas
        let margin = 16.0;
        let (display_w, _) = fit_within(
            extent,
            ((rect.width() - margin * 2.0).max(1.0), (rect.height() - margin * 2.0).max(1.0)),
        );
        if display_w <= 0.0 {
            return;
        }
        let scale = display_w / extent.0;
        let center = rect.center() + egui::vec2(shake_offset[0], shake_offset[1]);

        let mut mesh = Mesh::with_texture(texture.id());
        let steps = MESH_SUBDIVISIONS;
        for row in 0..=steps {
            for col in 0..=steps {
                let u = col as f32 / steps as f32;
                let v = row as f32 / steps as f32;
                let [x, y] = transform.project_point((u - 0.5) * width, (v - 0.5) * height);
                mesh.vertices.push(Vertex {
                    pos: center + egui::vec2(x * scale, y * scale),
                    uv: egui::pos2(u, v),
                    color: egui::Color32::WHITE,
                });
            }
        }
        let stride = steps + 1;
        for row in 0..steps {
            for col in 0..steps {
                let top_left = row * stride + col;
                let top_right = top_left + 1;
                let bottom_left = top_left + stride;
                let bottom_right = bottom_left + 1;
                mesh.add_triangle(top_left, top_right, bottom_right);
                mesh.add_triangle(top_left, bottom_right, bottom_left);
            }
        }

        ui.painter_at(rect).add(egui::Shape::mesh(mesh));
    });
}

/// Draw a keyframe thumbnail scaled into `max_size`, or a placeholder.
pub fn thumbnail(ui: &mut egui::Ui, texture: Option<&egui::TextureHandle>, max_size: egui::Vec2) {
    match texture {
        Some(texture) => {
            let [w, h] = texture.size();
            let (w, h) = fit_within((w as f32, h as f32), (max_size.x, max_size.y));
            ui.add(egui::Image::new((texture.id(), egui::vec2(w, h))));
        }
        None => {
            let (rect, _) = ui.allocate_exact_size(max_size, egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, 4.0, egui::Color32::from_gray(45));
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No image",
                egui::FontId::proportional(13.0),
                egui::Color32::from_gray(150),
            );
        }
    }
}
