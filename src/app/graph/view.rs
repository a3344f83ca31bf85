use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, vec2};

use crate::graph::{ClusterGraph, Dimensions, LABEL_COLOR, Scene, TooltipView};

use super::super::ViewModel;
use super::super::render_utils::{
    draw_background, nav_dot_centers, nav_dot_radius, nav_dot_rect, scene_to_screen,
    screen_to_scene, with_opacity,
};

const TOOLTIP_OFFSET: f32 = 14.0;

fn paint_scene(painter: &egui::Painter, rect: Rect, scene: &Scene) {
    for link in &scene.links {
        painter.line_segment(
            [scene_to_screen(rect, link.from), scene_to_screen(rect, link.to)],
            Stroke::new(link.width, with_opacity(link.color, link.opacity)),
        );
    }

    for cluster in &scene.clusters {
        let center = scene_to_screen(rect, cluster.center);
        painter.circle_filled(center, cluster.radius, with_opacity(cluster.fill, cluster.opacity));
        painter.circle_stroke(
            center,
            cluster.radius,
            Stroke::new(cluster.stroke_width, with_opacity(cluster.stroke, cluster.opacity)),
        );
    }

    for question in &scene.questions {
        let center = scene_to_screen(rect, question.center);
        painter.circle_filled(center, question.radius, with_opacity(question.fill, question.opacity));
        if question.multi_cluster {
            painter.circle_stroke(
                center,
                question.radius + 1.0,
                Stroke::new(1.0, with_opacity(Color32::WHITE, question.opacity)),
            );
        }
    }

    for label in &scene.labels {
        let position = scene_to_screen(rect, label.position);
        let color = with_opacity(LABEL_COLOR, label.opacity);
        let font = FontId::proportional(label.font_size);
        painter.text(position, Align2::CENTER_BOTTOM, &label.text, font.clone(), color);
        if label.bold {
            // Faux bold: the default fonts ship no bold face.
            painter.text(position + vec2(0.6, 0.0), Align2::CENTER_BOTTOM, &label.text, font, color);
        }
    }
}

impl ViewModel {
    fn sync_dimensions(&mut self, ui: &Ui, now: f64) -> Option<Dimensions> {
        let observed = Dimensions::from_size(ui.available_size());
        if let Some(dimensions) = self.observer.observe(observed) {
            match self.graph.as_mut() {
                Some(graph) => graph.resize(dimensions, now),
                None => {
                    self.graph = Some(ClusterGraph::new(
                        self.loaded.dataset.clone(),
                        dimensions,
                        now,
                    ));
                }
            }
        }
        self.observer.current()
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, now: f64) {
        let Some(dimensions) = self.sync_dimensions(ui, now) else {
            return;
        };

        egui::ScrollArea::both()
            .id_salt("graph_canvas")
            .show(ui, |ui| self.draw_canvas(ui, dimensions, now));
    }

    fn draw_canvas(&mut self, ui: &mut Ui, dimensions: Dimensions, now: f64) {
        let (rect, response) = ui.allocate_exact_size(
            vec2(dimensions.width, dimensions.height),
            Sense::click_and_drag(),
        );
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.handle_step_keys(ui, now);
        self.handle_step_wheel(ui, &response, now);

        let Some(graph) = self.graph.as_mut() else {
            return;
        };

        if graph.advance(now) {
            ui.ctx().request_repaint();
        }

        if graph.cluster_count() == 0 {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No clusters to show for the applied filters.",
                FontId::proportional(16.0),
                Color32::from_gray(90),
            );
            return;
        }

        match response.hover_pos() {
            Some(pointer) => {
                let point = screen_to_scene(rect, pointer);
                graph.pointer_moved(point, now);
                if graph.is_interactive(point, now) {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
            }
            None => graph.pointer_left(now),
        }

        let mut click = None;
        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            click = graph.click(screen_to_scene(rect, pointer), now);
        }

        let scene = graph.scene(now);
        paint_scene(&painter, rect, &scene);

        let mut requested_step = None;
        let current = graph.step();
        for (step, center) in nav_dot_centers(rect, graph.total_steps())
            .into_iter()
            .enumerate()
        {
            let dot = ui.interact(nav_dot_rect(center), ui.id().with(("nav_dot", step)), Sense::click());
            let color = if step == current {
                Color32::from_gray(60)
            } else if dot.hovered() {
                Color32::from_gray(140)
            } else {
                Color32::from_gray(195)
            };
            painter.circle_filled(center, nav_dot_radius(), color);
            if dot.clicked() {
                requested_step = Some(step);
            }
        }
        if let Some(step) = requested_step {
            graph.set_step(step, now);
        }

        if let Some(tooltip) = &scene.tooltip {
            self.draw_tooltip(ui.ctx(), rect, tooltip, now);
        }

        if let Some(click) = click {
            self.notify_click(&click, now);
        }
    }

    fn draw_tooltip(&mut self, ctx: &egui::Context, rect: Rect, tooltip: &TooltipView, now: f64) {
        let anchor = scene_to_screen(rect, tooltip.anchor) + vec2(TOOLTIP_OFFSET, TOOLTIP_OFFSET);
        let area = egui::Area::new(egui::Id::new("graph_tooltip"))
            .fixed_pos(anchor)
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(280.0);
                    ui.label(egui::RichText::new(tooltip.content.title.as_str()).strong());
                    for line in &tooltip.content.lines {
                        ui.small(line.as_str());
                    }
                });
            });

        let inside = ctx
            .pointer_hover_pos()
            .is_some_and(|pointer| area.response.rect.contains(pointer));
        if let Some(graph) = self.graph.as_mut() {
            graph.set_pointer_over_tooltip(inside, now);
        }
    }
}
