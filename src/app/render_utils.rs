use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2, vec2};

pub(super) const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(248, 249, 251);
const NAV_DOT_RADIUS: f32 = 5.0;
const NAV_DOT_SPACING: f32 = 18.0;
const NAV_DOT_MARGIN: f32 = 22.0;

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity).round() as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, CANVAS_BACKGROUND);
}

pub(super) fn scene_to_screen(rect: Rect, point: Pos2) -> Pos2 {
    rect.min + point.to_vec2()
}

pub(super) fn screen_to_scene(rect: Rect, point: Pos2) -> Pos2 {
    point - rect.min.to_vec2()
}

/// Centres of the step navigation dots, bottom-centred in `rect`.
pub(super) fn nav_dot_centers(rect: Rect, count: usize) -> Vec<Pos2> {
    let span = NAV_DOT_SPACING * count.saturating_sub(1) as f32;
    let first = Pos2::new(rect.center().x - span * 0.5, rect.bottom() - NAV_DOT_MARGIN);
    (0..count)
        .map(|index| first + vec2(NAV_DOT_SPACING * index as f32, 0.0))
        .collect()
}

pub(super) fn nav_dot_rect(center: Pos2) -> Rect {
    Rect::from_center_size(center, Vec2::splat(NAV_DOT_RADIUS * 2.0 + 6.0))
}

pub(super) fn nav_dot_radius() -> f32 {
    NAV_DOT_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn opacity_scales_alpha_only() {
        let color = with_opacity(Color32::from_rgb(10, 20, 30), 0.5);
        assert_eq!(color.a(), 128);
        assert_eq!(with_opacity(Color32::WHITE, f32::NAN).a(), 0);
    }

    #[test]
    fn scene_and_screen_coordinates_round_trip() {
        let rect = Rect::from_min_size(pos2(100.0, 50.0), vec2(800.0, 600.0));
        let screen = scene_to_screen(rect, pos2(10.0, 20.0));
        assert_eq!(screen, pos2(110.0, 70.0));
        assert_eq!(screen_to_scene(rect, screen), pos2(10.0, 20.0));
        assert_eq!(screen_to_scene(rect, rect.min), pos2(0.0, 0.0));
    }

    #[test]
    fn nav_dots_are_centred() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 300.0));
        let dots = nav_dot_centers(rect, 3);
        assert_eq!(dots.len(), 3);
        assert_eq!(dots[1].x, 200.0);
        assert_eq!(dots[0].y, 278.0);
    }
}
