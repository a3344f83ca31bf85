use std::fmt::Write as _;

use eframe::egui::Color32;

use super::scene::{LABEL_COLOR, Scene};

fn hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Serialises a scene as a standalone SVG document in scene coordinates.
pub fn render_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = scene.width,
        h = scene.height,
    );

    out.push_str("  <g class=\"links\">\n");
    for link in &scene.links {
        let _ = writeln!(
            out,
            r#"    <line data-cluster="{}" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" stroke-opacity="{:.3}"/>"#,
            link.kind.wire_cluster_id(),
            link.from.x,
            link.from.y,
            link.to.x,
            link.to.y,
            hex(link.color),
            link.width,
            link.opacity,
        );
    }
    out.push_str("  </g>\n");

    out.push_str("  <g class=\"clusters\">\n");
    for cluster in &scene.clusters {
        let _ = writeln!(
            out,
            r#"    <circle id="{}" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="{:.2}" opacity="{:.3}"/>"#,
            escape(&cluster.node_id),
            cluster.center.x,
            cluster.center.y,
            cluster.radius,
            hex(cluster.fill),
            hex(cluster.stroke),
            cluster.stroke_width,
            cluster.opacity,
        );
    }
    out.push_str("  </g>\n");

    out.push_str("  <g class=\"questions\">\n");
    for question in &scene.questions {
        let _ = writeln!(
            out,
            r#"    <circle id="{}" class="{}" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" opacity="{:.3}"/>"#,
            escape(&question.node_id),
            if question.multi_cluster { "question multi" } else { "question" },
            question.center.x,
            question.center.y,
            question.radius,
            hex(question.fill),
            question.opacity,
        );
    }
    out.push_str("  </g>\n");

    out.push_str("  <g class=\"labels\">\n");
    for label in &scene.labels {
        let _ = writeln!(
            out,
            r#"    <text x="{:.2}" y="{:.2}" font-size="{:.1}" font-weight="{}" text-anchor="middle" fill="{}" opacity="{:.3}">{}</text>"#,
            label.position.x,
            label.position.y,
            label.font_size,
            if label.bold { "bold" } else { "normal" },
            hex(LABEL_COLOR),
            label.opacity,
            escape(&label.text),
        );
    }
    out.push_str("  </g>\n");
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::LinkKind;
    use crate::graph::scene::{ClusterView, LabelView, LinkView, QuestionView};
    use eframe::egui::pos2;

    #[test]
    fn svg_uses_scene_viewbox_and_escapes_labels() {
        let scene = Scene {
            width: 800.0,
            height: 560.0,
            clusters: vec![ClusterView {
                node_id: "cluster-0".into(),
                cluster_id: 0,
                center: pos2(400.0, 120.0),
                radius: 33.6,
                fill: Color32::WHITE,
                stroke: Color32::from_rgb(0x1f, 0x77, 0xb4),
                stroke_width: 2.0,
                opacity: 1.0,
            }],
            labels: vec![LabelView {
                cluster_id: 0,
                text: "Storage & <handling>".into(),
                position: pos2(400.0, 70.0),
                font_size: 13.4,
                opacity: 1.0,
                bold: true,
            }],
            questions: vec![QuestionView {
                node_id: "question-Q1".into(),
                center: pos2(380.0, 140.0),
                radius: 5.0,
                fill: Color32::from_rgb(0x1f, 0x77, 0xb4),
                opacity: 1.0,
                multi_cluster: true,
            }],
            links: vec![LinkView {
                from: pos2(400.0, 120.0),
                to: pos2(200.0, 300.0),
                kind: LinkKind::Backbone,
                color: Color32::GRAY,
                width: 1.0,
                opacity: 0.15,
            }],
            ..Scene::default()
        };

        let svg = render_svg(&scene);
        assert!(svg.contains(r#"viewBox="0 0 800 560""#));
        assert!(svg.contains(r##"stroke="#1f77b4""##));
        assert!(svg.contains("Storage &amp; &lt;handling&gt;"));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r#"class="question multi""#));
        assert!(svg.contains(r#"data-cluster="-1""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
