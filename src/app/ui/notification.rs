use eframe::egui::{self, Align2, Color32, Context, RichText, Sense, vec2};

use crate::data::Dataset;
use crate::graph::{QuestionClick, cluster_color};

/// How long a click notification stays up unless closed.
pub(in crate::app) const NOTIFICATION_SECS: f64 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Notification {
    pub(in crate::app) question_id: String,
    pub(in crate::app) clusters: Vec<(String, Color32)>,
    pub(in crate::app) shown_at: f64,
}

impl Notification {
    pub(in crate::app) fn from_click(click: &QuestionClick, dataset: &Dataset, now: f64) -> Self {
        let clusters = click
            .cluster_ids
            .iter()
            .map(|&cluster_id| {
                let label = dataset
                    .cluster(cluster_id)
                    .map_or_else(|| format!("Cluster {cluster_id}"), |cluster| cluster.display_title());
                (label, cluster_color(cluster_id))
            })
            .collect();
        Self {
            question_id: click.question_id.clone(),
            clusters,
            shown_at: now,
        }
    }

    pub(in crate::app) fn is_expired(&self, now: f64) -> bool {
        now - self.shown_at >= NOTIFICATION_SECS
    }

    pub(in crate::app) fn remaining(&self, now: f64) -> f64 {
        (self.shown_at + NOTIFICATION_SECS - now).max(0.0)
    }
}

impl super::super::ViewModel {
    pub(in crate::app) fn draw_notification(&mut self, ctx: &Context, now: f64) {
        if self
            .notification
            .as_ref()
            .is_some_and(|notification| notification.is_expired(now))
        {
            self.notification = None;
        }
        let Some(notification) = &self.notification else {
            return;
        };

        let mut closed = false;
        egui::Area::new(egui::Id::new("click_notification"))
            .anchor(Align2::CENTER_TOP, vec2(0.0, 48.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format!(
                                "Question links {} clusters",
                                notification.clusters.len()
                            ))
                            .strong(),
                        );
                        if ui.small_button("x").clicked() {
                            closed = true;
                        }
                    });
                    ui.small(notification.question_id.as_str());
                    for (label, color) in &notification.clusters {
                        ui.horizontal(|ui| {
                            let (rect, _) = ui.allocate_exact_size(vec2(10.0, 10.0), Sense::hover());
                            ui.painter().circle_filled(rect.center(), 4.5, *color);
                            ui.label(label.as_str());
                        });
                    }
                });
            });

        if closed {
            self.notification = None;
        } else {
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(
                notification.remaining(now),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_dataset;

    #[test]
    fn notification_lists_cluster_labels_and_colours() {
        let dataset = sample_dataset();
        let click = QuestionClick {
            question_id: "question-CASE-1003".into(),
            cluster_ids: vec![0, 2, 42],
        };
        let notification = Notification::from_click(&click, &dataset, 10.0);

        assert_eq!(notification.clusters.len(), 3);
        assert_eq!(notification.clusters[0].0, dataset.clusters[0].display_title());
        assert_eq!(notification.clusters[1].1, cluster_color(2));
        assert_eq!(notification.clusters[2].0, "Cluster 42");
    }

    #[test]
    fn notification_expires_after_five_seconds() {
        let click = QuestionClick {
            question_id: "question-Q1".into(),
            cluster_ids: vec![0, 1],
        };
        let notification = Notification::from_click(&click, &Dataset::default(), 2.0);
        assert!(!notification.is_expired(6.9));
        assert!(notification.is_expired(7.0));
        assert_eq!(notification.remaining(8.0), 0.0);
    }
}
