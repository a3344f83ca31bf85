use eframe::egui::{self, Key, Ui};

use super::super::ViewModel;

/// Minimum time between wheel-driven step changes.
pub(in crate::app) const WHEEL_COOLDOWN_SECS: f64 = 0.6;

#[derive(Debug, Default)]
pub(in crate::app) struct StepScroller {
    last_change: Option<f64>,
}

impl StepScroller {
    /// Turns a wheel delta into a step offset, at most one per cooldown.
    pub(in crate::app) fn step_delta(&mut self, scroll_y: f32, now: f64) -> Option<isize> {
        if scroll_y.abs() <= f32::EPSILON {
            return None;
        }
        if let Some(last) = self.last_change
            && now - last < WHEEL_COOLDOWN_SECS
        {
            return None;
        }
        self.last_change = Some(now);
        Some(if scroll_y < 0.0 { 1 } else { -1 })
    }
}

fn offset_step(step: usize, delta: isize, total: usize) -> usize {
    step.saturating_add_signed(delta).min(total.saturating_sub(1))
}

impl ViewModel {
    pub(in crate::app) fn handle_step_keys(&mut self, ui: &Ui, now: f64) {
        if ui.ctx().wants_keyboard_input() {
            return;
        }
        let delta = ui.input(|input| {
            if input.key_pressed(Key::ArrowRight) || input.key_pressed(Key::ArrowDown) {
                1
            } else if input.key_pressed(Key::ArrowLeft) || input.key_pressed(Key::ArrowUp) {
                -1
            } else {
                0
            }
        });
        if delta != 0 {
            self.move_step(delta, now);
        }
    }

    pub(in crate::app) fn handle_step_wheel(&mut self, ui: &Ui, response: &egui::Response, now: f64) {
        if !response.hovered() {
            return;
        }
        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if let Some(delta) = self.scroller.step_delta(scroll, now) {
            self.move_step(delta, now);
        }
    }

    fn move_step(&mut self, delta: isize, now: f64) {
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        let next = offset_step(graph.step(), delta, graph.total_steps());
        if next != graph.step() {
            graph.set_step(next, now);
        }
    }
}
