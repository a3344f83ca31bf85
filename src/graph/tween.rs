use eframe::egui::Pos2;

pub const STEP_TRANSITION_SECS: f64 = 1.0;

pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

pub trait Lerp: Copy + PartialEq {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Pos2 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

/// A value that eases toward its latest target. Retargeting mid-flight
/// restarts from the currently displayed value.
#[derive(Clone, Copy, Debug)]
pub struct Animated<T: Lerp> {
    from: T,
    to: T,
    started_at: f64,
    duration: f64,
}

impl<T: Lerp> Animated<T> {
    pub fn new(value: T) -> Self {
        Self {
            from: value,
            to: value,
            started_at: 0.0,
            duration: 0.0,
        }
    }

    pub fn set(&mut self, value: T) {
        *self = Self::new(value);
    }

    pub fn animate_to(&mut self, target: T, now: f64, duration: f64) {
        let current = self.value(now);
        self.from = current;
        self.to = target;
        self.started_at = now;
        self.duration = duration;
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn value(&self, now: f64) -> T {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, ease_cubic_in_out(progress))
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.from != self.to && self.progress(now) < 1.0
    }
}
