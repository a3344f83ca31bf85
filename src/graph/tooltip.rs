use eframe::egui::Pos2;

/// Delay between a hide request and the tooltip disappearing.
pub const HIDE_DELAY_SECS: f64 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl TooltipContent {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipView {
    pub content: TooltipContent,
    pub anchor: Pos2,
}

/// The single tooltip of a graph. Hiding is debounced so the pointer can
/// travel from a node onto the tooltip without it vanishing.
#[derive(Debug, Default)]
pub struct TooltipService {
    content: Option<TooltipContent>,
    anchor: Pos2,
    hide_at: Option<f64>,
    pointer_inside: bool,
}

impl TooltipService {
    pub fn show(&mut self, content: TooltipContent, anchor: Pos2) {
        self.content = Some(content);
        self.anchor = anchor;
        self.hide_at = None;
    }

    pub fn move_to(&mut self, anchor: Pos2) {
        if self.content.is_some() {
            self.anchor = anchor;
        }
    }

    pub fn request_hide(&mut self, now: f64) {
        if self.content.is_none() || self.pointer_inside || self.hide_at.is_some() {
            return;
        }
        self.hide_at = Some(now + HIDE_DELAY_SECS);
    }

    pub fn hide_now(&mut self) {
        self.content = None;
        self.hide_at = None;
        self.pointer_inside = false;
    }

    pub fn set_pointer_inside(&mut self, inside: bool, now: f64) {
        if self.pointer_inside == inside {
            return;
        }
        self.pointer_inside = inside;
        if inside {
            self.hide_at = None;
        } else {
            self.request_hide(now);
        }
    }

    pub fn is_hide_pending(&self) -> bool {
        self.hide_at.is_some()
    }

    /// Applies an expired hide deadline; returns whether the tooltip changed.
    pub fn update(&mut self, now: f64) -> bool {
        match self.hide_at {
            Some(deadline) if now >= deadline => {
                self.content = None;
                self.hide_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn view(&self) -> Option<TooltipView> {
        self.content.as_ref().map(|content| TooltipView {
            content: content.clone(),
            anchor: self.anchor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn hide_is_debounced() {
        let mut tooltip = TooltipService::default();
        tooltip.show(TooltipContent::title("Cluster A"), pos2(10.0, 10.0));
        tooltip.request_hide(1.0);

        assert!(!tooltip.update(1.1));
        assert!(tooltip.view().is_some());
        assert!(tooltip.update(1.25));
        assert!(tooltip.view().is_none());
    }

    #[test]
    fn showing_again_cancels_a_pending_hide() {
        let mut tooltip = TooltipService::default();
        tooltip.show(TooltipContent::title("A"), pos2(0.0, 0.0));
        tooltip.request_hide(0.0);
        tooltip.show(TooltipContent::title("B"), pos2(5.0, 5.0));

        assert!(!tooltip.update(1.0));
        assert_eq!(tooltip.view().map(|view| view.content.title), Some("B".to_string()));
    }

    #[test]
    fn pointer_over_tooltip_keeps_it_open() {
        let mut tooltip = TooltipService::default();
        tooltip.show(TooltipContent::title("A"), pos2(0.0, 0.0));
        tooltip.request_hide(0.0);
        tooltip.set_pointer_inside(true, 0.1);
        assert!(!tooltip.is_hide_pending());
        assert!(!tooltip.update(5.0));

        tooltip.set_pointer_inside(false, 5.0);
        assert!(tooltip.is_hide_pending());
        assert!(tooltip.update(5.25));
        assert!(tooltip.view().is_none());
    }

    #[test]
    fn move_only_applies_while_visible() {
        let mut tooltip = TooltipService::default();
        tooltip.move_to(pos2(3.0, 3.0));
        assert!(tooltip.view().is_none());

        tooltip.show(TooltipContent::title("A"), pos2(0.0, 0.0));
        tooltip.move_to(pos2(3.0, 4.0));
        assert_eq!(tooltip.view().map(|view| view.anchor), Some(pos2(3.0, 4.0)));
    }
}
