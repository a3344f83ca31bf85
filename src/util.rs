use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strips the stray quote characters the clustering backend leaves around titles.
pub fn clean_title(title: &str) -> String {
    title
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '“' | '”'))
        .replace('"', "")
        .trim()
        .to_string()
}

pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated = text.chars().take(max_chars.saturating_sub(1)).collect::<String>();
    truncated.push('…');
    truncated
}

/// Deterministic pair in `[-1, 1]` derived from a key.
pub fn stable_pair(key: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_title_removes_wrapping_and_inner_quotes() {
        assert_eq!(clean_title("\"Off-label dosing\""), "Off-label dosing");
        assert_eq!(clean_title("  \"Storage\" questions "), "Storage questions");
        assert_eq!(clean_title("Plain"), "Plain");
    }

    #[test]
    fn stable_pair_is_repeatable_and_bounded() {
        let first = stable_pair("cell-7");
        let second = stable_pair("cell-7");
        assert_eq!(first, second);
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
    }

    #[test]
    fn truncate_label_keeps_short_text() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("a longer label", 6), "a lon…");
    }

    #[test]
    fn finite_or_zero_replaces_nan() {
        assert_eq!(finite_or_zero(f32::NAN), 0.0);
        assert_eq!(finite_or_zero(f32::INFINITY), 0.0);
        assert_eq!(finite_or_zero(3.5), 3.5);
    }
}
