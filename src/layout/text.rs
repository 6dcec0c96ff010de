use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::TextBlock;

pub(crate) fn measure_label(text: &str, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let font_size = theme.font_size;
    let font_family = theme.font_family.as_str();
    let fast = config.fast_text_metrics;
    let max_width = max_label_width_px(config.max_label_width_chars, font_size, font_family, fast);

    let mut lines = Vec::new();
    for line in split_lines(text) {
        lines.extend(wrap_line(&line, max_width, font_size, font_family, fast));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let width = lines
        .iter()
        .map(|line| text_width(line, font_size, font_family, fast))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;

    TextBlock {
        lines,
        width,
        height,
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("\\n", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

pub(crate) fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast: bool,
) -> Vec<String> {
    if text_width(line, font_size, font_family, fast) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_width(&candidate, font_size, font_family, fast) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast: bool) -> f32 {
    if fast {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

/// Rough em-relative advance used when no font face is available.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.27,
        'f' | 'r' | 't' | '(' | ')' | '[' | ']' => 0.35,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '#' | '%' | '&' => 0.95,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_digit() => 0.6,
        c if c.is_ascii() => 0.56,
        // CJK and other wide scripts
        _ => 1.0,
    }
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

fn max_label_width_px(max_chars: usize, font_size: f32, font_family: &str, fast: bool) -> f32 {
    let avg_char = if fast {
        font_size * 0.56
    } else {
        text_metrics::average_char_width(font_family, font_size).unwrap_or(font_size * 0.56)
    };
    max_chars.max(1) as f32 * avg_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn split_lines_handles_breaks() {
        assert_eq!(split_lines("a<br/>b"), vec!["a", "b"]);
        assert_eq!(split_lines("a\\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("  yes \n no "), vec!["yes", "no"]);
    }

    #[test]
    fn wrap_line_keeps_short_text() {
        assert_eq!(wrap_line("Small", 500.0, 14.0, "sans-serif", true), vec!["Small"]);
    }

    #[test]
    fn wrap_line_splits_long_text() {
        let lines = wrap_line(
            "would you like to speak with a human agent today",
            120.0,
            14.0,
            "sans-serif",
            true,
        );
        assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
        assert!(lines.iter().all(|line| !line.is_empty()));
    }

    #[test]
    fn fallback_width_scales_with_font_size() {
        let w14 = fallback_text_width("Order pizza", 14.0);
        let w28 = fallback_text_width("Order pizza", 28.0);
        assert!((w28 - w14 * 2.0).abs() < 0.01);
    }

    #[test]
    fn empty_label_still_has_one_line() {
        let block = measure_label("", &Theme::modern(), &fast_config());
        assert_eq!(block.lines.len(), 1);
        assert_eq!(block.width, 0.0);
        assert!(block.height > 0.0);
    }
}
