//! Text helpers for labels and descriptions.

/// Collapses whitespace and truncates `text` on a word boundary so the
/// result, `placeholder` included, fits in `width` characters.
///
/// Text that already fits is returned with its whitespace collapsed. When
/// not even the first word fits, only the placeholder is returned.
pub fn shorten(text: &str, width: usize, placeholder: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(placeholder.chars().count());
    let mut out = String::new();
    let mut used = 0;
    for word in words {
        let gap = usize::from(!out.is_empty());
        let len = word.chars().count();
        if used + gap + len > budget {
            break;
        }
        if gap == 1 {
            out.push(' ');
        }
        out.push_str(word);
        used += gap + len;
    }

    if out.is_empty() {
        return placeholder.trim_start().to_string();
    }
    out.push_str(placeholder);
    out
}
