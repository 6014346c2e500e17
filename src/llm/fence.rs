//! Markdown code-fence removal for completion text.

const FENCE: &str = "```";

fn is_language_tag(tag: &str) -> bool {
    tag.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}

/// Strip an outer Markdown code fence, if any
///
/// Only the outermost opening and closing fences are touched, so triple
/// backticks inside the content survive. Text without a fence is returned
/// trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = match rest.split_once('\n') {
            Some((tag, body)) if is_language_tag(tag.trim()) => body,
            Some(_) => rest,
            // ```json {"a":1}```
            None => rest.trim_start_matches(|c: char| {
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')
            }),
        };
    }

    if let Some(body) = text.trim_end().strip_suffix(FENCE) {
        text = body;
    }

    text.trim()
}
