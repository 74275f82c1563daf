//! `xml:space` whitespace handling for character data.

/// Normalize text content.
///
/// Default handling drops newlines, turns tabs into spaces, trims and
/// collapses runs of spaces. With `preserve` every newline and tab becomes a
/// space and nothing is removed.
pub fn clean_xml_text(text: &str, preserve: bool) -> String {
    if preserve {
        return text
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
            .collect();
    }

    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        match c {
            '\n' | '\r' => {}
            ' ' | '\t' => pending_space = !out.is_empty(),
            _ => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.push(c);
            }
        }
    }
    out
}
