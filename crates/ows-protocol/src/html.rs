//! HTML entity encoding for generated markup.

use ows_common::OwsResult;

/// Escape `&`, `"`, `<` and `>`; everything else is copied unchanged.
///
/// The output buffer starts at the input length plus some slack and doubles
/// whenever fewer than six bytes remain, so no pre-scan is needed. Running
/// it twice escapes the ampersands of the first pass again.
pub fn encode_html_entities(input: &str) -> OwsResult<String> {
    let mut capacity = input.len() + 100;
    let mut out = String::new();
    out.try_reserve_exact(capacity)?;

    for c in input.chars() {
        if out.len() + 6 > capacity {
            capacity *= 2;
            out.try_reserve_exact(capacity - out.len())?;
        }

        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }

    Ok(out)
}
