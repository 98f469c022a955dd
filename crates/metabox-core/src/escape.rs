use std::borrow::Cow;

///
/// HTML escaping for rendered field output. Two contexts: element text and
/// double-quoted attribute values. Borrow passes through untouched input.
///

#[must_use]
pub fn esc_html(s: &str) -> Cow<'_, str> {
    escape(s, false)
}

#[must_use]
pub fn esc_attr(s: &str) -> Cow<'_, str> {
    escape(s, true)
}

fn escape(s: &str, attr: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (attr && matches!(c, '"' | '\''));

    if !s.chars().any(needs) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\'' if attr => out.push_str("&#39;"),
            other => out.push(other),
        }
    }

    Cow::Owned(out)
}

///
/// TESTS
///
