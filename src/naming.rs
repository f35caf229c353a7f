//! Field and type name helpers.

/// Convert a field name to `SCREAMING_SNAKE_CASE`.
///
/// Accepts `snake_case` and `CamelCase` input: `bind_addr` and `BindAddr` both
/// become `BIND_ADDR`, acronyms stay together (`HTTPServer` becomes `HTTP_SERVER`).
pub fn screaming_snake(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ' | '.') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Strip module paths from a `std::any::type_name` string
///
/// `alloc::vec::Vec<core::time::Duration>` becomes `Vec<Duration>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut token = String::new();

    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            token.push(c);
        } else {
            push_last_segment(&mut out, &token);
            token.clear();
            out.push(c);
        }
    }
    push_last_segment(&mut out, &token);
    out
}

fn push_last_segment(out: &mut String, token: &str) {
    if let Some(segment) = token.rsplit("::").next() {
        out.push_str(segment);
    }
}
