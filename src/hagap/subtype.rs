/// Extracts the broad subtype group ("H3", "B", ...) from a subtype label,
/// ignoring the neuraminidase number.
///
/// Accepts "A(H3N2)", "A(H3)", "H3N2", "B" and "B/..." style labels.
pub fn h_or_b(label: &str) -> Option<&str> {
    let label = label.trim();
    if label.starts_with('B') {
        return Some("B");
    }
    let rest = label.strip_prefix("A(").unwrap_or(label);
    let digits = rest
        .strip_prefix('H')?
        .bytes()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    Some(&rest[..digits + 1])
}

/// Subtype with neuraminidase number, e.g. "H3N2" from "A(H3N2)".
pub fn hn_or_b(label: &str) -> Option<&str> {
    let label = label.trim();
    if label.starts_with('B') {
        return Some("B");
    }
    let rest = label.strip_prefix("A(").unwrap_or(label);
    let rest = rest.strip_suffix(')').unwrap_or(rest);
    if rest.starts_with('H') && rest.len() > 1 {
        Some(rest)
    } else {
        None
    }
}

/// Subtypes routinely reported by the WHO collaborating centres.
/// Soft failures for these are logged as warnings.
pub fn is_authoritative(label: &str) -> bool {
    matches!(hn_or_b(label), Some("B" | "H1N1" | "H3N2"))
}

/// True when both labels fall into the same broad group.
pub fn same_group(a: &str, b: &str) -> bool {
    match (h_or_b(a), h_or_b(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
