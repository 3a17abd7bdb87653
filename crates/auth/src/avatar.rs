//! Deterministic SVG avatars for users without an uploaded picture.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const PALETTE: [&str; 7] = [
    "#ef4444", "#dc2626", "#b91c1c", "#991b1b", "#6b7280", "#4b5563", "#374151",
];

/// 32-bit string hash over UTF-16 code units, `h = h * 31 + unit` with wrap-around.
pub fn identifier_hash(identifier: &str) -> i32 {
    identifier.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}

/// Render the avatar for `identifier` as an `image/svg+xml` data URL.
///
/// ```
/// let a = voltchat_auth::avatar::generate_profile_picture("admin@voltaccept.com");
/// let b = voltchat_auth::avatar::generate_profile_picture("admin@voltaccept.com");
/// assert_eq!(a, b);
/// assert!(a.starts_with("data:image/svg+xml;base64,"));
/// ```
pub fn generate_profile_picture(identifier: &str) -> String {
    let svg = render_svg(identifier);
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn render_svg(identifier: &str) -> String {
    let magnitude = i64::from(identifier_hash(identifier)).unsigned_abs() as usize;

    let background = PALETTE[magnitude % PALETTE.len()];
    let accent = PALETTE[(magnitude + 3) % PALETTE.len()];

    let pattern = match magnitude % 4 {
        0 => format!(r#"<circle cx="32" cy="32" r="20" fill="{accent}" opacity="0.8"/>"#),
        1 => format!(r#"<rect x="16" y="16" width="32" height="32" fill="{accent}" opacity="0.8"/>"#),
        2 => format!(r#"<polygon points="32,12 52,32 32,52 12,32" fill="{accent}" opacity="0.8"/>"#),
        _ => format!(r#"<polygon points="32,16 48,48 16,48" fill="{accent}" opacity="0.8"/>"#),
    };

    let initial: String = identifier
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();

    format!(
        concat!(
            r#"<svg width="64" height="64" viewBox="0 0 64 64" xmlns="http://www.w3.org/2000/svg">"#,
            r#"<rect width="64" height="64" fill="{background}"/>"#,
            "{pattern}",
            r#"<text x="32" y="40" text-anchor="middle" fill="white" font-family="Arial, sans-serif" font-size="24" font-weight="bold">{initial}</text>"#,
            "</svg>"
        ),
        background = background,
        pattern = pattern,
        initial = escape_xml(&initial),
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(identifier_hash(""), 0);
        assert_eq!(identifier_hash("a"), 97);
        assert_eq!(identifier_hash("ab"), 97 * 31 + 98);
        // wraps instead of overflowing
        let long = "z".repeat(64);
        let _ = identifier_hash(&long);
    }

    #[test]
    fn svg_uses_uppercase_initial_and_palette_colours() {
        let svg = render_svg("test@gmail.com");
        assert!(svg.contains(">T</text>"));
        assert!(PALETTE.iter().any(|colour| svg.contains(colour)));
    }

    #[test]
    fn initial_is_escaped() {
        let svg = render_svg("<script>");
        assert!(svg.contains("&lt;</text>"));
        assert!(!svg.contains("<script>"));
    }

    #[test]
    fn empty_identifier_still_renders() {
        let url = generate_profile_picture("");
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }
}
