use hexmap_shared::colors::{parse_hex_color, to_hex};

/// Brighten a color by a factor (1.0 = no change, >1.0 = brighter).
pub fn brighten(r: u8, g: u8, b: u8, factor: f64) -> (u8, u8, u8) {
    (
        ((r as f64 * factor).min(255.0)) as u8,
        ((g as f64 * factor).min(255.0)) as u8,
        ((b as f64 * factor).min(255.0)) as u8,
    )
}

/// Brightened variant of a `#RRGGBB` color; other inputs pass through.
pub fn brighten_hex(color: &str, factor: f64) -> String {
    match parse_hex_color(color) {
        Some((r, g, b)) => {
            let (r, g, b) = brighten(r, g, b, factor);
            to_hex(r, g, b)
        }
        None => color.to_string(),
    }
}
