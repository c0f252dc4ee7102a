/// Deterministic color slot for an owner key via CRC32 of its bytes.
pub fn palette_index(key: &str, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    crc32fast::hash(key.as_bytes()) as usize % len
}

/// Picks a color from `palette` for `key`. Stable across runs and platforms.
pub fn palette_color<'a>(key: &str, palette: &[&'a str]) -> Option<&'a str> {
    palette.get(palette_index(key, palette.len())).copied()
}

/// Parses `#RRGGBB` or `#RGB` (case-insensitive).
pub fn parse_hex_color(text: &str) -> Option<(u8, u8, u8)> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some((
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
            Some((digit(0).ok()?, digit(1).ok()?, digit(2).ok()?))
        }
        _ => None,
    }
}

pub fn is_hex_color(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() == 7 && parse_hex_color(trimmed).is_some()
}

pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Multiply-blend `top` over `bottom` at `alpha` coverage.
pub fn multiply_over(bottom: (u8, u8, u8), top: (u8, u8, u8), alpha: f64) -> (u8, u8, u8) {
    let alpha = alpha.clamp(0.0, 1.0);
    let channel = |b: u8, t: u8| {
        let b = b as f64 / 255.0;
        let multiplied = b * (t as f64 / 255.0);
        let out = b + (multiplied - b) * alpha;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };
    (
        channel(bottom.0, top.0),
        channel(bottom.1, top.1),
        channel(bottom.2, top.2),
    )
}
