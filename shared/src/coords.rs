use std::fmt;

use hexx::{Hex, HexOrientation, OffsetHexMode, shapes};
use serde::{Deserialize, Serialize};

/// Largest absolute row or column accepted from documents. Every derived
/// axial, cube and pixel value stays far from `i32` overflow below it.
pub const COORD_LIMIT: i32 = 1 << 20;

/// Offset (row, column) address on a packed hex grid. Odd rows are shifted
/// right by half a cell width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OffsetCoord {
    pub r: i32,
    pub c: i32,
}

impl OffsetCoord {
    pub const fn new(r: i32, c: i32) -> Self {
        Self { r, c }
    }

    /// Identity key used by every overlay store: `"r:c"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.r, self.c)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let (r, c) = key.trim().split_once(':')?;
        let coord = Self {
            r: r.trim().parse().ok()?,
            c: c.trim().parse().ok()?,
        };
        coord.in_range().then_some(coord)
    }

    pub const fn in_range(&self) -> bool {
        in_limit(self.r) && in_limit(self.c)
    }

    pub const fn is_odd_row(&self) -> bool {
        self.r.rem_euclid(2) == 1
    }

    /// Odd-r offset to axial conversion.
    pub fn to_axial(&self) -> AxialCoord {
        Hex::from_offset_coordinates([self.c, self.r], OffsetHexMode::Odd, HexOrientation::Pointy)
            .into()
    }
}

impl fmt::Display for OffsetCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.r, self.c)
    }
}

const fn in_limit(value: i32) -> bool {
    value.unsigned_abs() <= COORD_LIMIT as u32
}

/// Untrusted coordinate as it arrives from hand-edited documents. Components
/// may be fractional, NaN or out of range; [`RawCoord::normalize`] decides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCoord {
    pub r: f64,
    pub c: f64,
}

impl RawCoord {
    pub const fn new(r: f64, c: f64) -> Self {
        Self { r, c }
    }

    pub fn normalize(&self) -> Option<OffsetCoord> {
        Some(OffsetCoord {
            r: integral(self.r)?,
            c: integral(self.c)?,
        })
    }
}

fn integral(value: f64) -> Option<i32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value.abs() > COORD_LIMIT as f64 {
        return None;
    }
    Some(value as i32)
}

impl From<OffsetCoord> for RawCoord {
    fn from(coord: OffsetCoord) -> Self {
        Self {
            r: coord.r as f64,
            c: coord.c as f64,
        }
    }
}

impl From<(i32, i32)> for RawCoord {
    fn from((r, c): (i32, i32)) -> Self {
        Self {
            r: r as f64,
            c: c as f64,
        }
    }
}

impl From<(f64, f64)> for RawCoord {
    fn from((r, c): (f64, f64)) -> Self {
        Self { r, c }
    }
}

/// Cube coordinate with the invariant `q + r + s == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl AxialCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Accepts an explicit cube triple, rejecting ones that leave the plane.
    pub const fn from_cube(q: i32, r: i32, s: i32) -> Option<Self> {
        if q as i64 + r as i64 + s as i64 != 0 {
            return None;
        }
        Some(Self { q, r, s })
    }

    pub const fn hex(&self) -> Hex {
        Hex::new(self.q, self.r)
    }

    pub fn distance(&self, other: &Self) -> u32 {
        self.hex().unsigned_distance_to(other.hex())
    }

    pub fn neighbors(&self) -> [Self; 6] {
        self.hex().all_neighbors().map(Self::from)
    }

    pub fn to_offset(&self) -> OffsetCoord {
        let [c, r] = self
            .hex()
            .to_offset_coordinates(OffsetHexMode::Odd, HexOrientation::Pointy);
        OffsetCoord::new(r, c)
    }

    /// Key used by merged influence maps: `"q,r,s"`.
    pub fn key(&self) -> String {
        format!("{},{},{}", self.q, self.r, self.s)
    }
}

impl From<Hex> for AxialCoord {
    fn from(hex: Hex) -> Self {
        Self::new(hex.x, hex.y)
    }
}

/// Every cell within `radius` steps of `center` (a filled hex disk).
pub fn coords_in_radius(center: AxialCoord, radius: u32) -> Vec<AxialCoord> {
    shapes::hexagon(center.hex(), radius)
        .map(AxialCoord::from)
        .collect()
}

/// Parses document coordinate text.
///
/// Accepts `"r,c"` (offset row/column) or `"q:<n>,r:<n>"` (axial). Whitespace
/// around every token is ignored. Anything else, including components beyond
/// [`COORD_LIMIT`], yields `None`.
pub fn parse_coordinates(text: Option<&str>) -> Option<AxialCoord> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    let (first, second) = text.split_once(',')?;
    let (first, second) = (first.trim(), second.trim());

    if let (Some(q), Some(r)) = (tagged(first, 'q'), tagged(second, 'r')) {
        let (q, r) = (q?, r?);
        return (in_limit(q) && in_limit(r)).then(|| AxialCoord::new(q, r));
    }

    let coord = OffsetCoord::new(first.parse().ok()?, second.parse().ok()?);
    coord.in_range().then(|| coord.to_axial())
}

/// `Some(Some(n))` for `"<tag>:<n>"`, `Some(None)` when the tag matches but the
/// number does not parse, `None` when the tag is absent.
fn tagged(token: &str, tag: char) -> Option<Option<i32>> {
    let rest = token.strip_prefix(tag)?.trim_start();
    let value = rest.strip_prefix(':')?.trim();
    Some(value.parse::<i32>().ok())
}
