use hexx::{Hex, HexOrientation, Vec2};
use serde::{Deserialize, Serialize};

use crate::coords::OffsetCoord;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Axis-aligned rectangle in scene content space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Pointy-top packed layout. `base` is the offset coordinate drawn at the
/// top-left corner; `padding` is the content-space margin in front of it.
///
/// Positions are computed relative to `base` so they stay precise however far
/// the map sits from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    pub radius: f64,
    pub base: OffsetCoord,
    pub padding: f64,
}

impl HexLayout {
    pub const fn new(radius: f64, base: OffsetCoord, padding: f64) -> Self {
        Self {
            radius,
            base,
            padding,
        }
    }

    pub fn hex_width(&self) -> f64 {
        SQRT_3 * self.radius
    }

    /// Center of the base cell. Row parity is absolute, so an odd base row
    /// starts half a cell to the right.
    fn anchor(&self) -> (f64, f64) {
        let shift = if self.base.is_odd_row() {
            self.hex_width() / 2.0
        } else {
            0.0
        };
        (
            self.padding + self.hex_width() / 2.0 + shift,
            self.padding + self.radius,
        )
    }

    /// Grid layout whose origin is the base cell. Screen rows grow downward.
    fn grid(&self) -> hexx::HexLayout {
        let (x, y) = self.anchor();
        let mut grid = hexx::HexLayout {
            orientation: HexOrientation::Pointy,
            scale: Vec2::splat(self.radius as f32),
            ..Default::default()
        };
        if grid.hex_to_world_pos(Hex::new(0, 1)).y < 0.0 {
            grid.scale.y = -grid.scale.y;
        }
        grid.origin = Vec2::new(x as f32, y as f32);
        grid
    }

    pub fn center_of(&self, coord: OffsetCoord) -> (f64, f64) {
        let relative = coord.to_axial().hex() - self.base.to_axial().hex();
        let pos = self.grid().hex_to_world_pos(relative);
        (pos.x as f64, pos.y as f64)
    }

    pub fn polygon_of(&self, coord: OffsetCoord) -> [(f64, f64); 6] {
        let (cx, cy) = self.center_of(coord);
        polygon_points(cx, cy, self.radius)
    }

    pub fn bbox_of(&self, coord: OffsetCoord) -> Bounds {
        let points = self.polygon_of(coord);
        points.iter().fold(
            Bounds {
                min_x: f64::INFINITY,
                min_y: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |acc, &(x, y)| Bounds {
                min_x: acc.min_x.min(x),
                min_y: acc.min_y.min(y),
                max_x: acc.max_x.max(x),
                max_y: acc.max_y.max(y),
            },
        )
    }

    /// Cell whose center is nearest to a content-space point.
    pub fn coord_at(&self, x: f64, y: f64) -> OffsetCoord {
        let relative = self.grid().world_pos_to_hex(Vec2::new(x as f32, y as f32));
        crate::coords::AxialCoord::from(relative + self.base.to_axial().hex()).to_offset()
    }
}

/// Pixel center of `coord` for a pointy-top layout anchored at `base`.
pub fn center_of(coord: OffsetCoord, radius: f64, base: OffsetCoord, padding: f64) -> (f64, f64) {
    HexLayout::new(radius, base, padding).center_of(coord)
}

/// The six vertices of a pointy-top hexagon of circumradius `radius`.
pub fn polygon_points(cx: f64, cy: f64, radius: f64) -> [(f64, f64); 6] {
    let unit = hexx::HexLayout {
        orientation: HexOrientation::Pointy,
        scale: Vec2::splat(1.0),
        ..Default::default()
    };
    let corners = unit.center_aligned_hex_corners();
    std::array::from_fn(|i| {
        (
            cx + corners[i].x as f64 * radius,
            cy + corners[i].y as f64 * radius,
        )
    })
}
