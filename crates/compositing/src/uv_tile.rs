//! UV tile numbering.
//!
//! Tiles are unit squares of UV space. Tile `(u, v)` is numbered
//! `1001 + v * 10 + u`, so a row holds ten tiles and `u` never exceeds 9.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{FIRST_TILE_NUMBER, TILES_PER_ROW};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("Tile number {0} is below 1001")]
    NumberOutOfRange(u32),
    #[error("Tile coordinate ({u}, {v}) has no tile number")]
    CoordOutOfRange { u: i32, v: i32 },
    #[error("Not a tile file name: {0}")]
    InvalidFileName(String),
}

/// Integer grid coordinate of a UV tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UvTileCoord {
    pub u: i32,
    pub v: i32,
}

/// Linear tile number (1001, 1002, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct UvTileNumber(u32);

impl UvTileNumber {
    /// The tile at UV origin.
    pub const FIRST: Self = Self(FIRST_TILE_NUMBER);

    /// Validate a tile number; anything below 1001 is rejected
    pub fn new(number: u32) -> Result<Self, TileError> {
        if number < FIRST_TILE_NUMBER {
            return Err(TileError::NumberOutOfRange(number));
        }
        Ok(Self(number))
    }

    /// Raw tile number
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Grid coordinate of this tile
    pub fn coord(self) -> UvTileCoord {
        let offset = self.0 - FIRST_TILE_NUMBER;
        UvTileCoord {
            u: (offset % TILES_PER_ROW) as i32,
            v: (offset / TILES_PER_ROW) as i32,
        }
    }
}

impl TryFrom<u32> for UvTileNumber {
    type Error = TileError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UvTileNumber> for u32 {
    fn from(value: UvTileNumber) -> Self {
        value.0
    }
}

impl fmt::Display for UvTileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UvTileNumber {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u32 = s
            .parse()
            .map_err(|_| TileError::InvalidFileName(s.to_string()))?;
        Self::new(number)
    }
}

impl UvTileCoord {
    /// Create a tile coordinate
    pub fn new(u: i32, v: i32) -> Self {
        Self { u, v }
    }

    /// Tile number for this coordinate.
    ///
    /// Only `u` in `0..10` and `v >= 0` are numbered, and only while the
    /// number fits in a `u32`.
    pub fn number(self) -> Result<UvTileNumber, TileError> {
        let out_of_range = TileError::CoordOutOfRange {
            u: self.u,
            v: self.v,
        };
        if !(0..TILES_PER_ROW as i32).contains(&self.u) || self.v < 0 {
            return Err(out_of_range);
        }
        (self.v as u32)
            .checked_mul(TILES_PER_ROW)
            .and_then(|row| row.checked_add(FIRST_TILE_NUMBER + self.u as u32))
            .map(UvTileNumber)
            .ok_or(out_of_range)
    }

    /// Centre of the tile on the z = 0 plane.
    pub fn center(self) -> DVec3 {
        DVec3::new(self.u as f64 + 0.5, self.v as f64 + 0.5, 0.0)
    }

    /// Tile under a planar location.
    ///
    /// Coordinates are truncated toward zero, so locations in (-1, 0) map to
    /// tile 0 rather than -1.
    pub fn from_location(location: DVec3) -> Self {
        Self {
            u: location.x as i32,
            v: location.y as i32,
        }
    }
}

/// Convert a tile number to its grid coordinate
pub fn tile_number_to_coord(number: UvTileNumber) -> UvTileCoord {
    number.coord()
}

/// Convert a grid coordinate to its tile number
pub fn tile_coord_to_number(coord: UvTileCoord) -> Result<UvTileNumber, TileError> {
    coord.number()
}

/// Centre point of a tile
pub fn tile_coord_to_center(coord: UvTileCoord) -> DVec3 {
    coord.center()
}

/// Tile under a planar location (truncating toward zero)
pub fn location_to_tile_coord(location: DVec3) -> UvTileCoord {
    UvTileCoord::from_location(location)
}

/// A file name of the form `Stem.<tile>.ext`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFileName {
    pub stem: String,
    pub tile: UvTileNumber,
    pub extension: String,
}

impl TileFileName {
    pub fn new(stem: impl Into<String>, tile: UvTileNumber, extension: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            tile,
            extension: extension.into(),
        }
    }
}

impl fmt::Display for TileFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.stem, self.tile, self.extension)
    }
}

/// Parse a tile file name such as `UvLayout.1001.png`.
///
/// The stem may itself contain dots; the tile number is always the
/// second-to-last component.
pub fn parse_tile_file_name(file_name: &str) -> Result<TileFileName, TileError> {
    let invalid = || TileError::InvalidFileName(file_name.to_string());

    let mut parts = file_name.rsplitn(3, '.');
    let extension = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let number = parts.next().ok_or_else(invalid)?;
    let stem = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let tile = number.parse::<UvTileNumber>().map_err(|_| invalid())?;

    Ok(TileFileName::new(stem, tile, extension))
}

/// Format a tile file name such as `UvLayout.1001.png`
pub fn format_tile_file_name(stem: &str, tile: UvTileNumber, extension: &str) -> String {
    TileFileName::new(stem, tile, extension).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_coord_round_trip() {
        for n in 1001..=1099 {
            let number = UvTileNumber::new(n).unwrap();
            let coord = tile_number_to_coord(number);
            assert_eq!(tile_coord_to_number(coord).unwrap().get(), n);
        }
    }

    #[test]
    fn test_number_to_coord() {
        let coord = tile_number_to_coord(UvTileNumber::new(1001).unwrap());
        assert_eq!(coord, UvTileCoord::new(0, 0));

        let coord = tile_number_to_coord(UvTileNumber::new(1010).unwrap());
        assert_eq!(coord, UvTileCoord::new(9, 0));

        let coord = tile_number_to_coord(UvTileNumber::new(1024).unwrap());
        assert_eq!(coord, UvTileCoord::new(3, 2));
    }

    #[test]
    fn test_unrepresentable_values() {
        assert_eq!(
            UvTileNumber::new(1000),
            Err(TileError::NumberOutOfRange(1000))
        );
        assert!(UvTileCoord::new(10, 0).number().is_err());
        assert!(UvTileCoord::new(-1, 0).number().is_err());
        assert!(UvTileCoord::new(0, -1).number().is_err());
    }

    #[test]
    fn test_far_rows_do_not_overflow() {
        assert_eq!(
            UvTileCoord::new(0, 500_000_000).number(),
            Err(TileError::CoordOutOfRange { u: 0, v: 500_000_000 })
        );
        assert_eq!(
            UvTileCoord::new(9, i32::MAX).number(),
            Err(TileError::CoordOutOfRange { u: 9, v: i32::MAX })
        );

        // Last row where u = 9 still fits
        let number = UvTileCoord::new(9, 429_496_628).number().unwrap();
        assert_eq!(number.get(), 4_294_967_290);
        assert_eq!(number.coord(), UvTileCoord::new(9, 429_496_628));
    }

    #[test]
    fn test_tile_center() {
        assert_eq!(
            tile_coord_to_center(UvTileCoord::new(0, 0)),
            DVec3::new(0.5, 0.5, 0.0)
        );
        assert_eq!(
            tile_coord_to_center(UvTileCoord::new(3, 2)),
            DVec3::new(3.5, 2.5, 0.0)
        );
    }

    #[test]
    fn test_location_to_tile_coord() {
        let coord = location_to_tile_coord(DVec3::new(3.7, 2.1, 9.0));
        assert_eq!(coord, UvTileCoord::new(3, 2));

        // Truncation toward zero, not floor
        let coord = location_to_tile_coord(DVec3::new(-0.3, -1.5, 0.0));
        assert_eq!(coord, UvTileCoord::new(0, -1));
    }

    #[test]
    fn test_parse_tile_file_name() {
        let parsed = parse_tile_file_name("UvLayout.1012.png").unwrap();
        assert_eq!(parsed.stem, "UvLayout");
        assert_eq!(parsed.tile.get(), 1012);
        assert_eq!(parsed.extension, "png");
        assert_eq!(parsed.tile.coord(), UvTileCoord::new(1, 1));

        let dotted = parse_tile_file_name("my.layout.1001.exr").unwrap();
        assert_eq!(dotted.stem, "my.layout");
    }

    #[test]
    fn test_parse_tile_file_name_rejects() {
        assert!(parse_tile_file_name("UvLayout.png").is_err());
        assert!(parse_tile_file_name("UvLayout.abcd.png").is_err());
        assert!(parse_tile_file_name("UvLayout.0999.png").is_err());
        assert!(parse_tile_file_name(".1001.png").is_err());
        assert!(parse_tile_file_name("UvLayout.1001.").is_err());
    }

    #[test]
    fn test_format_tile_file_name() {
        let tile = UvTileNumber::new(1003).unwrap();
        assert_eq!(format_tile_file_name("Overlay", tile, "png"), "Overlay.1003.png");
    }
}
