#![forbid(unsafe_code)]

//! Screen geometry and cursor positions.
//!
//! Positions are 1-indexed, matching the terminal's own addressing: row 1 is
//! the first row below the status line, column 1 is the leftmost column.
//! Row 0 is reserved for the status line and is only reachable through the
//! dedicated status-line operations.

use std::fmt;

/// Environment variable overriding the number of rows.
const ENV_ROWS: &str = "VTX_ROWS";
/// Environment variable overriding the number of columns.
const ENV_COLUMNS: &str = "VTX_COLUMNS";

/// Largest row or column value that absolute addressing can express
/// (`0x40 + n` must stay a printable 7-bit byte).
pub const MAX_ADDRESSABLE: u8 = 62;

/// A cursor position on the main screen area (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Row, starting at 1.
    pub row: u8,
    /// Column, starting at 1.
    pub col: u8,
}

impl Position {
    /// The top-left corner.
    pub const HOME: Self = Self { row: 1, col: 1 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Position shifted right by `cols` columns (saturating).
    #[inline]
    #[must_use]
    pub const fn offset_col(self, cols: u8) -> Self {
        Self {
            row: self.row,
            col: self.col.saturating_add(cols),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::HOME
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Size of a rectangular area, in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Number of rows.
    pub rows: u8,
    /// Number of columns.
    pub cols: u8,
}

impl Size {
    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    /// Check if the size has zero area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Area in cells.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Terminal screen geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    rows: u8,
    columns: u8,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl Geometry {
    /// The common 24 x 40 videotex screen.
    pub const STANDARD: Self = Self {
        rows: 24,
        columns: 40,
    };

    /// Create a geometry, rejecting sizes that absolute addressing cannot reach.
    pub fn new(rows: u8, columns: u8) -> Result<Self, GeometryError> {
        if rows == 0 || columns == 0 || rows > MAX_ADDRESSABLE || columns > MAX_ADDRESSABLE {
            return Err(GeometryError::InvalidGeometry { rows, columns });
        }
        Ok(Self { rows, columns })
    }

    /// Build a geometry from `VTX_ROWS` / `VTX_COLUMNS`, falling back to the
    /// standard screen for missing or unusable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Geometry::from_env`] with a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| get_env(key).and_then(|v| v.trim().parse::<u8>().ok());
        let rows = parse(ENV_ROWS).unwrap_or(Self::STANDARD.rows);
        let columns = parse(ENV_COLUMNS).unwrap_or(Self::STANDARD.columns);
        Self::new(rows, columns).unwrap_or(Self::STANDARD)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u8 {
        self.rows
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn columns(&self) -> u8 {
        self.columns
    }

    /// Check whether a position lies on the main screen.
    #[inline]
    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.row >= 1 && pos.row <= self.rows && pos.col >= 1 && pos.col <= self.columns
    }

    /// Clamp a position onto the main screen.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        Position {
            row: pos.row.clamp(1, self.rows),
            col: pos.col.clamp(1, self.columns),
        }
    }

    /// Validate a position, returning it unchanged when it lies on screen.
    pub fn check(&self, pos: Position) -> Result<Position, GeometryError> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(GeometryError::OutOfBounds {
                pos,
                geometry: *self,
            })
        }
    }

    /// Validate that an area of `size` placed at `origin` fits on screen.
    pub fn check_area(&self, origin: Position, size: Size) -> Result<(), GeometryError> {
        let last_row = origin.row as u16 + size.rows as u16;
        let last_col = origin.col as u16 + size.cols as u16;
        if !self.contains(origin)
            || last_row > self.rows as u16 + 1
            || last_col > self.columns as u16 + 1
        {
            return Err(GeometryError::AreaExceeded {
                origin,
                size,
                geometry: *self,
            });
        }
        Ok(())
    }

    /// The position reached after writing one cell at `pos`, following the
    /// terminal's wrap rule: end of row continues on the next row, the last
    /// row wraps back to row 1 (page mode).
    #[must_use]
    pub fn advance(&self, pos: Position, width: u8) -> Position {
        let mut col = pos.col as u16 + width as u16;
        let mut row = pos.row;
        while col > self.columns as u16 {
            col -= self.columns as u16;
            row = if row >= self.rows { 1 } else { row + 1 };
        }
        Position {
            row,
            col: col as u8,
        }
    }
}

/// Errors raised when a position or an area does not fit the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// A cursor target outside the screen.
    OutOfBounds { pos: Position, geometry: Geometry },
    /// An area (image, field) that does not fit from the given origin.
    AreaExceeded {
        origin: Position,
        size: Size,
        geometry: Geometry,
    },
    /// A geometry that absolute addressing cannot express.
    InvalidGeometry { rows: u8, columns: u8 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { pos, geometry } => write!(
                f,
                "position {pos} outside {}x{} screen",
                geometry.rows, geometry.columns
            ),
            Self::AreaExceeded {
                origin,
                size,
                geometry,
            } => write!(
                f,
                "{}x{} area at {origin} exceeds {}x{} screen",
                size.rows, size.cols, geometry.rows, geometry.columns
            ),
            Self::InvalidGeometry { rows, columns } => {
                write!(f, "unaddressable geometry {rows}x{columns}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn get_env<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    #[test]
    fn standard_geometry() {
        let g = Geometry::default();
        assert_eq!(g.rows(), 24);
        assert_eq!(g.columns(), 40);
    }

    #[test]
    fn new_rejects_unaddressable() {
        assert!(Geometry::new(0, 40).is_err());
        assert!(Geometry::new(24, 80).is_err());
        assert!(Geometry::new(24, 62).is_ok());
    }

    #[test]
    fn clamp_never_leaves_screen() {
        let g = Geometry::default();
        assert_eq!(g.clamp(Position::new(0, 0)), Position::new(1, 1));
        assert_eq!(g.clamp(Position::new(99, 99)), Position::new(24, 40));
        assert_eq!(g.clamp(Position::new(5, 7)), Position::new(5, 7));
    }

    #[test]
    fn check_rejects_out_of_bounds() {
        let g = Geometry::default();
        assert!(g.check(Position::new(25, 1)).is_err());
        assert!(g.check(Position::new(1, 41)).is_err());
        assert!(g.check(Position::new(24, 40)).is_ok());
    }

    #[test]
    fn check_area_exact_fit() {
        let g = Geometry::default();
        assert!(g.check_area(Position::HOME, Size::new(24, 40)).is_ok());
        assert!(g.check_area(Position::new(2, 1), Size::new(24, 40)).is_err());
        assert!(g.check_area(Position::new(1, 40), Size::new(1, 1)).is_ok());
        assert!(g.check_area(Position::new(1, 40), Size::new(1, 2)).is_err());
    }

    #[test]
    fn advance_wraps_rows_and_pages() {
        let g = Geometry::default();
        assert_eq!(g.advance(Position::new(3, 5), 1), Position::new(3, 6));
        assert_eq!(g.advance(Position::new(3, 40), 1), Position::new(4, 1));
        assert_eq!(g.advance(Position::new(24, 40), 1), Position::new(1, 1));
        assert_eq!(g.advance(Position::new(3, 39), 2), Position::new(4, 1));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [(ENV_ROWS, "12"), (ENV_COLUMNS, "32")].into();
        let g = Geometry::from_env_with(get_env(&env));
        assert_eq!((g.rows(), g.columns()), (12, 32));

        let bad: HashMap<&str, &str> = [(ENV_COLUMNS, "80")].into();
        assert_eq!(Geometry::from_env_with(get_env(&bad)), Geometry::STANDARD);
    }
}
