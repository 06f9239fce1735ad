#![forbid(unsafe_code)]

//! Raster images to semi-graphic cells.
//!
//! A target grid of `rows x cols` cells covers `rows * 3` by `cols * 2`
//! sub-pixels. The source is resized to exactly that many pixels, then each
//! 2 x 3 block is quantized independently:
//!
//! 1. every pixel is mapped to its nearest palette entry in CIE L\*a\*b\*;
//! 2. the two most frequent entries become the cell colors (ties go to the
//!    lower palette index), the lighter one as foreground;
//! 3. each sub-pixel takes whichever of the two colors is closer.
//!
//! Conversion is a pure function of the image, the grid size, and the
//! palette. No dithering, no randomness.

use std::fmt;

use image::{DynamicImage, RgbImage, imageops, imageops::FilterType};

use vtx_core::attr::{Color, DisplayMode};
use vtx_core::geometry::{GeometryError, Position, Size};
use vtx_render::{Screen, ScreenError, SemiGraphicCell, SubPixels};

/// Sub-pixel columns per cell.
const CELL_WIDTH: u32 = 2;
/// Sub-pixel rows per cell.
const CELL_HEIGHT: u32 = 3;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// RGB value shown by each of the eight colors, indexed by [`Color::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    entries: [[u8; 3]; 8],
}

impl Default for Palette {
    /// The standard hardware palette.
    fn default() -> Self {
        Self {
            entries: [
                [0, 0, 0],
                [255, 0, 0],
                [0, 255, 0],
                [255, 255, 0],
                [0, 0, 255],
                [255, 0, 255],
                [0, 255, 255],
                [255, 255, 255],
            ],
        }
    }
}

impl Palette {
    #[must_use]
    pub const fn new(entries: [[u8; 3]; 8]) -> Self {
        Self { entries }
    }

    /// Gray levels shown by a monochrome terminal.
    ///
    /// Monochrome sets render each color as a gray whose brightness follows
    /// the luminance of the hardware color: black, blue, red, magenta, green,
    /// cyan, yellow, white.
    #[must_use]
    pub fn grayscale() -> Self {
        const RANK: [u8; 8] = [0, 2, 4, 6, 1, 3, 5, 7];
        let mut entries = [[0u8; 3]; 8];
        for (entry, rank) in entries.iter_mut().zip(RANK) {
            let level = (u16::from(rank) * 255 / 7) as u8;
            *entry = [level; 3];
        }
        Self { entries }
    }

    #[must_use]
    pub fn rgb(&self, color: Color) -> [u8; 3] {
        self.entries[color.index() as usize]
    }

    /// Palette color closest to `rgb` in L\*a\*b\*.
    #[must_use]
    pub fn nearest(&self, rgb: [u8; 3]) -> Color {
        let labs = self.labs();
        nearest_index(&labs, Lab::from_rgb(rgb))
    }

    fn labs(&self) -> [Lab; 8] {
        self.entries.map(Lab::from_rgb)
    }
}

// ---------------------------------------------------------------------------
// CIE L*a*b*
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Lab {
    l: f32,
    a: f32,
    b: f32,
}

impl Lab {
    /// sRGB (D65) to L\*a\*b\*.
    fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        fn linear(c: u8) -> f32 {
            let c = f32::from(c) / 255.0;
            if c <= 0.040_45 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        fn f(t: f32) -> f32 {
            const DELTA: f32 = 6.0 / 29.0;
            if t > DELTA * DELTA * DELTA {
                t.cbrt()
            } else {
                t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
            }
        }

        let (r, g, b) = (linear(r), linear(g), linear(b));
        let x = (0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b) / 0.950_47;
        let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175 * b;
        let z = (0.019_333_9 * r + 0.119_192 * g + 0.950_304_1 * b) / 1.088_83;

        let (fx, fy, fz) = (f(x), f(y), f(z));
        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Squared CIE76 distance.
    fn distance2(self, other: Self) -> f32 {
        let (dl, da, db) = (self.l - other.l, self.a - other.a, self.b - other.b);
        dl * dl + da * da + db * db
    }
}

/// First palette entry at minimal distance.
fn nearest_index(labs: &[Lab; 8], lab: Lab) -> Color {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (i, entry) in labs.iter().enumerate() {
        let d = entry.distance2(lab);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    Color::from_index(best as u8)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by image conversion and rendering.
#[derive(Debug)]
pub enum ImageError {
    /// The source bytes are not a decodable image.
    Decode(image::ImageError),
    /// The grid does not fit the screen from the requested origin.
    GeometryExceeded(GeometryError),
    /// Zero rows or columns requested, or an empty source image.
    EmptyGrid,
    /// The screen refused a cell.
    Screen(ScreenError),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "image decode error: {err}"),
            Self::GeometryExceeded(err) => write!(f, "image does not fit: {err}"),
            Self::EmptyGrid => f.write_str("empty image grid"),
            Self::Screen(err) => write!(f, "screen error: {err}"),
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::GeometryExceeded(err) => Some(err),
            Self::Screen(err) => Some(err),
            Self::EmptyGrid => None,
        }
    }
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err)
    }
}

impl From<ScreenError> for ImageError {
    fn from(err: ScreenError) -> Self {
        Self::Screen(err)
    }
}

// ---------------------------------------------------------------------------
// Cell grid
// ---------------------------------------------------------------------------

/// Converted image: cells in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    size: Size,
    cells: Vec<SemiGraphicCell>,
}

impl CellGrid {
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn cells(&self) -> &[SemiGraphicCell] {
        &self.cells
    }

    /// Cell at zero-based `row` and `col`.
    #[must_use]
    pub fn get(&self, row: u8, col: u8) -> Option<&SemiGraphicCell> {
        if row >= self.size.rows || col >= self.size.cols {
            return None;
        }
        self.cells
            .get(row as usize * self.size.cols as usize + col as usize)
    }

    /// Protocol bytes of the cells, in reading order.
    #[must_use]
    pub fn pattern_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(SemiGraphicCell::to_byte).collect()
    }

    /// Draw the grid with its top-left cell at `origin`.
    ///
    /// The cursor is only addressed when it is not already where the next
    /// cell goes, so a full-width grid streams without any cursor move.
    ///
    /// # Errors
    ///
    /// [`ImageError::GeometryExceeded`] before anything is emitted when the
    /// grid does not fit; [`ImageError::EmptyGrid`] for an empty grid.
    pub fn render(&self, origin: Position, screen: &mut Screen) -> Result<(), ImageError> {
        if self.cells.is_empty() {
            return Err(ImageError::EmptyGrid);
        }
        screen
            .geometry()
            .check_area(origin, self.size)
            .map_err(ImageError::GeometryExceeded)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(rows = self.size.rows, cols = self.size.cols, %origin, "render image");

        // Leaving mixed mode forgets the cursor, so switch before addressing.
        screen.set_mode(DisplayMode::Graphic);
        for (row, line) in self.cells.chunks(self.size.cols as usize).enumerate() {
            for (col, cell) in line.iter().enumerate() {
                let pos = Position::new(origin.row + row as u8, origin.col + col as u8);
                if screen.cursor() != Some(pos) {
                    screen.move_cursor(pos.row, pos.col);
                }
                screen.draw_cell(cell)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Converts raster images into [`CellGrid`]s against a fixed palette.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    palette: Palette,
    labs: [Lab; 8],
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl ImageConverter {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            labs: palette.labs(),
        }
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Decode an encoded image (PNG) and convert it.
    pub fn convert_bytes(&self, bytes: &[u8], size: Size) -> Result<CellGrid, ImageError> {
        let image = image::load_from_memory(bytes)?;
        self.convert(&image, size)
    }

    /// Convert `image` to a grid of `size` cells.
    ///
    /// # Errors
    ///
    /// [`ImageError::EmptyGrid`] when `size` or the image is empty.
    pub fn convert(&self, image: &DynamicImage, size: Size) -> Result<CellGrid, ImageError> {
        if size.is_empty() || image.width() == 0 || image.height() == 0 {
            return Err(ImageError::EmptyGrid);
        }
        let width = u32::from(size.cols) * CELL_WIDTH;
        let height = u32::from(size.rows) * CELL_HEIGHT;

        let rgb = image.to_rgb8();
        let pixels: RgbImage = if rgb.dimensions() == (width, height) {
            rgb
        } else {
            imageops::resize(&rgb, width, height, FilterType::Triangle)
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            src_w = image.width(),
            src_h = image.height(),
            rows = size.rows,
            cols = size.cols,
            "convert image"
        );

        let mut cells = Vec::with_capacity(size.area());
        for row in 0..u32::from(size.rows) {
            for col in 0..u32::from(size.cols) {
                let mut block = [Lab::from_rgb([0, 0, 0]); 6];
                for (i, lab) in block.iter_mut().enumerate() {
                    let x = col * CELL_WIDTH + i as u32 % CELL_WIDTH;
                    let y = row * CELL_HEIGHT + i as u32 / CELL_WIDTH;
                    *lab = Lab::from_rgb(pixels.get_pixel(x, y).0);
                }
                cells.push(self.quantize(&block));
            }
        }
        Ok(CellGrid { size, cells })
    }

    /// One 2 x 3 block, sub-pixels in mosaic bit order.
    fn quantize(&self, block: &[Lab; 6]) -> SemiGraphicCell {
        let mut counts = [0u8; 8];
        for lab in block {
            counts[nearest_index(&self.labs, *lab).index() as usize] += 1;
        }

        let mut ranked: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
        // Stable sort keeps the lower index first among equal counts.
        ranked.sort_by(|a, b| counts[*b].cmp(&counts[*a]));
        let (first, second) = (ranked[0], ranked[1]);
        if counts[second] == 0 {
            return SemiGraphicCell::solid(Color::from_index(first as u8));
        }

        let (fg, bg) = if self.labs[second].l > self.labs[first].l {
            (second, first)
        } else {
            (first, second)
        };
        let mut pattern = SubPixels::empty();
        for (i, lab) in block.iter().enumerate() {
            if lab.distance2(self.labs[fg]) <= lab.distance2(self.labs[bg]) {
                pattern |= SubPixels::from_bits_truncate(1 << i);
            }
        }
        SemiGraphicCell::new(Color::from_index(fg as u8), Color::from_index(bg as u8), pattern)
    }
}
