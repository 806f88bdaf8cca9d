#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Image export for solved mazes.
//!
//! A grid is first rendered into an in-memory [`Image`], one colour per
//! cell replicated `scale × scale` times, and then serialised as a PPM pixel
//! dump. Export only reads the grid.

mod ppm;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use maze_solver_core::CellStatus;
use maze_solver_grid::{Grid, GridSnapshot};
use thiserror::Error;
use tracing::debug;

pub use ppm::PixelFormat;

/// Opaque RGB colour with byte channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Rgb {
    /// Colour used for walls.
    pub const WALL: Rgb = Rgb::new(0, 0, 0);
    /// Colour used for cells no explorer reached.
    pub const OPEN: Rgb = Rgb::new(255, 255, 255);

    /// Creates a colour from byte channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Colour of a cell claimed by explorer `id` when `max_id` explorers ran.
    ///
    /// Red grows linearly with the identifier while green and blue fade, so
    /// early explorers render cyan and late ones red.
    #[must_use]
    pub fn for_explorer(id: u32, max_id: u32) -> Self {
        let max_id = u64::from(max_id.max(1));
        let rank = u64::from(id.saturating_sub(1)).min(max_id - 1);
        let red = u8::try_from(255 * rank / max_id).unwrap_or(u8::MAX);
        Self::new(red, 255 - red, 255 - red)
    }
}

/// Errors reported while exporting a grid.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Scale factors must be at least one.
    #[error("image scale must be at least 1")]
    InvalidScale,
    /// The grid has no cells to draw.
    #[error("cannot export an empty grid")]
    EmptyGrid,
    /// The scaled image does not fit in memory addressing.
    #[error("a {width}x{height} grid at scale {scale} is too large to export")]
    TooLarge {
        /// Grid columns.
        width: u32,
        /// Grid rows.
        height: u32,
        /// Requested scale.
        scale: u32,
    },
    /// Writing the image failed.
    #[error("failed to write image to {}", path.display())]
    Io {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Row-major pixel container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Image {
    /// Renders a grid snapshot, replicating every cell `scale` times along
    /// both axes.
    pub fn render(snapshot: &GridSnapshot, scale: u32) -> Result<Self, ExportError> {
        if scale == 0 {
            return Err(ExportError::InvalidScale);
        }
        if snapshot.width() == 0 || snapshot.height() == 0 {
            return Err(ExportError::EmptyGrid);
        }

        let too_large = || ExportError::TooLarge {
            width: snapshot.width(),
            height: snapshot.height(),
            scale,
        };
        let factor = usize::try_from(scale).map_err(|_| too_large())?;
        let width = usize::try_from(snapshot.width())
            .ok()
            .and_then(|width| width.checked_mul(factor))
            .ok_or_else(too_large)?;
        let height = usize::try_from(snapshot.height())
            .ok()
            .and_then(|height| height.checked_mul(factor))
            .ok_or_else(too_large)?;
        let capacity = width.checked_mul(height).ok_or_else(too_large)?;

        let max_id = snapshot.max_id().map_or(1, |id| id.get());
        let mut pixels = Vec::with_capacity(capacity);
        for row in snapshot.rows() {
            let line: Vec<Rgb> = row
                .iter()
                .flat_map(|&raw| std::iter::repeat(cell_colour(raw, max_id)).take(factor))
                .collect();
            for _ in 0..factor {
                pixels.extend_from_slice(&line);
            }
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Pixels in row-major order, top to bottom.
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Colour of the pixel at `(x, y)`, if inside the image.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Serialises the image as a PPM pixel dump.
    pub fn write_ppm<W>(&self, format: PixelFormat, writer: W) -> io::Result<()>
    where
        W: Write,
    {
        ppm::write(self, format, writer)
    }
}

fn cell_colour(raw: i32, max_id: u32) -> Rgb {
    match CellStatus::from_raw(raw) {
        Some(CellStatus::Claimed(id)) => Rgb::for_explorer(id.get(), max_id),
        Some(CellStatus::Open) => Rgb::OPEN,
        Some(CellStatus::Wall) | None => Rgb::WALL,
    }
}

/// Writes the grid to `path` as a plain PPM image.
pub fn export_image(grid: &Grid, path: impl AsRef<Path>, scale: u32) -> Result<(), ExportError> {
    export_image_as(grid, path, scale, PixelFormat::Plain)
}

/// Writes the grid to `path` as a PPM image in the provided format.
///
/// The image is rendered before the file is created, so invalid arguments
/// never leave a file behind.
pub fn export_image_as(
    grid: &Grid,
    path: impl AsRef<Path>,
    scale: u32,
    format: PixelFormat,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let image = Image::render(&grid.snapshot(), scale)?;
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    image.write_ppm(format, &mut writer).map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "exported maze image"
    );
    Ok(())
}
