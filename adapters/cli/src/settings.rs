use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use maze_solver_core::Position;
use maze_solver_export::PixelFormat;
use serde::Deserialize;

/// Settings file looked up in the working directory.
pub(crate) const DEFAULT_SETTINGS_PATH: &str = "maze-solver.toml";

/// Driver settings. Every key is optional; missing keys keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Rows of the generated maze.
    pub(crate) height: u32,
    /// Columns of the generated maze.
    pub(crate) width: u32,
    /// Seed shared by generation and start selection.
    pub(crate) seed: Option<u64>,
    /// Worker threads used to run explorer waves.
    pub(crate) threads: Option<usize>,
    /// Maze description to load instead of generating one.
    pub(crate) maze: Option<PathBuf>,
    /// Start cell as `[row, column]`; random when absent.
    pub(crate) start: Option<[u32; 2]>,
    /// Destination of the exported image.
    pub(crate) output: PathBuf,
    /// Pixels per cell along each axis.
    pub(crate) scale: u32,
    /// PPM flavour written to `output`.
    pub(crate) format: ImageFormat,
    /// Whether the solved board is printed.
    pub(crate) print_board: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            height: 41,
            width: 41,
            seed: None,
            threads: None,
            maze: None,
            start: None,
            output: PathBuf::from("maze.ppm"),
            scale: 16,
            format: ImageFormat::Plain,
            print_board: true,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents)
                .with_context(|| format!("invalid settings in {}", path.display())),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => {
                Err(error).with_context(|| format!("failed to read settings at {}", path.display()))
            }
        }
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        if settings.scale == 0 {
            bail!("scale must be at least 1");
        }
        if settings.threads == Some(0) {
            bail!("threads must be at least 1 when set");
        }
        Ok(settings)
    }

    /// Start cell requested by the settings, if any.
    pub(crate) fn start_position(&self) -> Option<Position> {
        self.start.map(|[row, column]| Position::new(row, column))
    }
}

/// Serialised name of a [`PixelFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ImageFormat {
    Plain,
    Raw,
}

impl From<ImageFormat> for PixelFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Plain => PixelFormat::Plain,
            ImageFormat::Raw => PixelFormat::Raw,
        }
    }
}
