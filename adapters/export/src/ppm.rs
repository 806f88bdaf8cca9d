use std::io::{self, Write};

use crate::Image;

const MAX_CHANNEL_VALUE: u8 = u8::MAX;

/// PPM flavour used when serialising an [`Image`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// `P3`: ASCII samples, one image row per line.
    #[default]
    Plain,
    /// `P6`: binary samples.
    Raw,
}

impl PixelFormat {
    const fn magic(self) -> &'static str {
        match self {
            Self::Plain => "P3",
            Self::Raw => "P6",
        }
    }
}

pub(crate) fn write<W>(image: &Image, format: PixelFormat, mut writer: W) -> io::Result<()>
where
    W: Write,
{
    write!(
        writer,
        "{}\n{} {}\n{}\n",
        format.magic(),
        image.width(),
        image.height(),
        MAX_CHANNEL_VALUE
    )?;

    match format {
        PixelFormat::Plain => {
            for row in image.pixels().chunks(image.width().max(1)) {
                let line = row
                    .iter()
                    .map(|pixel| format!("{} {} {}", pixel.red, pixel.green, pixel.blue))
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(writer, "{line}")?;
            }
        }
        PixelFormat::Raw => {
            let bytes: Vec<u8> = image
                .pixels()
                .iter()
                .flat_map(|pixel| [pixel.red, pixel.green, pixel.blue])
                .collect();
            writer.write_all(&bytes)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_solver_grid::Grid;

    fn two_by_two() -> Image {
        let grid = Grid::from_rows(&[[-1, 0], [0, -1]]).expect("rows");
        Image::render(&grid.snapshot(), 1).expect("rendered")
    }

    #[test]
    fn plain_dump_has_header_and_ascii_rows() {
        let mut out = Vec::new();
        write(&two_by_two(), PixelFormat::Plain, &mut out).expect("written");

        let text = String::from_utf8(out).expect("ascii");
        assert_eq!(
            text,
            "P3\n2 2\n255\n0 0 0 255 255 255\n255 255 255 0 0 0\n"
        );
    }

    #[test]
    fn raw_dump_has_three_bytes_per_pixel() {
        let mut out = Vec::new();
        write(&two_by_two(), PixelFormat::Raw, &mut out).expect("written");

        let header = b"P6\n2 2\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(
            &out[header.len()..],
            &[0, 0, 0, 255, 255, 255, 255, 255, 255, 0, 0, 0]
        );
    }
}
