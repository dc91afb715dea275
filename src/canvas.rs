use std::io::{ self, Write, BufWriter };
use std::fs::File;
use std::path::Path;

use crate::color::Color;

/// Maximum line length of a PPM file.
const PPM_LINE_WIDTH: usize = 70;

/// A canvas for drawing pixels.
///
/// This structure mostly stores the results of the ray tracer. Once the user
/// specifies the desired image width and height, the `Camera` generates rays
/// which are cast onto a `World`'s objects.
///
/// The canvas stores the resultant colors for each pixel ray. Once execution
/// finishes, the `Canvas` can be used to save the pixels to an image file.
///
/// For now, only PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector, row by row.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Saves a canvas to a PPM file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Every channel is scaled to 255, rounded and clamped. Each row of the
    /// image starts on a new line, and no line exceeds 70 columns; values which
    /// would pass the 70 column mark are moved to the next line over.
    ///
    /// ```
    /// # use whitted_tracer::canvas::Canvas;
    /// # use whitted_tracer::color::Color;
    /// let mut canvas = Canvas::new(2, 1);
    /// canvas.write_pixel(1, 0, &Color::rgb(1.0, 0.5, 2.0));
    ///
    /// let mut ppm = Vec::new();
    /// canvas.write_ppm(&mut ppm).unwrap();
    /// assert_eq!(String::from_utf8(ppm).unwrap(),
    ///     "P3\n2 1\n255\n0 0 0 255 128 255\n");
    /// ```
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?; // Maximum color value

        if self.width == 0 {
            return Ok(());
        }

        for row in self.pixels.chunks(self.width) {
            let mut col = 0;

            for pixel in row.iter() {
                for channel in [pixel.r, pixel.g, pixel.b].iter() {
                    let value = Self::scale_channel(*channel).to_string();

                    if col == 0 {
                        write!(out, "{}", value)?;
                        col = value.len();
                    } else if col + 1 + value.len() > PPM_LINE_WIDTH {
                        write!(out, "\n{}", value)?;
                        col = value.len();
                    } else {
                        write!(out, " {}", value)?;
                        col += 1 + value.len();
                    }
                }
            }

            writeln!(out)?;
        }

        Ok(())
    }

    fn scale_channel(c: f64) -> u8 {
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel, and `x` is the column. Rows
    /// and columns are zero-indexed.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use whitted_tracer::color::Color;
    /// # use whitted_tracer::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Copies a whole row of colors onto the canvas, starting at column 0.
    ///
    /// Colors past the canvas width, and rows past the canvas height, are
    /// ignored.
    pub fn write_row(&mut self, y: usize, row: &[Color]) {
        for (x, pixel) in row.iter().enumerate() {
            self.write_pixel(x, y, pixel);
        }
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Pixels are specified in row-column order, where `y` is the row of the
    /// pixel, and `x` is the column. If the specified pixel location is
    /// out-of-bounds, `None` is returned by this function.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }
}

#[cfg(test)]
fn ppm_of(canvas: &Canvas) -> String {
    let mut out = Vec::new();
    canvas.write_ppm(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y), Some(Color::black()));
        }
    }
}

#[test]
fn out_of_bounds_pixels() {
    let mut c = Canvas::new(4, 3);
    c.write_pixel(4, 0, &Color::red());
    c.write_pixel(0, 3, &Color::red());

    assert_eq!(c, Canvas::new(4, 3));
    assert_eq!(c.read_pixel(4, 0), None);
    assert_eq!(c.read_pixel(0, 3), None);
}

#[test]
fn writing_rows() {
    let mut c = Canvas::new(3, 2);
    c.write_row(1, &[Color::red(), Color::green(), Color::blue(), Color::white()]);

    assert_eq!(c.read_pixel(0, 0), Some(Color::black()));
    assert_eq!(c.read_pixel(0, 1), Some(Color::red()));
    assert_eq!(c.read_pixel(1, 1), Some(Color::green()));
    assert_eq!(c.read_pixel(2, 1), Some(Color::blue()));
}

#[test]
fn ppm_header() {
    let ppm = ppm_of(&Canvas::new(5, 3));
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(&lines[0..3], &["P3", "5 3", "255"]);
}

#[test]
fn ppm_pixel_data() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let ppm = ppm_of(&c);
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(lines[3], "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0");
    assert_eq!(lines[4], "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0");
    assert_eq!(lines[5], "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255");
}

#[test]
fn ppm_splits_long_lines() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        c.write_row(y, &[Color::rgb(1.0, 0.8, 0.6); 10]);
    }

    let ppm = ppm_of(&c);
    let lines: Vec<&str> = ppm.lines().collect();

    let first = "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204";
    let second = "153 255 204 153 255 204 153 255 204 153 255 204 153";
    assert_eq!(&lines[3..7], &[first, second, first, second]);
    assert!(lines.iter().all(|l| l.len() <= 70));
}

#[test]
fn ppm_ends_with_newline() {
    let ppm = ppm_of(&Canvas::new(5, 3));

    assert!(ppm.ends_with('\n'));
}
