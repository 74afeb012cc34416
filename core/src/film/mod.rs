//! Film

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::sync::Mutex;

mod film_tile;

// Re-export.
pub use film_tile::*;

/// Accumulated radiance of one pixel.
#[derive(Copy, Clone, Default)]
pub struct Pixel {
    /// Running sum of sample contributions.
    pub rgb: [Float; RGB_SAMPLES],

    /// Number of samples that landed in the pixel.
    pub weight_sum: Float,
}

/// The image sensor. Samples are accumulated with a box filter that covers
/// exactly one pixel.
pub struct Film {
    /// The overall image resolution in pixels.
    pub full_resolution: Point2i,

    /// Filename of output image.
    pub filename: String,

    /// Pixels that are rendered and stored.
    pub cropped_pixel_bounds: Bounds2i,

    /// Stores the image pixels.
    pixels: Mutex<Vec<Pixel>>,
}

impl Film {
    /// Create a new `Film` covering the whole image.
    ///
    /// * `resolution` - The overall image resolution in pixels.
    /// * `filename`   - Filename of output image.
    pub fn new(resolution: &Point2i, filename: &str) -> Self {
        let cropped_pixel_bounds = Bounds2i::new(Point2i::new(0, 0), *resolution);
        let n = cropped_pixel_bounds.area() as usize;
        Self {
            full_resolution: *resolution,
            filename: String::from(filename),
            cropped_pixel_bounds,
            pixels: Mutex::new(vec![Pixel::default(); n]),
        }
    }

    /// Returns the bounds of pixel coordinates that camera samples are taken
    /// in.
    pub fn get_sample_bounds(&self) -> Bounds2i {
        self.cropped_pixel_bounds
    }

    /// Returns the storage index of a pixel.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    fn get_pixel_offset(&self, p: &Point2i) -> usize {
        let width = self.cropped_pixel_bounds.p_max.x - self.cropped_pixel_bounds.p_min.x;
        ((p.x - self.cropped_pixel_bounds.p_min.x) + (p.y - self.cropped_pixel_bounds.p_min.y) * width) as usize
    }

    /// Returns a `FilmTile` for a region of sample coordinates.
    ///
    /// * `sample_bounds` - Tile region in the overall image.
    pub fn get_film_tile(&self, sample_bounds: &Bounds2i) -> FilmTile {
        FilmTile::new(sample_bounds.intersect(&self.cropped_pixel_bounds))
    }

    /// Adds the contributions of a `FilmTile` into the image.
    ///
    /// * `tile` - The `FilmTile` to merge.
    pub fn merge_film_tile(&self, tile: &FilmTile) {
        let mut pixels = match self.pixels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for p in tile.get_pixel_bounds() {
            let src = tile.get_pixel(&p);
            let dst = &mut pixels[self.get_pixel_offset(&p)];
            for c in 0..RGB_SAMPLES {
                dst.rgb[c] += src.rgb[c];
            }
            dst.weight_sum += src.weight_sum;
        }
    }

    /// Returns the filtered RGB value of a pixel.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    pub fn get_pixel_rgb(&self, p: &Point2i) -> [Float; RGB_SAMPLES] {
        let pixels = match self.pixels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let pixel = pixels[self.get_pixel_offset(p)];
        resolve(&pixel)
    }

    /// Writes the image as an 8-bit sRGB PNG to `filename`.
    pub fn write_image(&self) -> Result<(), String> {
        info!("Converting image to RGB and computing final pixel values");

        let width = (self.cropped_pixel_bounds.p_max.x - self.cropped_pixel_bounds.p_min.x) as u32;
        let height = (self.cropped_pixel_bounds.p_max.y - self.cropped_pixel_bounds.p_min.y) as u32;

        let pixels = match self.pixels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut img = image::RgbImage::new(width, height);
        for (pixel, out) in pixels.iter().zip(img.pixels_mut()) {
            let rgb = resolve(pixel);
            *out = image::Rgb([to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2])]);
        }

        info!("Writing image {} with bounds {}", self.filename, self.cropped_pixel_bounds);
        img.save(&self.filename)
            .map_err(|err| format!("Could not write {}. {}", self.filename, err))
    }
}

/// Divides the running sum by the number of samples.
///
/// * `pixel` - The pixel.
fn resolve(pixel: &Pixel) -> [Float; RGB_SAMPLES] {
    if pixel.weight_sum == 0.0 {
        return [0.0; RGB_SAMPLES];
    }
    let inv_wt = 1.0 / pixel.weight_sum;
    [
        (pixel.rgb[0] * inv_wt).max(0.0),
        (pixel.rgb[1] * inv_wt).max(0.0),
        (pixel.rgb[2] * inv_wt).max(0.0),
    ]
}

/// Converts a linear value to an 8-bit sRGB value.
///
/// * `v` - Linear value.
fn to_byte(v: Float) -> u8 {
    clamp(255.0 * gamma_correct(v) + 0.5, 0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn merged_tiles_average_their_samples() {
        let film = Film::new(&Point2i::new(4, 2), "test.png");
        let mut tile = film.get_film_tile(&Bounds2i::new(Point2i::new(0, 0), Point2i::new(2, 2)));
        tile.add_sample(&Point2f::new(1.25, 0.5), &Spectrum::new(1.0));
        tile.add_sample(&Point2f::new(1.75, 0.25), &Spectrum::rgb(0.0, 0.5, 1.0));
        film.merge_film_tile(&tile);

        let rgb = film.get_pixel_rgb(&Point2i::new(1, 0));
        assert!(approx_eq!(Float, rgb[0], 0.5));
        assert!(approx_eq!(Float, rgb[1], 0.75));
        assert!(approx_eq!(Float, rgb[2], 1.0));
        assert_eq!(film.get_pixel_rgb(&Point2i::new(0, 0)), [0.0; 3]);
    }

    #[test]
    fn tiles_are_clipped_to_the_image() {
        let film = Film::new(&Point2i::new(4, 2), "test.png");
        let tile = film.get_film_tile(&Bounds2i::new(Point2i::new(2, 0), Point2i::new(6, 4)));
        let b = tile.get_pixel_bounds();
        assert_eq!(b.p_max, Point2i::new(4, 2));
        assert_eq!(b.area(), 4);
    }

    #[test]
    fn srgb_encoding() {
        assert_eq!(to_byte(0.0), 0);
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(4.0), 255);
        assert!((187..=189).contains(&to_byte(0.5)));
    }
}
