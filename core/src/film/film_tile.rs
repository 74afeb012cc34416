//! Film Tile

use super::*;

/// Pixel contributions of one image tile rendered by a single thread.
pub struct FilmTile {
    /// Bounding box of the pixels in the tile.
    pixel_bounds: Bounds2i,

    /// The pixels.
    pixels: Vec<Pixel>,
}

impl FilmTile {
    /// Create a new `FilmTile`.
    ///
    /// * `pixel_bounds` - Bounding box of the pixels in the tile.
    pub fn new(pixel_bounds: Bounds2i) -> Self {
        let n = pixel_bounds.area().max(0) as usize;
        Self {
            pixel_bounds,
            pixels: vec![Pixel::default(); n],
        }
    }

    /// Adds a radiance sample to the pixel containing `p_film`. Samples
    /// outside the tile are ignored.
    ///
    /// * `p_film` - Continuous film position.
    /// * `l`      - Radiance.
    pub fn add_sample(&mut self, p_film: &Point2f, l: &Spectrum) {
        let p = Point2i::new(p_film.x.floor() as Int, p_film.y.floor() as Int);
        if !self.pixel_bounds.contains_exclusive(&p) {
            return;
        }
        let offset = self.get_pixel_offset(&p);
        let pixel = &mut self.pixels[offset];
        for c in 0..RGB_SAMPLES {
            pixel.rgb[c] += l[c];
        }
        pixel.weight_sum += 1.0;
    }

    /// Returns the pixel storage offset.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    fn get_pixel_offset(&self, p: &Point2i) -> usize {
        let width = self.pixel_bounds.p_max.x - self.pixel_bounds.p_min.x;
        ((p.x - self.pixel_bounds.p_min.x) + (p.y - self.pixel_bounds.p_min.y) * width) as usize
    }

    /// Returns a pixel inside the tile.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    pub fn get_pixel(&self, p: &Point2i) -> &Pixel {
        &self.pixels[self.get_pixel_offset(p)]
    }

    /// Returns the bounds of the tile.
    pub fn get_pixel_bounds(&self) -> Bounds2i {
        self.pixel_bounds
    }
}
