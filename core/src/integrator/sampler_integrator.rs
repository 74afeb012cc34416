//! Sampler Integrator

use super::*;
use crate::app::create_progress_bar;
use crate::camera::*;
use crate::film::FilmTile;
use crate::geometry::*;
use crate::pbrt::*;
use crate::sampler::*;
use crate::spectrum::*;
use bumpalo::Bump;

/// Common data for sampler integrators.
pub struct SamplerIntegratorData {
    /// Supplies camera samples and the sample values used by integrators.
    /// Each tile renders with its own clone.
    pub sampler: ArcSampler,

    /// The camera.
    pub camera: ArcCamera,

    /// Pixels that are rendered.
    pub pixel_bounds: Bounds2i,
}

impl SamplerIntegratorData {
    /// Create a new `SamplerIntegratorData`.
    ///
    /// * `camera`       - The camera.
    /// * `sampler`      - The sampler.
    /// * `pixel_bounds` - Pixels that are rendered.
    pub fn new(camera: ArcCamera, sampler: ArcSampler, pixel_bounds: Bounds2i) -> Self {
        Self {
            sampler,
            camera,
            pixel_bounds,
        }
    }
}

/// Renders by tracing a camera ray for every sample the `Sampler` produces
/// and estimating the radiance arriving along it.
pub trait SamplerIntegrator: Integrator + Send + Sync {
    /// Returns the common data.
    fn get_data(&self) -> &SamplerIntegratorData;

    /// Returns the incident radiance at the origin of a ray.
    ///
    /// * `ray`     - The ray.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    /// * `arena`   - Allocator for scattering functions of this sample.
    fn li(&self, ray: &mut Ray, scene: &Scene, sampler: &mut dyn Sampler, arena: &Bump) -> Spectrum;

    /// Renders the scene in parallel tiles and writes the image.
    ///
    /// * `scene`   - The scene.
    /// * `options` - Rendering options.
    fn render(&self, scene: &Scene, options: &Options) -> Result<(), String> {
        let film = self.get_data().camera.get_film();

        let sample_bounds = film.get_sample_bounds();
        let sample_extent = sample_bounds.diagonal();
        let tile_size = options.tile_size.max(1) as Int;
        let n_tiles = Point2i::new(
            (sample_extent.x + tile_size - 1) / tile_size,
            (sample_extent.y + tile_size - 1) / tile_size,
        );
        let tile_count = (n_tiles.x.max(0) * n_tiles.y.max(0)) as usize;
        let n_threads = options.threads();

        info!("Rendering {}x{} tiles on {} threads", n_tiles.x, n_tiles.y, n_threads);

        let progress = create_progress_bar(tile_count as u64, options.quiet);
        progress.set_message("Rendering scene");

        crossbeam::scope(|scope| {
            let (tx, rx) = crossbeam_channel::bounded(n_threads);

            for _ in 0..n_threads {
                let rxc = rx.clone();
                let progress = &progress;
                let film = &film;
                scope.spawn(move |_| {
                    let mut arena = Bump::new();
                    for tile_idx in rxc.iter() {
                        let film_tile = self.render_tile(
                            tile_idx,
                            &n_tiles,
                            tile_size,
                            scene,
                            &sample_bounds,
                            &mut arena,
                        );
                        film.merge_film_tile(&film_tile);
                        progress.inc(1);
                    }
                    crate::report_stats!();
                });
            }
            drop(rx);

            for tile_idx in 0..tile_count {
                if tx.send(tile_idx).is_err() {
                    break;
                }
            }
        })
        .map_err(|_| String::from("A rendering thread panicked"))?;

        progress.finish_with_message("Render complete");

        film.write_image()
    }

    /// Renders one image tile.
    ///
    /// * `tile_idx`      - Tile index in scanline order.
    /// * `n_tiles`       - Number of tiles along x and y.
    /// * `tile_size`     - Width and height of a tile in pixels.
    /// * `scene`         - The scene.
    /// * `sample_bounds` - Bounds of pixels that are sampled.
    /// * `arena`         - Per-thread allocator, reset after every sample.
    fn render_tile(
        &self,
        tile_idx: usize,
        n_tiles: &Point2i,
        tile_size: Int,
        scene: &Scene,
        sample_bounds: &Bounds2i,
        arena: &mut Bump,
    ) -> FilmTile {
        let tile_x = tile_idx as Int % n_tiles.x;
        let tile_y = tile_idx as Int / n_tiles.x;

        let data = self.get_data();
        let camera = &data.camera;
        let mut sampler = data.sampler.clone_sampler(tile_idx as u64);

        let x0 = sample_bounds.p_min.x + tile_x * tile_size;
        let x1 = (x0 + tile_size).min(sample_bounds.p_max.x);
        let y0 = sample_bounds.p_min.y + tile_y * tile_size;
        let y1 = (y0 + tile_size).min(sample_bounds.p_max.y);
        let tile_bounds = Bounds2i::new(Point2i::new(x0, y0), Point2i::new(x1, y1));

        info!("Starting image tile ({}, {}) -> {}", tile_x, tile_y, tile_bounds);

        let mut film_tile = camera.get_film().get_film_tile(&tile_bounds);

        for pixel in tile_bounds {
            sampler.start_pixel(&pixel);

            // Checked after `start_pixel()` so random number consumption does
            // not depend on the pixel bounds.
            if !data.pixel_bounds.contains_exclusive(&pixel) {
                continue;
            }

            loop {
                let camera_sample = sampler.get_camera_sample(&pixel);
                let (mut ray, ray_weight) = camera.generate_ray(&camera_sample);

                let mut l = if ray_weight > 0.0 {
                    self.li(&mut ray, scene, &mut *sampler, arena)
                } else {
                    Spectrum::new(0.0)
                };

                let sample_index = sampler.get_data().current_pixel_sample_index;
                if l.has_nans() {
                    error!(
                        "Not-a-number radiance value returned for pixel ({}, {}), sample {}. Setting to black.",
                        pixel.x, pixel.y, sample_index
                    );
                    l = Spectrum::new(0.0);
                } else if l.y() < -1e-5 {
                    error!(
                        "Negative luminance value, {}, returned for pixel ({}, {}), sample {}. Setting to black.",
                        l.y(),
                        pixel.x,
                        pixel.y,
                        sample_index
                    );
                    l = Spectrum::new(0.0);
                } else if l.has_infs() {
                    error!(
                        "Infinite luminance value returned for pixel ({}, {}), sample {}. Setting to black.",
                        pixel.x, pixel.y, sample_index
                    );
                    l = Spectrum::new(0.0);
                }

                film_tile.add_sample(&camera_sample.p_film, &(l * ray_weight));
                arena.reset();

                if !sampler.start_next_sample() {
                    break;
                }
            }
        }

        info!("Finished image tile ({}, {}) -> {}", tile_x, tile_y, tile_bounds);

        film_tile
    }
}
