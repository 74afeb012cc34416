//! Image Texture

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use volpath_core::error::*;
use volpath_core::interaction::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::spectrum::*;
use volpath_core::texture::*;

/// Handling of texture coordinates outside [0, 1].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageWrap {
    Repeat,
    Black,
    Clamp,
}

impl ImageWrap {
    /// Parses a wrap mode. Returns `None` for unknown names.
    ///
    /// * `name` - The name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "repeat" => Some(Self::Repeat),
            "black" => Some(Self::Black),
            "clamp" => Some(Self::Clamp),
            _ => None,
        }
    }
}

/// Texel reconstruction filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageFilter {
    Point,
    Bilinear,
}

impl ImageFilter {
    /// Parses a filter name. Returns `None` for unknown names. Filters that
    /// need a MIP pyramid reconstruct bilinearly from the base level.
    ///
    /// * `name` - The name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "point" => Some(Self::Point),
            "bilinear" | "trilinear" | "ewa" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

/// Linear RGB texels with the first row at the bottom of the image.
pub struct TexelImage {
    /// Width in texels.
    pub width: usize,

    /// Height in texels.
    pub height: usize,

    /// Texels in row-major order.
    pub texels: Vec<Spectrum>,
}

/// Atomic reference counted `TexelImage`.
pub type ArcTexelImage = Arc<TexelImage>;

lazy_static! {
    /// Images already loaded, keyed by path and gamma decoding.
    static ref IMAGE_CACHE: Mutex<HashMap<(String, bool), ArcTexelImage>> = Mutex::new(HashMap::new());
}

/// Converts an sRGB encoded value to linear.
///
/// * `v` - Encoded value in [0, 1].
fn inverse_gamma_correct(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

impl TexelImage {
    /// Create a new `TexelImage`. Rows are given bottom to top.
    ///
    /// * `width`  - Width in texels.
    /// * `height` - Height in texels.
    /// * `texels` - Texels in row-major order.
    pub fn new(width: usize, height: usize, texels: Vec<Spectrum>) -> Self {
        Self { width, height, texels }
    }

    /// Loads an image file through the cache.
    ///
    /// * `path`  - Image path.
    /// * `gamma` - Decode sRGB values to linear.
    pub fn load(path: &str, gamma: bool) -> Result<ArcTexelImage, String> {
        let key = (path.to_string(), gamma);
        let mut cache = match IMAGE_CACHE.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(img) = cache.get(&key) {
            return Ok(Arc::clone(img));
        }

        let img = image::open(path).map_err(|e| format!("Unable to read image '{}': {}", path, e))?;
        let rgb = img.to_rgb32f();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        if width == 0 || height == 0 {
            return Err(format!("Image '{}' is empty", path));
        }
        info!("Read image '{}' ({} x {})", path, width, height);

        let mut texels = Vec::with_capacity(width * height);
        // Flip so that t = 0 is the bottom row.
        for y in (0..height).rev() {
            for x in 0..width {
                let p = rgb.get_pixel(x as u32, y as u32);
                let c = |v: f32| if gamma { inverse_gamma_correct(v) } else { v };
                texels.push(Spectrum::rgb(c(p[0]), c(p[1]), c(p[2])));
            }
        }

        let img = Arc::new(Self::new(width, height, texels));
        cache.insert(key, Arc::clone(&img));
        Ok(img)
    }

    /// Returns a texel, applying the wrap mode to out of range coordinates.
    ///
    /// * `x`    - Column.
    /// * `y`    - Row.
    /// * `wrap` - Wrap mode.
    pub fn texel(&self, x: i64, y: i64, wrap: ImageWrap) -> Spectrum {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y) = match wrap {
            ImageWrap::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            ImageWrap::Clamp => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
            ImageWrap::Black => {
                if x < 0 || x >= w || y < 0 || y >= h {
                    return Spectrum::new(0.0);
                }
                (x, y)
            }
        };
        self.texels[(y * w + x) as usize]
    }

    /// Reconstructs the image at continuous coordinates in [0, 1]^2.
    ///
    /// * `s`      - Horizontal coordinate.
    /// * `t`      - Vertical coordinate, 0 at the bottom.
    /// * `filter` - Reconstruction filter.
    /// * `wrap`   - Wrap mode.
    pub fn lookup(&self, s: Float, t: Float, filter: ImageFilter, wrap: ImageWrap) -> Spectrum {
        let x = s * self.width as Float;
        let y = t * self.height as Float;
        match filter {
            ImageFilter::Point => self.texel(x.floor() as i64, y.floor() as i64, wrap),
            ImageFilter::Bilinear => {
                let (x, y) = (x - 0.5, y - 0.5);
                let (x0, y0) = (x.floor(), y.floor());
                let (dx, dy) = (x - x0, y - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);
                self.texel(x0, y0, wrap) * ((1.0 - dx) * (1.0 - dy))
                    + self.texel(x0 + 1, y0, wrap) * (dx * (1.0 - dy))
                    + self.texel(x0, y0 + 1, wrap) * ((1.0 - dx) * dy)
                    + self.texel(x0 + 1, y0 + 1, wrap) * (dx * dy)
            }
        }
    }
}

/// Implements a texture backed by an image file.
pub struct ImageTexture {
    /// 2D mapping.
    mapping: ArcTextureMapping2D,

    /// The texels.
    image: ArcTexelImage,

    /// Reconstruction filter.
    filter: ImageFilter,

    /// Wrap mode.
    wrap: ImageWrap,

    /// Scale for the texel values.
    scale: Float,

    /// Return one minus the texel value.
    invert: bool,
}

impl ImageTexture {
    /// Create a new `ImageTexture`.
    ///
    /// * `mapping` - The 2D mapping.
    /// * `image`   - The texels.
    /// * `filter`  - Reconstruction filter.
    /// * `wrap`    - Wrap mode.
    /// * `scale`   - Scale for the texel values.
    /// * `invert`  - Return one minus the texel value.
    pub fn new(
        mapping: ArcTextureMapping2D,
        image: ArcTexelImage,
        filter: ImageFilter,
        wrap: ImageWrap,
        scale: Float,
        invert: bool,
    ) -> Self {
        Self {
            mapping,
            image,
            filter,
            wrap,
            scale,
            invert,
        }
    }

    /// Returns the scaled texel value at a surface point.
    ///
    /// * `si` - The surface interaction.
    fn value(&self, si: &SurfaceInteraction) -> Spectrum {
        let st = self.mapping.map(si);
        let v = self.image.lookup(st.x, st.y, self.filter, self.wrap) * self.scale;
        if self.invert {
            (Spectrum::new(1.0) - v).clamp(0.0, INFINITY)
        } else {
            v
        }
    }
}

impl Texture<Spectrum> for ImageTexture {
    fn evaluate(&self, si: &SurfaceInteraction) -> Spectrum {
        self.value(si)
    }
}

impl Texture<Float> for ImageTexture {
    fn evaluate(&self, si: &SurfaceInteraction) -> Float {
        self.value(si).average()
    }
}

/// Builds an `ImageTexture` from texture parameters. Unknown filter and wrap
/// names are reported as warnings and replaced with bilinear filtering and
/// repeat.
///
/// * `tp`       - Texture parameters.
/// * `reporter` - Error reporter.
fn image_texture_from_params(tp: &TextureParams, reporter: &ErrorReporter) -> Result<ImageTexture, String> {
    let mapping = get_texture_mapping_2d(tp, reporter);

    let filter_name = tp.find_string("filter", String::from("bilinear"));
    let filter = ImageFilter::parse(&filter_name).unwrap_or_else(|| {
        reporter.warning(&format!("{}: filter function unknown", filter_name));
        ImageFilter::Bilinear
    });

    let wrap_name = tp.find_string("wrap", String::from("repeat"));
    let wrap = ImageWrap::parse(&wrap_name).unwrap_or_else(|| {
        reporter.warning(&format!("{}: wrap mode unknown", wrap_name));
        ImageWrap::Repeat
    });

    let scale = tp.find_float("scale", 1.0);
    let invert = tp.find_bool("invert", false);
    let filename = tp.find_string("filename", String::new());
    let lower = filename.to_lowercase();
    let gamma = tp.find_bool("gamma", lower.ends_with(".tga") || lower.ends_with(".png"));

    let image = TexelImage::load(&filename, gamma)?;
    Ok(ImageTexture::new(mapping, image, filter, wrap, scale, invert))
}

/// Returns a reference counted floating point `ImageTexture`.
///
/// * `tp`       - Texture parameters.
/// * `reporter` - Error reporter.
pub fn create_image_float_texture(tp: &TextureParams, reporter: &ErrorReporter) -> Result<ArcTexture<Float>, String> {
    Ok(Arc::new(image_texture_from_params(tp, reporter)?))
}

/// Returns a reference counted spectrum `ImageTexture`.
///
/// * `tp`       - Texture parameters.
/// * `reporter` - Error reporter.
pub fn create_image_spectrum_texture(
    tp: &TextureParams,
    reporter: &ErrorReporter,
) -> Result<ArcTexture<Spectrum>, String> {
    Ok(Arc::new(image_texture_from_params(tp, reporter)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use volpath_core::geometry::*;

    fn checker() -> TexelImage {
        TexelImage::new(
            2,
            2,
            vec![
                Spectrum::new(0.0),
                Spectrum::new(1.0),
                Spectrum::new(1.0),
                Spectrum::new(0.0),
            ],
        )
    }

    #[test]
    fn wrap_modes() {
        let img = checker();
        assert_eq!(img.texel(2, 0, ImageWrap::Repeat)[0], 0.0);
        assert_eq!(img.texel(-1, 0, ImageWrap::Repeat)[0], 1.0);
        assert_eq!(img.texel(5, 0, ImageWrap::Clamp)[0], 1.0);
        assert!(img.texel(-1, 0, ImageWrap::Black).is_black());
    }

    #[test]
    fn bilinear_blends_at_texel_corners() {
        let img = checker();
        let v = img.lookup(0.5, 0.5, ImageFilter::Bilinear, ImageWrap::Clamp);
        assert!(approx_eq!(Float, v[0], 0.5, epsilon = 1e-6));
        let p = img.lookup(0.25, 0.25, ImageFilter::Point, ImageWrap::Clamp);
        assert_eq!(p[0], 0.0);
    }

    #[test]
    fn unknown_names_fall_back() {
        assert_eq!(ImageWrap::parse("mirror"), None);
        assert_eq!(ImageFilter::parse("gaussian"), None);
        assert_eq!(ImageFilter::parse("ewa"), Some(ImageFilter::Bilinear));
    }

    #[test]
    fn loads_png_with_warnings_for_unknown_modes() {
        let path = std::env::temp_dir().join("volpath_imagemap_test.png");
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 255, 255]));
        img.put_pixel(1, 0, image::Rgb([0, 0, 0]));
        img.save(&path).unwrap();

        let reporter = ErrorReporter::new(false);
        let tp = TextureParams::new(
            ParamSet::new()
                .add_string("filename", path.to_str().unwrap())
                .add_string("wrap", "mirror")
                .add_string("filter", "point"),
            Default::default(),
            Default::default(),
        );
        let tex = create_image_spectrum_texture(&tp, &reporter).unwrap();
        assert_eq!(reporter.last_message().as_deref(), Some("mirror: wrap mode unknown"));

        let mut si = SurfaceInteraction::default();
        si.uv = Point2f::new(0.25, 0.5);
        assert!(approx_eq!(Float, tex.evaluate(&si)[0], 1.0, epsilon = 1e-5));
        // Repeat wraps back to the first column.
        si.uv = Point2f::new(1.25, 0.5);
        assert!(approx_eq!(Float, tex.evaluate(&si)[1], 1.0, epsilon = 1e-5));
        si.uv = Point2f::new(0.75, 0.5);
        assert!(tex.evaluate(&si).is_black());
    }

    #[test]
    fn missing_file_is_an_error() {
        let reporter = ErrorReporter::new(true);
        let tp = TextureParams::new(
            ParamSet::new().add_string("filename", "/nonexistent/texture.png"),
            Default::default(),
            Default::default(),
        );
        assert!(create_image_float_texture(&tp, &reporter).is_err());
    }
}
