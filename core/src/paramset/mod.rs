//! Parameter Sets
//!
//! Plug-ins read their configuration from a `ParamSet`, a typed key/value
//! store filled in by whoever builds the scene. Lookups never fail; missing
//! or malformed values fall back to the caller's default.

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::collections::HashMap;
use std::fmt;

mod texture_params;

// Re-export
pub use texture_params::*;

/// A hashmap of parameter values stored by name.
pub type ParamSetMap<T> = HashMap<String, Vec<T>>;

/// Stores named parameter lists of different types.
#[derive(Clone, Default)]
pub struct ParamSet {
    pub bools: ParamSetMap<bool>,
    pub ints: ParamSetMap<Int>,
    pub floats: ParamSetMap<Float>,
    pub point2fs: ParamSetMap<Point2f>,
    pub point3fs: ParamSetMap<Point3f>,
    pub vector3fs: ParamSetMap<Vector3f>,
    pub spectra: ParamSetMap<Spectrum>,
    pub strings: ParamSetMap<String>,
    pub textures: ParamSetMap<String>,
}

/// Generates a builder style function that adds or replaces a parameter.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $map: ident) => {
        pub fn $func(mut self, name: &str, values: &[$t]) -> Self {
            self.$map.insert(String::from(name), values.to_vec());
            self
        }
    };
}

/// Generates a function returning a parameter that holds exactly one value,
/// or the default.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $map: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            match self.$map.get(name) {
                Some(values) if values.len() == 1 => values[0].clone(),
                _ => default,
            }
        }
    };
}

/// Generates a function returning all values of a parameter.
macro_rules! paramset_find {
    ($func: ident, $t: ty, $map: ident) => {
        pub fn $func(&self, name: &str) -> &[$t] {
            self.$map.get(name).map_or(&[], |values| values.as_slice())
        }
    };
}

macro_rules! display_param {
    ($map: expr, $param_type: literal, $f: expr) => {
        let mut names: Vec<&String> = $map.keys().collect();
        names.sort();
        for name in names {
            write!($f, "\"{} {}\" [", $param_type, name)?;
            for v in $map[name].iter() {
                write!($f, " {}", v)?;
            }
            writeln!($f, " ]")?;
        }
    };
}

impl ParamSet {
    /// Returns an empty `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    paramset_find_one!(find_one_bool, bool, bools);
    paramset_find!(find_bool, bool, bools);
    paramset_add!(add_bool, bool, bools);

    paramset_find_one!(find_one_int, Int, ints);
    paramset_find!(find_int, Int, ints);
    paramset_add!(add_int, Int, ints);

    paramset_find_one!(find_one_float, Float, floats);
    paramset_find!(find_float, Float, floats);
    paramset_add!(add_float, Float, floats);

    paramset_find_one!(find_one_point2f, Point2f, point2fs);
    paramset_find!(find_point2f, Point2f, point2fs);
    paramset_add!(add_point2f, Point2f, point2fs);

    paramset_find_one!(find_one_point3f, Point3f, point3fs);
    paramset_find!(find_point3f, Point3f, point3fs);
    paramset_add!(add_point3f, Point3f, point3fs);

    paramset_find_one!(find_one_vector3f, Vector3f, vector3fs);
    paramset_find!(find_vector3f, Vector3f, vector3fs);
    paramset_add!(add_vector3f, Vector3f, vector3fs);

    paramset_find_one!(find_one_spectrum, Spectrum, spectra);
    paramset_find!(find_spectrum, Spectrum, spectra);
    paramset_add!(add_spectrum, Spectrum, spectra);

    paramset_find_one!(find_one_string, String, strings);
    paramset_find!(find_string, String, strings);

    paramset_find_one!(find_one_texture, String, textures);

    /// Add/replace a single string parameter.
    ///
    /// * `name`  - Parameter name.
    /// * `value` - The value.
    pub fn add_string(mut self, name: &str, value: &str) -> Self {
        self.strings
            .insert(String::from(name), vec![String::from(value)]);
        self
    }

    /// Add/replace a reference to a named texture.
    ///
    /// * `name`    - Parameter name.
    /// * `texture` - Name of the texture.
    pub fn add_texture(mut self, name: &str, texture: &str) -> Self {
        self.textures
            .insert(String::from(name), vec![String::from(texture)]);
        self
    }

    /// Add/replace RGB spectra given as consecutive triples.
    ///
    /// * `name`   - Parameter name.
    /// * `values` - RGB values; the length must be a multiple of 3.
    pub fn add_rgb(self, name: &str, values: &[Float]) -> Self {
        if values.len() % 3 != 0 {
            warn!(
                "RGB values for '{}' not a multiple of 3; ignoring {} trailing values",
                name,
                values.len() % 3
            );
        }
        let spectra: Vec<Spectrum> = values
            .chunks_exact(3)
            .map(|c| Spectrum::rgb(c[0], c[1], c[2]))
            .collect();
        self.add_spectrum(name, &spectra)
    }

    /// Returns true if there is a parameter of any type with the given name.
    ///
    /// * `name` - Parameter name.
    pub fn contains(&self, name: &str) -> bool {
        self.bools.contains_key(name)
            || self.ints.contains_key(name)
            || self.floats.contains_key(name)
            || self.point2fs.contains_key(name)
            || self.point3fs.contains_key(name)
            || self.vector3fs.contains_key(name)
            || self.spectra.contains_key(name)
            || self.strings.contains_key(name)
            || self.textures.contains_key(name)
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_param!(self.bools, "bool", f);
        display_param!(self.ints, "integer", f);
        display_param!(self.floats, "float", f);
        display_param!(self.point2fs, "point2", f);
        display_param!(self.point3fs, "point3", f);
        display_param!(self.vector3fs, "vector3", f);
        display_param!(self.spectra, "rgb", f);
        display_param!(self.strings, "string", f);
        display_param!(self.textures, "texture", f);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_one_requires_a_single_value() {
        let ps = ParamSet::new()
            .add_int("maxdepth", &[7])
            .add_int("pixelbounds", &[0, 4, 0, 4]);
        assert_eq!(ps.find_one_int("maxdepth", 5), 7);
        assert_eq!(ps.find_one_int("pixelbounds", 5), 5);
        assert_eq!(ps.find_one_int("missing", 5), 5);
        assert_eq!(ps.find_int("pixelbounds"), &[0, 4, 0, 4]);
        assert!(ps.find_int("missing").is_empty());
    }

    #[test]
    fn rgb_triples_become_spectra() {
        let ps = ParamSet::new().add_rgb("Kd", &[0.1, 0.2, 0.3, 1.0]);
        assert_eq!(ps.find_spectrum("Kd"), &[Spectrum::rgb(0.1, 0.2, 0.3)]);
        assert!(ps.contains("Kd"));
        assert!(!ps.contains("Ks"));
    }

    #[test]
    fn strings_and_textures() {
        let ps = ParamSet::new()
            .add_string("lightsamplestrategy", "power")
            .add_texture("reflectance", "checks");
        assert_eq!(
            ps.find_one_string("lightsamplestrategy", String::from("spatial")),
            "power"
        );
        assert_eq!(ps.find_one_texture("reflectance", String::new()), "checks");
        assert!(format!("{}", ps).contains("\"string lightsamplestrategy\" [ power ]"));
    }
}
