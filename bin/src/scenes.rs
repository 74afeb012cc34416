//! Built-in Scenes

use cameras::*;
use itertools::iproduct;
use lights::*;
use materials::*;
use media::*;
use samplers::*;
use shapes::*;
use std::sync::Arc;
use textures::*;
use volpath_core::app::Options;
use volpath_core::camera::*;
use volpath_core::error::*;
use volpath_core::film::Film;
use volpath_core::geometry::*;
use volpath_core::light::*;
use volpath_core::material::*;
use volpath_core::medium::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::primitives::*;
use volpath_core::sampler::*;
use volpath_core::scene::*;
use volpath_core::spectrum::*;
use volpath_core::texture::*;

/// Names of the built-in scenes.
pub const SCENES: [&str; 6] = ["spheres", "fog", "coated", "glass", "hair", "skin"];

/// Image resolution of every built-in scene.
const RESOLUTION: (Int, Int) = (400, 300);

/// A scene ready to render.
pub struct SceneDescription {
    /// The geometry and lights.
    pub scene: Scene,

    /// The camera.
    pub camera: ArcCamera,

    /// The sampler.
    pub sampler: ArcSampler,

    /// Integrator parameters.
    pub integrator_params: ParamSet,
}

/// Camera placement.
struct View {
    from: Point3f,
    to: Point3f,
    fov: Float,
    medium: Option<ArcMedium>,
    random_sampler: bool,
}

impl View {
    fn new(from: Point3f, to: Point3f, fov: Float) -> Self {
        Self {
            from,
            to,
            fov,
            medium: None,
            random_sampler: false,
        }
    }

    /// Use independent random samples instead of the Halton sequence.
    fn with_random_sampler(mut self) -> Self {
        self.random_sampler = true;
        self
    }
}

/// Accumulates primitives, lights and named textures.
struct SceneBuilder {
    primitives: Vec<ArcPrimitive>,
    lights: Vec<ArcLight>,
    float_textures: FloatTextureMap,
    spectrum_textures: SpectrumTextureMap,
    reporter: ArcErrorReporter,
    seed: Int,
}

impl SceneBuilder {
    fn new(reporter: ArcErrorReporter, seed: Int) -> Self {
        Self {
            primitives: vec![],
            lights: vec![],
            float_textures: FloatTextureMap::new(),
            spectrum_textures: SpectrumTextureMap::new(),
            reporter,
            seed,
        }
    }

    /// Wraps material parameters with the named textures defined so far.
    fn tex_params(&self, params: ParamSet) -> TextureParams {
        TextureParams::new(params, self.float_textures.clone(), self.spectrum_textures.clone())
    }

    /// Defines a bilinearly interpolated spectrum texture.
    fn bilerp_texture(&mut self, name: &str, corners: [[Float; 3]; 4], scale: Float) {
        let params = ParamSet::new()
            .add_rgb("v00", &corners[0])
            .add_rgb("v01", &corners[1])
            .add_rgb("v10", &corners[2])
            .add_rgb("v11", &corners[3])
            .add_float("uscale", &[scale])
            .add_float("vscale", &[scale]);
        let tex = create_bilerp_spectrum_texture(&self.tex_params(params), &self.reporter);
        self.spectrum_textures.insert(String::from(name), tex);
    }

    /// Defines a bilinearly interpolated float texture.
    fn bilerp_float_texture(&mut self, name: &str, corners: [Float; 4]) {
        let params = ParamSet::new()
            .add_float("v00", &[corners[0]])
            .add_float("v01", &[corners[1]])
            .add_float("v10", &[corners[2]])
            .add_float("v11", &[corners[3]]);
        let tex = create_bilerp_float_texture(&self.tex_params(params), &self.reporter);
        self.float_textures.insert(String::from(name), tex);
    }

    /// Layered materials hash their random walks with the render seed.
    fn layered(&self, params: ParamSet) -> TextureParams {
        self.tex_params(params.add_int("seed", &[self.seed]))
    }

    fn sphere(
        &mut self,
        center: Point3f,
        radius: Float,
        material: Option<ArcMaterial>,
        medium_interface: MediumInterface,
    ) {
        let shape = create_sphere(
            &ParamSet::new()
                .add_point3f("center", &[center])
                .add_float("radius", &[radius]),
        );
        self.primitives
            .push(Arc::new(GeometricPrimitive::new(shape, material, None, medium_interface)));
    }

    fn emitter(&mut self, center: Point3f, radius: Float, l: Spectrum) {
        let shape = create_sphere(
            &ParamSet::new()
                .add_point3f("center", &[center])
                .add_float("radius", &[radius]),
        );
        let light = create_diffuse_area_light(
            &ParamSet::new().add_spectrum("L", &[l]),
            Arc::clone(&shape),
            MediumInterface::default(),
        );
        let black = create_diffuse_material(&self.tex_params(ParamSet::new().add_rgb("reflectance", &[0.0, 0.0, 0.0])));
        self.lights.push(Arc::clone(&light));
        self.primitives.push(Arc::new(GeometricPrimitive::new(
            shape,
            Some(black),
            Some(light),
            MediumInterface::default(),
        )));
    }

    fn ground(&mut self, material: ArcMaterial) {
        self.sphere(
            Point3f::new(0.0, -1000.0, 0.0),
            1000.0,
            Some(material),
            MediumInterface::default(),
        );
    }

    fn sky(&mut self, l: Float) {
        self.lights
            .push(create_infinite_light(&ParamSet::new().add_spectrum("L", &[Spectrum::new(l)])));
    }

    fn sun(&mut self, from: Point3f, l: Float) {
        self.lights.push(create_distant_light(
            &ParamSet::new()
                .add_point3f("from", &[from])
                .add_point3f("to", &[Point3f::zero()])
                .add_spectrum("L", &[Spectrum::new(l)]),
        ));
    }

    fn build(self) -> Scene {
        info!(
            "Built scene with {} primitives and {} lights",
            self.primitives.len(),
            self.lights.len()
        );
        Scene::new(Arc::new(PrimitiveList::new(self.primitives)), self.lights)
    }
}

/// Builds a built-in scene with its camera, sampler and integrator
/// parameters.
///
/// * `options`  - Rendering options.
/// * `reporter` - Reports configuration problems.
pub fn build_scene(options: &Options, reporter: ArcErrorReporter) -> Result<SceneDescription, String> {
    let mut builder = SceneBuilder::new(Arc::clone(&reporter), options.seed as Int);
    let view = match options.scene.as_str() {
        "spheres" => spheres(&mut builder)?,
        "fog" => fog(&mut builder),
        "coated" => coated(&mut builder),
        "glass" => glass(&mut builder),
        "hair" => hair(&mut builder),
        "skin" => skin(&mut builder)?,
        name => {
            return Err(format!(
                "Unknown scene '{}'. Expected one of {}.",
                name,
                SCENES.join(", ")
            ))
        }
    };
    let scene = builder.build();

    let film = Film::new(&Point2i::new(RESOLUTION.0, RESOLUTION.1), &options.image_file);
    let camera_params = ParamSet::new()
        .add_point3f("from", &[view.from])
        .add_point3f("to", &[view.to])
        .add_vector3f("up", &[Vector3f::new(0.0, 1.0, 0.0)])
        .add_float("fov", &[view.fov]);
    let random_sampler = view.random_sampler;
    let camera = create_perspective_camera(&camera_params, film, view.medium);

    let mut sampler_params = ParamSet::new();
    if let Some(spp) = options.spp {
        sampler_params = sampler_params.add_int("pixelsamples", &[spp as Int]);
    }
    let sampler = if random_sampler {
        create_random_sampler(&sampler_params, options.seed as u64)
    } else {
        create_halton_sampler(&sampler_params, camera.get_film().get_sample_bounds(), reporter)
    };

    let mut integrator_params = ParamSet::new();
    if let Some(max_depth) = options.max_depth {
        integrator_params = integrator_params.add_int("maxdepth", &[max_depth]);
    }

    Ok(SceneDescription {
        scene,
        camera,
        sampler,
        integrator_params,
    })
}

/// A grid of spheres showing most materials on a checkered floor.
fn spheres(b: &mut SceneBuilder) -> Result<View, String> {
    b.bilerp_texture(
        "floor",
        [[0.8, 0.8, 0.8], [0.2, 0.3, 0.4], [0.4, 0.3, 0.2], [0.8, 0.8, 0.8]],
        4.0,
    );
    let floor = create_diffuse_material(&b.tex_params(ParamSet::new().add_texture("reflectance", "floor")));
    b.ground(floor);

    let materials: Vec<ArcMaterial> = vec![
        create_diffuse_material(&b.tex_params(ParamSet::new().add_rgb("reflectance", &[0.7, 0.2, 0.2]))),
        create_diffuse_material(&b.tex_params(
            ParamSet::new()
                .add_rgb("reflectance", &[0.2, 0.7, 0.2])
                .add_float("sigma", &[20.0]),
        )),
        create_conductor_material(&b.tex_params(ParamSet::new())),
        create_conductor_material(&b.tex_params(
            ParamSet::new()
                .add_rgb("reflectance", &[0.95, 0.75, 0.3])
                .add_float("roughness", &[0.2]),
        )),
        create_dielectric_material(&b.tex_params(ParamSet::new())),
        create_thin_dielectric_material(&b.tex_params(ParamSet::new())),
        create_coated_diffuse_material(&b.layered(
            ParamSet::new()
                .add_rgb("reflectance", &[0.1, 0.2, 0.6])
                .add_float("roughness", &[0.0]),
        )),
        create_coated_conductor_material(&b.layered(ParamSet::new().add_float("interface.roughness", &[0.05]))),
        create_measured_material(&b.tex_params(ParamSet::new()))?,
    ];

    for ((i, j), material) in iproduct!(0..3, 0..3).zip(materials.into_iter()) {
        let center = Point3f::new(-1.2 + 1.2 * i as Float, 0.4, -1.2 + 1.2 * j as Float);
        b.sphere(center, 0.4, Some(material), MediumInterface::default());
    }

    b.sun(Point3f::new(1.0, 3.0, -2.0), 2.5);
    b.sky(0.3);
    Ok(View::new(Point3f::new(0.0, 2.5, -5.5), Point3f::new(0.0, 0.3, 0.0), 40.0))
}

/// A diffuse sphere inside a ball of scattering fog lit from within.
fn fog(b: &mut SceneBuilder) -> View {
    let fog = create_homogeneous_medium(
        &ParamSet::new()
            .add_rgb("sigma_a", &[0.05, 0.05, 0.05])
            .add_rgb("sigma_s", &[0.3, 0.35, 0.4])
            .add_float("g", &[0.3]),
    );

    let boundary = create_interface_material();
    b.sphere(
        Point3f::zero(),
        4.0,
        Some(boundary),
        MediumInterface::new(Some(Arc::clone(&fog)), None),
    );

    let white = create_diffuse_material(&b.tex_params(ParamSet::new().add_rgb("reflectance", &[0.8, 0.8, 0.8])));
    b.sphere(
        Point3f::zero(),
        0.8,
        Some(white),
        MediumInterface::new(None, Some(Arc::clone(&fog))),
    );

    b.lights.push(create_point_light(
        &ParamSet::new()
            .add_point3f("from", &[Point3f::new(1.5, 1.5, -1.0)])
            .add_spectrum("I", &[Spectrum::rgb(8.0, 6.0, 4.0)]),
        Some(fog),
    ));
    b.sun(Point3f::new(-1.0, 2.0, -1.0), 1.0);
    View::new(Point3f::new(0.0, 0.5, -9.0), Point3f::zero(), 45.0).with_random_sampler()
}

/// Coated diffuse spheres of increasing roughness and slab albedo.
fn coated(b: &mut SceneBuilder) -> View {
    b.bilerp_texture(
        "paint",
        [[0.7, 0.1, 0.1], [0.1, 0.1, 0.7], [0.7, 0.6, 0.1], [0.1, 0.6, 0.2]],
        1.0,
    );
    b.bilerp_float_texture("streaks", [0.0, 0.4, 0.4, 0.0]);
    let floor = create_coated_conductor_material(&b.layered(
        ParamSet::new()
            .add_texture("interface.roughness", "streaks")
            .add_rgb("conductor.reflectance", &[0.6, 0.6, 0.6]),
    ));
    b.ground(floor);

    for (i, (roughness, albedo)) in [(0.0, 0.0), (0.1, 0.3), (0.3, 0.8)].iter().enumerate() {
        let material = create_coated_diffuse_material(&b.layered(
            ParamSet::new()
                .add_texture("reflectance", "paint")
                .add_float("roughness", &[*roughness])
                .add_rgb("albedo", &[*albedo, *albedo, *albedo])
                .add_float("thickness", &[0.05]),
        ));
        let center = Point3f::new(-1.5 + 1.5 * i as Float, 0.6, 0.0);
        b.sphere(center, 0.6, Some(material), MediumInterface::default());
    }

    b.emitter(Point3f::new(0.0, 4.0, -1.0), 0.8, Spectrum::new(8.0));
    b.sky(0.1);
    View::new(Point3f::new(0.0, 1.5, -5.0), Point3f::new(0.0, 0.5, 0.0), 45.0)
}

/// Smooth, rough and thin glass under a spherical area light.
fn glass(b: &mut SceneBuilder) -> View {
    b.bilerp_texture(
        "floor",
        [[0.9, 0.9, 0.9], [0.1, 0.1, 0.1], [0.1, 0.1, 0.1], [0.9, 0.9, 0.9]],
        8.0,
    );
    let floor = create_diffuse_material(&b.tex_params(ParamSet::new().add_texture("reflectance", "floor")));
    b.ground(floor);

    let materials = [
        create_dielectric_material(&b.tex_params(ParamSet::new())),
        create_dielectric_material(&b.tex_params(ParamSet::new().add_float("roughness", &[0.1]))),
        create_thin_dielectric_material(&b.tex_params(ParamSet::new().add_float("eta", &[1.33]))),
    ];
    for (i, material) in materials.into_iter().enumerate() {
        let center = Point3f::new(-1.4 + 1.4 * i as Float, 0.6, 0.0);
        b.sphere(center, 0.6, Some(material), MediumInterface::default());
    }

    b.emitter(Point3f::new(2.0, 5.0, -2.0), 1.0, Spectrum::new(10.0));
    View::new(Point3f::new(0.0, 1.2, -5.0), Point3f::new(0.0, 0.5, 0.0), 45.0)
}

/// Hair fibers of different pigmentation wrapped onto spheres.
fn hair(b: &mut SceneBuilder) -> View {
    let floor = create_diffuse_material(&b.tex_params(ParamSet::new().add_rgb("reflectance", &[0.4, 0.4, 0.4])));
    b.ground(floor);

    let materials = [
        create_hair_material(&b.tex_params(ParamSet::new().add_float("eumelanin", &[0.3]))),
        create_hair_material(&b.tex_params(ParamSet::new())),
        create_hair_material(&b.tex_params(ParamSet::new().add_float("eumelanin", &[8.0]))),
        create_hair_material(&b.tex_params(ParamSet::new().add_rgb("reflectance", &[0.8, 0.2, 0.1]))),
    ];
    for (i, material) in materials.into_iter().enumerate() {
        let center = Point3f::new(-1.8 + 1.2 * i as Float, 0.5, 0.0);
        b.sphere(center, 0.5, Some(material), MediumInterface::default());
    }

    b.sun(Point3f::new(0.5, 2.0, -1.5), 3.0);
    b.sky(0.2);
    View::new(Point3f::new(0.0, 1.0, -5.0), Point3f::new(0.0, 0.4, 0.0), 45.0).with_random_sampler()
}

/// Translucent subsurface spheres next to a measured BRDF.
fn skin(b: &mut SceneBuilder) -> Result<View, String> {
    let floor = create_diffuse_material(&b.tex_params(ParamSet::new().add_rgb("reflectance", &[0.5, 0.5, 0.5])));
    b.ground(floor);

    let materials = [
        create_subsurface_material(&b.tex_params(
            ParamSet::new()
                .add_rgb("reflectance", &[0.8, 0.5, 0.4])
                .add_rgb("mfp", &[0.08, 0.04, 0.02]),
        )),
        create_subsurface_material(&b.tex_params(
            ParamSet::new()
                .add_float("scale", &[10.0])
                .add_float("roughness", &[0.05]),
        )),
        create_measured_material(&b.tex_params(ParamSet::new()))?,
    ];
    for (i, material) in materials.into_iter().enumerate() {
        let center = Point3f::new(-1.4 + 1.4 * i as Float, 0.6, 0.0);
        b.sphere(center, 0.6, Some(material), MediumInterface::default());
    }

    b.emitter(Point3f::new(-2.0, 4.0, -2.0), 0.8, Spectrum::new(10.0));
    b.sky(0.1);
    Ok(View::new(Point3f::new(0.0, 1.2, -5.0), Point3f::new(0.0, 0.5, 0.0), 45.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(scene: &str) -> Options {
        Options {
            scene: String::from(scene),
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn builds_every_scene() {
        for name in SCENES.iter() {
            let reporter = Arc::new(ErrorReporter::new(true));
            let desc = build_scene(&options(name), reporter);
            assert!(desc.is_ok(), "scene '{}' failed", name);
            let desc = desc.unwrap();
            assert!(!desc.scene.lights.is_empty());
            assert!(!desc.scene.world_bound.is_empty());
        }
    }

    #[test]
    fn unknown_scene_is_an_error() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let err = build_scene(&options("teapot"), reporter).err();
        assert!(err.map_or(false, |e| e.contains("Unknown scene 'teapot'")));
    }

    #[test]
    fn overrides_reach_sampler_and_integrator() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let mut opts = options("spheres");
        opts.spp = Some(2);
        opts.max_depth = Some(3);
        let desc = build_scene(&opts, reporter).unwrap();
        assert_eq!(desc.sampler.get_data().samples_per_pixel, 2);
        assert_eq!(desc.integrator_params.find_one_int("maxdepth", 5), 3);
    }
}
