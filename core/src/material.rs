//! Material

use crate::bssrdf::TabulatedBSSRDF;
use crate::interaction::*;
use crate::reflection::{TransportMode, BSDF};
use bumpalo::boxed::Box as BumpBox;
use bumpalo::Bump;
use std::sync::Arc;

/// Scattering functions of a surface point. Both live in the per-sample
/// arena.
#[derive(Default)]
pub struct ScatteringFunctions<'arena> {
    /// Surface scattering. `None` for surfaces that only separate media.
    pub bsdf: Option<BumpBox<'arena, BSDF>>,

    /// Subsurface scattering.
    pub bssrdf: Option<BumpBox<'arena, TabulatedBSSRDF>>,
}

impl<'arena> ScatteringFunctions<'arena> {
    /// Allocates a BSDF without subsurface scattering.
    ///
    /// * `arena` - The arena.
    /// * `bsdf`  - The BSDF.
    pub fn with_bsdf(arena: &'arena Bump, bsdf: BSDF) -> Self {
        Self {
            bsdf: Some(BumpBox::new_in(bsdf, arena)),
            bssrdf: None,
        }
    }

    /// Allocates a BSDF together with a BSSRDF.
    ///
    /// * `arena`  - The arena.
    /// * `bsdf`   - The BSDF.
    /// * `bssrdf` - The BSSRDF.
    pub fn with_bssrdf(arena: &'arena Bump, bsdf: BSDF, bssrdf: TabulatedBSSRDF) -> Self {
        Self {
            bsdf: Some(BumpBox::new_in(bsdf, arena)),
            bssrdf: Some(BumpBox::new_in(bssrdf, arena)),
        }
    }
}

/// Material trait provides common behavior.
pub trait Material {
    /// Evaluates textures at a surface point and returns its scattering
    /// functions.
    ///
    /// * `si`    - The surface interaction.
    /// * `arena` - Per-sample allocator.
    /// * `mode`  - Transport mode.
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        mode: TransportMode,
    ) -> ScatteringFunctions<'arena>;
}

/// Atomic reference counted `Material`.
pub type ArcMaterial = Arc<dyn Material + Send + Sync>;
