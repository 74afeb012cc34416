//! Interface Material

use bumpalo::Bump;
use std::sync::Arc;
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::reflection::*;

/// Marks the boundary between two participating media. Rays pass straight
/// through it.
#[derive(Copy, Clone, Default)]
pub struct InterfaceMaterial;

impl Material for InterfaceMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        _si: &SurfaceInteraction,
        _arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        ScatteringFunctions::default()
    }
}

/// Returns a reference counted `InterfaceMaterial`.
pub fn create_interface_material() -> ArcMaterial {
    Arc::new(InterfaceMaterial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn has_no_scattering_functions() {
        let arena = Bump::new();
        let sf = InterfaceMaterial.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        assert!(sf.bsdf.is_none());
        assert!(sf.bssrdf.is_none());
    }
}
