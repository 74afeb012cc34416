//! Spectrum

mod rgb_spectrum;

// Re-export
pub use rgb_spectrum::*;

/// Spectral quantities are carried as linear RGB triples.
pub type Spectrum = RGBSpectrum;
