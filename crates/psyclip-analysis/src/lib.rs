//! Psyclip Analysis - measurement tools for clipper verification
//!
//! Offline helpers used by tests to judge what a clipper did to a signal:
//!
//! - [`fft`] - Analysis windows and a planned FFT
//! - [`spectrum`] - Magnitude spectra, band and harmonic energy
//! - [`dynamics`] - Peak, RMS and crest factor
//! - [`align`] - Delay estimation between input and output
//!
//! None of this is real-time safe; everything allocates.
//!
//! ## Example
//!
//! ```rust
//! use psyclip_analysis::{dynamics, spectrum};
//! use psyclip_analysis::fft::Window;
//!
//! let signal: Vec<f32> = (0..4096)
//!     .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48_000.0).sin())
//!     .collect();
//!
//! assert!((dynamics::crest_factor(&signal) - 2.0_f32.sqrt()).abs() < 0.01);
//! let mags = spectrum::magnitude_spectrum(&signal, 4096, Window::Hann);
//! let centroid = spectrum::spectral_centroid(&mags, 48_000.0);
//! assert!((centroid - 1000.0).abs() < 50.0);
//! ```

pub mod align;
pub mod dynamics;
pub mod fft;
pub mod spectrum;

pub use align::{cross_correlation, estimate_delay};
pub use dynamics::{crest_factor, peak, rms};
pub use fft::{Fft, Window};
pub use spectrum::{
    band_energy, harmonic_energy_ratio, magnitude_spectrum, spectral_centroid, welch_spectrum,
};
