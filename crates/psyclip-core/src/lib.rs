//! Psyclip Core - psychoacoustic lookahead clipping
//!
//! This crate limits the peaks of an audio stream to a ceiling while shaping
//! the inevitable distortion so that it stays masked by the signal itself.
//! Processing is frame-based (Hann window, 4× overlap) with a fixed latency
//! and zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Clipper
//!
//! - [`PsyClipper`] - One channel of clipping over any [`RealFft`]
//! - [`Clipper`] - `PsyClipper` on the rustfft backend (`std` only)
//!
//! ## Building Blocks
//!
//! - [`HannWindow`] - Periodic Hann window and its clamped inverse
//! - [`OverlapAddBuffer`] - Sliding input/distortion frames
//! - [`SpreadTable`] - Psychoacoustic spreading rows
//! - [`MarginCurve`] / [`MarginPoint`] - Per-frequency headroom
//! - [`compute_mask_curve`] / [`limit_spectrum`] - Mask construction and enforcement
//!
//! ## Host Interface
//!
//! - [`Effect`] - Object-safe per-sample processor trait
//! - [`SmoothedParam`] - Click-free level changes
//!
//! # no_std Support
//!
//! Everything except the rustfft backend works without `std`. Bring your own
//! [`RealFft`] and disable default features:
//!
//! ```toml
//! [dependencies]
//! psyclip-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use psyclip_core::Clipper;
//!
//! let mut clipper = Clipper::new(48_000, 2048, 1.0).unwrap();
//! let hop = clipper.feed_size();
//!
//! let input = vec![1.5_f32; hop * 8];
//! let mut output = vec![0.0_f32; hop * 8];
//! for (inp, out) in input.chunks_exact(hop).zip(output.chunks_exact_mut(hop)) {
//!     clipper.feed(inp, out, false, None);
//! }
//! ```
//!
//! # Logging
//!
//! With the `tracing` feature, construction and table rebuilds emit `debug!`
//! events. The processing path never logs.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod clipper;
pub mod effect;
pub mod error;
pub mod margin;
pub mod mask;
pub mod math;
pub mod overlap;
pub mod param;
pub mod spread;
pub mod transform;
pub mod window;

pub use clipper::{
    DEFAULT_ADAPTIVE_STRENGTH, DEFAULT_ITERATIONS, MIN_CLIP_LEVEL, MIN_FFT_SIZE, PsyClipper,
    recommended_fft_size,
};
pub use effect::Effect;
pub use error::ClipperError;
pub use margin::{DEFAULT_MARGIN_CURVE, MarginCurve, MarginPoint, margin_db_at};
pub use mask::{compute_mask_curve, limit_spectrum};
pub use math::{db_to_linear, linear_to_db, peak_abs};
pub use overlap::OverlapAddBuffer;
pub use param::{DEFAULT_SMOOTHING_MS, SmoothedParam};
pub use spread::{SpreadRange, SpreadTable, psy_bin_count};
pub use transform::{RealFft, packed_magnitude, scale_packed_bin};
pub use window::{HannWindow, INV_WINDOW_FLOOR, SQUARED_HANN_OVERLAP_GAIN, WindowMode};

#[cfg(feature = "std")]
pub use transform::RustRealFft;

/// [`PsyClipper`] on the rustfft backend.
#[cfg(feature = "std")]
pub type Clipper = PsyClipper<RustRealFft>;
