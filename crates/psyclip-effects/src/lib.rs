//! Psyclip Effects - host-facing clipper effect
//!
//! This crate wraps the frame-based engine from `psyclip-core` in the
//! per-sample [`Effect`](psyclip_core::Effect) interface:
//!
//! - [`PsyClip`] - Stereo psychoacoustic clipper with input/output level,
//!   auto level, bypass and a margin-shift meter
//!
//! ## Example
//!
//! ```rust
//! use psyclip_core::Effect;
//! use psyclip_effects::PsyClip;
//!
//! let mut clip = PsyClip::with_default_size(48_000.0).unwrap();
//! clip.set_clip_level_db(-0.5);
//!
//! let input = vec![0.9_f32; 1024];
//! let mut output = vec![0.0_f32; 1024];
//! clip.process_block(&input, &mut output);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod psy_clip;

pub use psy_clip::{CLIP_LEVEL_DB_RANGE, LEVEL_DB_RANGE, MAX_ITERATIONS, PsyClip};
