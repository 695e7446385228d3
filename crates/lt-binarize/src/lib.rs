//! Sauvola-style local adaptive binarization.
//!
//! Per pixel, with local mean `m` and local standard deviation `s` taken over
//! a disk window of radius `r` (see [`lt_stats`]):
//!
//! ```text
//! t = m * (1 + k * (s / R - 1)),   R = 128
//! out = 0 if intensity <= t else 255
//! ```
//!
//! [`compute_threshold`] is the single synchronous entry point. Front ends
//! that want the intermediate grids use [`SauvolaBinarizer::run_with_maps`].

mod binarize;
mod pipeline;
mod threshold;

pub use binarize::{BACKGROUND, FOREGROUND, binarize};
pub use pipeline::{SauvolaBinarizer, SauvolaMaps, binarize_u8, compute_threshold};
pub use threshold::{SAUVOLA_DYNAMIC_RANGE, SauvolaParams, sauvola_threshold, sauvola_threshold_at};
