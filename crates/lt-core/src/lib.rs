//! Foundational primitives for local adaptive thresholding.
//!
//! ## Grids
//! [`Image`] owns a row-major grid; [`ImageView`] borrows one, possibly with
//! a row stride larger than its width. Pixel `(x, y)` is column `x`, row `y`.
//! Intensity and statistic grids use `f64` so intermediate averages are not
//! truncated.
//!
//! ## Disk Windows
//! [`DiskWindow`] is the single neighborhood policy shared by every local
//! statistic: a disk of radius `r`, clipped by a bounding box that is clamped
//! at the lower edges but never re-centered. See its docs for the exact rule.

mod error;
mod image;
mod window;

pub use error::Error;
pub use image::{
    Image, ImageView, ensure_same_dims, min_max, normalize_to_u8, to_f64, to_u8_saturating,
};
pub use window::DiskWindow;
