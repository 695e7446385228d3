//! Umbrella crate for the `localthresh` workspace.
//!
//! Re-exports the grid primitives, the local statistic engines and the
//! Sauvola binarization pipeline.
//!
//! ```
//! use localthresh::{Image, compute_threshold};
//!
//! let img = Image::from_vec(3, 1, vec![10.0, 200.0, 10.0]).unwrap();
//! let out = compute_threshold(&img.as_view(), 1, 0.2).unwrap();
//! assert!(out.data().iter().all(|&v| v == 0.0 || v == 255.0));
//! ```

pub use lt_binarize::*;
pub use lt_core::*;
pub use lt_stats::*;
