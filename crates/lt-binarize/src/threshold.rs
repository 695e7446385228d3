use core::ops::RangeInclusive;

use lt_core::{Error, Image, ImageView, ensure_same_dims};
use rayon::prelude::*;

/// Assumed maximum standard deviation of 8-bit grayscale data (`R`).
pub const SAUVOLA_DYNAMIC_RANGE: f64 = 128.0;

/// Tuning parameters of the Sauvola threshold.
///
/// `radius` sets the disk window size, `k` how strongly local contrast moves
/// the threshold away from the local mean. Any finite `k` is accepted;
/// [`SauvolaParams::ADVISORY_K_RANGE`] is guidance only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SauvolaParams {
    pub radius: usize,
    pub k: f64,
}

impl Default for SauvolaParams {
    fn default() -> Self {
        Self { radius: 5, k: 0.2 }
    }
}

impl SauvolaParams {
    pub const ADVISORY_K_RANGE: RangeInclusive<f64> = 0.2..=0.5;

    /// Validates user-facing parameters. The radius is signed so that
    /// negative input is reported instead of being unrepresentable.
    pub fn new(radius: i64, k: f64) -> Result<Self, Error> {
        if radius < 0 {
            return Err(Error::InvalidParameter("radius must be non-negative"));
        }
        let radius = usize::try_from(radius)
            .map_err(|_| Error::InvalidParameter("radius does not fit in usize"))?;
        let params = Self { radius, k };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.k.is_finite() {
            return Err(Error::InvalidParameter("k must be finite"));
        }
        Ok(())
    }

    pub fn k_in_advisory_range(&self) -> bool {
        Self::ADVISORY_K_RANGE.contains(&self.k)
    }
}

/// Sauvola threshold of a single pixel, without clamping.
#[inline]
pub fn sauvola_threshold_at(mean: f64, std_dev: f64, k: f64) -> f64 {
    mean * (1.0 + k * (std_dev / SAUVOLA_DYNAMIC_RANGE - 1.0))
}

/// Per-pixel `mean * (1 + k * (std_dev / R - 1))`.
///
/// The result is not clamped and may leave `[0, 255]` for extreme `k` or
/// deviation; that only decides which side of the comparison a pixel falls on.
pub fn sauvola_threshold(
    mean: &ImageView<'_, f64>,
    std_dev: &ImageView<'_, f64>,
    k: f64,
) -> Result<Image<f64>, Error> {
    ensure_same_dims(mean.dims(), std_dev.dims())?;

    let mut dst = Image::new_fill(mean.width(), mean.height(), 0.0f64);
    if mean.is_empty() {
        return Ok(dst);
    }

    let width = mean.width();
    dst.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let mean_row = mean.row(y);
            let std_row = std_dev.row(y);
            for ((out, &m), &s) in dst_row.iter_mut().zip(mean_row).zip(std_row) {
                *out = sauvola_threshold_at(m, s, k);
            }
        });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use lt_core::{Error, Image};

    use super::{SAUVOLA_DYNAMIC_RANGE, SauvolaParams, sauvola_threshold, sauvola_threshold_at};

    #[test]
    fn zero_deviation_scales_mean_by_one_minus_k() {
        let mean = Image::from_vec(3, 1, vec![0.0, 100.0, 255.0]).expect("valid image");
        let std_dev = Image::new_fill(3, 1, 0.0f64);
        let t = sauvola_threshold(&mean.as_view(), &std_dev.as_view(), 0.3).expect("same dims");
        for (got, &m) in t.data().iter().zip(mean.data()) {
            assert_eq!(*got, m * (1.0 - 0.3));
        }
    }

    #[test]
    fn deviation_at_dynamic_range_returns_mean() {
        assert_eq!(sauvola_threshold_at(90.0, SAUVOLA_DYNAMIC_RANGE, 0.4), 90.0);
    }

    #[test]
    fn result_is_not_clamped() {
        assert_relative_eq!(sauvola_threshold_at(200.0, 256.0, 1.0), 400.0);
        assert!(sauvola_threshold_at(200.0, 0.0, 3.0) < 0.0);
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let mean = Image::new_fill(2, 2, 1.0f64);
        let std_dev = Image::new_fill(2, 3, 1.0f64);
        let err = sauvola_threshold(&mean.as_view(), &std_dev.as_view(), 0.2)
            .expect_err("dims differ");
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn params_validation() {
        assert_eq!(
            SauvolaParams::new(0, 0.2),
            Ok(SauvolaParams { radius: 0, k: 0.2 })
        );
        assert_eq!(
            SauvolaParams::new(-1, 0.2),
            Err(Error::InvalidParameter("radius must be non-negative"))
        );
        assert_eq!(
            SauvolaParams::new(3, f64::NAN),
            Err(Error::InvalidParameter("k must be finite"))
        );
        assert!(SauvolaParams::new(3, f64::INFINITY).is_err());

        let loose = SauvolaParams::new(3, 1.5).expect("out-of-range k is tolerated");
        assert!(!loose.k_in_advisory_range());
        assert!(SauvolaParams::default().k_in_advisory_range());
    }
}
