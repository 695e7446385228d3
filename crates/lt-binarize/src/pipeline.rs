use std::time::Instant;

use lt_core::{Error, Image, ImageView, to_f64, to_u8_saturating};
use lt_stats::{LocalStats, local_stats};

use crate::binarize::binarize;
use crate::threshold::{SauvolaParams, sauvola_threshold};

/// Every grid produced by one pipeline run, all with the input's dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct SauvolaMaps {
    pub mean: Image<f64>,
    pub std_dev: Image<f64>,
    pub threshold: Image<f64>,
    pub binary: Image<f64>,
}

/// Local adaptive binarization with fixed, validated parameters.
///
/// Stages run strictly in order: mean, standard deviation, threshold,
/// binarize. Each writes a freshly allocated grid; nothing is kept between
/// runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SauvolaBinarizer {
    params: SauvolaParams,
}

impl SauvolaBinarizer {
    pub fn new(params: SauvolaParams) -> Result<Self, Error> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SauvolaParams {
        &self.params
    }

    pub fn run(&self, src: &ImageView<'_, f64>) -> Result<Image<f64>, Error> {
        Ok(self.run_with_maps(src)?.binary)
    }

    pub fn run_with_maps(&self, src: &ImageView<'_, f64>) -> Result<SauvolaMaps, Error> {
        if src.is_empty() {
            return Err(Error::InvalidInput("image has zero width or height"));
        }

        let SauvolaParams { radius, k } = self.params;
        tracing::debug!(
            width = src.width(),
            height = src.height(),
            radius,
            k,
            "running sauvola binarization"
        );

        let t0 = Instant::now();
        let LocalStats { mean, std_dev } = local_stats(src, radius);
        let t_stats = t0.elapsed();

        let threshold = sauvola_threshold(&mean.as_view(), &std_dev.as_view(), k)?;
        let binary = binarize(src, &threshold.as_view())?;

        tracing::debug!(
            stats_ms = t_stats.as_secs_f64() * 1e3,
            total_ms = t0.elapsed().as_secs_f64() * 1e3,
            "sauvola binarization finished"
        );

        Ok(SauvolaMaps {
            mean,
            std_dev,
            threshold,
            binary,
        })
    }
}

/// Single entry point: binarize `src` with radius `radius` and sensitivity `k`.
///
/// Fails before any computation with [`Error::InvalidParameter`] for a
/// negative radius or non-finite `k`, and with [`Error::InvalidInput`] for a
/// zero-sized grid. The output holds only `0.0` and `255.0` and is
/// bit-identical across calls with the same inputs.
pub fn compute_threshold(
    src: &ImageView<'_, f64>,
    radius: i64,
    k: f64,
) -> Result<Image<f64>, Error> {
    let params = SauvolaParams::new(radius, k)?;
    SauvolaBinarizer::new(params)?.run(src)
}

/// Binarizes 8-bit luma into 8-bit `0`/`255`.
pub fn binarize_u8(src: &ImageView<'_, u8>, params: &SauvolaParams) -> Result<Image<u8>, Error> {
    let grid = to_f64(src);
    let binary = SauvolaBinarizer::new(*params)?.run(&grid.as_view())?;
    Ok(to_u8_saturating(&binary.as_view()))
}
