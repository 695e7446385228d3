use lt_core::{DiskWindow, Error, Image, ImageView, ensure_same_dims};
use rayon::prelude::*;

use crate::mean::local_mean_into;

/// Mean and standard deviation grids computed over the same disk windows.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalStats {
    pub mean: Image<f64>,
    pub std_dev: Image<f64>,
}

/// Computes the full mean grid, then the standard deviation grid from it.
pub fn local_stats(src: &ImageView<'_, f64>, radius: usize) -> LocalStats {
    let mut mean = Image::new_fill(src.width(), src.height(), 0.0f64);
    local_mean_into(src, radius, &mut mean);

    let mut std_dev = Image::new_fill(src.width(), src.height(), 0.0f64);
    local_std_dev_into(src, &mean.as_view(), radius, &mut std_dev);

    LocalStats { mean, std_dev }
}

/// Local population standard deviation over the disk window of every pixel.
///
/// Each member `(w, h)` contributes its deviation from its *own* local mean,
/// `(src(w, h) - mean(w, h))^2`, not from the mean at the window center. The
/// sum is divided by the member count (population variance) before taking
/// the square root.
///
/// `mean` must be the complete [`local_mean`](crate::local_mean) grid of `src`
/// for the same `radius`, since members read it away from the center.
pub fn local_std_dev(
    src: &ImageView<'_, f64>,
    mean: &ImageView<'_, f64>,
    radius: usize,
) -> Result<Image<f64>, Error> {
    ensure_same_dims(src.dims(), mean.dims())?;
    let mut dst = Image::new_fill(src.width(), src.height(), 0.0f64);
    local_std_dev_into(src, mean, radius, &mut dst);
    Ok(dst)
}

fn local_std_dev_into(
    src: &ImageView<'_, f64>,
    mean: &ImageView<'_, f64>,
    radius: usize,
    dst: &mut Image<f64>,
) {
    debug_assert_eq!(src.dims(), mean.dims());
    debug_assert_eq!(dst.dims(), src.dims());
    if src.is_empty() {
        return;
    }

    tracing::trace!(
        width = src.width(),
        height = src.height(),
        radius,
        "computing local standard deviation"
    );

    let width = src.width();
    dst.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for (x, out) in dst_row.iter_mut().enumerate() {
                *out = std_dev_at(src, mean, x, y, radius);
            }
        });
}

#[inline]
fn std_dev_at(
    src: &ImageView<'_, f64>,
    mean: &ImageView<'_, f64>,
    x: usize,
    y: usize,
    radius: usize,
) -> f64 {
    let win = DiskWindow::new(x, y, radius, src.width(), src.height());
    let mut sum_sq = 0.0f64;
    let mut count = 0usize;
    win.for_each_member(|w, h| {
        let diff = src.row(h)[w] - mean.row(h)[w];
        sum_sq += diff * diff;
        count += 1;
    });
    (sum_sq / count as f64).sqrt()
}
