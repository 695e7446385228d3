use lt_core::{DiskWindow, Image, ImageView};
use rayon::prelude::*;

/// Local mean over the disk window of every pixel.
///
/// `mean(x, y)` is the arithmetic mean of `src` over the members of
/// [`DiskWindow::new(x, y, radius, ..)`](DiskWindow::new). Cost is
/// `O(width * height * radius^2)`. An empty input yields an empty output.
pub fn local_mean(src: &ImageView<'_, f64>, radius: usize) -> Image<f64> {
    let mut dst = Image::new_fill(src.width(), src.height(), 0.0f64);
    local_mean_into(src, radius, &mut dst);
    dst
}

pub(crate) fn local_mean_into(src: &ImageView<'_, f64>, radius: usize, dst: &mut Image<f64>) {
    debug_assert_eq!(dst.dims(), src.dims());
    if src.is_empty() {
        return;
    }

    tracing::trace!(
        width = src.width(),
        height = src.height(),
        radius,
        "computing local mean"
    );

    let width = src.width();
    dst.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for (x, out) in dst_row.iter_mut().enumerate() {
                *out = mean_at(src, x, y, radius);
            }
        });
}

#[inline]
fn mean_at(src: &ImageView<'_, f64>, x: usize, y: usize, radius: usize) -> f64 {
    let win = DiskWindow::new(x, y, radius, src.width(), src.height());
    let mut sum = 0.0f64;
    let mut count = 0usize;
    win.for_each_member(|w, h| {
        sum += src.row(h)[w];
        count += 1;
    });
    // The center is always a member, so `count >= 1`.
    sum / count as f64
}
