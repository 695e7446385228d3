use lt_core::{Error, Image, ImageView, ensure_same_dims};
use rayon::prelude::*;

pub const BACKGROUND: f64 = 0.0;
pub const FOREGROUND: f64 = 255.0;

/// Emits [`BACKGROUND`] where `src <= threshold` and [`FOREGROUND`] otherwise.
pub fn binarize(
    src: &ImageView<'_, f64>,
    threshold: &ImageView<'_, f64>,
) -> Result<Image<f64>, Error> {
    ensure_same_dims(src.dims(), threshold.dims())?;

    let mut dst = Image::new_fill(src.width(), src.height(), BACKGROUND);
    if src.is_empty() {
        return Ok(dst);
    }

    let width = src.width();
    dst.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let src_row = src.row(y);
            let t_row = threshold.row(y);
            for ((out, &v), &t) in dst_row.iter_mut().zip(src_row).zip(t_row) {
                *out = if v <= t { BACKGROUND } else { FOREGROUND };
            }
        });

    Ok(dst)
}
