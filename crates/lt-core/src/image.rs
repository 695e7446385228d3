use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }
}

/// Borrowed, possibly strided, read-only view over a grid.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        if stride < width {
            return Err(Error::InvalidStride);
        }

        let min_len = min_required_len(width, height, stride).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < min_len {
            return Err(Error::SizeMismatch {
                expected: min_len,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.stride + x;
        self.data.get(idx)
    }
}

/// Fails with [`Error::DimensionMismatch`] unless both grids have the same shape.
pub fn ensure_same_dims(expected: (usize, usize), actual: (usize, usize)) -> Result<(), Error> {
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }

    let rows_before_last = height.checked_sub(1)?;
    let base = rows_before_last.checked_mul(stride)?;
    base.checked_add(width)
}

/// Converts 8-bit luma samples into an `f64` intensity grid in `[0, 255]`.
pub fn to_f64(img: &ImageView<'_, u8>) -> Image<f64> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        for &px in img.row(y) {
            out.push(f64::from(px));
        }
    }

    Image {
        width: img.width(),
        height: img.height(),
        data: out,
    }
}

/// Rounds to the nearest integer and saturates into `[0, 255]`.
///
/// NaN maps to 0.
pub fn to_u8_saturating(img: &ImageView<'_, f64>) -> Image<u8> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        for &v in img.row(y) {
            // `as` saturates and maps NaN to zero.
            out.push(v.round().clamp(0.0, 255.0) as u8);
        }
    }

    Image {
        width: img.width(),
        height: img.height(),
        data: out,
    }
}

/// Returns `(min, max)` over all finite samples, or `None` if there are none.
pub fn min_max(img: &ImageView<'_, f64>) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for y in 0..img.height() {
        for &v in img.row(y) {
            if !v.is_finite() {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
    }
    range
}

/// Min-max stretches a statistic grid into `[0, 255]` for visualization.
///
/// A constant (or entirely non-finite) grid maps to all zeros.
pub fn normalize_to_u8(img: &ImageView<'_, f64>) -> Image<u8> {
    let len = img.width() * img.height();
    let Some((lo, hi)) = min_max(img) else {
        return Image::new_fill(img.width(), img.height(), 0u8);
    };
    if (hi - lo).abs() < 1e-12 {
        return Image::new_fill(img.width(), img.height(), 0u8);
    }

    let scale = 255.0 / (hi - lo);
    let mut out = Vec::with_capacity(len);
    for y in 0..img.height() {
        for &v in img.row(y) {
            out.push(((v - lo) * scale).round().clamp(0.0, 255.0) as u8);
        }
    }

    Image {
        width: img.width(),
        height: img.height(),
        data: out,
    }
}
