use core::ops::Range;

/// Disk neighborhood of a pixel, clipped by a clamp-then-clip bounding box.
///
/// The bounding box is computed as
///
/// ```text
/// left   = max(x - r, 0)        right  = min(left + 2r, width)
/// top    = max(y - r, 0)        bottom = min(top + 2r, height)
/// ```
///
/// and is *not* re-centered after `left`/`top` are clamped, and the upper
/// bounds are exclusive. Near the top/left edges the box therefore extends
/// further past the center than it does in the interior, while in the
/// interior the column `x + r` and row `y + r` fall outside of it. A candidate
/// `(w, h)` inside the box is a member when `(x - w)^2 + (y - h)^2 <= r^2`.
///
/// The box always covers the center column and row, so the center pixel is
/// always a member and [`DiskWindow::count`] is at least 1. For `r >= 1` this
/// never changes the box; for `r = 0` it makes the window the single center
/// pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskWindow {
    x: usize,
    y: usize,
    radius_sq: usize,
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

impl DiskWindow {
    /// Builds the window for center `(x, y)` in a `width x height` grid.
    ///
    /// `x < width` and `y < height` are required.
    pub fn new(x: usize, y: usize, radius: usize, width: usize, height: usize) -> Self {
        debug_assert!(x < width && y < height, "window center outside grid");

        let span = radius.saturating_mul(2);
        let left = x.saturating_sub(radius);
        let top = y.saturating_sub(radius);
        let right = left.saturating_add(span).max(x + 1).min(width);
        let bottom = top.saturating_add(span).max(y + 1).min(height);

        Self {
            x,
            y,
            radius_sq: radius.saturating_mul(radius),
            left,
            top,
            right,
            bottom,
        }
    }

    /// Candidate columns `[left, right)`.
    pub fn cols(&self) -> Range<usize> {
        self.left..self.right
    }

    /// Candidate rows `[top, bottom)`.
    pub fn rows(&self) -> Range<usize> {
        self.top..self.bottom
    }

    #[inline]
    pub fn contains(&self, w: usize, h: usize) -> bool {
        if !self.cols().contains(&w) || !self.rows().contains(&h) {
            return false;
        }
        let dx = self.x.abs_diff(w);
        let dy = self.y.abs_diff(h);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)) <= self.radius_sq
    }

    /// Visits every member, column by column and top to bottom within a column.
    ///
    /// Both statistic engines accumulate in this order, so their sums are
    /// reproducible bit for bit.
    #[inline]
    pub fn for_each_member<F: FnMut(usize, usize)>(&self, mut f: F) {
        for w in self.cols() {
            let dx = self.x.abs_diff(w);
            let dx_sq = dx * dx;
            if dx_sq > self.radius_sq {
                continue;
            }
            for h in self.rows() {
                let dy = self.y.abs_diff(h);
                if dx_sq + dy * dy <= self.radius_sq {
                    f(w, h);
                }
            }
        }
    }

    pub fn count(&self) -> usize {
        let mut n = 0usize;
        self.for_each_member(|_, _| n += 1);
        n
    }
}
