use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// How coordinates outside `[0, w) x [0, h)` are treated when a neighborhood
/// reaches past the grid edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Wrap both axes with floor-mod (torus).
    #[default]
    Toroidal,
    /// Out-of-range neighbors are left out of the aggregate entirely.
    ClampedSkip,
}

impl Boundary {
    /// Map a possibly out-of-range coordinate onto the grid.
    /// Returns None if the coordinate should not participate.
    #[inline]
    pub fn resolve(self, x: i64, y: i64, w: usize, h: usize) -> Option<(usize, usize)> {
        match self {
            Boundary::Toroidal => Some((
                x.rem_euclid(w as i64) as usize,
                y.rem_euclid(h as i64) as usize,
            )),
            Boundary::ClampedSkip => {
                if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                    None
                } else {
                    Some((x as usize, y as usize))
                }
            }
        }
    }
}

/// Row-major flat grid. No per-cell objects, f32 friendly.
/// Dimensions are fixed at construction; only cell values change.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    w: usize,
    h: usize,
}

/// Returns the cell count.
fn check_dims(w: usize, h: usize) -> Result<usize, FieldError> {
    if w == 0 {
        return Err(FieldError::InvalidDimension { what: "width", value: 0 });
    }
    if h == 0 {
        return Err(FieldError::InvalidDimension { what: "height", value: 0 });
    }
    w.checked_mul(h)
        .ok_or(FieldError::TooLarge { width: w, height: h })
}

impl<T: Copy + Default> Grid<T> {
    /// Grid filled with `T::default()` (0.0 for scalars, false for booleans).
    pub fn new(w: usize, h: usize) -> Result<Self, FieldError> {
        Self::filled(w, h, T::default())
    }

    pub fn filled(w: usize, h: usize, v: T) -> Result<Self, FieldError> {
        let n = check_dims(w, h)?;
        Ok(Self {
            data: vec![v; n],
            w,
            h,
        })
    }

    /// Wrap an existing row-major buffer. The buffer length must be `w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<T>) -> Result<Self, FieldError> {
        if data.len() != check_dims(w, h)? {
            return Err(FieldError::InvalidDimension {
                what: "buffer length",
                value: data.len() as i64,
            });
        }
        Ok(Self { data, w, h })
    }

    #[inline]
    pub fn w(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn h(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable view of the cells. A slice, so the grid can never be resized.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.w as i64 && y < self.h as i64
    }

    fn checked_idx(&self, x: i64, y: i64) -> Result<usize, FieldError> {
        if self.contains(x, y) {
            Ok(self.idx(x as usize, y as usize))
        } else {
            Err(FieldError::OutOfRange {
                x,
                y,
                width: self.w,
                height: self.h,
            })
        }
    }

    pub fn get(&self, x: i64, y: i64) -> Result<T, FieldError> {
        let i = self.checked_idx(x, y)?;
        Ok(self.data[i])
    }

    pub fn set(&mut self, x: i64, y: i64, v: T) -> Result<(), FieldError> {
        let i = self.checked_idx(x, y)?;
        self.data[i] = v;
        Ok(())
    }

    /// Toroidal read: never out of range.
    #[inline]
    pub fn get_wrapped(&self, x: i64, y: i64) -> T {
        let wx = x.rem_euclid(self.w as i64) as usize;
        let wy = y.rem_euclid(self.h as i64) as usize;
        self.data[self.idx(wx, wy)]
    }

    /// Read under a boundary policy; None means "skip this contribution".
    #[inline]
    pub fn sample(&self, x: i64, y: i64, boundary: Boundary) -> Option<T> {
        boundary
            .resolve(x, y, self.w, self.h)
            .map(|(sx, sy)| self.data[self.idx(sx, sy)])
    }

    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }

    /// Every coordinate in row-major sweep order. Cloneable, so restartable.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + Clone + use<T> {
        let w = self.w;
        (0..self.h).flat_map(move |y| (0..w).map(move |x| (x, y)))
    }

    pub fn map<U: Copy + Default>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        Grid {
            data: self.data.iter().map(|&v| f(v)).collect(),
            w: self.w,
            h: self.h,
        }
    }

    /// Pointwise combination of two equally shaped grids.
    pub fn zip_with<U: Copy + Default>(
        &self,
        other: &Grid<T>,
        f: impl Fn(T, T) -> U,
    ) -> Result<Grid<U>, FieldError> {
        if self.w != other.w {
            return Err(FieldError::InvalidDimension {
                what: "width mismatch",
                value: other.w as i64,
            });
        }
        if self.h != other.h {
            return Err(FieldError::InvalidDimension {
                what: "height mismatch",
                value: other.h as i64,
            });
        }
        Ok(Grid {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            w: self.w,
            h: self.h,
        })
    }
}

impl Grid<f32> {
    /// Every cell starts at π/2, which renders as full white under the sine
    /// palette. Only used when a visible test pattern is wanted.
    pub fn test_pattern(w: usize, h: usize) -> Result<Self, FieldError> {
        Self::filled(w, h, std::f32::consts::FRAC_PI_2)
    }

    pub fn add_cell(&mut self, x: i64, y: i64, delta: f32) -> Result<(), FieldError> {
        let i = self.checked_idx(x, y)?;
        self.data[i] += delta;
        Ok(())
    }

    pub fn scale_cell(&mut self, x: i64, y: i64, factor: f32) -> Result<(), FieldError> {
        let i = self.checked_idx(x, y)?;
        self.data[i] *= factor;
        Ok(())
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    pub fn average(&self) -> f32 {
        self.sum() / self.data.len() as f32
    }
}

impl Div<f32> for &Grid<f32> {
    type Output = Grid<f32>;

    fn div(self, divisor: f32) -> Grid<f32> {
        self.map(|v| v / divisor)
    }
}

impl Mul<f32> for &Grid<f32> {
    type Output = Grid<f32>;

    fn mul(self, factor: f32) -> Grid<f32> {
        self.map(|v| v * factor)
    }
}

impl Add<f32> for &Grid<f32> {
    type Output = Grid<f32>;

    fn add(self, offset: f32) -> Grid<f32> {
        self.map(|v| v + offset)
    }
}

impl Sub<f32> for &Grid<f32> {
    type Output = Grid<f32>;

    fn sub(self, offset: f32) -> Grid<f32> {
        self.map(|v| v - offset)
    }
}

/// One line per row, comma separated.
impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.w) {
            for (x, v) in row.iter().enumerate() {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
