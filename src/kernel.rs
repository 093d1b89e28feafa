//! Convolution kernels.
//!
//! A kernel is a small grid of weights read as offsets from its center
//! `(w/2, h/2)` (integer division), the same anchor the convolution engine
//! uses. The offset table is built once per kernel and shared by every cell.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::grid::Grid;

#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    weights: Grid<f32>,
    /// (dx, dy) for each weight, in the same row-major order as the weights.
    offsets: Vec<(i64, i64)>,
}

impl Kernel {
    pub fn from_weights(weights: Grid<f32>) -> Self {
        let cx = (weights.w() / 2) as i64;
        let cy = (weights.h() / 2) as i64;
        let offsets = weights
            .positions()
            .map(|(x, y)| (x as i64 - cx, y as i64 - cy))
            .collect();
        Self { weights, offsets }
    }

    #[inline]
    pub fn weights(&self) -> &Grid<f32> {
        &self.weights
    }

    #[inline]
    pub fn offsets(&self) -> &[(i64, i64)] {
        &self.offsets
    }

    /// (offset, weight) pairs.
    #[inline]
    pub fn taps(&self) -> impl Iterator<Item = ((i64, i64), f32)> + '_ {
        self.offsets
            .iter()
            .copied()
            .zip(self.weights.data().iter().copied())
    }

    pub fn sum(&self) -> f32 {
        self.weights.sum()
    }

    pub fn scaled(&self, gain: f32) -> Self {
        Self {
            weights: &self.weights * gain,
            offsets: self.offsets.clone(),
        }
    }

    /// Single 1.0 at the center: leaves any input unchanged.
    pub fn identity(size: usize) -> Result<Self, FieldError> {
        check_size(size)?;
        let mut weights = Grid::new(size, size)?;
        let c = (size / 2) as i64;
        weights.set(c, c, 1.0)?;
        Ok(Self::from_weights(weights))
    }

    /// Box blur, every weight `1 / size²`.
    pub fn uniform(size: usize) -> Result<Self, FieldError> {
        check_size(size)?;
        let weights = Grid::filled(size, size, 1.0 / (size * size) as f32)?;
        Ok(Self::from_weights(weights))
    }
}

/// Which radial profile to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Circular,
    Ring,
}

impl Shape {
    pub fn build(self, size: usize, gain: f32) -> Result<Kernel, FieldError> {
        match self {
            Shape::Circular => circular(size, gain),
            Shape::Ring => ring(size, gain),
        }
    }
}

fn check_size(size: usize) -> Result<(), FieldError> {
    if size == 0 {
        return Err(FieldError::InvalidDimension {
            what: "kernel size",
            value: 0,
        });
    }
    Ok(())
}

/// Fill a size x size window with `profile(distance from center)`.
fn radial(size: usize, profile: impl Fn(f32) -> f32) -> Result<Grid<f32>, FieldError> {
    check_size(size)?;
    let mut weights = Grid::new(size, size)?;
    let c = (size / 2) as f32;
    for (x, y) in weights.positions() {
        let d = (x as f32 - c).hypot(y as f32 - c);
        let i = weights.idx(x, y);
        weights.data_mut()[i] = profile(d);
    }
    Ok(weights)
}

/// Scale weights so they sum to 1.
pub fn normalize(weights: &Grid<f32>) -> Result<Grid<f32>, FieldError> {
    let sum = weights.sum();
    if sum == 0.0 || !sum.is_finite() {
        return Err(FieldError::DegenerateKernel);
    }
    Ok(weights / sum)
}

/// Low-pass kernel with a sharp central peak: `1 / (1 + d)`, normalized,
/// times `gain`.
pub fn circular(size: usize, gain: f32) -> Result<Kernel, FieldError> {
    let raw = radial(size, |d| 1.0 / (1.0 + d))?;
    let normalized = normalize(&raw)?;
    Ok(Kernel::from_weights(&normalized * gain))
}

/// Band-pass kernel: `|d - size/2|`, normalized, then re-centered on its
/// mean and doubled so the weights sum to zero, times `gain`.
pub fn ring(size: usize, gain: f32) -> Result<Kernel, FieldError> {
    let radius = (size / 2) as f32;
    let raw = radial(size, |d| (d - radius).abs())?;
    let normalized = normalize(&raw)?;
    let centered = &(&normalized - normalized.average()) * 2.0;
    Ok(Kernel::from_weights(&centered * gain))
}
