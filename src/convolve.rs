use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::grid::{Boundary, Grid};
use crate::kernel::Kernel;

/// Per-cell function applied to every convolution result, typically to keep
/// values bounded over many steps.
#[derive(Clone)]
pub struct PostTransform(Arc<dyn Fn(f32) -> f32 + Send + Sync>);

impl PostTransform {
    pub fn new(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Wrap into `[0, limit)`. Negative results wrap up from `limit`.
    pub fn wrap_modulo(limit: f32) -> Self {
        Self::new(move |v| v.rem_euclid(limit))
    }

    #[inline]
    pub fn apply(&self, v: f32) -> f32 {
        (self.0)(v)
    }
}

impl fmt::Debug for PostTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PostTransform(..)")
    }
}

/// Weighted neighborhood sum for every cell.
///
/// Each output cell reads only the shared input and kernel, so rows are
/// computed in parallel and joined before the result is returned.
#[derive(Clone, Debug, Default)]
pub struct ConvolutionEngine {
    pub boundary: Boundary,
    pub post: Option<PostTransform>,
}

impl ConvolutionEngine {
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            post: None,
        }
    }

    pub fn with_post(mut self, post: PostTransform) -> Self {
        self.post = Some(post);
        self
    }

    /// Convolve `input` with `kernel` into a freshly allocated grid.
    ///
    /// Under `ClampedSkip` the taps that fall outside the grid are left out
    /// of the sum and the remaining weights are not renormalized, so edge
    /// cells come out smaller. Kernels larger than the input are allowed.
    pub fn apply(&self, input: &Grid<f32>, kernel: &Kernel) -> Grid<f32> {
        let w = input.w();
        let mut out = input.map(|_| 0.0f32);

        out.data_mut()
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    let v = self.convolve_at(input, kernel, x, y);
                    *cell = match &self.post {
                        Some(post) => post.apply(v),
                        None => v,
                    };
                }
            });

        out
    }

    #[inline]
    fn convolve_at(&self, input: &Grid<f32>, kernel: &Kernel, x: usize, y: usize) -> f32 {
        let (x, y) = (x as i64, y as i64);
        kernel
            .taps()
            .filter_map(|((dx, dy), weight)| {
                input
                    .sample(x + dx, y + dy, self.boundary)
                    .map(|v| weight * v)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::circular;

    fn point(w: usize, h: usize, x: i64, y: i64, v: f32) -> Grid<f32> {
        let mut g = Grid::new(w, h).unwrap();
        g.set(x, y, v).unwrap();
        g
    }

    #[test]
    fn identity_kernel_is_a_no_op() {
        let mut input = Grid::new(6, 5).unwrap();
        for (i, v) in input.data_mut().iter_mut().enumerate() {
            *v = i as f32 * 0.5 - 3.0;
        }
        let k = Kernel::identity(3).unwrap();
        for boundary in [Boundary::Toroidal, Boundary::ClampedSkip] {
            let out = ConvolutionEngine::new(boundary).apply(&input, &k);
            assert_eq!(out, input);
        }
    }

    #[test]
    fn uniform_spreads_center_mass_evenly() {
        let input = point(3, 3, 1, 1, 1.0);
        let out = ConvolutionEngine::new(Boundary::Toroidal).apply(&input, &Kernel::uniform(3).unwrap());
        for &v in out.data() {
            assert!((v - 1.0 / 9.0).abs() < 1e-6);
        }
    }

    #[test]
    fn toroidal_wraps_mass_across_edges() {
        let input = point(4, 4, 0, 0, 9.0);
        let out = ConvolutionEngine::new(Boundary::Toroidal).apply(&input, &Kernel::uniform(3).unwrap());
        assert!((out.get(3, 3).unwrap() - 1.0).abs() < 1e-6);
        assert!((out.get(1, 3).unwrap() - 1.0).abs() < 1e-6);
        assert!(out.get(2, 2).unwrap().abs() < 1e-6);
        assert!((out.sum() - 9.0).abs() < 1e-5);
    }

    #[test]
    fn clamped_skip_omits_outside_taps() {
        let input = Grid::filled(4, 4, 1.0f32).unwrap();
        let out = ConvolutionEngine::new(Boundary::ClampedSkip).apply(&input, &Kernel::uniform(3).unwrap());
        // Corner sees 4 of 9 taps, edge 6, interior all 9.
        assert!((out.get(0, 0).unwrap() - 4.0 / 9.0).abs() < 1e-6);
        assert!((out.get(1, 0).unwrap() - 6.0 / 9.0).abs() < 1e-6);
        assert!((out.get(1, 1).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn kernel_larger_than_input() {
        let input = point(3, 3, 1, 1, 1.0);
        let k = Kernel::uniform(5).unwrap();
        let toroidal = ConvolutionEngine::new(Boundary::Toroidal).apply(&input, &k);
        assert!((toroidal.sum() - 1.0).abs() < 1e-5);
        let skipped = ConvolutionEngine::new(Boundary::ClampedSkip).apply(&input, &k);
        for &v in skipped.data() {
            assert!((v - 1.0 / 25.0).abs() < 1e-6);
        }
    }

    #[test]
    fn post_transform_bounds_results() {
        let limit = 5.0 * std::f32::consts::PI;
        let input = Grid::filled(3, 3, 20.0f32).unwrap();
        let engine = ConvolutionEngine::new(Boundary::Toroidal)
            .with_post(PostTransform::wrap_modulo(limit));
        let out = engine.apply(&input, &Kernel::identity(1).unwrap());
        for &v in out.data() {
            assert!((0.0..limit).contains(&v));
            assert!((v - (20.0 - limit)).abs() < 1e-4);
        }
        assert!((PostTransform::wrap_modulo(limit).apply(-1.0) - (limit - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn custom_post_transform() {
        let input = Grid::filled(2, 2, -3.0f32).unwrap();
        let engine = ConvolutionEngine::new(Boundary::Toroidal).with_post(PostTransform::new(f32::abs));
        let out = engine.apply(&input, &Kernel::identity(1).unwrap());
        assert!(out.data().iter().all(|&v| v == 3.0));
    }

    #[test]
    fn input_is_not_modified() {
        let input = point(8, 8, 4, 4, 100.0);
        let before = input.clone();
        let _ = ConvolutionEngine::default().apply(&input, &circular(5, 1.0).unwrap());
        assert_eq!(input, before);
    }
}
