//! Double-buffered simulators.
//!
//! A step computes the next field from the committed one into a fresh
//! buffer and only then replaces the committed field, so a reader never sees
//! a half-updated grid. `step` and `perturb` both take `&mut self`, which
//! keeps pointer edits from interleaving with a step in flight.

use crate::automaton::{CellRule, CellularRuleEngine, Decay, Parity};
use crate::config::Params;
use crate::convolve::{ConvolutionEngine, PostTransform};
use crate::error::FieldError;
use crate::grid::{Boundary, Grid};
use crate::kernel::{Kernel, circular};
use crate::rng::Rng;

/// Default pointer-held amounts: add 100, then triple.
pub const POINTER_ADD: f32 = 100.0;
pub const POINTER_MULT: f32 = 3.0;

/// A readable field that advances on demand. This is all a render loop needs.
pub trait Steppable {
    type Cell: Copy + Default;

    fn step(&mut self);
    fn field(&self) -> &Grid<Self::Cell>;
    fn generation(&self) -> u64;
}

/// Convolution-driven scalar field.
pub struct FieldSimulator {
    field: Grid<f32>,
    kernel: Kernel,
    engine: ConvolutionEngine,
    generation: u64,
    pointer_add: f32,
    pointer_mult: f32,
}

impl FieldSimulator {
    /// Zero field, circular kernel, toroidal edges.
    pub fn new(w: usize, h: usize, kernel_size: usize, gain: f32) -> Result<Self, FieldError> {
        Ok(Self::with_engine(
            Grid::new(w, h)?,
            circular(kernel_size, gain)?,
            ConvolutionEngine::new(Boundary::Toroidal),
        ))
    }

    pub fn with_engine(field: Grid<f32>, kernel: Kernel, engine: ConvolutionEngine) -> Self {
        Self {
            field,
            kernel,
            engine,
            generation: 0,
            pointer_add: POINTER_ADD,
            pointer_mult: POINTER_MULT,
        }
    }

    pub fn from_params(params: &Params) -> Result<Self, FieldError> {
        let kernel = params.shape.build(params.filter_size, params.gain)?;
        let mut engine = ConvolutionEngine::new(params.boundary);
        if let Some(limit) = params.wrap_limit {
            engine = engine.with_post(PostTransform::wrap_modulo(limit));
        }
        let mut sim = Self::with_engine(Grid::new(params.width, params.height)?, kernel, engine);
        sim.pointer_add = params.pointer_add;
        sim.pointer_mult = params.pointer_mult;
        Ok(sim)
    }

    pub fn get(&self, x: i64, y: i64) -> Result<f32, FieldError> {
        self.field.get(x, y)
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn engine(&self) -> &ConvolutionEngine {
        &self.engine
    }

    /// Takes effect on the next `step`.
    pub fn replace_kernel(&mut self, kernel: Kernel) {
        self.kernel = kernel;
    }

    pub fn set_zero(&mut self) {
        self.field.fill(0.0);
    }

    /// Place `mass` at the center, split over 1, 2 or 4 cells depending on
    /// which axes are even. Both mixed cases split along y, over `h/2` and
    /// `h/2 + 1`; an even-by-even grid takes the 2x2 block at `n/2`.
    pub fn seed(&mut self, mass: f32) {
        let w = self.field.w() as i64;
        let h = self.field.h() as i64;
        let (cx, cy) = (w / 2, h / 2);
        let cells = match (w % 2 == 1, h % 2 == 1) {
            (true, true) => vec![(cx, cy)],
            (true, false) => vec![(cx, cy), (cx, cy + 1)],
            (false, true) => vec![(cx, cy), (cx, cy + 1)],
            (false, false) => vec![(cx, cy), (cx, cy + 1), (cx + 1, cy), (cx + 1, cy + 1)],
        };
        let share = mass / cells.len() as f32;
        for (x, y) in cells {
            // n/2 + 1 runs off a 2-wide axis; wrap it back.
            let (x, y) = (x.rem_euclid(w) as usize, y.rem_euclid(h) as usize);
            let i = self.field.idx(x, y);
            self.field.data_mut()[i] = share;
        }
    }

    /// Add then multiply one cell of the committed field.
    pub fn perturb(&mut self, x: i64, y: i64, add: f32, mult: f32) -> Result<(), FieldError> {
        self.field.add_cell(x, y, add)?;
        self.field.scale_cell(x, y, mult)
    }

    /// Pointer-held event with the configured amounts.
    pub fn pointer(&mut self, x: i64, y: i64) -> Result<(), FieldError> {
        self.perturb(x, y, self.pointer_add, self.pointer_mult)
    }
}

impl Steppable for FieldSimulator {
    type Cell = f32;

    fn step(&mut self) {
        let next = self.engine.apply(&self.field, &self.kernel);
        self.field = next;
        self.generation += 1;
    }

    fn field(&self) -> &Grid<f32> {
        &self.field
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// Rule-driven field (parity or decay).
pub struct AutomatonSimulator<R: CellRule> {
    field: Grid<R::Cell>,
    engine: CellularRuleEngine<R>,
    generation: u64,
}

impl<R: CellRule> AutomatonSimulator<R> {
    pub fn new(field: Grid<R::Cell>, engine: CellularRuleEngine<R>) -> Self {
        Self {
            field,
            engine,
            generation: 0,
        }
    }

    pub fn get(&self, x: i64, y: i64) -> Result<R::Cell, FieldError> {
        self.field.get(x, y)
    }

    pub fn set(&mut self, x: i64, y: i64, v: R::Cell) -> Result<(), FieldError> {
        self.field.set(x, y, v)
    }
}

impl AutomatonSimulator<Parity> {
    /// Random live cells at `params.density`.
    pub fn parity(params: &Params) -> Result<Self, FieldError> {
        let density = params.density;
        let field = random_field(params.width, params.height, params.rng_seed, |rng| {
            rng.chance(density)
        })?;
        Ok(Self::new(field, CellularRuleEngine::new(Parity, params.neighborhood)))
    }
}

impl AutomatonSimulator<Decay> {
    /// Random values in [0, 1) at `params.density`, zero elsewhere.
    pub fn decay(params: &Params) -> Result<Self, FieldError> {
        let density = params.density;
        let field = random_field(params.width, params.height, params.rng_seed, |rng| {
            if rng.chance(density) { rng.next_f32() } else { 0.0 }
        })?;
        let rule = Decay {
            scale: params.decay_scale,
        };
        Ok(Self::new(field, CellularRuleEngine::new(rule, params.neighborhood)))
    }
}

impl<R: CellRule> Steppable for AutomatonSimulator<R> {
    type Cell = R::Cell;

    fn step(&mut self) {
        let next = self.engine.apply(&self.field);
        self.field = next;
        self.generation += 1;
    }

    fn field(&self) -> &Grid<R::Cell> {
        &self.field
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// Grid filled cell by cell from a seeded RNG, in row-major order.
pub fn random_field<T: Copy + Default>(
    w: usize,
    h: usize,
    seed: u64,
    mut sample: impl FnMut(&mut Rng) -> T,
) -> Result<Grid<T>, FieldError> {
    let mut rng = Rng::new(seed);
    let data = (0..w.saturating_mul(h)).map(|_| sample(&mut rng)).collect();
    Grid::from_vec(w, h, data)
}
