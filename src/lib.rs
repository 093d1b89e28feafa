pub mod automaton;
pub mod config;
pub mod convolve;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod render;
pub mod rng;
pub mod simulator;

use std::time::Instant;

use config::{Mode, Params};
use error::FieldError;
use grid::Grid;
use simulator::{AutomatonSimulator, FieldSimulator, Steppable};

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// A rendered snapshot handed to the caller.
pub struct Frame<'a> {
    pub step: usize,
    pub w: usize,
    pub h: usize,
    pub rgba: &'a [u8],
}

#[inline]
fn elapsed_ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

/// Build the simulator described by `params`, advance it `params.steps`
/// times and hand out a rendered frame at step 0, every `snapshot_every`
/// steps and after the last step.
pub fn run(params: &Params, on_frame: impl FnMut(Frame<'_>)) -> Result<Vec<Timing>, FieldError> {
    params.validate()?;
    let mut timings = Vec::new();
    let total_start = Instant::now();

    match params.mode {
        Mode::Convolution => {
            let t = Instant::now();
            let mut sim = FieldSimulator::from_params(params)?;
            timings.push(Timing {
                name: "kernel",
                ms: elapsed_ms(t),
            });

            let t = Instant::now();
            sim.seed(params.seed_mass);
            timings.push(Timing {
                name: "seed",
                ms: elapsed_ms(t),
            });

            let palette = params.palette;
            drive(
                &mut sim,
                params,
                |sim, step| {
                    for p in params.perturbations.iter().filter(|p| p.step == step) {
                        sim.pointer(p.x, p.y)?;
                    }
                    Ok(())
                },
                |field| render::render_field(field, palette),
                on_frame,
                &mut timings,
            )?;
        }
        Mode::Parity => {
            let t = Instant::now();
            let mut sim = AutomatonSimulator::parity(params)?;
            timings.push(Timing {
                name: "seed",
                ms: elapsed_ms(t),
            });
            drive(&mut sim, params, |_, _| Ok(()), render::render_cells, on_frame, &mut timings)?;
        }
        Mode::Decay => {
            let t = Instant::now();
            let mut sim = AutomatonSimulator::decay(params)?;
            timings.push(Timing {
                name: "seed",
                ms: elapsed_ms(t),
            });
            drive(&mut sim, params, |_, _| Ok(()), render::render_unit, on_frame, &mut timings)?;
        }
    }

    timings.push(Timing {
        name: "TOTAL",
        ms: elapsed_ms(total_start),
    });

    Ok(timings)
}

/// Step loop shared by every mode. `before_step` runs between steps, never
/// during one.
fn drive<S: Steppable>(
    sim: &mut S,
    params: &Params,
    mut before_step: impl FnMut(&mut S, usize) -> Result<(), FieldError>,
    render: impl Fn(&Grid<S::Cell>) -> Vec<u8>,
    mut on_frame: impl FnMut(Frame<'_>),
    timings: &mut Vec<Timing>,
) -> Result<(), FieldError> {
    let mut step_ms = 0.0;
    let mut render_ms = 0.0;

    let mut emit = |sim: &S, step: usize, render_ms: &mut f64| {
        let t = Instant::now();
        let field = sim.field();
        let rgba = render(field);
        *render_ms += elapsed_ms(t);
        on_frame(Frame {
            step,
            w: field.w(),
            h: field.h(),
            rgba: &rgba,
        });
    };

    emit(&*sim, 0, &mut render_ms);
    for step in 0..params.steps {
        before_step(&mut *sim, step)?;

        let t = Instant::now();
        sim.step();
        step_ms += elapsed_ms(t);

        let done = step + 1;
        let snapshot = params.snapshot_every > 0 && done % params.snapshot_every == 0;
        if snapshot || done == params.steps {
            emit(&*sim, done, &mut render_ms);
        }
    }

    timings.push(Timing {
        name: "step",
        ms: step_ms,
    });
    timings.push(Timing {
        name: "render",
        ms: render_ms,
    });
    Ok(())
}
