use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fieldsim::config::Params;
use fieldsim::Frame;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // fieldsim [config.json | -] [out_dir] [steps]
    let params = match args.get(1).map(String::as_str) {
        None | Some("-") => Params::default(),
        Some(path) => match Params::load(Path::new(path)) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{path}: {e}");
                return ExitCode::FAILURE;
            }
        },
    };
    let out_dir: PathBuf = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    let params = Params {
        steps: args.get(3).and_then(|s| s.parse().ok()).unwrap_or(params.steps),
        ..params
    };

    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("failed to create {}: {e}", out_dir.display());
        return ExitCode::FAILURE;
    }

    eprintln!(
        "Simulating {}x{} {:?} field, filter={} gain={} steps={}",
        params.width, params.height, params.mode, params.filter_size, params.gain, params.steps
    );

    let mut save_error = None;
    let save = |frame: Frame<'_>| {
        if save_error.is_some() {
            return;
        }
        let path = out_dir.join(format!("frame_{:05}.png", frame.step));
        match image::save_buffer(
            &path,
            frame.rgba,
            frame.w as u32,
            frame.h as u32,
            image::ColorType::Rgba8,
        ) {
            Ok(()) => eprintln!("Saved {}", path.display()),
            Err(e) => save_error = Some(format!("{}: {e}", path.display())),
        }
    };

    let timings = match fieldsim::run(&params, save) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(e) = save_error {
        eprintln!("failed to save frame {e}");
        return ExitCode::FAILURE;
    }

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    eprintln!("\nDone.");
    ExitCode::SUCCESS
}
