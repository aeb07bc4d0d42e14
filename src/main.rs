use std::{env, process::ExitCode};

use log::{error, info, warn};
use mandelbrot_horizons::{
    context, render_with, CpuBackend, Error, GpuBackend, GrayscaleImage, Resolution, ViewWindow,
};

/// Darkest to brightest.
const SHADES: &[u8] = b" .:-=+*#%@";

const USAGE: &str = "\
usage: mandelbrot-horizons [--cpu] [x_min x_max y_min y_max width height max_iter]

Renders the Mandelbrot set over [x_min, x_max) x [y_min, y_max) as ASCII shading.
Missing positional arguments take their defaults: -2.0 1.0 -1.0 1.0 120 40 100.

options:
  --cpu        render on the host thread pool instead of the GPU
  -h, --help   print this message

Logging is controlled by RUST_LOG.";

const DEFAULTS: [&str; 7] = ["-2.0", "1.0", "-1.0", "1.0", "120", "40", "100"];
const NAMES: [&str; 7] = [
    "x_min", "x_max", "y_min", "y_max", "width", "height", "max_iter",
];

#[derive(Debug)]
struct Args {
    window: ViewWindow,
    resolution: Resolution,
    max_iter: u32,
    cpu: bool,
}

#[derive(Debug)]
enum Command {
    Render(Args),
    Help,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut cpu = false;
    let mut numbers = Vec::new();
    for arg in args {
        if arg == "-h" || arg == "--help" {
            return Ok(Command::Help);
        } else if arg == "--cpu" {
            cpu = true;
        } else if arg.starts_with("--") {
            // A typo, not a negative bound.
            return Err(format!("unknown option {}", arg));
        } else {
            numbers.push(arg);
        }
    }

    if numbers.len() > DEFAULTS.len() {
        return Err(format!(
            "expected at most {} positional arguments, got {}",
            DEFAULTS.len(),
            numbers.len()
        ));
    }
    let value = |index: usize| numbers.get(index).map_or(DEFAULTS[index], String::as_str);

    let float = |index: usize| {
        value(index)
            .parse::<f64>()
            .map_err(|error| format!("{} {:?}: {}", NAMES[index], value(index), error))
    };
    let integer = |index: usize| {
        value(index)
            .parse::<u32>()
            .map_err(|error| format!("{} {:?}: {}", NAMES[index], value(index), error))
    };

    let window = ViewWindow::new(float(0)?, float(1)?, float(2)?, float(3)?)
        .map_err(|error| error.to_string())?;
    let resolution = Resolution::new(integer(4)?, integer(5)?).map_err(|error| error.to_string())?;
    let max_iter = integer(6)?;

    Ok(Command::Render(Args {
        window,
        resolution,
        max_iter,
        cpu,
    }))
}

fn print_image(image: &GrayscaleImage) {
    for row in image.rows() {
        let line: String = row
            .iter()
            .map(|&pixel| SHADES[pixel as usize * (SHADES.len() - 1) / 255] as char)
            .collect();
        println!("{}", line);
    }
}

fn run(args: &Args) -> Result<GrayscaleImage, Error> {
    if !args.cpu {
        match GpuBackend::shared() {
            Ok(backend) => {
                info!("rendering on gpu");
                return render_with(&backend, args.window, args.resolution, args.max_iter);
            }
            Err(error @ Error::DeviceUnavailable(_)) => {
                warn!("{}, falling back to cpu", error);
            }
            Err(error) => return Err(error),
        }
    }

    info!("rendering on cpu");
    render_with(
        &CpuBackend::new()?,
        args.window,
        args.resolution,
        args.max_iter,
    )
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(Command::Render(args)) => args,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&args);
    context::teardown();

    match result {
        Ok(image) => {
            print_image(&image);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("render failed: {}", err);
            eprintln!("render failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
