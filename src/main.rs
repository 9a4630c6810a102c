use clap::Parser;
use raster_engrave::{EngraveError, EngraveOptions, engrave_file};
use std::path::PathBuf;
use std::process;

/// Convert a raster image to G-code for laser engraving
#[derive(Parser, Debug)]
#[command(name = "raster-engrave", version, about)]
struct Cli {
    /// Input image (PNG, JPEG or BMP)
    input: PathBuf,

    /// Output G-code file; a BMP preview is written next to it
    output: PathBuf,

    /// Maximum laser power
    #[arg(short, long, default_value_t = 255)]
    power: u32,

    /// Feed rate for engraving in mm/min
    #[arg(short, long, default_value_t = 1500)]
    feedrate: u32,

    /// Feed rate for the fast return in mm/min
    #[arg(short = 'r', long, alias = "fast_return_rate", default_value_t = 3000)]
    fast_return_rate: u32,

    /// Lines per millimeter
    #[arg(short, long, alias = "lines_per_mm", default_value_t = 10.0)]
    lines_per_mm: f64,

    /// Do not embed the preview thumbnail in the program
    #[arg(long)]
    no_thumbnail: bool,
}

fn exit_code(e: &EngraveError) -> i32 {
    match e {
        EngraveError::InvalidImage(_) => 2,
        EngraveError::InvalidConfiguration(_) => 3,
        EngraveError::OutputWrite { .. } => 4,
        // Downgraded to a warning inside the compiler, never returned
        EngraveError::ThumbnailEncoding(_) => 5,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = EngraveOptions {
        laser_max_power: cli.power,
        feed_rate: cli.feedrate,
        fast_return_rate: cli.fast_return_rate,
        lines_per_mm: cli.lines_per_mm,
        thumbnail: !cli.no_thumbnail,
    };

    match engrave_file(&cli.input, &cli.output, &options) {
        Ok(_) => {
            println!(
                "Successfully converted '{}' to '{}'",
                cli.input.display(),
                cli.output.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["raster-engrave", "in.png", "out.gcode"]).unwrap();
        assert_eq!(cli.power, 255);
        assert_eq!(cli.feedrate, 1500);
        assert_eq!(cli.fast_return_rate, 3000);
        assert_eq!(cli.lines_per_mm, 10.0);
        assert!(!cli.no_thumbnail);
    }

    #[test]
    fn test_underscore_long_flags() {
        let cli = Cli::try_parse_from([
            "raster-engrave",
            "in.png",
            "out.gcode",
            "--fast_return_rate",
            "4000",
            "--lines_per_mm",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.fast_return_rate, 4000);
        assert_eq!(cli.lines_per_mm, 5.0);
    }

    #[test]
    fn test_kebab_and_short_flags() {
        let cli = Cli::try_parse_from([
            "raster-engrave",
            "in.png",
            "out.gcode",
            "--fast-return-rate",
            "4500",
            "-l",
            "2.5",
            "-p",
            "1000",
        ])
        .unwrap();
        assert_eq!(cli.fast_return_rate, 4500);
        assert_eq!(cli.lines_per_mm, 2.5);
        assert_eq!(cli.power, 1000);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&EngraveError::InvalidImage(String::new())), 2);
        assert_eq!(exit_code(&EngraveError::InvalidConfiguration(String::new())), 3);
    }
}
