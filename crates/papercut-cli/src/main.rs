// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Papercut — command-line document scanner
//
// Entry point. Initialises logging, loads the scan configuration, and runs
// one subcommand against a photo on disk.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use image::DynamicImage;
use serde::Serialize;

use papercut_core::{PapercutError, Quad, Result, ScanConfig, human_errors::humanize_error};
use papercut_engine::scan::draw_quad;
use papercut_engine::{Scanner, codec};

#[derive(Parser)]
#[command(name = "papercut")]
#[command(about = "Find, straighten and clean up documents in photos", long_about = None)]
struct Cli {
    /// JSON scan configuration; built-in defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the detected document corners as JSON
    Detect {
        /// Input photo
        image: PathBuf,
    },
    /// Draw the detected corners onto a copy of the photo
    Preview {
        /// Input photo
        image: PathBuf,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rectify and enhance the document, writing PNGs and a JSON report
    Scan {
        /// Input photo
        image: PathBuf,
        /// Output directory (created if missing)
        #[arg(short, long)]
        output: PathBuf,
        /// Corners in photo pixels as x,y,x,y,x,y,x,y; skips detection
        #[arg(long, value_parser = parse_corners)]
        corners: Option<Quad>,
    },
}

/// JSON body printed by `detect`.
#[derive(Serialize)]
struct DetectOutput {
    corners: [(f32, f32); 4],
    fallback: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "papercut failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let scanner = Scanner::new(load_config(cli.config.as_deref())?)?;

    match cli.command {
        Command::Detect { image } => {
            let photo = codec::open(&image)?;
            let detection = scanner.detect(&photo)?;
            let output = DetectOutput {
                corners: detection.corners.to_tuples(),
                fallback: detection.is_fallback(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Preview { image, output } => {
            let photo = codec::open(&image)?;
            let detection = scanner.detect(&photo)?;
            let overlay = draw_quad(&photo, &detection.corners);
            codec::save(&DynamicImage::ImageRgb8(overlay), &output)?;
            tracing::info!(path = %output.display(), "Preview written");
        }
        Command::Scan {
            image,
            output,
            corners,
        } => {
            let written = scan(&scanner, &image, &output, corners)?;
            for path in written {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::load(path),
        None => Ok(ScanConfig::default()),
    }
}

/// Run the full pipeline on `image`, writing the three artifacts and
/// `<session>_report.json` into `out_dir`. Returns the written paths.
fn scan(scanner: &Scanner, image: &Path, out_dir: &Path, corners: Option<Quad>) -> Result<Vec<PathBuf>> {
    let photo = codec::open(image)?;
    let session = match corners {
        Some(quad) => scanner.open_session_with(photo, quad)?,
        None => scanner.open_session(photo)?,
    };
    let (artifacts, report) = scanner.cutout(&session)?;

    let prefix = session.id().to_string();
    let mut written = artifacts.write_pngs(out_dir, &prefix)?;

    let report_path = out_dir.join(format!("{prefix}_report.json"));
    std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
    written.push(report_path);
    Ok(written)
}

fn parse_corners(text: &str) -> std::result::Result<Quad, String> {
    Quad::parse_csv(text).map_err(|err: PapercutError| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use image::{GrayImage, Luma};

    fn write_photo(dir: &Path) -> PathBuf {
        let img = GrayImage::from_fn(300, 400, |x, y| {
            if (40..260).contains(&x) && (50..350).contains(&y) {
                Luma([235u8])
            } else {
                Luma([25u8])
            }
        });
        let path = dir.join("photo.png");
        DynamicImage::ImageLuma8(img).save(&path).unwrap();
        path
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn corners_flag_parses_eight_numbers() {
        let cli = Cli::try_parse_from([
            "papercut",
            "scan",
            "in.jpg",
            "-o",
            "out",
            "--corners",
            "0,0,10,0,10,10,0,10",
        ])
        .unwrap();
        let Command::Scan { corners, .. } = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(
            corners,
            Some(Quad::from_tuples([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]))
        );
    }

    #[test]
    fn malformed_corners_are_rejected_by_the_parser() {
        let parsed = Cli::try_parse_from(["papercut", "scan", "in.jpg", "-o", "out", "--corners", "1,2,3"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn scan_writes_artifacts_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_photo(dir.path());
        let out = dir.path().join("out");

        let written = scan(&Scanner::default(), &photo, &out, None).unwrap();
        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists(), "{}", path.display());
        }

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[3]).unwrap()).unwrap();
        assert_eq!(report["fallback"], false);
        assert_eq!(report["source_width"], 300);
    }

    #[test]
    fn missing_input_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(&Scanner::default(), &dir.path().join("nope.jpg"), dir.path(), None).unwrap_err();
        assert!(matches!(err, PapercutError::Io(_)));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/definitely/not/here.json"))).is_err());
        assert_eq!(load_config(None).unwrap(), ScanConfig::default());
    }
}
