//! Command-line entry point for scansweep.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use scansweep::{MaxrangeMethod, NormalMethod, PipelineConfig, ScanFormat};

/// Partition registered 3D laser scans into static and dynamic points.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Start at this scan number (0-based)
    #[arg(short, long, default_value_t = 0)]
    start: usize,

    /// Stop at this scan number (0-based, -1 meaning don't stop)
    #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
    end: i64,

    /// Input scan format
    #[arg(short, long, value_enum, default_value_t = ScanFormat::Uos)]
    format: ScanFormat,

    /// How far points on a perfect plane may lie away from it
    #[arg(long, default_value_t = 0.0)]
    fuzz: f64,

    /// Voxel grid size
    #[arg(long, default_value_t = 10.0)]
    voxel_size: f64,

    /// Number of scans before and after the current scan grouped together
    #[arg(long, default_value_t = 0)]
    diff: usize,

    /// Do not calculate with subvoxel accuracy
    #[arg(long)]
    no_subvoxel_accuracy: bool,

    /// How to compute the search range of each ray
    #[arg(long, value_enum, default_value_t = MaxrangeMethod::None)]
    maxrange_method: MaxrangeMethod,

    /// Neighbour count for normal estimation with --normal-method=knearest
    #[arg(long, default_value_t = 40)]
    normal_knearest: usize,

    /// How to select the points the normal is computed from
    #[arg(long, value_enum, default_value_t = NormalMethod::Angle)]
    normal_method: NormalMethod,

    /// Directory for .mask files (default: <dir>/pplremover)
    #[arg(long)]
    maskdir: Option<PathBuf>,

    /// Number of threads to run in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Input directory containing the scan files
    dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    let config = PipelineConfig {
        dir: args.dir,
        format: args.format,
        start: args.start,
        end: args.end,
        fuzz: args.fuzz,
        voxel_size: args.voxel_size,
        diff: args.diff,
        no_subvoxel_accuracy: args.no_subvoxel_accuracy,
        maxrange_method: args.maxrange_method,
        normal_knearest: args.normal_knearest,
        normal_method: args.normal_method,
        maskdir: args.maskdir,
        out_dir: PathBuf::from("."),
        jobs: args.jobs,
    };

    match scansweep::run(&config) {
        Ok(summary) => {
            log::info!(
                "done: {} static, {} dynamic of {} points across {} slices",
                summary.static_points,
                summary.dynamic_points,
                summary.points,
                summary.slices
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
