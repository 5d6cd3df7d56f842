//! Swarf CLI - mesh cleanup command-line tool.
//!
//! Usage: swarf [OPTIONS] <INPUT> <OUTPUT>
//!
//! Run `swarf --help` for available options.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use swarf::clean::{cleanup_with_progress, CleanupOptions, Progress};
use swarf::io;

#[derive(Parser)]
#[command(name = "swarf")]
#[command(version, about = "Mesh cleanup CLI", long_about = None)]
struct Cli {
    /// Input mesh file (.obj, .ply, .stl)
    input: PathBuf,

    /// Output mesh file (.obj, .ply, .stl)
    output: PathBuf,

    /// Distance threshold for merging duplicate vertices
    #[arg(long, default_value = "0.0001")]
    merge_distance: f64,

    /// Angle tolerance for two-edged vertex dissolution, in degrees
    #[arg(long, default_value = "5.0")]
    dissolve_angle: f64,

    /// Skip the two-edged vertex dissolve pass (faster on huge meshes)
    #[arg(long)]
    skip_two_edged: bool,

    /// Also remove faces not connected to any other face
    #[arg(long)]
    prune_faces: bool,

    /// Suppress progress and statistics output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(&cli.input)?;

    if !cli.quiet {
        println!(
            "Loaded: {} vertices, {} edges, {} faces",
            mesh.num_vertices(),
            mesh.num_edges(),
            mesh.num_faces()
        );
    }

    let options = CleanupOptions::default()
        .with_merge_distance(cli.merge_distance)
        .with_dissolve_angle(cli.dissolve_angle.to_radians())
        .with_two_edged(!cli.skip_two_edged)
        .with_prune_faces(cli.prune_faces);

    let progress = if cli.quiet {
        Progress::none()
    } else {
        Progress::new(|current, total, message| {
            if current < total {
                eprintln!("[{}/{}] {}", current + 1, total, message);
            }
        })
    };

    let start = Instant::now();
    let report = cleanup_with_progress(&mut mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    if !cli.quiet {
        println!("{}", report);
        println!(
            "Result: {} vertices, {} edges, {} faces ({:.2?})",
            mesh.num_vertices(),
            mesh.num_edges(),
            mesh.num_faces(),
            elapsed
        );
    }

    io::save(&mesh, &cli.output)?;
    if !cli.quiet {
        println!("Saved: {}", cli.output.display());
    }

    Ok(())
}
