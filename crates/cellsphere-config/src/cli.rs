//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Headless cell sphere renderer.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "cellsphere", about = "Instanced cell sphere renderer")]
pub struct CliArgs {
    /// Latitude bands of the sphere mesh.
    #[arg(long)]
    pub latitude_segments: Option<u32>,

    /// Longitude columns of the sphere mesh.
    #[arg(long)]
    pub longitude_segments: Option<u32>,

    /// Sphere radius.
    #[arg(long)]
    pub radius: Option<f32>,

    /// Number of cell instances to draw.
    #[arg(long)]
    pub instances: Option<u32>,

    /// Offscreen target width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Offscreen target height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(lat) = args.latitude_segments {
            self.mesh.latitude_segments = lat;
        }
        if let Some(lon) = args.longitude_segments {
            self.mesh.longitude_segments = lon;
        }
        if let Some(radius) = args.radius {
            self.mesh.radius = radius;
        }
        if let Some(n) = args.instances {
            self.render.instance_count = n;
        }
        if let Some(w) = args.width {
            self.render.width = w;
        }
        if let Some(h) = args.height {
            self.render.height = h;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
