//! Headless demo: renders a seeded colony of cells with one instanced draw.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p cellsphere-demo`.
//! Run with `cargo run -p cellsphere-demo -- --latitude-segments 8 --instances 64`
//! to change the tessellation and colony size.

mod cells;

use std::process::ExitCode;

use cellsphere_config::{CliArgs, Config, default_config_dir};
use cellsphere_mesh::SphereParams;
use cellsphere_render::{
    CameraUniform, CellPipeline, OffscreenTarget, ReadbackError, RenderContext,
    RenderContextError, RenderOutcome, SphereMesh, SphereMeshError, UsageError,
    init_render_context_blocking,
};
use clap::Parser;
use glam::Vec3;
use tracing::{error, info, warn};
use wgpu::util::DeviceExt;

use crate::cells::{CELL_SEED, cell_payloads, grid_extent};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Context(#[from] RenderContextError),
    #[error(transparent)]
    Mesh(#[from] SphereMeshError),
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Readback(#[from] ReadbackError),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = match args.config.clone().map_or_else(default_config_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Some(log_file) =
        cellsphere_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        info!("Writing JSON log to {}", log_file.display());
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), DemoError> {
    let ctx = init_render_context_blocking()?;
    let params = config.mesh.sphere_params();
    let instance_count = config.render.instance_count;

    let target = OffscreenTarget::new(
        &ctx.device,
        config.render.width,
        config.render.height,
        COLOR_FORMAT,
    );

    // The colony buffer belongs to the demo; the mesh only borrows it.
    let payloads = cell_payloads(instance_count, params.radius, CELL_SEED);
    let instance_buffer = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cell-instances"),
            contents: bytemuck::cast_slice(&payloads),
            usage: wgpu::BufferUsages::VERTEX,
        });

    let mut mesh = SphereMesh::new();
    mesh.generate(params)?;
    mesh.setup_buffers(&ctx.device)?;
    mesh.setup_instance_buffer(&instance_buffer)?;

    let layouts = mesh
        .vertex_array()
        .map(|vao| vao.buffer_layouts())
        .ok_or(UsageError::NotInitialized)?;
    let pipeline = CellPipeline::new(
        &ctx.device,
        &layouts,
        COLOR_FORMAT,
        Some(OffscreenTarget::DEPTH_FORMAT),
    );

    let distance = grid_extent(instance_count, params.radius) * 2.0;
    let eye = Vec3::new(0.6, 0.4, 1.0).normalize() * distance;
    pipeline.write_camera(
        &ctx.queue,
        &CameraUniform::looking_at(eye, Vec3::ZERO, target.aspect_ratio()),
    );

    render_frame(&ctx, &target, &pipeline, &mesh, config, "initial")?;

    // Finer tessellation on the same instance buffer.
    let finer = SphereParams::new(
        params.latitude_segments.saturating_mul(2),
        params.longitude_segments.saturating_mul(2),
        params.radius,
    );
    match mesh.regenerate(&ctx.device, finer) {
        Ok(()) => {
            mesh.setup_instance_buffer(&instance_buffer)?;
            render_frame(&ctx, &target, &pipeline, &mesh, config, "regenerated")?;
        }
        Err(e) => warn!("Skipping regenerated frame: {e}"),
    }

    mesh.cleanup();
    instance_buffer.destroy();
    info!("Released GPU resources");
    Ok(())
}

fn render_frame(
    ctx: &RenderContext,
    target: &OffscreenTarget,
    pipeline: &CellPipeline,
    mesh: &SphereMesh,
    config: &Config,
    label: &str,
) -> Result<(), DemoError> {
    let [r, g, b, a] = config.render.clear_color;
    let clear = wgpu::Color { r, g, b, a };

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("cell-frame-encoder"),
        });
    let outcome = {
        let mut pass = target.begin_pass(&mut encoder, clear);
        pipeline.bind(&mut pass);
        mesh.render(&mut pass, config.render.instance_count)
    };
    ctx.queue.submit(std::iter::once(encoder.finish()));

    match outcome {
        RenderOutcome::Drawn {
            index_count,
            instance_count,
        } => info!(
            "Frame '{label}': drew {instance_count} cells x {} triangles",
            index_count / 3
        ),
        RenderOutcome::NothingToDraw => info!("Frame '{label}': no cells to draw"),
        RenderOutcome::Skipped(err) => return Err(err.into()),
    }

    let pixels = target.read_pixels(&ctx.device, &ctx.queue)?;
    let background = pixels.first_chunk::<4>().copied().unwrap_or_default();
    let covered = pixels
        .chunks_exact(4)
        .filter(|px| **px != background[..])
        .count();
    info!(
        "Frame '{label}': {covered} of {} pixels covered",
        target.width() * target.height()
    );
    Ok(())
}
