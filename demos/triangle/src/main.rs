//! Opens a window and draws one orange triangle until it is closed or the
//! exit key (Escape by default) is pressed.
//!
//! Window settings come from `GLPIPE_*` environment variables, log filtering
//! from `RUST_LOG`.

use anyhow::{Context, Result};
use glpipe::{triangle, FrameDriver, GpuContext};
use glpipe_core::{logging, Settings};
use glpipe_gl::GlWindow;
use tracing::{error, info, warn};

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = Settings::from_env();
    info!(title = %settings.title, width = settings.width, height = settings.height, "starting");

    let mut window = GlWindow::new(&settings).context("failed to set up the window")?;
    let ctx = GpuContext::new(window.device());

    let pipeline = ctx
        .build_pipeline(
            triangle::vertex_shader(),
            triangle::fragment_shader(),
            &triangle::VERTICES,
            triangle::LAYOUT,
        )
        .context("failed to build the triangle pipeline")?;

    for e in ctx.device().drain_errors() {
        warn!("GL error during setup: {e}");
    }

    let stats = FrameDriver::new(ctx.device(), &pipeline, &settings).run(&mut window)?;
    info!(frames = stats.frames, "window closed");

    Ok(())
}
