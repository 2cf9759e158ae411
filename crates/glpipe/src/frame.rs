//! The render loop.

use glpipe_core::{
    ClearColor, Device, FrameState, Key, Settings, Surface, SurfaceError, SurfaceEvent, Viewport,
};
use tracing::{debug, info, trace, warn};

use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Terminated,
}

/// Totals for one run of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Frames presented.
    pub frames: u64,
}

/// Drives the clear, draw and present cycle until the surface closes.
///
/// A driver runs once. Each iteration:
///
/// 1. stop if the surface should close,
/// 2. pump window events (resizes update the viewport, a close request stops
///    the loop before anything is drawn),
/// 3. clear, draw the pipeline, present,
/// 4. request close if the exit key is held.
pub struct FrameDriver<'p, 'd, D: Device> {
    device: &'d D,
    pipeline: &'p Pipeline<'d, D>,
    clear_color: ClearColor,
    exit_key: Key,
    viewport: Option<Viewport>,
    state: DriverState,
    stats: FrameStats,
}

impl<'p, 'd, D: Device> FrameDriver<'p, 'd, D> {
    pub fn new(device: &'d D, pipeline: &'p Pipeline<'d, D>, settings: &Settings) -> Self {
        Self {
            device,
            pipeline,
            clear_color: settings.clear_color,
            exit_key: settings.exit_key,
            viewport: None,
            state: DriverState::Idle,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Set the viewport to cover `viewport` from the origin. Repeating the
    /// current size issues nothing.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.viewport == Some(viewport) {
            return;
        }
        debug!(width = viewport.width, height = viewport.height, "viewport");
        self.device.viewport(viewport);
        self.viewport = Some(viewport);
    }

    /// Run the loop until the surface closes.
    ///
    /// A driver that already ran returns its previous stats without touching
    /// the surface. A presentation failure ends the run with the error.
    pub fn run(&mut self, surface: &mut impl Surface) -> Result<FrameStats, SurfaceError> {
        if self.state == DriverState::Terminated {
            warn!("frame driver already terminated");
            return Ok(self.stats);
        }

        self.state = DriverState::Running;
        info!("entering render loop");
        self.resize(surface.framebuffer_size());

        let result = self.drive(surface);
        self.state = DriverState::Terminated;
        info!(frames = self.stats.frames, "render loop finished");

        result.map(|()| self.stats)
    }

    fn drive(&mut self, surface: &mut impl Surface) -> Result<(), SurfaceError> {
        while !surface.should_close() {
            let mut resized = None;
            let mut close_requested = false;
            surface.poll_events(&mut |event| match event {
                SurfaceEvent::Resized { width, height } => {
                    resized = Some(Viewport::new(width, height))
                }
                SurfaceEvent::CloseRequested => close_requested = true,
            });

            if let Some(viewport) = resized {
                self.resize(viewport);
            }
            if close_requested || surface.should_close() {
                break;
            }

            let frame = FrameState {
                clear_color: self.clear_color,
                viewport: self.viewport.unwrap_or_default(),
            };
            self.render(&frame);
            surface.present()?;
            self.stats.frames += 1;
            trace!(frame = self.stats.frames, "presented");

            if surface.is_key_pressed(self.exit_key) {
                debug!(key = ?self.exit_key, "exit key pressed");
                surface.request_close();
            }
        }

        Ok(())
    }

    fn render(&self, frame: &FrameState) {
        self.device.clear_color(frame.clear_color);
        self.device.clear();
        self.pipeline.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle;
    use glpipe_core::headless::Call;
    use glpipe_core::HeadlessDevice;

    /// Closes itself after presenting `limit` frames.
    struct CountingSurface {
        presented: u64,
        limit: u64,
        closed: bool,
    }

    impl Surface for CountingSurface {
        fn framebuffer_size(&self) -> Viewport {
            Viewport::new(800, 600)
        }

        fn poll_events(&mut self, _on_event: &mut dyn FnMut(SurfaceEvent)) {}

        fn present(&mut self) -> Result<(), SurfaceError> {
            self.presented += 1;
            if self.presented >= self.limit {
                self.closed = true;
            }
            Ok(())
        }

        fn should_close(&self) -> bool {
            self.closed
        }

        fn request_close(&mut self) {
            self.closed = true;
        }

        fn is_key_pressed(&self, _key: Key) -> bool {
            false
        }
    }

    fn pipeline(device: &HeadlessDevice) -> Pipeline<'_, HeadlessDevice> {
        Pipeline::build(
            device,
            triangle::vertex_shader(),
            triangle::fragment_shader(),
            &triangle::VERTICES,
            triangle::LAYOUT,
        )
        .unwrap()
    }

    #[test]
    fn clears_before_each_draw() {
        let device = HeadlessDevice::new();
        let pipeline = pipeline(&device);
        let settings = Settings::default().with_clear_color(ClearColor::BLACK);
        let mut surface = CountingSurface {
            presented: 0,
            limit: 2,
            closed: false,
        };

        let mut driver = FrameDriver::new(&device, &pipeline, &settings);
        let stats = driver.run(&mut surface).unwrap();
        assert_eq!(stats.frames, 2);
        assert_eq!(driver.state(), DriverState::Terminated);

        let calls = device.calls();
        let clears = calls.iter().filter(|c| **c == Call::Clear).count();
        assert_eq!(clears, 2);
        for draw in device.draw_calls() {
            assert_eq!(draw.clear_color, Some(ClearColor::BLACK));
            assert_eq!(draw.viewport, Some(Viewport::new(800, 600)));
        }
    }

    #[test]
    fn second_run_is_a_no_op() {
        let device = HeadlessDevice::new();
        let pipeline = pipeline(&device);
        let settings = Settings::default();
        let mut surface = CountingSurface {
            presented: 0,
            limit: 1,
            closed: false,
        };

        let mut driver = FrameDriver::new(&device, &pipeline, &settings);
        driver.run(&mut surface).unwrap();
        let calls_after_first = device.calls().len();

        surface.closed = false;
        let stats = driver.run(&mut surface).unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(device.calls().len(), calls_after_first);
    }

    #[test]
    fn repeated_resize_issues_one_call() {
        let device = HeadlessDevice::new();
        let pipeline = pipeline(&device);
        let settings = Settings::default();
        let mut driver = FrameDriver::new(&device, &pipeline, &settings);

        driver.resize(Viewport::new(320, 240));
        driver.resize(Viewport::new(320, 240));
        let viewports = device
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Viewport(_)))
            .count();
        assert_eq!(viewports, 1);
        assert_eq!(driver.state(), DriverState::Idle);
    }
}
