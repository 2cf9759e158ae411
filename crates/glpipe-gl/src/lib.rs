//! Native window and OpenGL context for the glpipe harness.
//!
//! [`GlWindow`] owns a winit window, a glutin OpenGL core context made current
//! on the calling thread, and a glium [`Display`] wrapping both for
//! presentation and capability queries. Events are pumped without blocking so
//! the frame driver keeps control of the loop.
//!
//! Drawing itself never goes through glium: the pipeline issues raw `gl`
//! calls through [`NativeDevice`].

use std::collections::HashSet;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context as _, Result};
use glium::backend::glutin::Display;
use glpipe_core::{ContextInitError, Key, Settings, Surface, SurfaceError, SurfaceEvent, Viewport};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, Version};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::prelude::{GlSurface, NotCurrentGlContext};
use glutin::surface::{SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use raw_window_handle::HasWindowHandle;
use tracing::{debug, info, trace, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

pub mod glsl;
pub mod loader;
pub mod native;
pub mod validate_gl;

pub use loader::LoadedGl;
pub use native::NativeDevice;

/// Window events collected during one pump, plus live key state.
#[derive(Debug, Default)]
struct WindowEvents {
    pending: Vec<SurfaceEvent>,
    pressed: HashSet<Key>,
}

impl ApplicationHandler for WindowEvents {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.pending.push(SurfaceEvent::CloseRequested),
            WindowEvent::Resized(size) => self.pending.push(SurfaceEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = map_key(code) else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => self.pressed.insert(key),
                    ElementState::Released => self.pressed.remove(&key),
                };
            }
            _ => {}
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Space => Some(Key::Space),
        KeyCode::KeyQ => Some(Key::Q),
        _ => None,
    }
}

/// Pumps allowed for the first `resumed` to arrive.
const BOOTSTRAP_PUMPS: usize = 100;
const BOOTSTRAP_WAIT: Duration = Duration::from_millis(10);

/// Creates the window once the event loop is resumed, the only point where
/// winit 0.30 guarantees window creation works on every platform.
struct Bootstrap {
    attributes: Option<WindowAttributes>,
    created: Option<Result<(Window, Config), ContextInitError>>,
}

impl ApplicationHandler for Bootstrap {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.attributes.take() {
            self.created = Some(create_window(event_loop, attributes));
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, _event: WindowEvent) {}
}

fn window_attributes(settings: &Settings) -> WindowAttributes {
    Window::default_attributes()
        .with_title(settings.title.clone())
        .with_inner_size(LogicalSize::new(settings.width, settings.height))
}

fn create_window(
    event_loop: &ActiveEventLoop,
    attributes: WindowAttributes,
) -> Result<(Window, Config), ContextInitError> {
    let (window, config) = DisplayBuilder::new()
        .with_window_attributes(Some(attributes))
        .build(event_loop, ConfigTemplateBuilder::new(), pick_config)
        .map_err(|e| ContextInitError::Window(e.to_string()))?;
    let window =
        window.ok_or_else(|| ContextInitError::Window("no window was created".to_string()))?;
    Ok((window, config))
}

/// A window with a current OpenGL context.
///
/// Field order is drop order: the GL display goes before the window it
/// renders into.
pub struct GlWindow {
    display: Display<WindowSurface>,
    window: Window,
    events: WindowEvents,
    event_loop: EventLoop<()>,
    loaded: LoadedGl,
    should_close: bool,
}

impl GlWindow {
    /// Open a window of the configured size and title, create and activate
    /// its context, and load GL entry points.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut event_loop =
            EventLoop::new().map_err(|e| ContextInitError::EventLoop(e.to_string()))?;

        let mut bootstrap = Bootstrap {
            attributes: Some(window_attributes(settings)),
            created: None,
        };
        for _ in 0..BOOTSTRAP_PUMPS {
            let status = event_loop.pump_app_events(Some(BOOTSTRAP_WAIT), &mut bootstrap);
            if let PumpStatus::Exit(code) = status {
                return Err(ContextInitError::EventLoop(format!(
                    "event loop exited with code {code} before the window was created"
                ))
                .into());
            }
            if bootstrap.created.is_some() {
                break;
            }
        }
        let (window, config) = bootstrap.created.ok_or_else(|| {
            ContextInitError::EventLoop("event loop never resumed".to_string())
        })??;

        let raw_window_handle = window
            .window_handle()
            .map_err(|e| ContextInitError::Window(e.to_string()))?
            .as_raw();

        let (major, minor) = settings.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window_handle));

        let gl_display = config.display();
        let not_current = unsafe { gl_display.create_context(&config, &context_attributes) }
            .map_err(|e| ContextInitError::Context(e.to_string()))?;

        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::<WindowSurface>::new())
            .map_err(|e| ContextInitError::Context(e.to_string()))?;
        let surface = unsafe { gl_display.create_window_surface(&config, &surface_attributes) }
            .map_err(|e| ContextInitError::Context(e.to_string()))?;

        let context = not_current
            .make_current(&surface)
            .map_err(|e| ContextInitError::Context(e.to_string()))?;

        let interval = if settings.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            warn!("could not set swap interval: {e}");
        }

        let loaded = loader::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(&symbol),
            Err(_) => std::ptr::null(),
        })
        .context("OpenGL loader failed")?;

        let display = Display::from_context_surface(context, surface)
            .map_err(|e| ContextInitError::Context(format!("{e:?}")))?;

        let version = display.get_opengl_version_string();
        let renderer = display.get_opengl_renderer_string();
        info!("OPENGL_VERSION {version}");
        debug!("OPENGL_RENDERER {renderer}");

        let glsl = glsl::require(&*display, glsl::GlslVersion::Glsl330)?;
        debug!("GLSL {}", glsl.as_str());

        Ok(Self {
            display,
            window,
            events: WindowEvents::default(),
            event_loop,
            loaded,
            should_close: false,
        })
    }

    /// A device issuing GL calls into this window's context.
    pub fn device(&self) -> NativeDevice {
        NativeDevice::new(self.loaded)
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        .expect("glutin yields at least one matching config")
}

impl Surface for GlWindow {
    fn framebuffer_size(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height)
    }

    fn poll_events(&mut self, on_event: &mut dyn FnMut(SurfaceEvent)) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.events);
        if let PumpStatus::Exit(code) = status {
            debug!(code, "event loop exited");
            self.should_close = true;
        }

        for event in self.events.pending.drain(..) {
            match event {
                SurfaceEvent::Resized { width, height } if width > 0 && height > 0 => {
                    self.display.resize((width, height));
                }
                SurfaceEvent::CloseRequested => self.should_close = true,
                _ => {}
            }
            trace!(?event, "window event");
            on_event(event);
        }
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.display
            .swap_buffers()
            .map_err(|e| SurfaceError(format!("{e:?}")))
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn request_close(&mut self) {
        self.should_close = true;
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.events.pressed.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Size;

    #[test]
    fn window_attributes_follow_settings() {
        let settings = Settings::default().with_title("triangle").with_size(300, 200);
        let attributes = window_attributes(&settings);
        assert_eq!(attributes.title, "triangle");
        assert_eq!(
            attributes.inner_size,
            Some(Size::Logical(LogicalSize::new(300.0, 200.0)))
        );
    }

    #[test]
    fn maps_exit_keys() {
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::KeyQ), Some(Key::Q));
        assert_eq!(map_key(KeyCode::KeyZ), None);
    }
}
