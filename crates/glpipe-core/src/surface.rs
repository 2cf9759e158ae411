//! What the frame driver needs from the window layer.

use std::str::FromStr;

use crate::error::SurfaceError;
use crate::types::Viewport;

/// Notifications delivered while pumping window events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The framebuffer changed size, in physical pixels.
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// Keys the harness can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Q,
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Ok(Key::Escape),
            "enter" | "return" => Ok(Key::Enter),
            "space" => Ok(Key::Space),
            "q" => Ok(Key::Q),
            other => Err(format!("unknown key '{other}'")),
        }
    }
}

/// A presentable window with a current GL context.
///
/// Everything here is called from the render thread, once per frame at most,
/// and never blocks except `present`, which may wait for vertical sync.
pub trait Surface {
    /// Current framebuffer size in physical pixels.
    fn framebuffer_size(&self) -> Viewport;

    /// Drain pending window events without blocking, handing each to `on_event`.
    fn poll_events(&mut self, on_event: &mut dyn FnMut(SurfaceEvent));

    /// Swap the back buffer to the screen.
    fn present(&mut self) -> Result<(), SurfaceError>;

    fn should_close(&self) -> bool;

    fn request_close(&mut self);

    fn is_key_pressed(&self, key: Key) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_names() {
        assert_eq!("Escape".parse::<Key>(), Ok(Key::Escape));
        assert_eq!("esc".parse::<Key>(), Ok(Key::Escape));
        assert_eq!("q".parse::<Key>(), Ok(Key::Q));
        assert!("f13".parse::<Key>().is_err());
    }
}
