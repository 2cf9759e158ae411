//! Shared building blocks for the glpipe rendering harness.
//!
//! This crate has no GL or windowing dependency. It defines:
//!
//! - the data model ([`ShaderSource`], [`VertexLayout`], [`FrameState`], ...),
//! - the error taxonomy ([`CompileError`], [`LinkError`], [`ContextInitError`],
//!   [`LoaderInitError`], ...),
//! - the [`Device`] trait every GPU call goes through, with a recording
//!   [`HeadlessDevice`] implementation,
//! - the [`Surface`] trait the frame driver consumes from the window layer,
//! - [`Settings`] and the [`logging`] bootstrap.

pub mod device;
pub mod error;
pub mod headless;
pub mod logging;
pub mod settings;
pub mod surface;
pub mod types;

pub use device::{BufferTarget, BufferUsage, Device, ObjectId, Primitive, INFO_LOG_CAPACITY};
pub use error::{
    CompileError, ContextInitError, LayoutError, LinkError, LoaderInitError, PipelineError,
    SurfaceError,
};
pub use headless::HeadlessDevice;
pub use settings::Settings;
pub use surface::{Key, Surface, SurfaceEvent};
pub use types::{ClearColor, FrameState, ShaderKind, ShaderSource, VertexLayout, Viewport};
