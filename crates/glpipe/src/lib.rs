//! Shader compilation, program linking, vertex upload and the frame loop.
//!
//! All GPU work goes through a [`glpipe_core::Device`]. With a
//! `glpipe_gl::NativeDevice` it reaches the driver; with a
//! [`glpipe_core::HeadlessDevice`] it is recorded for inspection.
//!
//! ```ignore
//! let ctx = GpuContext::new(window.device());
//! let pipeline = ctx.build_pipeline(
//!     triangle::vertex_shader(),
//!     triangle::fragment_shader(),
//!     &triangle::VERTICES,
//!     triangle::LAYOUT,
//! )?;
//! FrameDriver::new(ctx.device(), &pipeline, &settings).run(&mut window)?;
//! ```

pub mod buffer;
pub mod bytes;
pub mod context;
pub mod frame;
pub mod pipeline;
pub mod program;
pub mod shader;
pub mod triangle;

pub use buffer::{upload, BufferBinding, Geometry, GpuBuffer, VertexArray, VertexArrayBinding};
pub use bytes::AsBytes;
pub use context::GpuContext;
pub use frame::{DriverState, FrameDriver, FrameStats};
pub use pipeline::Pipeline;
pub use program::{link, ActiveProgram, ShaderProgram};
pub use shader::{compile, CompiledShaderUnit};
