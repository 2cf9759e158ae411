//! Error taxonomy. Every variant here is fatal to the current run.

use thiserror::Error;

use crate::types::ShaderKind;

/// A shader unit failed to compile. `log` is the driver's diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} shader failed to compile:\n{log}")]
pub struct CompileError {
    pub kind: ShaderKind,
    pub log: String,
}

/// Two compiled units could not be linked into a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shader program failed to link:\n{log}")]
pub struct LinkError {
    pub log: String,
}

/// Vertex data and its declared layout disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("attribute component count {0} is outside 1..=4")]
    Components(u8),
    #[error("attribute at offset {offset} with {components} components overruns the {stride}-byte stride")]
    Overrun {
        offset: usize,
        components: u8,
        stride: usize,
    },
    #[error("no vertex data to upload")]
    Empty,
    #[error("{len} bytes of vertex data is not a whole number of {stride}-byte vertices")]
    Ragged { len: usize, stride: usize },
}

/// Window or GL context creation failed.
#[derive(Debug, Error)]
pub enum ContextInitError {
    #[error("failed to create the event loop: {0}")]
    EventLoop(String),
    #[error("failed to create the window: {0}")]
    Window(String),
    #[error("failed to create the OpenGL context: {0}")]
    Context(String),
    #[error("the OpenGL context does not support GLSL {required}")]
    UnsupportedGlsl { required: &'static str },
}

/// GL entry points could not be resolved after the context was made current.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load OpenGL entry points: {}", missing.join(", "))]
pub struct LoaderInitError {
    pub missing: Vec<&'static str>,
}

/// The window layer could not present a finished frame.
#[derive(Debug, Error)]
#[error("failed to present frame: {0}")]
pub struct SurfaceError(pub String);

/// Anything that stops the pipeline from being built.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
