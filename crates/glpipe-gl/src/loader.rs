//! GL function pointer loading.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::sync::OnceLock;

use glpipe_core::LoaderInitError;
use tracing::debug;

static LOADED: OnceLock<Result<(), LoaderInitError>> = OnceLock::new();

/// Proof that GL entry points were resolved for the current context.
///
/// Not `Send`: the pointers are only usable on the thread that owns the
/// context they were loaded from.
#[derive(Debug, Clone, Copy)]
pub struct LoadedGl {
    _thread: PhantomData<*const ()>,
}

/// Resolve every GL entry point through `get_proc_address`.
///
/// The loader runs exactly once per process; later calls return the first
/// outcome without touching the driver again. Must be called after the
/// context is made current and before any GL call.
pub fn load_with<F>(mut get_proc_address: F) -> Result<LoadedGl, LoaderInitError>
where
    F: FnMut(&str) -> *const c_void,
{
    LOADED
        .get_or_init(|| {
            gl::load_with(|symbol| get_proc_address(symbol));

            let missing = missing_entry_points();
            if missing.is_empty() {
                debug!("GL entry points loaded");
                Ok(())
            } else {
                Err(LoaderInitError { missing })
            }
        })
        .clone()
        .map(|()| LoadedGl {
            _thread: PhantomData,
        })
}

/// Entry points the pipeline cannot run without.
fn missing_entry_points() -> Vec<&'static str> {
    let required = [
        ("glCreateShader", gl::CreateShader::is_loaded()),
        ("glShaderSource", gl::ShaderSource::is_loaded()),
        ("glCompileShader", gl::CompileShader::is_loaded()),
        ("glGetShaderiv", gl::GetShaderiv::is_loaded()),
        ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded()),
        ("glCreateProgram", gl::CreateProgram::is_loaded()),
        ("glAttachShader", gl::AttachShader::is_loaded()),
        ("glLinkProgram", gl::LinkProgram::is_loaded()),
        ("glUseProgram", gl::UseProgram::is_loaded()),
        ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
        ("glBindVertexArray", gl::BindVertexArray::is_loaded()),
        ("glGenBuffers", gl::GenBuffers::is_loaded()),
        ("glBufferData", gl::BufferData::is_loaded()),
        ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded()),
        ("glEnableVertexAttribArray", gl::EnableVertexAttribArray::is_loaded()),
        ("glViewport", gl::Viewport::is_loaded()),
        ("glClear", gl::Clear::is_loaded()),
        ("glDrawArrays", gl::DrawArrays::is_loaded()),
    ];

    required
        .iter()
        .filter(|(_, loaded)| !loaded)
        .map(|(name, _)| *name)
        .collect()
}
