//! [`Device`] backed by the real OpenGL driver.

use std::ffi::c_void;

use gl::types::{GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};
use glpipe_core::device::bound_log;
use glpipe_core::{
    BufferTarget, BufferUsage, ClearColor, Device, ObjectId, Primitive, ShaderKind, VertexLayout,
    Viewport,
};
use tracing::warn;

use crate::loader::LoadedGl;
use crate::validate_gl;

/// Issues raw `gl` calls.
///
/// Constructing one requires a [`LoadedGl`] token, so entry points are always
/// resolved, and the token keeps the device on the context's thread. The
/// context must stay current for as long as the device is used; `GlWindow`
/// never releases it.
#[derive(Debug, Clone, Copy)]
pub struct NativeDevice {
    _loaded: LoadedGl,
}

impl NativeDevice {
    pub fn new(loaded: LoadedGl) -> Self {
        Self { _loaded: loaded }
    }

    /// Pop and describe every pending GL error.
    pub fn drain_errors(&self) -> Vec<&'static str> {
        unsafe { validate_gl::drain_errors() }
    }
}

fn shader_type(kind: ShaderKind) -> GLenum {
    match kind {
        ShaderKind::Vertex => gl::VERTEX_SHADER,
        ShaderKind::Fragment => gl::FRAGMENT_SHADER,
        ShaderKind::Geometry => gl::GEOMETRY_SHADER,
    }
}

fn buffer_target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::StaticDraw => gl::STATIC_DRAW,
    }
}

fn primitive_mode(primitive: Primitive) -> GLenum {
    match primitive {
        Primitive::Triangles => gl::TRIANGLES,
    }
}

/// Read an info log through `getter` into a `capacity`-byte buffer.
unsafe fn read_info_log(
    object: GLuint,
    capacity: usize,
    getter: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut buf = vec![0u8; capacity];
    let mut written: GLsizei = 0;
    getter(
        object,
        capacity as GLsizei,
        &mut written,
        buf.as_mut_ptr() as *mut GLchar,
    );
    buf.truncate(written.max(0) as usize);
    bound_log(String::from_utf8_lossy(&buf).into_owned(), capacity)
}

// SAFETY (all methods below): the LoadedGl token guarantees the entry points
// exist, and it is only obtainable on the thread where the context is current.
impl Device for NativeDevice {
    fn create_shader(&self, kind: ShaderKind) -> ObjectId {
        unsafe { gl::CreateShader(shader_type(kind)) }
    }

    fn shader_source(&self, shader: ObjectId, source: &str) {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) }
    }

    fn compile_shader(&self, shader: ObjectId) {
        unsafe { gl::CompileShader(shader) }
    }

    fn compile_status(&self, shader: ObjectId) -> bool {
        let mut status = GLint::from(gl::FALSE);
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == GLint::from(gl::TRUE)
    }

    fn shader_info_log(&self, shader: ObjectId, capacity: usize) -> String {
        unsafe { read_info_log(shader, capacity, gl::GetShaderInfoLog) }
    }

    fn delete_shader(&self, shader: ObjectId) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> ObjectId {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: ObjectId, shader: ObjectId) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: ObjectId, shader: ObjectId) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn link_program(&self, program: ObjectId) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: ObjectId) -> bool {
        let mut status = GLint::from(gl::FALSE);
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == GLint::from(gl::TRUE)
    }

    fn program_info_log(&self, program: ObjectId, capacity: usize) -> String {
        unsafe { read_info_log(program, capacity, gl::GetProgramInfoLog) }
    }

    fn use_program(&self, program: ObjectId) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: ObjectId) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn create_vertex_array(&self) -> ObjectId {
        let mut id = 0;
        unsafe { gl::GenVertexArrays(1, &mut id) };
        id
    }

    fn bind_vertex_array(&self, vertex_array: ObjectId) {
        unsafe { gl::BindVertexArray(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: ObjectId) {
        unsafe { gl::DeleteVertexArrays(1, &vertex_array) }
    }

    fn create_buffer(&self) -> ObjectId {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, &mut id) };
        id
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: ObjectId) {
        unsafe { gl::BindBuffer(buffer_target(target), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            gl::BufferData(
                buffer_target(target),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                buffer_usage(usage),
            )
        }
    }

    fn delete_buffer(&self, buffer: ObjectId) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn vertex_attrib_pointer(&self, layout: &VertexLayout) {
        unsafe {
            gl::VertexAttribPointer(
                layout.location,
                GLint::from(layout.components),
                gl::FLOAT,
                gl::FALSE,
                layout.stride as GLsizei,
                layout.offset as *const c_void,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { gl::EnableVertexAttribArray(location) }
    }

    fn viewport(&self, viewport: Viewport) {
        unsafe {
            gl::Viewport(0, 0, viewport.width as GLint, viewport.height as GLint);

            if cfg!(debug_assertions) {
                if let Err(e) = validate_gl::validate_viewport(viewport) {
                    warn!("viewport check failed: {e}");
                }
            }
        }
    }

    fn clear_color(&self, color: ClearColor) {
        let [r, g, b, a] = color.0;
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) }
    }

    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32) {
        unsafe { gl::DrawArrays(primitive_mode(primitive), first as GLint, count as GLsizei) }
    }
}
