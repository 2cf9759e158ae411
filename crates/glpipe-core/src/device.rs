//! The [`Device`] trait: the only way the pipeline talks to the GPU.
//!
//! Methods map one-to-one onto the OpenGL calls the harness issues, in the
//! order it issues them. Object names are plain `u32`s, exactly as GL hands
//! them out; ownership is tracked by the wrapper types in the `glpipe` crate,
//! not here.
//!
//! Implementations must only be used on the thread that owns the current
//! context. Both implementations in this workspace are `!Send` and `!Sync`.

use crate::types::{ClearColor, ShaderKind, VertexLayout, Viewport};

/// A GL object name.
pub type ObjectId = u32;

/// Bytes requested from the driver for an info log, terminator included.
/// At most `INFO_LOG_CAPACITY - 1` visible characters come back.
pub const INFO_LOG_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
}

/// Upload frequency hint for buffer storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    StaticDraw,
}

/// How `draw_arrays` assembles vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Every three vertices form one filled triangle.
    Triangles,
}

pub trait Device {
    fn create_shader(&self, kind: ShaderKind) -> ObjectId;
    fn shader_source(&self, shader: ObjectId, source: &str);
    fn compile_shader(&self, shader: ObjectId);
    fn compile_status(&self, shader: ObjectId) -> bool;
    /// Driver log for `shader`, truncated to `capacity - 1` characters.
    fn shader_info_log(&self, shader: ObjectId, capacity: usize) -> String;
    fn delete_shader(&self, shader: ObjectId);

    fn create_program(&self) -> ObjectId;
    fn attach_shader(&self, program: ObjectId, shader: ObjectId);
    fn detach_shader(&self, program: ObjectId, shader: ObjectId);
    fn link_program(&self, program: ObjectId);
    fn link_status(&self, program: ObjectId) -> bool;
    /// Driver log for `program`, truncated to `capacity - 1` characters.
    fn program_info_log(&self, program: ObjectId, capacity: usize) -> String;
    fn use_program(&self, program: ObjectId);
    fn delete_program(&self, program: ObjectId);

    fn create_vertex_array(&self) -> ObjectId;
    fn bind_vertex_array(&self, vertex_array: ObjectId);
    fn delete_vertex_array(&self, vertex_array: ObjectId);

    fn create_buffer(&self) -> ObjectId;
    fn bind_buffer(&self, target: BufferTarget, buffer: ObjectId);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: ObjectId);

    /// Describe a float attribute of the currently bound array buffer.
    fn vertex_attrib_pointer(&self, layout: &VertexLayout);
    fn enable_vertex_attrib_array(&self, location: u32);

    fn viewport(&self, viewport: Viewport);
    fn clear_color(&self, color: ClearColor);
    /// Clear the color buffer only.
    fn clear(&self);
    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32);
}

/// Trim a driver log to what a `capacity`-byte C buffer would have held.
pub fn bound_log(mut log: String, capacity: usize) -> String {
    let visible = capacity.saturating_sub(1);
    if log.len() > visible {
        let mut end = visible;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_log_keeps_511_visible_bytes() {
        let long = "x".repeat(2000);
        assert_eq!(bound_log(long, INFO_LOG_CAPACITY).len(), 511);
        assert_eq!(bound_log("short".into(), INFO_LOG_CAPACITY), "short");
    }

    #[test]
    fn bound_log_respects_char_boundaries() {
        let log = "é".repeat(300);
        let bounded = bound_log(log, INFO_LOG_CAPACITY);
        assert!(bounded.len() <= 511);
        assert!(bounded.chars().all(|c| c == 'é'));
    }
}
