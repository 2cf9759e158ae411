//! Program linking and activation.

use glpipe_core::{Device, LinkError, ObjectId, Primitive, ShaderKind, INFO_LOG_CAPACITY};
use tracing::{debug, error, trace};

use crate::buffer::VertexArrayBinding;
use crate::shader::{non_empty, CompiledShaderUnit};

/// A linked vertex + fragment program. Deleted on drop.
pub struct ShaderProgram<'d, D: Device> {
    device: &'d D,
    id: ObjectId,
}

impl<'d, D: Device> ShaderProgram<'d, D> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Make this the current program for subsequent draws.
    pub fn activate(&self) -> ActiveProgram<'_, D> {
        self.device.use_program(self.id);
        ActiveProgram {
            device: self.device,
            id: self.id,
        }
    }
}

impl<D: Device> Drop for ShaderProgram<'_, D> {
    fn drop(&mut self) {
        self.device.delete_program(self.id);
    }
}

impl<D: Device> std::fmt::Debug for ShaderProgram<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram").field("id", &self.id).finish()
    }
}

/// Proof that a program is current. Draws go through here.
pub struct ActiveProgram<'a, D: Device> {
    device: &'a D,
    id: ObjectId,
}

impl<D: Device> ActiveProgram<'_, D> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Draw `count` vertices starting at `first` from the bound vertex array.
    pub fn draw_arrays(
        &self,
        _vertex_array: &VertexArrayBinding<'_, D>,
        primitive: Primitive,
        first: u32,
        count: u32,
    ) {
        trace!(program = self.id, ?primitive, count, "draw");
        self.device.draw_arrays(primitive, first, count);
    }
}

/// Link a vertex and a fragment unit into a program.
///
/// Both units are consumed and their shader objects deleted whatever the
/// outcome. A failed program object is deleted too.
pub fn link<'d, D: Device>(
    vertex: CompiledShaderUnit<'d, D>,
    fragment: CompiledShaderUnit<'d, D>,
) -> Result<ShaderProgram<'d, D>, LinkError> {
    if vertex.kind != ShaderKind::Vertex || fragment.kind != ShaderKind::Fragment {
        let log = format!(
            "expected a vertex and a fragment unit, got {} and {}",
            vertex.kind, fragment.kind
        );
        error!("shader program link failed:\n{log}");
        return Err(LinkError { log });
    }

    let device = vertex.device;
    let id = device.create_program();
    if id == 0 {
        let log = "driver could not allocate a program object".to_string();
        error!("shader program link failed:\n{log}");
        return Err(LinkError { log });
    }

    device.attach_shader(id, vertex.id);
    device.attach_shader(id, fragment.id);
    device.link_program(id);

    let linked = device.link_status(id);
    let log = if linked {
        None
    } else {
        Some(non_empty(device.program_info_log(id, INFO_LOG_CAPACITY)))
    };

    device.detach_shader(id, vertex.id);
    device.detach_shader(id, fragment.id);
    drop(vertex);
    drop(fragment);

    if let Some(log) = log {
        device.delete_program(id);
        error!("shader program link failed:\n{log}");
        return Err(LinkError { log });
    }

    debug!(id, "linked shader program");
    Ok(ShaderProgram { device, id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile;
    use glpipe_core::{HeadlessDevice, ShaderSource};

    const VERTEX: &str = "#version 330 core
layout (location = 0) in vec2 aPos;
void main()
{
    gl_Position = vec4(aPos, 0.0, 1.0);
}
";

    const FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
void main()
{
    FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
";

    #[test]
    fn link_consumes_both_units() {
        let device = HeadlessDevice::new();
        let vs = compile(&device, ShaderSource::vertex(VERTEX)).unwrap();
        let fs = compile(&device, ShaderSource::fragment(FRAGMENT)).unwrap();

        let program = link(vs, fs).unwrap();
        assert_eq!(device.live_shaders(), 0);
        assert_eq!(device.live_programs(), 1);

        drop(program);
        assert_eq!(device.live_programs(), 0);
    }

    #[test]
    fn failed_link_cleans_up_everything() {
        let device = HeadlessDevice::new().with_link_failure("error: varying mismatch");
        let vs = compile(&device, ShaderSource::vertex(VERTEX)).unwrap();
        let fs = compile(&device, ShaderSource::fragment(FRAGMENT)).unwrap();

        let err = link(vs, fs).unwrap_err();
        assert_eq!(err.log, "error: varying mismatch");
        assert_eq!(device.live_shaders(), 0);
        assert_eq!(device.live_programs(), 0);
    }

    #[test]
    fn swapped_units_are_rejected() {
        let device = HeadlessDevice::new();
        let vs = compile(&device, ShaderSource::vertex(VERTEX)).unwrap();
        let fs = compile(&device, ShaderSource::fragment(FRAGMENT)).unwrap();

        let err = link(fs, vs).unwrap_err();
        assert!(err.log.contains("got fragment and vertex"), "{}", err.log);
        assert_eq!(device.live_shaders(), 0);
        assert_eq!(device.live_programs(), 0);
    }

    #[test]
    fn activation_sets_current_program() {
        let device = HeadlessDevice::new();
        let vs = compile(&device, ShaderSource::vertex(VERTEX)).unwrap();
        let fs = compile(&device, ShaderSource::fragment(FRAGMENT)).unwrap();
        let program = link(vs, fs).unwrap();

        let active = program.activate();
        assert_eq!(active.id(), program.id());
    }
}
