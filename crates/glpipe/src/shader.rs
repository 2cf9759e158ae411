//! Shader unit compilation.

use glpipe_core::{CompileError, Device, ObjectId, ShaderKind, ShaderSource, INFO_LOG_CAPACITY};
use tracing::{debug, error};

/// Used when the driver reports failure without saying why.
pub(crate) const EMPTY_LOG: &str = "no diagnostic log available";

/// A successfully compiled shader stage, ready to be linked.
///
/// Dropping a unit deletes the shader object. [`crate::link`] consumes both
/// units, so a unit never outlives the link it was compiled for.
pub struct CompiledShaderUnit<'d, D: Device> {
    pub(crate) device: &'d D,
    pub(crate) id: ObjectId,
    pub(crate) kind: ShaderKind,
}

impl<D: Device> CompiledShaderUnit<'_, D> {
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl<D: Device> Drop for CompiledShaderUnit<'_, D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.id);
    }
}

impl<D: Device> std::fmt::Debug for CompiledShaderUnit<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledShaderUnit")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Compile one shader stage.
///
/// On failure the shader object is deleted before the error is returned, and
/// the error carries the driver's info log (at most
/// `INFO_LOG_CAPACITY - 1` bytes).
pub fn compile<D: Device>(
    device: &D,
    source: ShaderSource,
) -> Result<CompiledShaderUnit<'_, D>, CompileError> {
    let kind = source.kind();

    let id = device.create_shader(kind);
    if id == 0 {
        let log = "driver could not allocate a shader object".to_string();
        error!("{kind} shader: {log}");
        return Err(CompileError { kind, log });
    }

    device.shader_source(id, source.text());
    device.compile_shader(id);

    if !device.compile_status(id) {
        let log = non_empty(device.shader_info_log(id, INFO_LOG_CAPACITY));
        device.delete_shader(id);
        error!("{kind} shader failed to compile:\n{log}");
        return Err(CompileError { kind, log });
    }

    debug!(id, "compiled {kind} shader");
    Ok(CompiledShaderUnit { device, id, kind })
}

pub(crate) fn non_empty(log: String) -> String {
    if log.trim().is_empty() {
        EMPTY_LOG.to_string()
    } else {
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glpipe_core::headless::Call;
    use glpipe_core::HeadlessDevice;

    const VERTEX: &str = "#version 330 core
layout (location = 0) in vec2 aPos;
void main()
{
    gl_Position = vec4(aPos, 0.0, 1.0);
}
";

    #[test]
    fn compiles_valid_vertex_source() {
        let device = HeadlessDevice::new();
        let unit = compile(&device, ShaderSource::vertex(VERTEX)).unwrap();
        assert_eq!(unit.kind(), ShaderKind::Vertex);
        assert_eq!(device.live_shaders(), 1);
        drop(unit);
        assert_eq!(device.live_shaders(), 0);
    }

    #[test]
    fn failed_compile_deletes_object_and_reports_log() {
        let device = HeadlessDevice::new();
        let broken = VERTEX.replace("1.0);", "1.0)");
        let err = compile(&device, ShaderSource::vertex(broken)).unwrap_err();

        assert_eq!(err.kind, ShaderKind::Vertex);
        assert!(err.log.contains("syntax error"), "log was {:?}", err.log);
        assert!(err.log.len() < INFO_LOG_CAPACITY);
        assert_eq!(device.live_shaders(), 0);
        assert!(matches!(device.calls().last(), Some(Call::DeleteShader(_))));
    }

    #[test]
    fn empty_log_gets_placeholder() {
        assert_eq!(non_empty(String::new()), EMPTY_LOG);
        assert_eq!(non_empty("  \n".to_string()), EMPTY_LOG);
        assert_eq!(non_empty("ERROR: 0:1".to_string()), "ERROR: 0:1");
    }
}
