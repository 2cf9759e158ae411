//! GPU context: the device every pipeline object is created through.

use std::marker::PhantomData;

use glpipe_core::{
    CompileError, Device, LayoutError, LinkError, PipelineError, ShaderSource, VertexLayout,
};

use crate::buffer::{upload, Geometry};
use crate::pipeline::Pipeline;
use crate::program::{link, ShaderProgram};
use crate::shader::{compile, CompiledShaderUnit};

/// Owns the device for the render thread.
///
/// Every object created here borrows the context, so all of them are
/// released before the context (and with it the GL context) goes away. The
/// context is neither `Send` nor `Sync`: GL objects belong to the thread
/// their context is current on.
pub struct GpuContext<D: Device> {
    device: D,
    _thread: PhantomData<*const ()>,
}

impl<D: Device> GpuContext<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            _thread: PhantomData,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn compile(&self, source: ShaderSource) -> Result<CompiledShaderUnit<'_, D>, CompileError> {
        compile(&self.device, source)
    }

    pub fn link<'d>(
        &'d self,
        vertex: CompiledShaderUnit<'d, D>,
        fragment: CompiledShaderUnit<'d, D>,
    ) -> Result<ShaderProgram<'d, D>, LinkError> {
        link(vertex, fragment)
    }

    pub fn upload(
        &self,
        vertices: &[f32],
        layout: VertexLayout,
    ) -> Result<Geometry<'_, D>, LayoutError> {
        upload(&self.device, vertices, layout)
    }

    /// Compile, link and upload in one go. See [`Pipeline::build`].
    pub fn build_pipeline(
        &self,
        vertex: ShaderSource,
        fragment: ShaderSource,
        vertices: &[f32],
        layout: VertexLayout,
    ) -> Result<Pipeline<'_, D>, PipelineError> {
        Pipeline::build(&self.device, vertex, fragment, vertices, layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle;
    use glpipe_core::HeadlessDevice;

    #[test]
    fn step_by_step_matches_build_pipeline() {
        let ctx = GpuContext::new(HeadlessDevice::new());
        let vs = ctx.compile(triangle::vertex_shader()).unwrap();
        let fs = ctx.compile(triangle::fragment_shader()).unwrap();
        let program = ctx.link(vs, fs).unwrap();
        let geometry = ctx.upload(&triangle::VERTICES, triangle::LAYOUT).unwrap();

        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(ctx.device().live_programs(), 1);
        drop(program);
        drop(geometry);

        let pipeline = ctx
            .build_pipeline(
                triangle::vertex_shader(),
                triangle::fragment_shader(),
                &triangle::VERTICES,
                triangle::LAYOUT,
            )
            .unwrap();
        assert_eq!(pipeline.geometry().vertex_count(), 3);
        assert_eq!(ctx.device().live_shaders(), 0);
    }
}
