//! A linked program paired with the geometry it draws.

use glpipe_core::{Device, PipelineError, Primitive, ShaderSource, VertexLayout};
use tracing::info;

use crate::buffer::{upload, Geometry};
use crate::program::{link, ShaderProgram};
use crate::shader::compile;

/// Everything needed to draw one frame's contents.
///
/// Field order is drop order: the program goes before the geometry.
pub struct Pipeline<'d, D: Device> {
    program: ShaderProgram<'d, D>,
    geometry: Geometry<'d, D>,
}

impl<'d, D: Device> Pipeline<'d, D> {
    /// Compile both stages, link them, then upload `vertices`.
    ///
    /// Stops at the first failure. Objects created by earlier steps are
    /// released before the error is returned.
    pub fn build(
        device: &'d D,
        vertex: ShaderSource,
        fragment: ShaderSource,
        vertices: &[f32],
        layout: VertexLayout,
    ) -> Result<Self, PipelineError> {
        let vs = compile(device, vertex)?;
        let fs = compile(device, fragment)?;
        let program = link(vs, fs)?;
        let geometry = upload(device, vertices, layout)?;

        info!(
            program = program.id(),
            vertices = geometry.vertex_count(),
            "pipeline ready"
        );

        Ok(Self { program, geometry })
    }

    pub fn program(&self) -> &ShaderProgram<'d, D> {
        &self.program
    }

    pub fn geometry(&self) -> &Geometry<'d, D> {
        &self.geometry
    }

    /// Activate the program and draw all uploaded vertices.
    pub fn draw(&self) {
        let program = self.program.activate();
        let vertex_array = self.geometry.bind();
        program.draw_arrays(
            &vertex_array,
            Primitive::Triangles,
            0,
            self.geometry.vertex_count(),
        );
    }
}

impl<D: Device> std::fmt::Debug for Pipeline<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("program", &self.program)
            .field("geometry", &self.geometry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle;
    use glpipe_core::{HeadlessDevice, LayoutError};

    #[test]
    fn build_then_draw_issues_one_triangle() {
        let device = HeadlessDevice::new();
        let pipeline = Pipeline::build(
            &device,
            triangle::vertex_shader(),
            triangle::fragment_shader(),
            &triangle::VERTICES,
            triangle::LAYOUT,
        )
        .unwrap();

        pipeline.draw();
        let draws = device.draw_calls();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].primitive, Primitive::Triangles);
        assert_eq!(draws[0].count, 3);
        assert_eq!(draws[0].program, Some(pipeline.program().id()));
        assert_eq!(
            draws[0].vertex_array,
            Some(pipeline.geometry().vertex_array().id())
        );
    }

    #[test]
    fn debug_names_program_and_geometry() {
        let device = HeadlessDevice::new();
        let pipeline = Pipeline::build(
            &device,
            triangle::vertex_shader(),
            triangle::fragment_shader(),
            &triangle::VERTICES,
            triangle::LAYOUT,
        )
        .unwrap();

        let text = format!("{pipeline:?}");
        assert!(text.starts_with("Pipeline"), "{text}");
        assert!(text.contains("ShaderProgram"), "{text}");
        assert!(text.contains("vertex_count: 3"), "{text}");
    }

    #[test]
    fn layout_error_releases_program() {
        let device = HeadlessDevice::new();
        let err = Pipeline::build(
            &device,
            triangle::vertex_shader(),
            triangle::fragment_shader(),
            &[],
            triangle::LAYOUT,
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Layout(LayoutError::Empty)));
        assert_eq!(device.live_programs(), 0);
        assert_eq!(device.live_shaders(), 0);
    }
}
