//! The harness's built-in scene: one orange triangle spanning the viewport.

use glpipe_core::{ShaderSource, VertexLayout};

/// Passes a 2D position at location 0 through unchanged.
pub const VERTEX_SHADER: &str = r#"#version 330 core
layout (location = 0) in vec2 aPos;

void main()
{
    gl_Position = vec4(aPos, 0.0, 1.0);
}
"#;

/// Fills every fragment with opaque orange `(1.0, 0.5, 0.2, 1.0)`.
pub const FRAGMENT_SHADER: &str = r#"#version 330 core
out vec4 FragColor;

void main()
{
    FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
"#;

/// Top-center, bottom-right, bottom-left in clip space.
pub const VERTICES: [f32; 6] = [0.0, 1.0, 1.0, -1.0, -1.0, -1.0];

pub const LAYOUT: VertexLayout = VertexLayout::packed(0, 2);

pub fn vertex_shader() -> ShaderSource {
    ShaderSource::vertex(VERTEX_SHADER)
}

pub fn fragment_shader() -> ShaderSource {
    ShaderSource::fragment(FRAGMENT_SHADER)
}
