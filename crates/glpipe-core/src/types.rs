//! Plain data passed between the compiler, the uploader and the frame driver.

use std::borrow::Cow;
use std::fmt;

use crate::error::LayoutError;

/// Size in bytes of one vertex component. Vertex data is always `f32`.
pub const COMPONENT_SIZE: usize = std::mem::size_of::<f32>();

/// Pipeline stage a shader unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
    /// Accepted by the compiler; the linker only builds vertex + fragment programs.
    Geometry,
}

impl ShaderKind {
    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
            ShaderKind::Geometry => "geometry",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// GLSL text tagged with the stage it targets.
///
/// Immutable once built. Embedded shader literals are borrowed, so building a
/// source from a `&'static str` does not allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    kind: ShaderKind,
    text: Cow<'static, str>,
}

impl ShaderSource {
    pub fn new(kind: ShaderKind, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn vertex(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ShaderKind::Vertex, text)
    }

    pub fn fragment(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ShaderKind::Fragment, text)
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// How one float attribute is laid out inside the vertex buffer.
///
/// `stride` and `offset` are in bytes. Nothing on the GPU side checks these
/// against the buffer: a layout that disagrees with the data renders garbage
/// or nothing. [`VertexLayout::validate`] and [`VertexLayout::vertex_count`]
/// catch the inconsistencies before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// Shader input location (`layout(location = N)`).
    pub location: u32,
    /// Floats per vertex for this attribute, 1..=4.
    pub components: u8,
    pub stride: usize,
    pub offset: usize,
}

impl VertexLayout {
    /// A single tightly packed attribute: stride equals the attribute size.
    pub const fn packed(location: u32, components: u8) -> Self {
        Self {
            location,
            components,
            stride: components as usize * COMPONENT_SIZE,
            offset: 0,
        }
    }

    pub const fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub const fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Size of the attribute itself in bytes.
    pub fn attribute_size(&self) -> usize {
        self.components as usize * COMPONENT_SIZE
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(1..=4).contains(&self.components) {
            return Err(LayoutError::Components(self.components));
        }

        let end = self.offset.checked_add(self.attribute_size());
        if end.map_or(true, |end| end > self.stride) {
            return Err(LayoutError::Overrun {
                offset: self.offset,
                components: self.components,
                stride: self.stride,
            });
        }

        Ok(())
    }

    /// Number of whole vertices held by `byte_len` bytes of data.
    pub fn vertex_count(&self, byte_len: usize) -> Result<usize, LayoutError> {
        self.validate()?;

        if byte_len == 0 {
            return Err(LayoutError::Empty);
        }

        if byte_len % self.stride != 0 {
            return Err(LayoutError::Ragged {
                len: byte_len,
                stride: self.stride,
            });
        }

        Ok(byte_len / self.stride)
    }

    /// Bytes from the start of the buffer that a draw of `count` vertices
    /// reads, or `None` if that overflows `usize`.
    pub fn span_bytes(&self, count: usize) -> Option<usize> {
        match count {
            0 => Some(0),
            n => (n - 1)
                .checked_mul(self.stride)?
                .checked_add(self.offset)?
                .checked_add(self.attribute_size()),
        }
    }
}

/// RGBA background color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor(pub [f32; 4]);

impl ClearColor {
    pub const BLACK: ClearColor = ClearColor([0.0, 0.0, 0.0, 1.0]);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        ClearColor([r, g, b, 1.0])
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Framebuffer region in physical pixels. The origin is always `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Per-iteration render parameters, rebuilt every frame and never stored
/// across runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub clear_color: ClearColor,
    pub viewport: Viewport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_stride_matches_components() {
        let layout = VertexLayout::packed(0, 2);
        assert_eq!(layout.stride, 8);
        assert_eq!(layout.offset, 0);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn three_vertices_of_n_floats_stay_in_bounds() {
        for n in 1..=4u8 {
            let layout = VertexLayout::packed(0, n);
            let byte_len = 3 * n as usize * COMPONENT_SIZE;
            let count = layout.vertex_count(byte_len).unwrap();
            assert_eq!(count, 3);
            assert!(layout.span_bytes(count).unwrap() <= byte_len);
        }
    }

    #[test]
    fn interleaved_attribute_reads_stay_in_bounds() {
        // position (2 floats) + color (3 floats), reading the color.
        let layout = VertexLayout::packed(1, 3).with_stride(20).with_offset(8);
        let count = layout.vertex_count(60).unwrap();
        assert_eq!(count, 3);
        assert_eq!(layout.span_bytes(count), Some(60));
    }

    #[test]
    fn rejects_inconsistent_layouts() {
        assert_eq!(
            VertexLayout::packed(0, 5).validate(),
            Err(LayoutError::Components(5))
        );
        assert_eq!(
            VertexLayout::packed(0, 3).with_offset(4).validate(),
            Err(LayoutError::Overrun {
                offset: 4,
                components: 3,
                stride: 12
            })
        );
        assert_eq!(
            VertexLayout::packed(0, 2).vertex_count(12),
            Err(LayoutError::Ragged { len: 12, stride: 8 })
        );
        assert_eq!(VertexLayout::packed(0, 2).vertex_count(0), Err(LayoutError::Empty));
    }

    #[test]
    fn huge_offset_is_an_overrun_not_a_panic() {
        let layout = VertexLayout::packed(0, 2).with_offset(usize::MAX);
        assert_eq!(
            layout.validate(),
            Err(LayoutError::Overrun {
                offset: usize::MAX,
                components: 2,
                stride: 8
            })
        );
        assert_eq!(layout.vertex_count(24), Err(layout.validate().unwrap_err()));
        assert_eq!(layout.span_bytes(2), None);
        assert_eq!(VertexLayout::packed(0, 2).span_bytes(usize::MAX), None);
    }

    #[test]
    fn embedded_source_keeps_kind() {
        let source = ShaderSource::fragment("void main() {}");
        assert_eq!(source.kind(), ShaderKind::Fragment);
        assert_eq!(source.text(), "void main() {}");
        assert_eq!(ShaderKind::Vertex.to_string(), "vertex");
    }
}
