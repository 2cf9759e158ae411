//! Vertex buffers, vertex array objects, and the upload that ties them together.
//!
//! Binding is scoped: a [`BufferBinding`] can only be obtained from a live
//! [`VertexArrayBinding`], so the vertex array is always bound before the
//! buffer, and the attribute pointer is always described while both are bound.
//! That is the order the vertex array captures state in.

use glpipe_core::{BufferTarget, BufferUsage, Device, LayoutError, ObjectId, VertexLayout};
use tracing::debug;

use crate::bytes::AsBytes;

/// A GPU-resident array buffer. Deleted on drop.
pub struct GpuBuffer<'d, D: Device> {
    device: &'d D,
    id: ObjectId,
    /// Total size in bytes.
    size: usize,
}

impl<'d, D: Device> GpuBuffer<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self {
            device,
            id: device.create_buffer(),
            size: 0,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Total size of this buffer in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<D: Device> Drop for GpuBuffer<'_, D> {
    fn drop(&mut self) {
        self.device.delete_buffer(self.id);
    }
}

/// A vertex array object. Deleted on drop.
pub struct VertexArray<'d, D: Device> {
    device: &'d D,
    id: ObjectId,
}

impl<'d, D: Device> VertexArray<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self {
            device,
            id: device.create_vertex_array(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn bind(&self) -> VertexArrayBinding<'_, D> {
        self.device.bind_vertex_array(self.id);
        VertexArrayBinding {
            device: self.device,
            id: self.id,
        }
    }
}

impl<D: Device> Drop for VertexArray<'_, D> {
    fn drop(&mut self) {
        self.device.delete_vertex_array(self.id);
    }
}

/// A vertex array that is currently bound.
pub struct VertexArrayBinding<'a, D: Device> {
    device: &'a D,
    id: ObjectId,
}

impl<D: Device> VertexArrayBinding<'_, D> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Bind `buffer` as the array buffer while this vertex array is bound.
    pub fn bind_buffer<'b>(&'b self, buffer: &'b mut GpuBuffer<'_, D>) -> BufferBinding<'b, D> {
        self.device.bind_buffer(BufferTarget::Array, buffer.id);
        BufferBinding {
            device: self.device,
            size: &mut buffer.size,
        }
    }
}

/// An array buffer bound inside a bound vertex array.
pub struct BufferBinding<'b, D: Device> {
    device: &'b D,
    size: &'b mut usize,
}

impl<D: Device> BufferBinding<'_, D> {
    /// Replace the buffer's storage with a copy of `data`.
    pub fn fill(&mut self, data: &[u8], usage: BufferUsage) {
        self.device.buffer_data(BufferTarget::Array, data, usage);
        *self.size = data.len();
    }

    /// Describe one float attribute sourced from this buffer and enable it.
    pub fn attribute(&self, layout: &VertexLayout) {
        self.device.vertex_attrib_pointer(layout);
        self.device.enable_vertex_attrib_array(layout.location);
    }
}

/// Uploaded vertex data: a buffer plus the vertex array describing it.
pub struct Geometry<'d, D: Device> {
    vertex_array: VertexArray<'d, D>,
    buffer: GpuBuffer<'d, D>,
    layout: VertexLayout,
    vertex_count: u32,
}

impl<'d, D: Device> Geometry<'d, D> {
    pub fn bind(&self) -> VertexArrayBinding<'_, D> {
        self.vertex_array.bind()
    }

    pub fn vertex_array(&self) -> &VertexArray<'d, D> {
        &self.vertex_array
    }

    pub fn buffer(&self) -> &GpuBuffer<'d, D> {
        &self.buffer
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

impl<D: Device> std::fmt::Debug for Geometry<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometry")
            .field("vertex_array", &self.vertex_array.id)
            .field("buffer", &self.buffer.id)
            .field("layout", &self.layout)
            .field("vertex_count", &self.vertex_count)
            .finish()
    }
}

/// Copy `vertices` to a new static buffer and record `layout` in a new vertex
/// array.
///
/// The vertex count is derived from the data; data that does not divide into
/// whole vertices is rejected before any GPU object is created.
pub fn upload<'d, D: Device>(
    device: &'d D,
    vertices: &[f32],
    layout: VertexLayout,
) -> Result<Geometry<'d, D>, LayoutError> {
    let bytes = vertices.as_bytes();
    let vertex_count = layout.vertex_count(bytes.len())?;

    let vertex_array = VertexArray::new(device);
    let mut buffer = GpuBuffer::new(device);
    {
        let bound = vertex_array.bind();
        let mut vbo = bound.bind_buffer(&mut buffer);
        vbo.fill(bytes, BufferUsage::StaticDraw);
        vbo.attribute(&layout);
    }

    debug!(
        vertex_array = vertex_array.id,
        buffer = buffer.id,
        bytes = buffer.size,
        vertex_count,
        "uploaded geometry"
    );

    Ok(Geometry {
        vertex_array,
        buffer,
        layout,
        vertex_count: vertex_count as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glpipe_core::headless::Call;
    use glpipe_core::HeadlessDevice;

    #[test]
    fn upload_copies_data_and_records_layout() {
        let device = HeadlessDevice::new();
        let vertices = [0.0f32, 1.0, 1.0, -1.0, -1.0, -1.0];
        let layout = VertexLayout::packed(0, 2);

        let geometry = upload(&device, &vertices, layout).unwrap();
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.buffer().size(), 24);
        assert_eq!(
            device.buffer_contents(geometry.buffer().id()).as_deref(),
            Some(vertices.as_bytes())
        );

        let state = device
            .vertex_array_state(geometry.vertex_array().id())
            .unwrap();
        assert_eq!(state.attributes, vec![(layout, Some(geometry.buffer().id()))]);
        assert!(state.enabled.contains(&0));
    }

    #[test]
    fn binds_in_capture_order() {
        let device = HeadlessDevice::new();
        let geometry = upload(&device, &[0.0; 6], VertexLayout::packed(0, 2)).unwrap();
        let vao = geometry.vertex_array().id();
        let vbo = geometry.buffer().id();

        let order: Vec<_> = device
            .calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::BindVertexArray(_)
                        | Call::BindBuffer(..)
                        | Call::VertexAttribPointer(_)
                        | Call::EnableVertexAttribArray(_)
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                Call::BindVertexArray(vao),
                Call::BindBuffer(BufferTarget::Array, vbo),
                Call::VertexAttribPointer(VertexLayout::packed(0, 2)),
                Call::EnableVertexAttribArray(0),
            ]
        );
    }

    #[test]
    fn ragged_data_creates_nothing() {
        let device = HeadlessDevice::new();
        let err = upload(&device, &[0.0; 5], VertexLayout::packed(0, 2)).unwrap_err();
        assert_eq!(err, LayoutError::Ragged { len: 20, stride: 8 });
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
    }

    #[test]
    fn overflowing_offset_creates_nothing() {
        let device = HeadlessDevice::new();
        let layout = VertexLayout::packed(0, 2).with_offset(usize::MAX);
        let err = upload(&device, &[0.0; 6], layout).unwrap_err();
        assert!(matches!(err, LayoutError::Overrun { .. }));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn drop_deletes_buffer_and_vertex_array() {
        let device = HeadlessDevice::new();
        let geometry = upload(&device, &[0.0; 3], VertexLayout::packed(0, 3)).unwrap();
        assert_eq!(device.live_buffers(), 1);
        drop(geometry);
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
    }
}
