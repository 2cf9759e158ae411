//! Byte views of vertex data for buffer upload.

/// View plain numeric data as raw bytes.
///
/// # Safety
///
/// Only implement on types made entirely of plain numeric values (`f32`,
/// `[f32]`, `[f32; N]`, ...) with no padding, pointers or references.
pub unsafe trait AsBytes {
    /// The returned slice has length `std::mem::size_of_val(self)`.
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(
                self as *const Self as *const u8,
                std::mem::size_of_val(self),
            )
        }
    }
}

unsafe impl AsBytes for f32 {}
unsafe impl AsBytes for [f32] {}
unsafe impl<const N: usize> AsBytes for [f32; N] {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_bytes_follow_native_float_encoding() {
        let vertices: &[f32] = &[1.0, -0.5];
        let mut expected = 1.0f32.to_ne_bytes().to_vec();
        expected.extend_from_slice(&(-0.5f32).to_ne_bytes());
        assert_eq!(vertices.as_bytes(), expected.as_slice());
    }

    #[test]
    fn array_length_is_byte_exact() {
        let vertices = [0.0f32; 6];
        assert_eq!(vertices.as_bytes().len(), 24);
    }
}
