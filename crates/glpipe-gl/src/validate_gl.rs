//! Inspect the OpenGL error queue and viewport state.

use gl::types::GLenum;
use glpipe_core::Viewport;

/// The error queue is finite in practice; stop after this many reads in case
/// a lost context keeps reporting.
const MAX_QUEUED_ERRORS: usize = 16;

/// Human-readable description of a `glGetError` code.
pub fn error_message(code: GLenum) -> &'static str {
    match code {
        gl::INVALID_ENUM => "an unacceptable value is specified for an enumerated argument",
        gl::INVALID_VALUE => "a numeric argument is out of range",
        gl::INVALID_OPERATION => "the specified operation is not allowed in the current state",
        gl::INVALID_FRAMEBUFFER_OPERATION => "the framebuffer object is not complete",
        gl::OUT_OF_MEMORY => "there is not enough memory left to execute the command",
        _ => "unknown OpenGL error",
    }
}

/// Pop every pending error off the GL error queue.
///
/// # Safety
///
/// Must be called with a valid OpenGL context current and entry points loaded.
pub unsafe fn drain_errors() -> Vec<&'static str> {
    let mut errors = Vec::new();
    for _ in 0..MAX_QUEUED_ERRORS {
        match gl::GetError() {
            gl::NO_ERROR => break,
            code => errors.push(error_message(code)),
        }
    }
    errors
}

/// Check that the GL viewport covers `expected` from the origin and that the
/// scissor test is off.
///
/// # Safety
///
/// Must be called with a valid OpenGL context current and entry points loaded.
pub unsafe fn validate_viewport(expected: Viewport) -> Result<(), String> {
    if gl::IsEnabled(gl::SCISSOR_TEST) != gl::FALSE {
        return Err("SCISSOR_TEST is enabled".to_string());
    }

    let mut dims: [i32; 4] = [0; 4];
    gl::GetIntegerv(gl::VIEWPORT, dims.as_mut_ptr());

    let wanted = [0, 0, expected.width as i32, expected.height as i32];
    if dims != wanted {
        return Err(format!("VIEWPORT is {dims:?}, expected {wanted:?}"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_messages() {
        assert_eq!(
            error_message(gl::INVALID_VALUE),
            "a numeric argument is out of range"
        );
        assert_eq!(error_message(0xdead), "unknown OpenGL error");
    }
}
