//! GLSL version detection.

use glium::{Api, CapabilitiesSource, Version};
use glpipe_core::ContextInitError;

/// GLSL versions the harness knows how to target, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GlslVersion {
    Glsl120,
    Glsl140,
    Glsl330,
}

impl GlslVersion {
    /// Dotted form used in diagnostics, e.g. `"3.30"`.
    pub fn as_str(self) -> &'static str {
        match self {
            GlslVersion::Glsl120 => "1.20",
            GlslVersion::Glsl140 => "1.40",
            GlslVersion::Glsl330 => "3.30",
        }
    }

    fn matches(self, version: &Version) -> bool {
        let (major, minor) = match self {
            GlslVersion::Glsl120 => (1, 2),
            GlslVersion::Glsl140 => (1, 4),
            GlslVersion::Glsl330 => (3, 3),
        };
        matches!(version, Version(Api::Gl, ma, mi) if *ma == major && *mi == minor)
    }
}

/// The newest known GLSL version the context supports, if any.
pub fn get_best_glsl_version(ctx: &impl CapabilitiesSource) -> Option<GlslVersion> {
    best_of(&ctx.get_capabilities().supported_glsl_versions)
}

/// Fail unless the context can compile shaders written for `required`.
pub fn require(
    ctx: &impl CapabilitiesSource,
    required: GlslVersion,
) -> Result<GlslVersion, ContextInitError> {
    match get_best_glsl_version(ctx) {
        Some(best) if best >= required => Ok(best),
        _ => Err(ContextInitError::UnsupportedGlsl {
            required: required.as_str(),
        }),
    }
}

fn best_of(versions: &[Version]) -> Option<GlslVersion> {
    [
        GlslVersion::Glsl330,
        GlslVersion::Glsl140,
        GlslVersion::Glsl120,
    ]
    .into_iter()
    .find(|glsl| versions.iter().any(|v| glsl.matches(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_newest_supported_version() {
        let versions = [
            Version(Api::Gl, 1, 2),
            Version(Api::Gl, 1, 4),
            Version(Api::Gl, 3, 3),
        ];
        assert_eq!(best_of(&versions), Some(GlslVersion::Glsl330));
    }

    #[test]
    fn ignores_es_only_versions() {
        let versions = [Version(Api::GlEs, 3, 0), Version(Api::Gl, 1, 4)];
        assert_eq!(best_of(&versions), Some(GlslVersion::Glsl140));
        assert_eq!(best_of(&[Version(Api::GlEs, 1, 0)]), None);
    }
}
