//! Element counts of shader types, consumed read-only by the layout merge.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub trait TypeSizeTable {
    /// Number of scalar elements a value of `ty` occupies.
    fn size_of(&self, ty: &str) -> Option<usize>;
}

static BUILTIN_SIZES: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HashMap::from([
        ("bool", 1),
        ("int", 1),
        ("float", 1),
        ("bvec2", 2),
        ("bvec3", 3),
        ("bvec4", 4),
        ("ivec2", 2),
        ("ivec3", 3),
        ("ivec4", 4),
        ("vec2", 2),
        ("vec3", 3),
        ("vec4", 4),
        ("mat2", 4),
        ("mat3", 9),
        ("mat4", 16),
        ("sampler2D", 1),
        ("samplerCube", 1),
    ])
});

/// The GLSL ES 1.0 built-in types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypes;

impl TypeSizeTable for BuiltinTypes {
    fn size_of(&self, ty: &str) -> Option<usize> {
        BUILTIN_SIZES.get(ty).copied()
    }
}

impl TypeSizeTable for HashMap<String, usize> {
    fn size_of(&self, ty: &str) -> Option<usize> {
        self.get(ty).copied()
    }
}
