use serde::{Deserialize, Serialize};

pub trait ConfigType {
    fn default() -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Mirrors the vector across the YZ plane.
    pub fn flip_x(self) -> Self {
        Self::new(-self.x, self.y, self.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Linear RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Mean of the three color channels, alpha excluded.
    pub fn mean_rgb(&self) -> f32 {
        (self.r + self.g + self.b) / 3.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

/// Identity of a host resource (material or texture).
///
/// Two views with the same key refer to the same underlying object. Keys say
/// nothing about names: distinct objects may share a name but never a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(usize);

impl ResourceKey {
    /// Key derived from the address of `obj`. Stable as long as `obj` does not move,
    /// which holds for anything living behind an `Arc`.
    pub fn of<T>(obj: &T) -> Self {
        Self(obj as *const T as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn resource_key_follows_identity() {
        let a = Arc::new(7_u32);
        let b = Arc::clone(&a);
        let c = Arc::new(7_u32);
        assert_eq!(ResourceKey::of(a.as_ref()), ResourceKey::of(b.as_ref()));
        assert_ne!(ResourceKey::of(a.as_ref()), ResourceKey::of(c.as_ref()));
    }

    #[test]
    fn mean_rgb_ignores_alpha() {
        let c = Color::new(0.3, 0.6, 0.9, 0.0);
        assert!((c.mean_rgb() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn flip_x() {
        assert_eq!(Vector3::new(1.0, 2.0, 3.0).flip_x(), Vector3::new(-1.0, 2.0, 3.0));
    }
}
