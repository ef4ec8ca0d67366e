// lib.rs

/// Contains the interface between the scene model and files on disk,
/// such as obj input, texture copies, and the final fbx write.
pub mod io;

/// Defines the ASCII FBX encoder.
pub mod encode;

/// Contains the scene model, the host view traits, and the shared definitions.
pub mod core;


/// Contains the most commonly used traits, types, and objects.
pub mod prelude {
    pub use crate::core::view::{NodeView, MeshView, MaterialView, TextureView};
    pub use crate::core::scene::SceneNode;
    pub use crate::core::mesh::{Mesh, builder::MeshBuilder};
    pub use crate::core::material::{Material, TransparencyMode};
    pub use crate::core::texture::{Texture, TextureSlot};
    pub use crate::core::shared::{Vector2, Vector3, Color, ResourceKey, ConfigType};
    pub use crate::encode::{self, encode_to_string, export_to_file};
}
