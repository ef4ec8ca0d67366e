//! Read-only capability traits over a host scene.
//!
//! The encoder never touches a host object model directly. Anything that can
//! answer these getters (a game engine's scene, an importer's output, the
//! in-memory [`SceneNode`](crate::core::scene::SceneNode)) can be exported.

use std::path::Path;

use crate::core::material::TransparencyMode;
use crate::core::shared::{Color, ResourceKey, Vector2, Vector3};
use crate::core::texture::TextureSlot;

pub trait TextureView {
    fn get_name(&self) -> &str;

    /// Path of the image file backing this texture.
    fn get_source_path(&self) -> &Path;

    /// Normal maps get their channels rebuilt when copied next to the output.
    fn is_normal_map(&self) -> bool;

    /// Identity used for deduplication. Defaults to the address of `self`.
    fn key(&self) -> ResourceKey
        where Self: Sized
    {
        ResourceKey::of(self)
    }
}

pub trait MaterialView {
    type Texture: TextureView;

    fn get_name(&self) -> &str;
    fn get_color(&self) -> Color;
    fn get_specular_color(&self) -> Option<Color>;
    fn get_emission_color(&self) -> Option<Color>;
    fn get_transparency_mode(&self) -> TransparencyMode;
    fn get_texture(&self, slot: TextureSlot) -> Option<&Self::Texture>;

    /// Identity used for deduplication. Defaults to the address of `self`.
    fn key(&self) -> ResourceKey
        where Self: Sized
    {
        ResourceKey::of(self)
    }
}

pub trait MeshView {
    fn get_name(&self) -> &str;
    fn get_vertices(&self) -> &[Vector3];

    /// Flat triangle list, three indices per triangle.
    fn get_triangles(&self) -> &[u32];

    /// Per-vertex normals. Empty when the mesh carries none.
    fn get_normals(&self) -> &[Vector3];

    /// Per-vertex coordinates of the first UV channel. Empty when the mesh carries none.
    fn get_uvs(&self) -> &[Vector2];

    fn num_submeshes(&self) -> usize;

    /// Triangle list of one submesh, in the same layout as [`MeshView::get_triangles`].
    fn get_submesh_triangles(&self, index: usize) -> &[u32];
}

pub trait NodeView {
    type Mesh: MeshView;
    type Material: MaterialView;

    fn get_name(&self) -> &str;
    fn get_local_position(&self) -> Vector3;

    /// Euler angles in degrees.
    fn get_local_rotation(&self) -> Vector3;
    fn get_local_scale(&self) -> Vector3;
    fn get_children(&self) -> Vec<&Self>;
    fn get_mesh(&self) -> Option<&Self::Mesh>;

    /// Material slots parallel to the mesh submeshes. A slot may be empty.
    fn get_materials(&self) -> Vec<Option<&Self::Material>>;
}
