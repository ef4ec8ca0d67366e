pub mod builder;

use std::ops::Range;

use crate::core::shared::{Vector2, Vector3};
use crate::core::view::MeshView;

/// Represents a triangle mesh.
/// Vertex data (positions, normals, uvs) is stored per vertex, and the index list
/// is split into submeshes, each of which is a contiguous range of the index list.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    name: String,
    pub(crate) vertices: Vec<Vector3>,
    pub(crate) triangles: Vec<u32>,
    pub(crate) normals: Vec<Vector3>,
    pub(crate) uvs: Vec<Vector2>,

    // Ranges into `triangles`. Empty means one submesh spanning the whole list.
    pub(crate) submeshes: Vec<Range<usize>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// Sets the vertex positions. No validation is done against the index list;
    /// use [`builder::MeshBuilder`] for checked construction.
    pub fn set_vertices(&mut self, vertices: Vec<Vector3>) {
        self.vertices = vertices;
    }

    /// Replaces the index list with a single submesh.
    pub fn set_triangles(&mut self, triangles: Vec<u32>) {
        self.triangles = triangles;
        self.submeshes.clear();
    }

    pub fn set_normals(&mut self, normals: Vec<Vector3>) {
        self.normals = normals;
    }

    pub fn set_uvs(&mut self, uvs: Vec<Vector2>) {
        self.uvs = uvs;
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }
}

impl MeshView for Mesh {
    fn get_name(&self) -> &str { &self.name }
    fn get_vertices(&self) -> &[Vector3] { &self.vertices }
    fn get_triangles(&self) -> &[u32] { &self.triangles }
    fn get_normals(&self) -> &[Vector3] { &self.normals }
    fn get_uvs(&self) -> &[Vector2] { &self.uvs }

    fn num_submeshes(&self) -> usize {
        self.submeshes.len().max(1)
    }

    fn get_submesh_triangles(&self, index: usize) -> &[u32] {
        if self.submeshes.is_empty() {
            return if index == 0 { &self.triangles[..] } else { &[] };
        }
        self.submeshes.get(index)
            .and_then(|range| self.triangles.get(range.clone()))
            .unwrap_or(&[])
    }
}
