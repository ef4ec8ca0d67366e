use thiserror::Error;

use crate::core::shared::{Vector2, Vector3};
use super::Mesh;

/// Builds a [`Mesh`] submesh by submesh, checking the data for consistency.
pub struct MeshBuilder {
    name: String,
    vertices: Vec<Vector3>,
    normals: Vec<Vector3>,
    uvs: Vec<Vector2>,
    submeshes: Vec<Vec<u32>>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            submeshes: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_owned();
        self
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vector3>) -> &mut Self {
        self.vertices = vertices;
        self
    }

    pub fn set_normals(&mut self, normals: Vec<Vector3>) -> &mut Self {
        self.normals = normals;
        self
    }

    pub fn set_uvs(&mut self, uvs: Vec<Vector2>) -> &mut Self {
        self.uvs = uvs;
        self
    }

    /// Appends a submesh. Its triangles follow the ones of the previously added submeshes.
    pub fn add_submesh(&mut self, triangles: Vec<u32>) -> &mut Self {
        self.submeshes.push(triangles);
        self
    }

    pub fn build(self) -> Result<Mesh, Err> {
        self.check_attributes()?;
        self.check_connectivity()?;

        let Self { name, vertices, normals, uvs, submeshes } = self;

        let mut triangles = Vec::with_capacity(submeshes.iter().map(|s| s.len()).sum());
        let mut ranges = Vec::with_capacity(submeshes.len());
        for submesh in submeshes {
            let start = triangles.len();
            triangles.extend(submesh);
            ranges.push(start..triangles.len());
        }

        Ok(
            Mesh {
                name,
                vertices,
                triangles,
                normals,
                uvs,
                submeshes: ranges,
            }
        )
    }

    /// Normals and uvs are either absent or given for every vertex.
    fn check_attributes(&self) -> Result<(), Err> {
        let n = self.vertices.len();
        if !self.normals.is_empty() && self.normals.len() != n {
            return Err(Err::AttributeSizeError("normals", self.normals.len(), n));
        }
        if !self.uvs.is_empty() && self.uvs.len() != n {
            return Err(Err::AttributeSizeError("uvs", self.uvs.len(), n));
        }
        Ok(())
    }

    fn check_connectivity(&self) -> Result<(), Err> {
        if self.submeshes.is_empty() {
            return Err(Err::NoSubmesh);
        }
        let n = self.vertices.len();
        for (i, submesh) in self.submeshes.iter().enumerate() {
            if submesh.len() % 3 != 0 {
                return Err(Err::IncompleteTriangle(i, submesh.len()));
            }
            if let Some(&idx) = submesh.iter().find(|&&idx| idx as usize >= n) {
                return Err(Err::IndexOutOfRange(i, idx, n));
            }
        }
        Ok(())
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug)]
pub enum Err {
    #[error("The {0} attribute has {1} values, but the mesh has {2} vertices.")]
    AttributeSizeError(&'static str, usize, usize),

    #[error("Submesh {0} has {1} indices, which is not a multiple of 3.")]
    IncompleteTriangle(usize, usize),

    #[error("Submesh {0} refers to vertex {1}, but the mesh has only {2} vertices.")]
    IndexOutOfRange(usize, u32, usize),

    #[error("A mesh needs at least one submesh.")]
    NoSubmesh,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::MeshView;

    fn quad_vertices() -> Vec<Vector3> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn submeshes_are_concatenated() {
        let mut builder = MeshBuilder::new();
        builder.set_name("quad")
            .set_vertices(quad_vertices())
            .add_submesh(vec![0, 1, 2])
            .add_submesh(vec![0, 2, 3]);
        let mesh = builder.build().unwrap();

        assert_eq!(mesh.get_name(), "quad");
        assert_eq!(mesh.get_triangles(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.num_submeshes(), 2);
        assert_eq!(mesh.get_submesh_triangles(1), &[0, 2, 3]);
    }

    #[test]
    fn rejects_bad_input() {
        let mut builder = MeshBuilder::new();
        builder.set_vertices(quad_vertices()).add_submesh(vec![0, 1]);
        assert!(matches!(builder.build(), Err(Err::IncompleteTriangle(0, 2))));

        let mut builder = MeshBuilder::new();
        builder.set_vertices(quad_vertices()).add_submesh(vec![0, 1, 4]);
        assert!(matches!(builder.build(), Err(Err::IndexOutOfRange(0, 4, 4))));

        let mut builder = MeshBuilder::new();
        builder.set_vertices(quad_vertices())
            .set_normals(vec![Vector3::zero()])
            .add_submesh(vec![0, 1, 2]);
        assert!(matches!(builder.build(), Err(Err::AttributeSizeError("normals", 1, 4))));

        assert!(matches!(MeshBuilder::new().build(), Err(Err::NoSubmesh)));
    }
}
