//! Geometry block of a mesh.
//!
//! The host convention is left-handed while the document is right-handed. The
//! conversion mirrors every position and normal across the YZ plane (negating X)
//! and swaps the second and third corner of each triangle so that faces keep
//! pointing outwards. Per-corner layers follow the swapped corner order.

use std::collections::HashMap;
use std::fmt::Write;

use crate::core::view::MeshView;
use super::format::{write_floats, write_ints, write_vec3};
use super::Err;

/// Checks that `mesh` can be written as a Geometry block.
/// On failure, returns a description of what is missing.
pub fn check_geometry<M: MeshView>(mesh: &M) -> Result<(), String> {
    let num_vertices = mesh.get_vertices().len();
    let triangles = mesh.get_triangles();
    if num_vertices == 0 {
        return Err("vertices".to_string());
    }
    if triangles.is_empty() {
        return Err("triangle indices".to_string());
    }
    if triangles.len() % 3 != 0 {
        return Err(format!("a complete triangle list ({} indices)", triangles.len()));
    }
    if let Some(&idx) = triangles.iter().find(|&&idx| idx as usize >= num_vertices) {
        return Err(format!("valid triangle indices (index {} with {} vertices)", idx, num_vertices));
    }
    Ok(())
}

/// Corner order of the written triangles: `i0, i2, i1` for every `(i0, i1, i2)`.
pub fn rewound_corners(triangles: &[u32]) -> impl Iterator<Item = u32> + '_ {
    triangles.chunks_exact(3)
        .flat_map(|t| [t[0], t[2], t[1]])
}

/// Polygon vertex indices: `(i0, i2, -i1 - 1)` per triangle. The bitwise complement
/// on the last corner marks the end of a polygon.
pub fn polygon_vertex_indices(triangles: &[u32]) -> Vec<i64> {
    triangles.chunks_exact(3)
        .flat_map(|t| [t[0] as i64, t[2] as i64, -(t[1] as i64) - 1])
        .collect()
}

/// Returns the submesh owning each triangle of `mesh`, in triangle order.
///
/// A triangle belongs to the first submesh containing the same index triple.
/// Triangles found in no submesh are assigned to submesh 0.
pub fn classify_triangles<M: MeshView>(mesh: &M) -> Vec<usize> {
    let triangles = mesh.get_triangles();
    let num_triangles = triangles.len() / 3;
    let num_submeshes = mesh.num_submeshes();
    if num_submeshes <= 1 {
        return vec![0; num_triangles];
    }

    let mut owner = HashMap::with_capacity(num_triangles);
    for submesh in 0..num_submeshes {
        for t in mesh.get_submesh_triangles(submesh).chunks_exact(3) {
            owner.entry([t[0], t[1], t[2]]).or_insert(submesh);
        }
    }

    let mut num_unmatched = 0;
    let out: Vec<usize> = triangles.chunks_exact(3)
        .map(|t| {
            owner.get(&[t[0], t[1], t[2]])
                .copied()
                .unwrap_or_else(|| {
                    num_unmatched += 1;
                    0
                })
        })
        .collect();
    if num_unmatched > 0 {
        log::warn!("Mesh \"{}\": {} triangle(s) belong to no submesh and are assigned to the first material.", mesh.get_name(), num_unmatched);
    }
    out
}

/// Writes the Geometry block of `mesh`. `material_indices` holds one entry per triangle.
/// The mesh must pass [`check_geometry`].
pub fn write_geometry<M: MeshView>(mesh: &M, id: i64, material_indices: &[i64], out: &mut String) -> Result<(), Err> {
    let vertices = mesh.get_vertices();
    let triangles = mesh.get_triangles();
    let num_corners = triangles.len();

    writeln!(out, "\tGeometry: {}, \"Geometry::\", \"Mesh\" {{", id)?;

    writeln!(out, "\t\tVertices: *{} {{", vertices.len() * 3)?;
    write!(out, "\t\t\ta: ")?;
    for (i, v) in vertices.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_vec3(out, v.flip_x())?;
    }
    writeln!(out)?;
    writeln!(out, "\t\t}}")?;

    writeln!(out, "\t\tPolygonVertexIndex: *{} {{", num_corners)?;
    write!(out, "\t\t\ta: ")?;
    write_ints(out, polygon_vertex_indices(triangles))?;
    writeln!(out)?;
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t\tGeometryVersion: 124")?;

    let has_normals = has_per_vertex_data(mesh, mesh.get_normals().len(), "normals");
    if has_normals {
        let normals = mesh.get_normals();
        writeln!(out, "\t\tLayerElementNormal: 0 {{")?;
        writeln!(out, "\t\t\tVersion: 101")?;
        writeln!(out, "\t\t\tName: \"\"")?;
        writeln!(out, "\t\t\tMappingInformationType: \"ByPolygonVertex\"")?;
        writeln!(out, "\t\t\tReferenceInformationType: \"Direct\"")?;
        writeln!(out, "\t\t\tNormals: *{} {{", num_corners * 3)?;
        write!(out, "\t\t\t\ta: ")?;
        for (i, corner) in rewound_corners(triangles).enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_vec3(out, normals[corner as usize].flip_x())?;
        }
        writeln!(out)?;
        writeln!(out, "\t\t\t}}")?;
        writeln!(out, "\t\t}}")?;
    }

    let has_uvs = has_per_vertex_data(mesh, mesh.get_uvs().len(), "uvs");
    if has_uvs {
        let uvs = mesh.get_uvs();
        writeln!(out, "\t\tLayerElementUV: 0 {{")?;
        writeln!(out, "\t\t\tVersion: 101")?;
        writeln!(out, "\t\t\tName: \"map1\"")?;
        writeln!(out, "\t\t\tMappingInformationType: \"ByPolygonVertex\"")?;
        writeln!(out, "\t\t\tReferenceInformationType: \"IndexToDirect\"")?;
        writeln!(out, "\t\t\tUV: *{} {{", uvs.len() * 2)?;
        write!(out, "\t\t\t\ta: ")?;
        write_floats(out, uvs.iter().flat_map(|uv| [uv.x, uv.y]))?;
        writeln!(out)?;
        writeln!(out, "\t\t\t}}")?;
        writeln!(out, "\t\t\tUVIndex: *{} {{", num_corners)?;
        write!(out, "\t\t\t\ta: ")?;
        write_ints(out, rewound_corners(triangles).map(i64::from))?;
        writeln!(out)?;
        writeln!(out, "\t\t\t}}")?;
        writeln!(out, "\t\t}}")?;
    }

    writeln!(out, "\t\tLayerElementMaterial: 0 {{")?;
    writeln!(out, "\t\t\tVersion: 101")?;
    writeln!(out, "\t\t\tName: \"\"")?;
    writeln!(out, "\t\t\tMappingInformationType: \"ByPolygon\"")?;
    writeln!(out, "\t\t\tReferenceInformationType: \"IndexToDirect\"")?;
    writeln!(out, "\t\t\tMaterials: *{} {{", material_indices.len())?;
    write!(out, "\t\t\t\ta: ")?;
    write_ints(out, material_indices.iter().copied())?;
    writeln!(out)?;
    writeln!(out, "\t\t\t}}")?;
    writeln!(out, "\t\t}}")?;

    writeln!(out, "\t\tLayer: 0 {{")?;
    writeln!(out, "\t\t\tVersion: 100")?;
    let mut layer_elements = Vec::with_capacity(3);
    if has_normals {
        layer_elements.push("LayerElementNormal");
    }
    layer_elements.push("LayerElementMaterial");
    if has_uvs {
        layer_elements.push("LayerElementUV");
    }
    for ty in layer_elements {
        writeln!(out, "\t\t\tLayerElement:  {{")?;
        writeln!(out, "\t\t\t\tType: \"{}\"", ty)?;
        writeln!(out, "\t\t\t\tTypedIndex: 0")?;
        writeln!(out, "\t\t\t}}")?;
    }
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

// Per-vertex layers are written only when present for every vertex.
fn has_per_vertex_data<M: MeshView>(mesh: &M, len: usize, what: &str) -> bool {
    if len == 0 {
        return false;
    }
    if len != mesh.get_vertices().len() {
        log::warn!(
            "Mesh \"{}\" has {} {} for {} vertices; the layer is left out.",
            mesh.get_name(), len, what, mesh.get_vertices().len()
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::{builder::MeshBuilder, Mesh};
    use crate::core::shared::{Vector2, Vector3};

    fn square() -> Vec<Vector3> {
        vec![
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(2.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn rewinding() {
        assert_eq!(polygon_vertex_indices(&[0, 1, 2]), vec![0, 2, -2]);
        assert_eq!(polygon_vertex_indices(&[3, 0, 1, 1, 2, 3]), vec![3, 1, -1, 1, 3, -3]);
        assert_eq!(rewound_corners(&[0, 1, 2, 4, 5, 6]).collect::<Vec<_>>(), vec![0, 2, 1, 4, 6, 5]);
    }

    #[test]
    fn check() {
        let mut mesh = Mesh::new();
        assert!(check_geometry(&mesh).is_err());
        mesh.set_vertices(square());
        assert!(check_geometry(&mesh).is_err());
        mesh.set_triangles(vec![0, 1]);
        assert!(check_geometry(&mesh).is_err());
        mesh.set_triangles(vec![0, 1, 4]);
        assert!(check_geometry(&mesh).is_err());
        mesh.set_triangles(vec![0, 1, 3]);
        assert!(check_geometry(&mesh).is_ok());
    }

    #[test]
    fn submesh_classification() {
        let mut builder = MeshBuilder::new();
        builder.set_vertices(square())
            .add_submesh(vec![0, 1, 2, 0, 2, 3])
            .add_submesh(vec![1, 2, 3, 3, 2, 1, 0, 1, 3]);
        let mesh = builder.build().unwrap();
        assert_eq!(classify_triangles(&mesh), vec![0, 0, 1, 1, 1]);
    }

    #[test]
    fn first_submesh_wins_and_unmatched_fall_back() {
        let mut builder = MeshBuilder::new();
        builder.set_vertices(square())
            .add_submesh(vec![0, 1, 2])
            .add_submesh(vec![0, 1, 2, 1, 2, 3]);
        let mut mesh = builder.build().unwrap();
        // A triangle that is in the index list but in no submesh.
        mesh.triangles.extend([0, 2, 3]);
        assert_eq!(classify_triangles(&mesh), vec![0, 0, 1, 0]);
    }

    #[test]
    fn geometry_block() {
        let mut builder = MeshBuilder::new();
        builder.set_vertices(square())
            .set_normals(vec![
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::new(0.5, 0.5, 0.0),
            ])
            .set_uvs(vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ])
            .add_submesh(vec![0, 1, 2]);
        let mesh = builder.build().unwrap();

        let mut out = String::new();
        write_geometry(&mesh, 42, &[0], &mut out).unwrap();

        assert!(out.starts_with("\tGeometry: 42, \"Geometry::\", \"Mesh\" {\n"));
        assert!(out.contains("\t\tVertices: *12 {\n\t\t\ta: -1,2,3,-2,0,0,-2,1,0,0,1,0\n"));
        assert!(out.contains("\t\tPolygonVertexIndex: *3 {\n\t\t\ta: 0,2,-2\n"));
        assert!(out.contains("\t\t\tNormals: *9 {\n\t\t\t\ta: -1,0,0,0,0,1,0,1,0\n"));
        assert!(out.contains("\t\t\tUV: *8 {\n\t\t\t\ta: 0,0,1,0,1,1,0,1\n"));
        assert!(out.contains("\t\t\tUVIndex: *3 {\n\t\t\t\ta: 0,2,1\n"));
        assert!(out.contains("\t\t\tMaterials: *1 {\n\t\t\t\ta: 0\n"));
        assert_eq!(out.matches("LayerElement:  {").count(), 3);
    }

    #[test]
    fn missing_layers_are_left_out() {
        let mut mesh = Mesh::new();
        mesh.set_vertices(square());
        mesh.set_triangles(vec![0, 1, 2]);
        mesh.set_uvs(vec![Vector2::new(0.0, 0.0)]);

        let mut out = String::new();
        write_geometry(&mesh, 1, &[0], &mut out).unwrap();
        assert!(!out.contains("LayerElementNormal"));
        assert!(!out.contains("LayerElementUV"));
        assert!(out.contains("Type: \"LayerElementMaterial\""));
    }
}
