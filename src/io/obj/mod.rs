// use tobj to load the obj file and convert it to our scene representation
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::material::{Material, TransparencyMode};
use crate::core::mesh::builder::MeshBuilder;
use crate::core::scene::SceneNode;
use crate::core::shared::{Color, Vector2, Vector3};
use crate::core::texture::{Texture, TextureSlot};

#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Failed to load obj file: {0}")]
    LoadError(#[from] tobj::LoadError),
    #[error("Mesh Builder Error in \"{0}\": {1}")]
    MeshBuilderError(String, crate::core::mesh::builder::Err),
}

/// Loads an obj file as a scene: a root node named after the file with one child
/// per obj model.
///
/// The file is read as right-handed and converted to the left-handed host
/// convention, so exporting the result restores the original coordinates.
pub fn load_obj<P: AsRef<Path> + Debug>(path: P) -> Result<SceneNode, Err> {
    let op = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(path, &op)?;
    let materials = match materials {
        Ok(materials) => materials,
        Err(err) => {
            log::warn!("Failed to load the materials of {:?}: {}", path, err);
            Vec::new()
        }
    };

    let base_dir = path.parent().unwrap_or(Path::new(""));
    let materials = convert_materials(&materials, base_dir);

    let root_name = path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Root".to_string());
    let mut root = SceneNode::new(&root_name);
    for (i, model) in models.iter().enumerate() {
        let name = if model.name.is_empty() { format!("Model{}", i) } else { model.name.clone() };
        let mesh = load_mesh(&name, &model.mesh)?;
        let material = model.mesh.material_id.and_then(|id| materials.get(id).cloned());
        root.add_child(SceneNode::new(&name).with_mesh(Arc::new(mesh), vec![material]));
    }
    log::debug!("Loaded {} models and {} materials from {:?}.", models.len(), materials.len(), path);
    Ok(root)
}

fn load_mesh(name: &str, mesh: &tobj::Mesh) -> Result<crate::core::mesh::Mesh, Err> {
    let vertices = mesh.positions.chunks(3)
        .map(|x| Vector3::new(x[0], x[1], x[2]).flip_x())
        .collect::<Vec<_>>();
    let normals = mesh.normals.chunks(3)
        .map(|x| Vector3::new(x[0], x[1], x[2]).flip_x())
        .collect::<Vec<_>>();
    let uvs = mesh.texcoords.chunks(2)
        .map(|x| Vector2::new(x[0], x[1]))
        .collect::<Vec<_>>();
    // mirroring flips the winding
    let triangles = mesh.indices.chunks(3)
        .flat_map(|x| [x[0], x[2], x[1]])
        .collect::<Vec<_>>();

    let mut builder = MeshBuilder::new();
    builder.set_name(name)
        .set_vertices(vertices)
        .set_normals(normals)
        .set_uvs(uvs)
        .add_submesh(triangles);
    builder.build().map_err(|e| Err::MeshBuilderError(name.to_string(), e))
}

fn convert_materials(materials: &[tobj::Material], base_dir: &Path) -> Vec<Arc<Material>> {
    let mut textures: HashMap<PathBuf, Arc<Texture>> = HashMap::new();
    let mut texture = |file: &Option<String>, normal_map: bool| {
        file.as_ref().map(|file| {
            let path = base_dir.join(file.trim());
            textures.entry(path.clone())
                .or_insert_with(|| Arc::new(Texture::from_path(&path).with_normal_map(normal_map)))
                .clone()
        })
    };

    materials.iter()
        .map(|m| {
            let mut material = Material::new(m.name.clone());
            let alpha = m.dissolve.unwrap_or(1.0);
            let [r, g, b] = m.diffuse.unwrap_or([1.0, 1.0, 1.0]);
            material.set_color(Color::new(r, g, b, alpha));
            material.set_specular_color(m.specular.map(|[r, g, b]| Color::rgb(r, g, b)));
            material.set_emission_color(m.unknown_param.get("Ke").and_then(|v| parse_rgb(v)));
            if alpha < 1.0 {
                material.set_transparency_mode(TransparencyMode::Fade);
            }
            material.set_texture(TextureSlot::Diffuse, texture(&m.diffuse_texture, false));
            material.set_texture(TextureSlot::Normal, texture(&m.normal_texture, true));
            Arc::new(material)
        })
        .collect()
}

fn parse_rgb(value: &str) -> Option<Color> {
    let v = value.split_whitespace()
        .map(|s| s.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match v.as_slice() {
        [r, g, b] => Some(Color::rgb(*r, *g, *b)),
        [l] => Some(Color::rgb(*l, *l, *l)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::{MaterialView, MeshView, NodeView, TextureView};

    #[test]
    fn triangle() {
        let root = load_obj("tests/data/triangle.obj").unwrap();
        assert_eq!(root.get_name(), "triangle");
        let children = root.get_children();
        assert_eq!(children.len(), 1);
        let mesh = children[0].get_mesh().unwrap();
        assert_eq!(mesh.get_vertices()[1], Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(mesh.get_triangles(), &[0, 2, 1]);
        assert!(mesh.get_normals().is_empty());
        assert!(children[0].get_materials()[0].is_none());
    }

    #[test]
    fn cube_with_two_materials() {
        let root = load_obj("tests/data/cube.obj").unwrap();
        let children = root.get_children();
        assert_eq!(children.len(), 2);

        let red = children[0].get_materials()[0].unwrap();
        let wood = children[1].get_materials()[0].unwrap();
        assert_eq!(red.get_name(), "Red");
        assert_eq!(red.get_color(), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(red.get_emission_color(), Some(Color::rgb(0.1, 0.0, 0.0)));
        assert_eq!(wood.get_name(), "Wood");
        assert_eq!(wood.get_transparency_mode(), TransparencyMode::Fade);

        let diffuse = wood.get_texture(TextureSlot::Diffuse).unwrap();
        assert_eq!(diffuse.get_name(), "wood");
        assert!(diffuse.get_source_path().ends_with("wood.png"));
        assert!(wood.get_texture(TextureSlot::Normal).unwrap().is_normal_map());

        let triangles: usize = children.iter().map(|c| c.get_mesh().unwrap().get_triangles().len() / 3).sum();
        assert_eq!(triangles, 12);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(load_obj("tests/data/does_not_exist.obj"), Err(Err::LoadError(_))));
    }

    #[test]
    fn emission_values() {
        assert_eq!(parse_rgb("0.5 0.25 1"), Some(Color::rgb(0.5, 0.25, 1.0)));
        assert_eq!(parse_rgb("0.5"), Some(Color::rgb(0.5, 0.5, 0.5)));
        assert_eq!(parse_rgb("x y z"), None);
    }
}
