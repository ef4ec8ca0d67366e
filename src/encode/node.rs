use std::fmt::Write;

use crate::core::shared::{ResourceKey, Vector3};
use crate::core::view::{MaterialView, MeshView, NodeView};
use super::format::{quote_safe, write_vec3};
use super::geometry;
use super::id::ROOT_ID;
use super::{EncodingContext, Err, Sections};

/// Writes the Model block of `node`, its Geometry block if it has encodable geometry,
/// their connections, and then recurses into the children.
/// Returns the id of the Model block.
pub fn encode_node<N>(node: &N, parent_id: i64, ctx: &mut EncodingContext<'_, N::Material>, out: &mut Sections) -> Result<i64, Err>
    where N: NodeView
{
    let parent_name = if parent_id == ROOT_ID {
        "RootNode".to_string()
    } else {
        parent_id.to_string()
    };
    encode_recursive(node, parent_id, &parent_name, ctx, out)
}

fn encode_recursive<N>(node: &N, parent_id: i64, parent_name: &str, ctx: &mut EncodingContext<'_, N::Material>, out: &mut Sections) -> Result<i64, Err>
    where N: NodeView
{
    let model_id = ctx.ids.new_id();
    let name = node.get_name();

    let mesh = match node.get_mesh() {
        Some(mesh) => match geometry::check_geometry(mesh) {
            Ok(()) => Some(mesh),
            Err(missing) => {
                log::warn!("{}", Err::MissingGeometryComponent(name.to_string(), missing));
                None
            }
        },
        None => None,
    };
    log::debug!("Encoding node \"{}\" ({}).", name, if mesh.is_some() { "mesh" } else { "empty" });

    write_model(node, model_id, mesh.is_some(), &mut out.objects)?;
    ctx.counts.models += 1;

    writeln!(out.connections, "\t;Model::{}, Model::{}", quote_safe(name), quote_safe(parent_name))?;
    writeln!(out.connections, "\tC: \"OO\", {}, {}", model_id, parent_id)?;
    writeln!(out.connections)?;

    if let Some(mesh) = mesh {
        let materials = distinct_materials(node, ctx)?;
        let material_indices = material_indices(node, mesh, &materials);

        let geometry_id = ctx.ids.new_id();
        geometry::write_geometry(mesh, geometry_id, &material_indices, &mut out.objects)?;
        ctx.counts.geometries += 1;

        writeln!(out.connections, "\t;Geometry::, Model::{}", quote_safe(name))?;
        writeln!(out.connections, "\tC: \"OO\", {}, {}", geometry_id, model_id)?;
        writeln!(out.connections)?;

        for (_, material_name, material_id) in &materials {
            writeln!(out.connections, "\t;Material::{}, Model::{}", quote_safe(material_name), quote_safe(name))?;
            writeln!(out.connections, "\tC: \"OO\", {}, {}", material_id, model_id)?;
            writeln!(out.connections)?;
        }
    }

    for child in node.get_children() {
        encode_recursive(child, model_id, name, ctx, out)?;
    }

    Ok(model_id)
}

/// The distinct materials bound to `node` in slot order, with their document names and ids.
fn distinct_materials<N>(node: &N, ctx: &EncodingContext<'_, N::Material>) -> Result<Vec<(ResourceKey, String, i64)>, Err>
    where N: NodeView
{
    let mut out: Vec<(ResourceKey, String, i64)> = Vec::new();
    for (slot, material) in node.get_materials().into_iter().enumerate() {
        let material = match material {
            Some(material) => material,
            None => {
                log::warn!("Node \"{}\" has no material in slot {}.", node.get_name(), slot);
                continue;
            }
        };
        let key = material.key();
        if out.iter().any(|(k, _, _)| *k == key) {
            continue;
        }
        let (entry, id) = match (ctx.materials.get(key), ctx.get_material_id(key)) {
            (Some(entry), Some(id)) => (entry, id),
            _ => return Err(Err::UnregisteredMaterial(material.get_name().to_string(), node.get_name().to_string())),
        };
        out.push((key, entry.name.clone(), id));
    }
    Ok(out)
}

/// Per-triangle index into `materials`, the node's distinct material list.
///
/// A submesh whose slot holds a material maps to that material's position.
/// A submesh with an empty or missing slot keeps its own index.
fn material_indices<N>(node: &N, mesh: &N::Mesh, materials: &[(ResourceKey, String, i64)]) -> Vec<i64>
    where N: NodeView
{
    let slots = node.get_materials();
    let slot_to_index = (0..mesh.num_submeshes())
        .map(|submesh| {
            slots.get(submesh)
                .copied()
                .flatten()
                .and_then(|material| {
                    let key = material.key();
                    materials.iter().position(|(k, _, _)| *k == key)
                })
                .unwrap_or(submesh) as i64
        })
        .collect::<Vec<_>>();

    geometry::classify_triangles(mesh)
        .into_iter()
        .map(|submesh| slot_to_index.get(submesh).copied().unwrap_or(submesh as i64))
        .collect()
}

fn write_model<N: NodeView>(node: &N, id: i64, has_geometry: bool, out: &mut String) -> Result<(), Err> {
    let ty = if has_geometry { "Mesh" } else { "Null" };
    writeln!(out, "\tModel: {}, \"Model::{}\", \"{}\" {{", id, quote_safe(node.get_name()), ty)?;
    writeln!(out, "\t\tVersion: 232")?;
    writeln!(out, "\t\tProperties70:  {{")?;
    writeln!(out, "\t\t\tP: \"RotationOrder\", \"enum\", \"\", \"\",4")?;
    writeln!(out, "\t\t\tP: \"RotationActive\", \"bool\", \"\", \"\",1")?;
    writeln!(out, "\t\t\tP: \"InheritType\", \"enum\", \"\", \"\",1")?;
    writeln!(out, "\t\t\tP: \"ScalingMax\", \"Vector3D\", \"Vector\", \"\",0,0,0")?;
    writeln!(out, "\t\t\tP: \"DefaultAttributeIndex\", \"int\", \"Integer\", \"\",0")?;

    let position = node.get_local_position().flip_x();
    write!(out, "\t\t\tP: \"Lcl Translation\", \"Lcl Translation\", \"\", \"A+\",")?;
    write_vec3(out, position)?;
    writeln!(out)?;

    let rotation = node.get_local_rotation();
    write!(out, "\t\t\tP: \"Lcl Rotation\", \"Lcl Rotation\", \"\", \"A+\",")?;
    write_vec3(out, Vector3::new(rotation.x, -rotation.y, -rotation.z))?;
    writeln!(out)?;

    write!(out, "\t\t\tP: \"Lcl Scaling\", \"Lcl Scaling\", \"\", \"A\",")?;
    write_vec3(out, node.get_local_scale())?;
    writeln!(out)?;

    writeln!(out, "\t\t\tP: \"currentUVSet\", \"KString\", \"\", \"U\", \"map1\"")?;
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t\tShading: T")?;
    writeln!(out, "\t\tCulling: \"CullingOff\"")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::material::Material;
    use crate::core::mesh::{builder::MeshBuilder, Mesh};
    use crate::core::scene::SceneNode;
    use crate::core::shared::ConfigType;
    use crate::encode::id::IdAllocator;
    use crate::encode::material::{collect_materials, MaterialTable, TextureResolution};
    use crate::encode::Config;

    fn two_submesh_mesh() -> Arc<Mesh> {
        let mut builder = MeshBuilder::new();
        builder.set_vertices(vec![Vector3::zero(); 4])
            .add_submesh(vec![0, 1, 2, 0, 2, 3])
            .add_submesh(vec![1, 2, 3, 3, 2, 1, 0, 1, 3]);
        Arc::new(builder.build().unwrap())
    }

    fn encode(root: &SceneNode) -> Result<Sections, Err> {
        let table = collect_materials(root, &Config::default())?;
        let mut ctx = EncodingContext::new(table, IdAllocator::with_seed(3), TextureResolution::default());
        let mut out = Sections::new();
        encode_node(root, ROOT_ID, &mut ctx, &mut out)?;
        Ok(out)
    }

    #[test]
    fn transform_conversion() {
        let mut node = SceneNode::new("n");
        node.set_local_position(Vector3::new(1.0, 2.0, 3.0));
        node.set_local_rotation(Vector3::new(10.0, 20.0, -30.0));
        node.set_local_scale(Vector3::new(1.0, 2.0, 0.5));

        let out = encode(&node).unwrap();
        assert!(out.objects.contains("\"Model::n\", \"Null\" {"));
        assert!(out.objects.contains("P: \"Lcl Translation\", \"Lcl Translation\", \"\", \"A+\",-1,2,3\n"));
        assert!(out.objects.contains("P: \"Lcl Rotation\", \"Lcl Rotation\", \"\", \"A+\",10,-20,30\n"));
        assert!(out.objects.contains("P: \"Lcl Scaling\", \"Lcl Scaling\", \"\", \"A\",1,2,0.5\n"));
        assert!(out.connections.contains(", 0\n"));
    }

    #[test]
    fn material_layer_follows_submeshes() {
        let a = Arc::new(Material::new("A".to_string()));
        let b = Arc::new(Material::new("B".to_string()));
        let root = SceneNode::new("root").with_mesh(two_submesh_mesh(), vec![Some(a), Some(b)]);

        let out = encode(&root).unwrap();
        assert!(out.objects.contains("Materials: *5 {\n\t\t\t\ta: 0,0,1,1,1\n"));
        assert!(out.objects.contains("\"Model::root\", \"Mesh\" {"));
        assert_eq!(out.connections.matches("C: \"OO\"").count(), 4);
    }

    #[test]
    fn repeated_material_maps_to_one_index() {
        let a = Arc::new(Material::new("A".to_string()));
        let root = SceneNode::new("root").with_mesh(two_submesh_mesh(), vec![Some(a.clone()), Some(a)]);

        let out = encode(&root).unwrap();
        assert!(out.objects.contains("Materials: *5 {\n\t\t\t\ta: 0,0,0,0,0\n"));
        // model->root, geometry->model, one material->model
        assert_eq!(out.connections.matches("C: \"OO\"").count(), 3);
    }

    #[test]
    fn empty_mesh_becomes_null() {
        let mut node = SceneNode::new("broken");
        node.set_mesh(Some(Arc::new(Mesh::new())));
        let out = encode(&node).unwrap();
        assert!(out.objects.contains("\"Model::broken\", \"Null\" {"));
        assert!(!out.objects.contains("Geometry:"));
    }

    #[test]
    fn unregistered_material_fails() {
        let root = SceneNode::new("root")
            .with_mesh(two_submesh_mesh(), vec![Some(Arc::new(Material::new("A".to_string())))]);
        let mut ctx = EncodingContext::new(MaterialTable::new(), IdAllocator::with_seed(3), TextureResolution::default());
        let mut out = Sections::new();
        let result = encode_node(&root, ROOT_ID, &mut ctx, &mut out);
        assert!(matches!(result, Err(Err::UnregisteredMaterial(..))));
    }

    #[test]
    fn children_connect_to_parent() {
        let root = SceneNode::new("root")
            .with_child(SceneNode::new("a"))
            .with_child(SceneNode::new("b").with_child(SceneNode::new("c")));
        let table = collect_materials(&root, &Config::default()).unwrap();
        let mut ctx = EncodingContext::new(table, IdAllocator::with_seed(3), TextureResolution::default());
        let mut out = Sections::new();
        let root_id = encode_node(&root, ROOT_ID, &mut ctx, &mut out).unwrap();

        assert_eq!(ctx.get_counts().models, 4);
        assert_eq!(out.connections.matches(&format!(", {}\n", root_id)).count(), 2);
        // pre-order
        let pos = |n: &str| out.objects.find(&format!("\"Model::{}\"", n)).unwrap();
        assert!(pos("root") < pos("a") && pos("a") < pos("b") && pos("b") < pos("c"));
    }
}
