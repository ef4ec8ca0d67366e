use std::sync::Arc;

use crate::core::material::Material;
use crate::core::mesh::Mesh;
use crate::core::shared::Vector3;
use crate::core::view::NodeView;

/// A node of an in-memory scene hierarchy.
///
/// Meshes and materials are held behind `Arc`s so that several nodes can share
/// them; sharing is what the encoder deduplicates on.
#[derive(Clone, Debug)]
pub struct SceneNode {
    name: String,
    position: Vector3,
    rotation: Vector3,
    scale: Vector3,
    children: Vec<SceneNode>,
    mesh: Option<Arc<Mesh>>,
    materials: Vec<Option<Arc<Material>>>,
}

impl SceneNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::one(),
            children: Vec::new(),
            mesh: None,
            materials: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn set_local_position(&mut self, position: Vector3) {
        self.position = position;
    }

    /// Sets the local rotation as Euler angles in degrees.
    pub fn set_local_rotation(&mut self, rotation: Vector3) {
        self.rotation = rotation;
    }

    pub fn set_local_scale(&mut self, scale: Vector3) {
        self.scale = scale;
    }

    pub fn set_mesh(&mut self, mesh: Option<Arc<Mesh>>) {
        self.mesh = mesh;
    }

    pub fn set_materials(&mut self, materials: Vec<Option<Arc<Material>>>) {
        self.materials = materials;
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn with_position(mut self, position: Vector3) -> Self {
        self.position = position;
        self
    }

    pub fn with_mesh(mut self, mesh: Arc<Mesh>, materials: Vec<Option<Arc<Material>>>) -> Self {
        self.mesh = Some(mesh);
        self.materials = materials;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in the subtree rooted here, this node included.
    pub fn num_nodes(&self) -> usize {
        1 + self.children.iter().map(|c| c.num_nodes()).sum::<usize>()
    }
}

impl NodeView for SceneNode {
    type Mesh = Mesh;
    type Material = Material;

    fn get_name(&self) -> &str { &self.name }
    fn get_local_position(&self) -> Vector3 { self.position }
    fn get_local_rotation(&self) -> Vector3 { self.rotation }
    fn get_local_scale(&self) -> Vector3 { self.scale }

    fn get_children(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }

    fn get_mesh(&self) -> Option<&Mesh> {
        self.mesh.as_deref()
    }

    fn get_materials(&self) -> Vec<Option<&Material>> {
        self.materials.iter()
            .map(|m| m.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy() {
        let root = SceneNode::new("root")
            .with_child(SceneNode::new("a").with_child(SceneNode::new("b")))
            .with_child(SceneNode::new("c"));
        assert_eq!(root.num_nodes(), 4);
        let names = root.get_children().iter().map(|c| c.get_name().to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(root.get_local_scale(), Vector3::one());
    }

    #[test]
    fn shared_material_has_one_address() {
        let mat = Arc::new(Material::new("Wood".to_string()));
        let mut node = SceneNode::new("n");
        node.set_materials(vec![Some(mat.clone()), None, Some(mat)]);
        let mats = node.get_materials();
        assert!(mats[1].is_none());
        assert!(std::ptr::eq(mats[0].unwrap(), mats[2].unwrap()));
    }
}
