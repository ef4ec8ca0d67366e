use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use indexmap::IndexMap;

use crate::core::shared::{Color, ResourceKey};
use crate::core::texture::TextureSlot;
use crate::core::view::{MaterialView, NodeView, TextureView};
use super::format::{quote_safe, write_floats};
use super::geometry;
use super::{Config, EncodingContext, Err, Sections};

pub struct MaterialEntry<'a, M> {
    pub material: &'a M,
    /// Name written to the document, prefix included.
    pub name: String,
}

/// The distinct materials of a scene in order of first discovery.
pub struct MaterialTable<'a, M> {
    entries: IndexMap<ResourceKey, MaterialEntry<'a, M>>,
}

impl<'a, M: MaterialView> MaterialTable<'a, M> {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: ResourceKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: ResourceKey) -> Option<&MaterialEntry<'a, M>> {
        self.entries.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKey, &MaterialEntry<'a, M>)> + '_ {
        self.entries.iter().map(|(k, e)| (*k, e))
    }

    pub fn materials(&self) -> Vec<&'a M> {
        self.entries.values().map(|e| e.material).collect()
    }

    /// The distinct textures bound to the materials of the table, diffuse before
    /// normal within a material, materials in table order.
    pub fn textures(&self) -> Vec<&'a M::Texture> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for entry in self.entries.values() {
            let material: &'a M = entry.material;
            for slot in TextureSlot::ALL {
                if let Some(texture) = material.get_texture(slot) {
                    if seen.insert(texture.key()) {
                        out.push(texture);
                    }
                }
            }
        }
        out
    }

    fn insert(&mut self, material: &'a M, name: String) {
        self.entries.entry(material.key())
            .or_insert(MaterialEntry { material, name });
    }
}

impl<'a, M: MaterialView> Default for MaterialTable<'a, M> {
    fn default() -> Self {
        Self::new()
    }
}


/// Where a texture is found, as written into its Texture block.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTexture {
    pub file_name: String,
    pub relative_file_name: Option<String>,
}

/// Outcome of copying textures next to the output.
/// Textures not mentioned here are referenced at their source path.
#[derive(Clone, Debug, Default)]
pub struct TextureResolution {
    resolved: HashMap<ResourceKey, ResolvedTexture>,
    skipped: HashSet<ResourceKey>,
}

impl TextureResolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, key: ResourceKey, resolved: ResolvedTexture) {
        self.resolved.insert(key, resolved);
    }

    /// Marks a texture as unusable; it is left out of the document.
    pub fn skip(&mut self, key: ResourceKey) {
        self.skipped.insert(key);
    }

    pub fn is_skipped(&self, key: ResourceKey) -> bool {
        self.skipped.contains(&key)
    }

    pub fn get(&self, key: ResourceKey) -> Option<&ResolvedTexture> {
        self.resolved.get(&key)
    }

    fn resolve_or_source<T: TextureView>(&self, texture: &T) -> ResolvedTexture {
        self.get(texture.key())
            .cloned()
            .unwrap_or_else(|| ResolvedTexture {
                file_name: texture.get_source_path().to_string_lossy().to_string(),
                relative_file_name: None,
            })
    }
}


/// Collects the distinct materials bound to nodes with encodable geometry under `root`,
/// and checks that their names are unique.
pub fn collect_materials<'a, N>(root: &'a N, cfg: &Config) -> Result<MaterialTable<'a, N::Material>, Err>
    where N: NodeView
{
    let prefix = if cfg.prefix_material_names {
        Some(root.get_name().to_string())
    } else {
        None
    };

    let mut table = MaterialTable::new();
    collect_recursive(root, prefix.as_deref(), &mut table);

    let mut names = HashMap::new();
    for (key, entry) in table.iter() {
        if let Some(other) = names.insert(entry.name.as_str(), key) {
            if other != key {
                return Err(Err::DuplicateMaterialName(entry.name.clone()));
            }
        }
    }
    Ok(table)
}

fn collect_recursive<'a, N>(node: &'a N, prefix: Option<&str>, table: &mut MaterialTable<'a, N::Material>)
    where N: NodeView
{
    let has_geometry = node.get_mesh()
        .map(|mesh| geometry::check_geometry(mesh).is_ok())
        .unwrap_or(false);
    if has_geometry {
        for material in node.get_materials().into_iter().flatten() {
            let name = match prefix {
                Some(prefix) => format!("{}_{}", prefix, material.get_name()),
                None => material.get_name().to_string(),
            };
            table.insert(material, name);
        }
    }
    for child in node.get_children() {
        collect_recursive(child, prefix, table);
    }
}


pub struct MaterialOutput<'a, M> {
    /// Distinct materials in the order they were written.
    pub materials: Vec<&'a M>,
    pub sections: Sections,
}

/// Writes one Material block per table entry, the Texture blocks of their textures
/// (each texture once per run), and the texture-to-material connections.
pub fn encode_materials<'a, M>(ctx: &mut EncodingContext<'a, M>) -> Result<MaterialOutput<'a, M>, Err>
    where M: MaterialView
{
    let mut sections = Sections::new();
    let entries = ctx.materials.iter()
        .map(|(key, entry)| (key, entry.material, entry.name.clone()))
        .collect::<Vec<_>>();

    for (key, material, name) in entries {
        let material_id = ctx.get_material_id(key)
            .ok_or_else(|| Err::UnregisteredMaterial(name.clone(), String::new()))?;

        write_material(material, material_id, &name, &mut sections.objects)?;
        ctx.counts.materials += 1;

        for slot in TextureSlot::ALL {
            let texture = match material.get_texture(slot) {
                Some(texture) => texture,
                None => continue,
            };
            let texture_key = texture.key();
            if ctx.textures.is_skipped(texture_key) {
                log::warn!("Texture \"{}\" of material \"{}\" is left out.", texture.get_name(), name);
                continue;
            }

            let texture_id = match ctx.texture_ids.get(&texture_key) {
                Some(&id) => id,
                None => {
                    let id = ctx.ids.new_id();
                    let resolved = ctx.textures.resolve_or_source(texture);
                    write_texture(texture, id, &resolved, &mut sections.objects)?;
                    ctx.texture_ids.insert(texture_key, id);
                    ctx.counts.textures += 1;
                    id
                }
            };

            writeln!(sections.connections, "\t;Texture::{}, Material::{}", quote_safe(texture.get_name()), quote_safe(&name))?;
            writeln!(sections.connections, "\tC: \"OP\", {}, {}, \"{}\"", texture_id, material_id, slot.fbx_property())?;
            writeln!(sections.connections)?;
        }
    }

    Ok(MaterialOutput {
        materials: ctx.materials.materials(),
        sections,
    })
}

fn write_color_property(out: &mut String, name: &str, ty: &str, label: &str, flags: &str, color: Color) -> Result<(), Err> {
    write!(out, "\t\t\tP: \"{}\", \"{}\", \"{}\", \"{}\",", name, ty, label, flags)?;
    write_floats(out, [color.r, color.g, color.b])?;
    writeln!(out)?;
    Ok(())
}

fn write_material<M: MaterialView>(material: &M, id: i64, name: &str, out: &mut String) -> Result<(), Err> {
    writeln!(out)?;
    writeln!(out, "\tMaterial: {}, \"Material::{}\", \"\" {{", id, quote_safe(name))?;
    writeln!(out, "\t\tVersion: 102")?;
    writeln!(out, "\t\tShadingModel: \"phong\"")?;
    writeln!(out, "\t\tMultiLayer: 0")?;
    writeln!(out, "\t\tProperties70:  {{")?;

    let color = material.get_color();
    write_color_property(out, "Diffuse", "Vector3D", "Vector", "", color)?;
    write_color_property(out, "DiffuseColor", "Color", "", "A", color)?;

    if let Some(specular) = material.get_specular_color() {
        write_color_property(out, "Specular", "Vector3D", "Vector", "", specular)?;
        write_color_property(out, "SpecularColor", "ColorRGB", "Color", " ", specular)?;
    }

    if material.get_transparency_mode().is_blended() {
        write_color_property(out, "TransparentColor", "Color", "", "A", color)?;
        write!(out, "\t\t\tP: \"Opacity\", \"double\", \"Number\", \"\",")?;
        write_floats(out, [color.a])?;
        writeln!(out)?;
    }

    if let Some(emission) = material.get_emission_color() {
        write_color_property(out, "Emissive", "Vector3D", "Vector", "", emission)?;
        write!(out, "\t\t\tP: \"EmissiveFactor\", \"Number\", \"\", \"A\",")?;
        write_floats(out, [emission.mean_rgb()])?;
        writeln!(out)?;
    }

    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

fn write_texture<T: TextureView>(texture: &T, id: i64, resolved: &ResolvedTexture, out: &mut String) -> Result<(), Err> {
    let name = quote_safe(texture.get_name());
    writeln!(out, "\tTexture: {}, \"Texture::{}\", \"\" {{", id, name)?;
    writeln!(out, "\t\tType: \"TextureVideoClip\"")?;
    writeln!(out, "\t\tVersion: 202")?;
    writeln!(out, "\t\tTextureName: \"Texture::{}\"", name)?;
    writeln!(out, "\t\tProperties70:  {{")?;
    writeln!(out, "\t\t\tP: \"CurrentTextureBlendMode\", \"enum\", \"\", \"\",0")?;
    writeln!(out, "\t\t\tP: \"UVSet\", \"KString\", \"\", \"\", \"map1\"")?;
    writeln!(out, "\t\t\tP: \"UseMaterial\", \"bool\", \"\", \"\",1")?;
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t\tMedia: \"Video::{}\"", name)?;
    writeln!(out, "\t\tFileName: \"{}\"", quote_safe(&resolved.file_name))?;
    if let Some(relative) = &resolved.relative_file_name {
        writeln!(out, "\t\tRelativeFilename: \"{}\"", quote_safe(relative))?;
    }
    writeln!(out, "\t\tModelUVTranslation: 0,0")?;
    writeln!(out, "\t\tModelUVScaling: 1,1")?;
    writeln!(out, "\t\tTexture_Alpha_Source: \"None\"")?;
    writeln!(out, "\t\tCropping: 0,0,0,0")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::material::{Material, TransparencyMode};
    use crate::core::mesh::Mesh;
    use crate::core::scene::SceneNode;
    use crate::core::shared::{ConfigType, Vector3};
    use crate::core::texture::Texture;
    use crate::encode::id::IdAllocator;

    fn triangle() -> Arc<Mesh> {
        let mut mesh = Mesh::new();
        mesh.set_vertices(vec![Vector3::zero(), Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)]);
        mesh.set_triangles(vec![0, 1, 2]);
        Arc::new(mesh)
    }

    fn node_with(name: &str, materials: Vec<Option<Arc<Material>>>) -> SceneNode {
        SceneNode::new(name).with_mesh(triangle(), materials)
    }

    #[test]
    fn materials_are_deduplicated_by_identity() {
        let wood = Arc::new(Material::new("Wood".to_string()));
        let stone = Arc::new(Material::new("Stone".to_string()));
        let root = SceneNode::new("root")
            .with_child(node_with("a", vec![Some(wood.clone()), None]))
            .with_child(node_with("b", vec![Some(stone.clone()), Some(wood.clone())]));

        let table = collect_materials(&root, &Config::default()).unwrap();
        let names = table.iter().map(|(_, e)| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Wood", "Stone"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let root = SceneNode::new("root")
            .with_child(node_with("a", vec![Some(Arc::new(Material::new("Wood".to_string())))]))
            .with_child(node_with("b", vec![Some(Arc::new(Material::new("Wood".to_string())))]));

        match collect_materials(&root, &Config::default()) {
            Err(Err::DuplicateMaterialName(name)) => assert_eq!(name, "Wood"),
            other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn prefix_uses_root_name() {
        let root = SceneNode::new("House")
            .with_child(node_with("a", vec![Some(Arc::new(Material::new("Wood".to_string())))]));
        let mut cfg = Config::default();
        cfg.prefix_material_names = true;
        let table = collect_materials(&root, &cfg).unwrap();
        assert_eq!(table.iter().next().map(|(_, e)| e.name.as_str()), Some("House_Wood"));
    }

    #[test]
    fn nodes_without_geometry_do_not_contribute() {
        let mut empty = SceneNode::new("empty");
        empty.set_mesh(Some(Arc::new(Mesh::new())));
        empty.set_materials(vec![Some(Arc::new(Material::new("Ghost".to_string())))]);
        let root = SceneNode::new("root").with_child(empty);
        assert!(collect_materials(&root, &Config::default()).unwrap().is_empty());
    }

    #[test]
    fn shared_texture_is_written_once() {
        let albedo = Arc::new(Texture::from_path("tex/albedo.png"));
        let bump = Arc::new(Texture::from_path("tex/bump.png").with_normal_map(true));
        let a = Arc::new(
            Material::new("A".to_string())
                .with_texture(TextureSlot::Diffuse, albedo.clone())
                .with_texture(TextureSlot::Normal, bump)
        );
        let b = Arc::new(Material::new("B".to_string()).with_texture(TextureSlot::Diffuse, albedo));
        let root = node_with("root", vec![Some(a), Some(b)]);

        let table = collect_materials(&root, &Config::default()).unwrap();
        assert_eq!(table.textures().len(), 2);
        let mut ctx = EncodingContext::new(table, IdAllocator::with_seed(1), TextureResolution::default());
        let out = encode_materials(&mut ctx).unwrap();

        assert_eq!(out.materials.len(), 2);
        assert_eq!(out.sections.objects.matches("\tTexture: ").count(), 2);
        assert_eq!(out.sections.connections.matches("C: \"OP\"").count(), 3);
        assert_eq!(out.sections.connections.matches("\"NormalMap\"").count(), 1);
        assert!(out.sections.objects.contains("FileName: \"tex/albedo.png\""));
        assert!(!out.sections.objects.contains("RelativeFilename"));
        assert_eq!(ctx.get_counts().textures, 2);
    }

    #[test]
    fn skipped_texture_is_left_out() {
        let albedo = Arc::new(Texture::from_path("missing.png"));
        let mat = Arc::new(Material::new("A".to_string()).with_texture(TextureSlot::Diffuse, albedo.clone()));
        let root = node_with("root", vec![Some(mat)]);

        let table = collect_materials(&root, &Config::default()).unwrap();
        let mut resolution = TextureResolution::new();
        resolution.skip(albedo.key());
        let mut ctx = EncodingContext::new(table, IdAllocator::with_seed(1), resolution);
        let out = encode_materials(&mut ctx).unwrap();
        assert!(!out.sections.objects.contains("Texture:"));
        assert!(out.sections.connections.is_empty());
    }

    #[test]
    fn material_properties() {
        let mut mat = Material::new("Glass".to_string());
        mat.set_color(Color::new(0.5, 0.25, 1.0, 0.5));
        mat.set_specular_color(Some(Color::rgb(0.1, 0.2, 0.3)));
        mat.set_emission_color(Some(Color::rgb(0.25, 0.5, 0.75)));
        mat.set_transparency_mode(TransparencyMode::Fade);

        let mut out = String::new();
        write_material(&mat, 7, "Glass", &mut out).unwrap();
        assert!(out.contains("\tMaterial: 7, \"Material::Glass\", \"\" {"));
        assert!(out.contains("P: \"DiffuseColor\", \"Color\", \"\", \"A\",0.5,0.25,1\n"));
        assert!(out.contains("P: \"SpecularColor\", \"ColorRGB\", \"Color\", \" \",0.1,0.2,0.3\n"));
        assert!(out.contains("P: \"Opacity\", \"double\", \"Number\", \"\",0.5\n"));
        assert!(out.contains("P: \"EmissiveFactor\", \"Number\", \"\", \"A\",0.5\n"));

        mat.set_transparency_mode(TransparencyMode::Cutout);
        mat.set_specular_color(None);
        let mut out = String::new();
        write_material(&mat, 7, "Glass", &mut out).unwrap();
        assert!(!out.contains("Opacity"));
        assert!(!out.contains("Specular"));
    }
}
