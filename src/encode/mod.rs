pub mod id;
pub mod format;
pub mod material;
pub mod geometry;
pub mod node;
pub mod document;

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::shared::{ConfigType, ResourceKey};
use crate::core::view::{MaterialView, NodeView};
use crate::io::asset_copy;
use self::document::{DocumentInfo, ObjectCounts};
use self::id::{IdAllocator, ROOT_ID};
use self::material::{MaterialTable, TextureResolution};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default = "default_config")]
pub struct Config {
    /// Copy every texture as a png into `textures_folder` next to the output file.
    pub copy_textures: bool,
    /// Subdirectory of the output directory. Must not contain `.` or `..` components.
    pub textures_folder: String,
    /// Remove `textures_folder` before copying.
    pub clear_texture_folder: bool,
    /// Rebuild normal maps from the two-channel layout when copying them.
    pub reconstruct_normal_maps: bool,
    /// Write material names as `<root name>_<material name>`.
    pub prefix_material_names: bool,
    pub creator: String,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            copy_textures: false,
            textures_folder: "Textures/".to_string(),
            clear_texture_folder: false,
            reconstruct_normal_maps: true,
            prefix_material_names: false,
            creator: format!("fbx-oxide version {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn default_config() -> Config {
    <Config as ConfigType>::default()
}

#[remain::sorted]
#[derive(Error, Debug)]
pub enum Err {
    #[error("Two distinct materials are named \"{0}\"; material names must be unique within one export.")]
    DuplicateMaterialName(String),
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("Invalid output path {0:?}: {1}")]
    InvalidOutputPath(PathBuf, String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Node \"{0}\" has a mesh without {1}; it is written as an empty node.")]
    MissingGeometryComponent(String, String),
    #[error("Texture {0:?} cannot be read: {1}")]
    UnreadableTexture(PathBuf, String),
    #[error("Material \"{0}\" is bound to node \"{1}\" but is missing from the material table.")]
    UnregisteredMaterial(String, String),
}

/// The two text sections an encoder appends to.
#[derive(Debug, Default, Clone)]
pub struct Sections {
    pub objects: String,
    pub connections: String,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, other: Sections) {
        self.objects.push_str(&other.objects);
        self.connections.push_str(&other.connections);
    }
}

/// State of one encoding run.
///
/// Holds the id allocator and every table that must be consistent across the
/// traversal. Nothing here outlives the run.
pub struct EncodingContext<'a, M: MaterialView> {
    pub(crate) ids: IdAllocator,
    pub(crate) materials: MaterialTable<'a, M>,
    pub(crate) material_ids: HashMap<ResourceKey, i64>,
    pub(crate) texture_ids: HashMap<ResourceKey, i64>,
    pub(crate) textures: TextureResolution,
    pub(crate) counts: ObjectCounts,
}

impl<'a, M: MaterialView> EncodingContext<'a, M> {
    /// Creates the context and allocates an id for every material of `materials`,
    /// in table order.
    pub fn new(materials: MaterialTable<'a, M>, mut ids: IdAllocator, textures: TextureResolution) -> Self {
        let material_ids = materials.keys()
            .map(|key| (key, ids.new_id()))
            .collect();
        Self {
            ids,
            materials,
            material_ids,
            texture_ids: HashMap::new(),
            textures,
            counts: ObjectCounts::default(),
        }
    }

    pub fn get_material_id(&self, key: ResourceKey) -> Option<i64> {
        self.material_ids.get(&key).copied()
    }

    pub fn get_counts(&self) -> &ObjectCounts {
        &self.counts
    }
}


/// Encodes the scene under `root` into a complete document.
/// `document_url` is written into the header as the location of the document.
pub fn encode_to_string<N>(root: &N, document_url: &str, cfg: &Config) -> Result<String, Err>
    where N: NodeView
{
    let table = material::collect_materials(root, cfg)?;
    let ctx = EncodingContext::new(table, IdAllocator::new(), TextureResolution::default());
    encode_document(root, ctx, &DocumentInfo::new(document_url, &cfg.creator))
}


/// Encodes `root` using an already prepared context.
pub fn encode_document<N>(root: &N, mut ctx: EncodingContext<'_, N::Material>, info: &DocumentInfo) -> Result<String, Err>
    where N: NodeView
{
    let material_output = material::encode_materials(&mut ctx)?;

    let mut sections = Sections::new();
    node::encode_node(root, ROOT_ID, &mut ctx, &mut sections)?;
    sections.append(material_output.sections);

    document::assemble(&sections.objects, &sections.connections, &ctx.counts, info)
}


/// Encodes the scene under `root` and writes it to `path`.
///
/// Nothing is written when the material names collide. The document itself is
/// written to a temporary file next to `path` and moved over it once complete.
pub fn export_to_file<N, P>(root: &N, path: P, cfg: &Config) -> Result<(), Err>
    where N: NodeView, P: AsRef<Path>
{
    let path = path.as_ref();
    check_output_extension(path)?;

    let table = material::collect_materials(root, cfg)?;

    let output_dir = prepare_output_dir(path)?;
    let textures = if cfg.copy_textures {
        asset_copy::copy_textures(&table.textures(), &output_dir, cfg)?
    } else {
        TextureResolution::default()
    };

    let ctx = EncodingContext::new(table, IdAllocator::new(), textures);
    let document = encode_document(root, ctx, &DocumentInfo::new(&path.to_string_lossy(), &cfg.creator))?;

    let mut file = tempfile::NamedTempFile::new_in(&output_dir)?;
    file.write_all(document.as_bytes())?;
    file.as_file().set_permissions(output_permissions(path, file.as_file())?)?;
    file.persist(path).map_err(|e| e.error)?;

    log::info!("Exported \"{}\" to {:?}.", root.get_name(), path);
    Ok(())
}

fn check_output_extension(path: &Path) -> Result<(), Err> {
    if path.file_name().is_none() {
        return Err(Err::InvalidOutputPath(path.to_path_buf(), "the path has no file name".to_string()));
    }
    match path.extension() {
        Some(ext) if ext.to_string_lossy().eq_ignore_ascii_case("fbx") => Ok(()),
        _ => Err(Err::InvalidOutputPath(path.to_path_buf(), "the file extension must be .fbx".to_string())),
    }
}

/// Permissions of the written document: those of the file it replaces, or the
/// usual mode of a new file (temporary files are created owner-only).
fn output_permissions(path: &Path, temp: &std::fs::File) -> Result<std::fs::Permissions, Err> {
    if let Ok(existing) = std::fs::metadata(path) {
        return Ok(existing.permissions());
    }
    #[allow(unused_mut)]
    let mut permissions = temp.metadata()?.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(0o644);
    }
    Ok(permissions)
}

/// Returns the directory `path` lives in, creating it when missing.
fn prepare_output_dir(path: &Path) -> Result<PathBuf, Err> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .map_err(|e| Err::InvalidOutputPath(path.to_path_buf(), format!("cannot create {:?}: {}", dir, e)))?;
    Ok(dir)
}
