use std::path::Path;

use crate::core::scene::SceneNode;
use crate::core::view::NodeView;
use crate::encode::{self, Config};
use crate::io::obj;

#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Error: {0}")]
    Error(String),
    #[error("FBX Encoder Error: {0}")]
    FbxEncoderError(#[from] encode::Err),
    #[error("OBJ Loader Error: {0}")]
    ObjLoaderError(#[from] obj::Err),
}

/// Supported scene file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFileFormat {
    Unknown,
    Fbx,
    Obj,
}

/// Guesses the format of a scene file from its extension.
pub fn get_scene_file_format<P: AsRef<Path>>(file_name: P) -> SceneFileFormat {
    let ext = file_name.as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "fbx" => SceneFileFormat::Fbx,
        "obj" => SceneFileFormat::Obj,
        _ => SceneFileFormat::Unknown,
    }
}

/// Reads a scene from a file. Currently only obj files are supported.
pub fn read_scene_from_file<P: AsRef<Path>>(file_name: P) -> Result<SceneNode, Err> {
    let file_name = file_name.as_ref();
    match get_scene_file_format(file_name) {
        SceneFileFormat::Obj => Ok(obj::load_obj(file_name)?),
        SceneFileFormat::Fbx => {
            Err(Err::Error("Reading fbx files is not supported.".to_string()))
        }
        SceneFileFormat::Unknown => {
            Err(Err::Error(format!("Unknown input file format: {:?}", file_name)))
        }
    }
}

/// Writes the scene under `root` into a file. Currently only fbx files are supported.
pub fn write_scene_to_file<N, P>(file_name: P, root: &N, cfg: &Config) -> Result<(), Err>
    where N: NodeView, P: AsRef<Path>
{
    let file_name = file_name.as_ref();
    match get_scene_file_format(file_name) {
        SceneFileFormat::Fbx => Ok(encode::export_to_file(root, file_name, cfg)?),
        _ => Err(Err::Error(format!("Unsupported output file format: {:?}", file_name))),
    }
}
