use std::path::{Path, PathBuf};

use crate::core::view::TextureView;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Texture {
    name: String,
    source_path: PathBuf,
    normal_map: bool,
}

impl Texture {
    pub fn new(name: String, source_path: PathBuf) -> Self {
        Self {
            name,
            source_path,
            normal_map: false,
        }
    }

    /// Creates a texture named after the stem of `source_path`.
    pub fn from_path<P: AsRef<Path>>(source_path: P) -> Self {
        let source_path = source_path.as_ref().to_path_buf();
        let name = TextureUtils::get_target_stem(&source_path);
        Self::new(name, source_path)
    }

    pub fn set_name(&mut self, name: String) { self.name = name; }
    pub fn set_source_path(&mut self, path: PathBuf) { self.source_path = path; }
    pub fn set_normal_map(&mut self, normal_map: bool) { self.normal_map = normal_map; }

    pub fn with_normal_map(mut self, normal_map: bool) -> Self {
        self.normal_map = normal_map;
        self
    }
}

impl TextureView for Texture {
    fn get_name(&self) -> &str { &self.name }
    fn get_source_path(&self) -> &Path { &self.source_path }
    fn is_normal_map(&self) -> bool { self.normal_map }
}


/// Material slots a texture can be bound to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TextureSlot {
    Diffuse = 0,
    Normal = 1,
}

impl TextureSlot {
    /// All slots, in the order their textures are written.
    pub const ALL: [TextureSlot; 2] = [TextureSlot::Diffuse, TextureSlot::Normal];

    /// Name of the material property the texture is connected to.
    pub fn fbx_property(&self) -> &'static str {
        match self {
            TextureSlot::Diffuse => "DiffuseColor",
            TextureSlot::Normal => "NormalMap",
        }
    }
}


// Helper struct implementing various utilities operating on texture paths.
pub(crate) struct TextureUtils;

impl TextureUtils {
    /// Returns the image stem (file basename without extension), or an empty
    /// string when the path has none.
    pub fn get_target_stem(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Returns the image stem, or a name like "Texture5" when the path has none.
    pub fn get_or_generate_target_stem(path: &Path, index: usize) -> String {
        let name = Self::get_target_stem(path);
        if !name.is_empty() {
            name
        } else {
            format!("Texture{}", index)
        }
    }

    // Helper: get lowercase file extension from filename
    pub fn lowercase_file_extension(path: &Path) -> String {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }
}
