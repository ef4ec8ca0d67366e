use std::fs;
use std::path::{Component, Path};

use rand::Rng;

use crate::core::texture::TextureUtils;
use crate::core::view::TextureView;
use crate::encode::material::{ResolvedTexture, TextureResolution};
use crate::encode::{Config, Err};
use super::texture_io;

/// Normalizes the name of the texture folder: no leading separator, exactly one
/// trailing '/', and "Textures/" when empty.
///
/// The folder must name a subdirectory of the output directory, so every component
/// has to be a plain name; `.`, `..` and drive prefixes are rejected.
pub fn normalize_folder_name(folder: &str) -> Result<String, Err> {
    let trimmed = folder.trim()
        .trim_start_matches(['/', '\\'])
        .trim_end_matches(['/', '\\'])
        .replace('\\', "/");
    if trimmed.is_empty() {
        return Ok("Textures/".to_string());
    }
    let plain = trimmed.split('/')
        .all(|part| matches!(Path::new(part).components().collect::<Vec<_>>().as_slice(), [Component::Normal(_)]));
    if !plain {
        return Err(Err::InvalidOutputPath(
            folder.into(),
            "the texture folder must be a subdirectory of the output directory".to_string(),
        ));
    }
    Ok(format!("{}/", trimmed))
}

/// Copies `textures` as png files into the texture folder under `output_dir`.
///
/// Textures that cannot be read or written are reported and marked as skipped;
/// they never fail the export. Failing to create the folder does.
pub fn copy_textures<T: TextureView>(textures: &[&T], output_dir: &Path, cfg: &Config) -> Result<TextureResolution, Err> {
    let folder_name = normalize_folder_name(&cfg.textures_folder)?;
    let folder = output_dir.join(&folder_name);

    if cfg.clear_texture_folder && folder.exists() {
        check_clearable(&folder, output_dir)?;
        log::info!("Removing existing texture folder {:?}.", folder);
        fs::remove_dir_all(&folder)?;
    }
    fs::create_dir_all(&folder)?;
    let folder = fs::canonicalize(&folder)?;

    let mut resolution = TextureResolution::new();
    for (index, &texture) in textures.iter().enumerate() {
        match copy_texture(texture, index, &folder, cfg) {
            Ok(file_name) => {
                let target = folder.join(&file_name);
                log::debug!("Copied texture \"{}\" to {:?}.", texture.get_name(), target);
                resolution.resolve(texture.key(), ResolvedTexture {
                    file_name: target.to_string_lossy().to_string(),
                    relative_file_name: Some(format!("/{}{}", folder_name, file_name)),
                });
            },
            Err(err) => {
                log::warn!("{}", Err::UnreadableTexture(texture.get_source_path().to_path_buf(), err.to_string()));
                resolution.skip(texture.key());
            }
        }
    }
    Ok(resolution)
}

// A folder reached through a link may still resolve to the output directory or above it.
fn check_clearable(folder: &Path, output_dir: &Path) -> Result<(), Err> {
    let resolved = fs::canonicalize(folder)?;
    if fs::canonicalize(output_dir)?.starts_with(&resolved) {
        return Err(Err::InvalidOutputPath(
            folder.to_path_buf(),
            "refusing to clear a texture folder that contains the output directory".to_string(),
        ));
    }
    Ok(())
}

/// Converts one texture and returns the file name it was written under.
fn copy_texture<T: TextureView>(texture: &T, index: usize, folder: &Path, cfg: &Config) -> Result<String, texture_io::Err> {
    let source = texture.get_source_path();
    let mut image = texture_io::read_texture_image(source)?;
    if texture.is_normal_map() && cfg.reconstruct_normal_maps {
        texture_io::reconstruct_normal_map(&mut image);
    }

    let stem = target_stem(texture, index);
    let file_name = unique_file_name(folder, &stem);
    if TextureUtils::lowercase_file_extension(source) != "png" {
        log::debug!("Converting {:?} to png.", source);
    }
    texture_io::write_png(&image, &folder.join(&file_name))?;
    Ok(file_name)
}

fn target_stem<T: TextureView>(texture: &T, index: usize) -> String {
    let name = texture.get_name().replace(['/', '\\'], "_");
    if name.is_empty() {
        TextureUtils::get_or_generate_target_stem(texture.get_source_path(), index)
    } else {
        name
    }
}

/// `<stem>.png`, or `<stem><random>.png` when that file already exists.
fn unique_file_name(folder: &Path, stem: &str) -> String {
    let mut file_name = format!("{}.png", stem);
    let mut rng = rand::thread_rng();
    while folder.join(&file_name).exists() {
        file_name = format!("{}{}.png", stem, rng.gen::<u32>());
    }
    file_name
}
