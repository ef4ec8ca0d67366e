use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::shared::Color;
use crate::core::texture::{Texture, TextureSlot};
use crate::core::view::MaterialView;

#[derive(Clone, Debug)]
pub struct Material {
    name: String,
    color: Color,
    specular_color: Option<Color>,
    emission_color: Option<Color>,
    transparency_mode: TransparencyMode,
    diffuse_texture: Option<Arc<Texture>>,
    normal_texture: Option<Arc<Texture>>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum TransparencyMode {
    #[default]
    Opaque = 0,
    Cutout,
    Fade,
    Transparent,
}

impl TransparencyMode {
    /// Whether the material is alpha blended, i.e. whether it gets opacity properties.
    pub fn is_blended(&self) -> bool {
        matches!(self, TransparencyMode::Fade | TransparencyMode::Transparent)
    }
}

impl Material {
    pub fn new(name: String) -> Self {
        Self {
            name,
            color: Color::white(),
            specular_color: None,
            emission_color: None,
            transparency_mode: TransparencyMode::Opaque,
            diffuse_texture: None,
            normal_texture: None,
        }
    }

    pub fn set_name(&mut self, name: String) { self.name = name; }
    pub fn set_color(&mut self, color: Color) { self.color = color; }
    pub fn set_specular_color(&mut self, color: Option<Color>) { self.specular_color = color; }
    pub fn set_emission_color(&mut self, color: Option<Color>) { self.emission_color = color; }
    pub fn set_transparency_mode(&mut self, mode: TransparencyMode) { self.transparency_mode = mode; }

    /// Binds `texture` to `slot`, replacing whatever was bound there.
    pub fn set_texture(&mut self, slot: TextureSlot, texture: Option<Arc<Texture>>) {
        match slot {
            TextureSlot::Diffuse => self.diffuse_texture = texture,
            TextureSlot::Normal => self.normal_texture = texture,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_texture(mut self, slot: TextureSlot, texture: Arc<Texture>) -> Self {
        self.set_texture(slot, Some(texture));
        self
    }

    pub fn get_texture_arc(&self, slot: TextureSlot) -> Option<&Arc<Texture>> {
        match slot {
            TextureSlot::Diffuse => self.diffuse_texture.as_ref(),
            TextureSlot::Normal => self.normal_texture.as_ref(),
        }
    }
}

impl MaterialView for Material {
    type Texture = Texture;

    fn get_name(&self) -> &str { &self.name }
    fn get_color(&self) -> Color { self.color }
    fn get_specular_color(&self) -> Option<Color> { self.specular_color }
    fn get_emission_color(&self) -> Option<Color> { self.emission_color }
    fn get_transparency_mode(&self) -> TransparencyMode { self.transparency_mode }

    fn get_texture(&self, slot: TextureSlot) -> Option<&Texture> {
        self.get_texture_arc(slot).map(|tex| tex.as_ref())
    }
}
