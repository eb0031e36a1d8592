use std::collections::{HashMap, HashSet};

use crate::context::TargetId;

/// Texture properties a single-mirror surface receives its image through.
pub const MAIN_TEXTURE: &str = "main_texture";
pub const BASE_MAP: &str = "base_map";

/// The subset of a surface material the reflection pipeline touches:
/// shader keywords and declared texture properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: [f32; 4],
    keywords: HashSet<String>,
    textures: HashMap<String, Option<TargetId>>,
}

impl Material {
    pub fn new(name: impl Into<String>, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            color,
            keywords: HashSet::new(),
            textures: HashMap::new(),
        }
    }

    /// Declares a texture property, initially unbound.
    pub fn with_texture_property(mut self, property: &str) -> Self {
        self.textures.entry(property.to_owned()).or_insert(None);
        self
    }

    pub fn has_texture_property(&self, property: &str) -> bool {
        self.textures.contains_key(property)
    }

    /// Binds `texture` to `property` if the material declares it.
    pub fn set_texture(&mut self, property: &str, texture: TargetId) -> bool {
        match self.textures.get_mut(property) {
            Some(slot) => {
                *slot = Some(texture);
                true
            }
            None => false,
        }
    }

    pub fn texture(&self, property: &str) -> Option<TargetId> {
        self.textures.get(property).copied().flatten()
    }

    /// Clears every property bound to `texture`. The properties stay
    /// declared.
    pub fn unbind_texture(&mut self, texture: TargetId) {
        for bound in self.textures.values_mut() {
            if *bound == Some(texture) {
                *bound = None;
            }
        }
    }

    pub fn enable_keyword(&mut self, keyword: &str) {
        if !self.keywords.contains(keyword) {
            self.keywords.insert(keyword.to_owned());
        }
    }

    pub fn disable_keyword(&mut self, keyword: &str) {
        self.keywords.remove(keyword);
    }

    pub fn is_keyword_enabled(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}
