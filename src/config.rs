use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::probe::{ProbeConfig, ProbeId, ProbeOutput, ProbeSystem, SlotIndex};
use crate::world::World;

/// One probe of a demo scene, attached to a surface by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeEntry {
    pub surface: String,
    #[serde(default)]
    pub config: ProbeConfig,
}

/// Settings for the headless demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    /// Seconds advanced per frame.
    pub frame_time: f32,
    pub seed: u64,
    pub cubes: u32,
    /// Rotation of the mirror stage, in degrees per second.
    pub stage_spin: f32,
    pub probes: Vec<ProbeEntry>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            width: 800,
            height: 600,
            frame_time: 1.0 / 60.0,
            seed: 0,
            cubes: 8,
            stage_spin: 20.0,
            probes: vec![
                ProbeEntry {
                    surface: "mirror".to_owned(),
                    config: ProbeConfig::default(),
                },
                ProbeEntry {
                    surface: "floor".to_owned(),
                    config: ProbeConfig {
                        quality: 0.5,
                        output: ProbeOutput::GlobalSlot(
                            SlotIndex::new(1).unwrap_or_default(),
                        ),
                        ..Default::default()
                    },
                },
            ],
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Registers and enables every configured probe. A probe whose surface
    /// does not exist is an error; one that fails validation is logged
    /// and left disabled.
    pub fn attach_probes(
        &self,
        world: &mut World,
        probes: &mut ProbeSystem,
    ) -> Result<Vec<ProbeId>> {
        let mut ids = Vec::with_capacity(self.probes.len());
        for entry in self.probes.iter() {
            let surface = world
                .surface_by_name(&entry.surface)
                .ok_or_else(|| {
                    anyhow!("no surface named '{}'", entry.surface)
                })?;
            let id = probes.add_probe(surface, entry.config.clone());
            if probes.enable(id, world).is_ok() {
                log::info!("probe {:?} attached to '{}'", id, entry.surface);
            }
            ids.push(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::transform::Transform;
    use crate::world::{Shape, Surface};

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SceneConfig = serde_json::from_str(
            r#"{
                "frames": 3,
                "probes": [
                    { "surface": "mirror", "config": { "quality": 0.25 } },
                    { "surface": "floor" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.frames, 3);
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.probes.len(), 2);
        assert_eq!(config.probes[0].config.quality, 0.25);
        assert_eq!(config.probes[1].config, ProbeConfig::default());
    }

    #[test]
    fn attaches_by_surface_name() {
        let mut world = World::new();
        world.add_surface(
            Surface::new(
                "mirror",
                Transform::default(),
                Shape::Quad {
                    half_width: 1.0,
                    half_height: 1.0,
                },
            )
            .with_material(Material::new("mirror", [1.0; 4])),
        );
        let mut probes = ProbeSystem::new();

        let mut config = SceneConfig::default();
        config.probes.truncate(1);
        let ids = config.attach_probes(&mut world, &mut probes).unwrap();
        assert_eq!(ids.len(), 1);
        assert!(probes.probe(ids[0]).unwrap().is_enabled());

        let missing =
            SceneConfig::default().attach_probes(&mut world, &mut probes);
        assert!(missing.is_err());
    }
}
