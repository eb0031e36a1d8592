use serde::{Deserialize, Serialize};

use super::SlotIndex;

pub const DEFAULT_SQUARE_RESOLUTION: u32 = 1024;
pub const MIN_QUALITY: f32 = 0.01;
pub const DEFAULT_FAR_CLIP: f32 = 1000.0;

/// Which local axis of the mirror surface is its normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Local +Z.
    Forward,
    /// Local +Y.
    Up,
    /// Local +X.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NormalSource {
    /// The surface's own axis, following its rotation.
    TransformAxis(Axis),
    /// A world-space direction: `axis` as a world axis, rotated by Euler
    /// angles in degrees (applied about Z, then X, then Y). Angles are
    /// clamped to [-180, 180].
    AnglesDeg {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
        #[serde(default = "default_axis")]
        axis: Axis,
    },
    /// A world-space direction, normalized on read.
    RawVector { x: f32, y: f32, z: f32 },
}

fn default_axis() -> Axis {
    Axis::Forward
}

impl Default for NormalSource {
    fn default() -> Self {
        NormalSource::TransformAxis(Axis::Forward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetResolution {
    /// Follow the observer's pixel size.
    Observer,
    /// Fixed square target, independent of the observer.
    Square(u32),
}

impl Default for TargetResolution {
    fn default() -> Self {
        TargetResolution::Observer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutput {
    /// Publish into one of the global slots; the surface material is bound
    /// to the slot's keyword at enable time.
    GlobalSlot(SlotIndex),
    /// Write straight into the surface material's main texture and base
    /// map properties.
    SurfaceMaterial,
}

impl Default for ProbeOutput {
    fn default() -> Self {
        ProbeOutput::GlobalSlot(SlotIndex::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub normal: NormalSource,
    pub resolution: TargetResolution,
    /// Fraction of the resolution actually rendered, in (0, 1].
    pub quality: f32,
    pub far_clip: f32,
    /// Copy the observer's clear mode and skybox; otherwise clear nothing.
    pub render_background: bool,
    /// Also serve editor scene-view cameras.
    pub render_in_editor: bool,
    pub output: ProbeOutput,
}

impl ProbeConfig {
    pub fn quality(&self) -> f32 {
        if self.quality.is_finite() {
            self.quality.max(MIN_QUALITY).min(1.0)
        } else {
            1.0
        }
    }

    /// Target size for an observer of `pixel_width x pixel_height`,
    /// scaled by quality and floored. Never zero.
    pub fn target_size(
        &self,
        pixel_width: u32,
        pixel_height: u32,
    ) -> (u32, u32) {
        let (width, height) = match self.resolution {
            TargetResolution::Observer => (pixel_width, pixel_height),
            TargetResolution::Square(edge) => (edge, edge),
        };
        let quality = self.quality();
        let scale = |n: u32| ((n as f32 * quality).floor() as u32).max(1);
        (scale(width), scale(height))
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            normal: NormalSource::default(),
            resolution: TargetResolution::default(),
            quality: 1.0,
            far_clip: DEFAULT_FAR_CLIP,
            render_background: true,
            render_in_editor: false,
            output: ProbeOutput::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_quality_halves_observer_size() {
        let config = ProbeConfig {
            quality: 0.5,
            ..Default::default()
        };
        assert_eq!(config.target_size(800, 600), (400, 300));
    }

    #[test]
    fn quality_is_clamped() {
        let mut config = ProbeConfig::default();
        config.quality = 4.0;
        assert_eq!(config.target_size(640, 480), (640, 480));
        config.quality = 0.0;
        assert_eq!(config.quality(), MIN_QUALITY);
        assert_eq!(config.target_size(10, 10), (1, 1));
        config.quality = f32::NAN;
        assert_eq!(config.quality(), 1.0);
    }

    #[test]
    fn square_resolution_ignores_observer() {
        let config = ProbeConfig {
            resolution: TargetResolution::Square(DEFAULT_SQUARE_RESOLUTION),
            quality: 0.25,
            ..Default::default()
        };
        assert_eq!(config.target_size(1920, 1080), (256, 256));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ProbeConfig = serde_json::from_str(
            r#"{
                "normal": { "AnglesDeg": { "z": -90.0, "axis": "Up" } },
                "quality": 0.5,
                "output": { "GlobalSlot": 2 }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.normal,
            NormalSource::AnglesDeg {
                x: 0.0,
                y: 0.0,
                z: -90.0,
                axis: Axis::Up
            }
        );
        assert_eq!(config.far_clip, DEFAULT_FAR_CLIP);
        assert!(config.render_background);
        assert_eq!(
            config.output,
            ProbeOutput::GlobalSlot(SlotIndex::new(2).unwrap())
        );
    }

    #[test]
    fn rejects_out_of_range_slot() {
        let result: Result<ProbeConfig, _> =
            serde_json::from_str(r#"{ "output": { "GlobalSlot": 4 } }"#);
        assert!(result.is_err());
    }
}
