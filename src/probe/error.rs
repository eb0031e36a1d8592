use thiserror::Error;

use crate::world::SurfaceId;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("surface {0:?} does not exist")]
    MissingSurface(SurfaceId),

    #[error("surface {0:?} has no material to receive the reflection")]
    MissingMaterial(SurfaceId),

    #[error(
        "material '{material}' declares neither a main texture nor a base map"
    )]
    MissingTextureProperty { material: String },

    #[error("far clip {0} is not a positive distance")]
    InvalidFarClip(f32),

    /// The far clip does not lie past this observer's near plane.
    #[error("far clip {far} is not beyond the observer's near plane {near}")]
    FarClipBeforeNear { far: f32, near: f32 },

    #[error("failed to allocate a {width}x{height} reflection target")]
    TargetAllocation {
        width: u32,
        height: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("reflection render failed")]
    Render(#[source] anyhow::Error),
}

impl ProbeError {
    /// Configuration errors keep the probe disabled; everything else only
    /// costs the current frame.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProbeError::MissingSurface(_)
                | ProbeError::MissingMaterial(_)
                | ProbeError::MissingTextureProperty { .. }
                | ProbeError::InvalidFarClip(_)
        )
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("slot index {0} is out of range (expected 0..=3)")]
pub struct InvalidSlot(pub u8);
