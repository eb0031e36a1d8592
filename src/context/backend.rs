use anyhow::Result;
use slotmap::new_key_type;

use crate::camera::{ClearMode, MirroredPose, Skybox};
use crate::probe::SlotTable;
use crate::world::{CameraId, World};

new_key_type! {
    /// An off-screen color + depth target owned by a backend.
    pub struct TargetId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
}

impl TargetDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Everything a backend needs to draw the scene from a mirror probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeView {
    pub pose: MirroredPose,
    pub clear: ClearMode,
    pub skybox: Option<Skybox>,
}

/// The rendering pipeline a probe plugs into.
///
/// All calls happen on the render thread, from inside the pre-camera
/// hook, so a target rendered here is complete before the observer's own
/// pass samples it.
pub trait RenderBackend {
    fn create_target(&mut self, desc: &TargetDescriptor) -> Result<TargetId>;

    /// Frees the target. Releasing an unknown id is a no-op.
    fn release_target(&mut self, target: TargetId);

    /// Global front/back face swap, applied to every draw while set.
    fn invert_culling(&self) -> bool;
    fn set_invert_culling(&mut self, invert: bool);

    /// Draws `world` from `view` into `target`.
    fn render_view(
        &mut self,
        world: &World,
        view: &ProbeView,
        target: TargetId,
    ) -> Result<()>;

    /// Draws the observer camera itself, sampling whatever the probes
    /// published this frame.
    fn render_camera(
        &mut self,
        world: &World,
        camera: CameraId,
        slots: &SlotTable,
    ) -> Result<()>;
}
