use anyhow::{bail, Result};
use slotmap::SlotMap;

use crate::context::{ProbeView, RenderBackend, TargetDescriptor, TargetId};
use crate::probe::{SlotIndex, SlotTable};
use crate::world::{CameraId, World};

pub fn camera_ids(n: usize) -> Vec<CameraId> {
    let mut ids: SlotMap<CameraId, ()> = SlotMap::with_key();
    (0..n).map(|_| ids.insert(())).collect()
}

#[derive(Debug, Clone)]
pub struct RenderCall {
    pub target: TargetId,
    pub inverted: bool,
    pub view: ProbeView,
}

/// Records every call instead of drawing.
#[derive(Default)]
pub struct MockBackend {
    targets: SlotMap<TargetId, TargetDescriptor>,
    invert: bool,
    pub created: usize,
    pub released: usize,
    pub allocation_log: Vec<(&'static str, TargetId)>,
    pub renders: Vec<RenderCall>,
    pub camera_renders: Vec<(CameraId, Vec<(SlotIndex, TargetId)>)>,
    pub fail_allocations: bool,
    pub fail_renders: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn is_live(&self, target: TargetId) -> bool {
        self.targets.contains_key(target)
    }

    pub fn size_of(&self, target: TargetId) -> Option<(u32, u32)> {
        self.targets.get(target).map(|d| (d.width, d.height))
    }
}

impl RenderBackend for MockBackend {
    fn create_target(&mut self, desc: &TargetDescriptor) -> Result<TargetId> {
        if self.fail_allocations {
            bail!("out of video memory");
        }
        let id = self.targets.insert(*desc);
        self.created += 1;
        self.allocation_log.push(("create", id));
        Ok(id)
    }

    fn release_target(&mut self, target: TargetId) {
        if self.targets.remove(target).is_some() {
            self.released += 1;
            self.allocation_log.push(("release", target));
        }
    }

    fn invert_culling(&self) -> bool {
        self.invert
    }

    fn set_invert_culling(&mut self, invert: bool) {
        self.invert = invert;
    }

    fn render_view(
        &mut self,
        _world: &World,
        view: &ProbeView,
        target: TargetId,
    ) -> Result<()> {
        self.renders.push(RenderCall {
            target,
            inverted: self.invert,
            view: *view,
        });
        if self.fail_renders {
            bail!("device lost");
        }
        if !self.targets.contains_key(target) {
            bail!("render into released target {:?}", target);
        }
        Ok(())
    }

    fn render_camera(
        &mut self,
        _world: &World,
        camera: CameraId,
        slots: &SlotTable,
    ) -> Result<()> {
        self.camera_renders.push((camera, slots.iter().collect()));
        Ok(())
    }
}
