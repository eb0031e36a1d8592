use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use super::{
    bind, resolve_plane, ProbeConfig, ProbeError, ProbeOutput,
    RenderTargetCache, SlotIndex, SlotTable,
};
use crate::alg::Plane;
use crate::camera::{build_mirrored_pose, Camera, CameraKind, ClearMode, Skybox};
use crate::context::{InvertedCulling, ProbeView, RenderBackend, TargetId};
use crate::material::{BASE_MAP, MAIN_TEXTURE};
use crate::world::{CameraId, SurfaceId, World};

new_key_type! {
    pub struct ProbeId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The camera belongs to a probe; rendering it would recurse.
    ReflectionCamera,
    EditorCamera,
    IgnoredCamera,
    /// No such camera, or it is disabled this frame.
    NoObserver,
    /// The camera has no pixels, e.g. a minimized window.
    EmptyObserver,
    /// The mirror surface is gone.
    NoSurface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Skipped(SkipReason),
    Rendered {
        target: TargetId,
        width: u32,
        height: u32,
    },
}

/// A planar mirror attached to one surface.
pub struct Probe {
    pub config: ProbeConfig,
    surface: SurfaceId,
    enabled: bool,
    targets: RenderTargetCache,
    ignored: SmallVec<[CameraId; 4]>,
    plane: Option<Plane>,
    warned_degenerate: bool,
}

impl Probe {
    pub fn new(surface: SurfaceId, config: ProbeConfig) -> Self {
        Self {
            config,
            surface,
            enabled: false,
            targets: RenderTargetCache::new(),
            ignored: SmallVec::new(),
            plane: None,
            warned_degenerate: false,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The plane used for the most recent render.
    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    pub fn targets(&self) -> &RenderTargetCache {
        &self.targets
    }

    pub fn ignore_camera(&mut self, camera: CameraId) {
        if !self.ignored.contains(&camera) {
            self.ignored.push(camera);
        }
    }

    pub fn unignore_camera(&mut self, camera: CameraId) {
        self.ignored.retain(|c| *c != camera);
    }

    pub fn clear_ignored(&mut self) {
        self.ignored.clear();
    }

    pub fn is_ignoring(&self, camera: CameraId) -> bool {
        self.ignored.contains(&camera)
    }

    pub fn slot(&self) -> Option<SlotIndex> {
        match self.config.output {
            ProbeOutput::GlobalSlot(slot) => Some(slot),
            ProbeOutput::SurfaceMaterial => None,
        }
    }

    fn skip_reason(&self, id: CameraId, camera: &Camera) -> Option<SkipReason> {
        match camera.kind {
            CameraKind::Reflection => Some(SkipReason::ReflectionCamera),
            CameraKind::SceneView if !self.config.render_in_editor => {
                Some(SkipReason::EditorCamera)
            }
            _ if self.is_ignoring(id) => Some(SkipReason::IgnoredCamera),
            _ => None,
        }
    }

    fn view_settings(&self, camera: &Camera) -> (ClearMode, Option<Skybox>) {
        if self.config.render_background {
            (camera.clear, camera.skybox)
        } else {
            (ClearMode::Nothing, None)
        }
    }

    fn refresh_plane(&mut self, id: ProbeId, world: &World) -> Option<Plane> {
        let surface = world.surfaces.get(self.surface)?;
        let (plane, degenerate) =
            resolve_plane(&self.config.normal, &surface.transform);
        if degenerate && !self.warned_degenerate {
            log::warn!(
                "probe {:?}: normal of '{}' is degenerate, using world up",
                id,
                surface.name
            );
            self.warned_degenerate = true;
        }
        self.plane = Some(plane);
        Some(plane)
    }

    fn render<B: RenderBackend + ?Sized>(
        &mut self,
        id: ProbeId,
        camera_id: CameraId,
        world: &mut World,
        backend: &mut B,
        slots: &mut SlotTable,
    ) -> Result<RenderOutcome, ProbeError> {
        let camera = match world.cameras.get(camera_id) {
            Some(camera) if camera.enabled => camera,
            _ => return Ok(RenderOutcome::Skipped(SkipReason::NoObserver)),
        };
        if let Some(reason) = self.skip_reason(camera_id, camera) {
            return Ok(RenderOutcome::Skipped(reason));
        }
        if camera.pixel_width == 0 || camera.pixel_height == 0 {
            return Ok(RenderOutcome::Skipped(SkipReason::EmptyObserver));
        }
        let far = self.config.far_clip;
        if !far.is_finite() || far <= camera.near {
            return Err(ProbeError::FarClipBeforeNear {
                far,
                near: camera.near,
            });
        }
        let observer = camera.pose().with_far(far);
        let (clear, skybox) = self.view_settings(camera);

        let plane = match self.refresh_plane(id, world) {
            Some(plane) => plane,
            None => return Ok(RenderOutcome::Skipped(SkipReason::NoSurface)),
        };

        let pose = build_mirrored_pose(&observer, &plane);

        let (width, height) = self
            .config
            .target_size(observer.pixel_width, observer.pixel_height);
        let entry = self.targets.acquire(backend, camera_id, width, height)?;

        let view = ProbeView {
            pose,
            clear,
            skybox,
        };
        {
            let mut inverted = InvertedCulling::new(backend);
            inverted
                .render_view(world, &view, entry.target)
                .map_err(ProbeError::Render)?;
        }

        self.publish(entry.target, world, slots);

        Ok(RenderOutcome::Rendered {
            target: entry.target,
            width,
            height,
        })
    }

    /// Undoes `publish` for a target that is about to disappear.
    fn retract(
        &self,
        image: TargetId,
        world: &mut World,
        slots: &mut SlotTable,
    ) {
        slots.retract(image);
        let material = world
            .surfaces
            .get_mut(self.surface)
            .and_then(|s| s.material.as_mut());
        if let Some(material) = material {
            material.unbind_texture(image);
        }
    }

    fn publish(
        &self,
        image: TargetId,
        world: &mut World,
        slots: &mut SlotTable,
    ) {
        match self.config.output {
            ProbeOutput::GlobalSlot(slot) => slots.publish(slot, image),
            ProbeOutput::SurfaceMaterial => {
                let material = world
                    .surfaces
                    .get_mut(self.surface)
                    .and_then(|s| s.material.as_mut());
                if let Some(material) = material {
                    material.set_texture(MAIN_TEXTURE, image);
                    material.set_texture(BASE_MAP, image);
                }
            }
        }
    }
}

/// All mirror probes in a scene, driven from the pipeline's pre-camera
/// hook.
#[derive(Default)]
pub struct ProbeSystem {
    probes: SlotMap<ProbeId, Probe>,
}

impl ProbeSystem {
    pub fn new() -> Self {
        Self {
            probes: SlotMap::with_key(),
        }
    }

    /// Registers a probe. It does nothing until enabled.
    pub fn add_probe(
        &mut self,
        surface: SurfaceId,
        config: ProbeConfig,
    ) -> ProbeId {
        self.probes.insert(Probe::new(surface, config))
    }

    pub fn probe(&self, id: ProbeId) -> Option<&Probe> {
        self.probes.get(id)
    }

    pub fn probe_mut(&mut self, id: ProbeId) -> Option<&mut Probe> {
        self.probes.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProbeId, &Probe)> {
        self.probes.iter()
    }

    /// Checks the probe's surface and material and hooks it into camera
    /// rendering. A configuration error leaves the probe disabled.
    pub fn enable(
        &mut self,
        id: ProbeId,
        world: &mut World,
    ) -> Result<(), ProbeError> {
        let probe = match self.probes.get_mut(id) {
            Some(probe) => probe,
            None => return Ok(()),
        };
        if probe.enabled {
            return Ok(());
        }

        if let Err(e) = validate(probe, world) {
            log::error!("probe {:?} disabled: {}", id, e);
            return Err(e);
        }

        probe.enabled = true;
        log::debug!("probe {:?} enabled", id);
        Ok(())
    }

    /// Unhooks the probe and frees every target it holds. Nothing keeps
    /// pointing at a freed target afterwards.
    pub fn disable<B: RenderBackend + ?Sized>(
        &mut self,
        id: ProbeId,
        world: &mut World,
        backend: &mut B,
        slots: &mut SlotTable,
    ) {
        let probe = match self.probes.get_mut(id) {
            Some(probe) => probe,
            None => return,
        };
        probe.enabled = false;
        for target in probe.targets.release_all(backend) {
            probe.retract(target, world, slots);
        }
        log::debug!("probe {:?} disabled", id);
    }

    pub fn remove_probe<B: RenderBackend + ?Sized>(
        &mut self,
        id: ProbeId,
        world: &mut World,
        backend: &mut B,
        slots: &mut SlotTable,
    ) -> Option<Probe> {
        self.disable(id, world, backend, slots);
        self.probes.remove(id)
    }

    /// Frees the targets every probe holds for `camera`, e.g. when the
    /// camera is removed from the scene.
    pub fn forget_camera<B: RenderBackend + ?Sized>(
        &mut self,
        camera: CameraId,
        world: &mut World,
        backend: &mut B,
        slots: &mut SlotTable,
    ) {
        for (_, probe) in self.probes.iter_mut() {
            if let Some(target) = probe.targets.release(backend, camera) {
                probe.retract(target, world, slots);
            }
            probe.unignore_camera(camera);
        }
    }

    pub fn probes_rendering_to(
        &self,
        slot: SlotIndex,
    ) -> impl Iterator<Item = ProbeId> + '_ {
        self.probes
            .iter()
            .filter(move |(_, p)| p.slot() == Some(slot))
            .map(|(id, _)| id)
    }

    pub fn probe_rendering_to(&self, slot: SlotIndex) -> Option<ProbeId> {
        self.probes_rendering_to(slot).next()
    }

    /// The pre-camera hook: renders every enabled probe for `camera`.
    ///
    /// A probe that fails is logged and skipped for this frame only; the
    /// others still render.
    pub fn before_camera_render<B: RenderBackend + ?Sized>(
        &mut self,
        camera: CameraId,
        world: &mut World,
        backend: &mut B,
        slots: &mut SlotTable,
    ) -> Vec<(ProbeId, Result<RenderOutcome, ProbeError>)> {
        let mut outcomes = Vec::new();
        for (id, probe) in self.probes.iter_mut() {
            if !probe.enabled {
                continue;
            }
            let result = probe.render(id, camera, world, backend, slots);
            match &result {
                Ok(RenderOutcome::Rendered {
                    target,
                    width,
                    height,
                }) => log::trace!(
                    "probe {:?} rendered {:?} ({}x{}) for {:?}",
                    id,
                    target,
                    width,
                    height,
                    camera
                ),
                Ok(RenderOutcome::Skipped(reason)) => log::trace!(
                    "probe {:?} skipped {:?}: {:?}",
                    id,
                    camera,
                    reason
                ),
                Err(e) => log::warn!(
                    "probe {:?} skipped this frame for {:?}: {}",
                    id,
                    camera,
                    e
                ),
            }
            outcomes.push((id, result));
        }
        outcomes
    }
}

fn validate(probe: &Probe, world: &mut World) -> Result<(), ProbeError> {
    let far = probe.config.far_clip;
    if !far.is_finite() || far <= 0.0 {
        return Err(ProbeError::InvalidFarClip(far));
    }

    let surface = world
        .surfaces
        .get_mut(probe.surface)
        .ok_or(ProbeError::MissingSurface(probe.surface))?;

    match probe.config.output {
        ProbeOutput::SurfaceMaterial => {
            let material = surface
                .material
                .as_ref()
                .ok_or(ProbeError::MissingMaterial(probe.surface))?;
            if !material.has_texture_property(MAIN_TEXTURE)
                && !material.has_texture_property(BASE_MAP)
            {
                return Err(ProbeError::MissingTextureProperty {
                    material: material.name.clone(),
                });
            }
        }
        ProbeOutput::GlobalSlot(slot) => {
            // A bare anchor surface is fine; only a visible one needs its
            // keyword set.
            if let Some(material) = surface.material.as_mut() {
                bind(material, slot);
            }
        }
    }
    Ok(())
}
