use slotmap::SecondaryMap;

use super::ProbeError;
use crate::context::{RenderBackend, TargetDescriptor, TargetId};
use crate::world::CameraId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetEntry {
    pub owner: CameraId,
    pub target: TargetId,
    pub width: u32,
    pub height: u32,
}

/// One off-screen target per observer a probe has served. At most one
/// live target exists per observer; a resize releases the old target
/// before allocating its replacement.
#[derive(Debug, Default)]
pub struct RenderTargetCache {
    entries: SecondaryMap<CameraId, RenderTargetEntry>,
}

impl RenderTargetCache {
    pub fn new() -> Self {
        Self {
            entries: SecondaryMap::new(),
        }
    }

    pub fn acquire<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        owner: CameraId,
        width: u32,
        height: u32,
    ) -> Result<RenderTargetEntry, ProbeError> {
        if let Some(entry) = self.entries.get(owner) {
            if entry.width == width && entry.height == height {
                return Ok(*entry);
            }
        }

        if let Some(stale) = self.entries.remove(owner) {
            log::debug!(
                "resizing reflection target for {:?}: {}x{} -> {}x{}",
                owner,
                stale.width,
                stale.height,
                width,
                height
            );
            backend.release_target(stale.target);
        }

        let target = backend
            .create_target(&TargetDescriptor::new(width, height))
            .map_err(|source| ProbeError::TargetAllocation {
                width,
                height,
                source,
            })?;

        let entry = RenderTargetEntry {
            owner,
            target,
            width,
            height,
        };
        self.entries.insert(owner, entry);
        Ok(entry)
    }

    pub fn get(&self, owner: CameraId) -> Option<&RenderTargetEntry> {
        self.entries.get(owner)
    }

    pub fn release<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        owner: CameraId,
    ) -> Option<TargetId> {
        let entry = self.entries.remove(owner)?;
        backend.release_target(entry.target);
        Some(entry.target)
    }

    /// Releases every target, returning the ids that were freed.
    pub fn release_all<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Vec<TargetId> {
        let released: Vec<TargetId> =
            self.entries.values().map(|entry| entry.target).collect();
        for target in released.iter() {
            backend.release_target(*target);
        }
        self.entries.clear();
        released
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderTargetEntry> {
        self.entries.values()
    }
}
