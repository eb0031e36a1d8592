use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use super::InvalidSlot;
use crate::context::TargetId;
use crate::material::Material;

pub const SLOT_COUNT: usize = 4;

/// Mutually exclusive material keywords selecting which published slot a
/// surface samples.
pub const SLOT_KEYWORDS: [&str; SLOT_COUNT] = [
    "PLANAR_PROBE_SLOT_ONE",
    "PLANAR_PROBE_SLOT_TWO",
    "PLANAR_PROBE_SLOT_THREE",
    "PLANAR_PROBE_SLOT_FOUR",
];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotIndex(u8);

impl SlotIndex {
    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < SLOT_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn keyword(self) -> &'static str {
        SLOT_KEYWORDS[self.index()]
    }

    /// Name the slot's image is published under, numbered from 1.
    pub fn global_name(self) -> String {
        format!("planar_reflections_tex_{}", self.0 + 1)
    }

    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT as u8).map(SlotIndex)
    }
}

impl Default for SlotIndex {
    fn default() -> Self {
        SlotIndex(0)
    }
}

impl TryFrom<u8> for SlotIndex {
    type Error = InvalidSlot;

    fn try_from(index: u8) -> Result<Self, InvalidSlot> {
        SlotIndex::new(index).ok_or(InvalidSlot(index))
    }
}

impl From<SlotIndex> for u8 {
    fn from(slot: SlotIndex) -> u8 {
        slot.0
    }
}

/// The images published by probes this frame, one per slot. Written in
/// the pre-camera hook and read by the observer's own pass right after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotTable {
    images: [Option<TargetId>; SLOT_COUNT],
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, slot: SlotIndex, image: TargetId) {
        self.images[slot.index()] = Some(image);
    }

    pub fn get(&self, slot: SlotIndex) -> Option<TargetId> {
        self.images[slot.index()]
    }

    /// Drops every slot still pointing at `image`.
    pub fn retract(&mut self, image: TargetId) {
        for published in self.images.iter_mut() {
            if *published == Some(image) {
                *published = None;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, TargetId)> + '_ {
        SlotIndex::all()
            .filter_map(move |slot| self.get(slot).map(|i| (slot, i)))
    }
}

/// Makes `material` sample `slot`: enables that slot's keyword and clears
/// the other three. Returns false if it was already bound that way.
pub fn bind(material: &mut Material, slot: SlotIndex) -> bool {
    if bound_slot(material) == Some(slot) {
        return false;
    }

    for other in SlotIndex::all() {
        if other == slot {
            material.enable_keyword(other.keyword());
        } else {
            material.disable_keyword(other.keyword());
        }
    }
    true
}

/// The slot `material` samples, if exactly one slot keyword is set.
pub fn bound_slot(material: &Material) -> Option<SlotIndex> {
    let mut enabled = SlotIndex::all()
        .filter(|s| material.is_keyword_enabled(s.keyword()));
    match (enabled.next(), enabled.next()) {
        (Some(slot), None) => Some(slot),
        _ => None,
    }
}
