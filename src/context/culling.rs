use std::ops::{Deref, DerefMut};

use super::RenderBackend;

/// Swaps front and back face culling on `backend` until dropped.
///
/// Drop restores the previous state, so an early return or a failed
/// render inside the scope cannot leave later draws inverted.
pub struct InvertedCulling<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    previous: bool,
}

impl<'a, B: RenderBackend + ?Sized> InvertedCulling<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        let previous = backend.invert_culling();
        backend.set_invert_culling(!previous);
        Self { backend, previous }
    }
}

impl<'a, B: RenderBackend + ?Sized> Deref for InvertedCulling<'a, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<'a, B: RenderBackend + ?Sized> DerefMut for InvertedCulling<'a, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<'a, B: RenderBackend + ?Sized> Drop for InvertedCulling<'a, B> {
    fn drop(&mut self) {
        self.backend.set_invert_culling(self.previous);
    }
}
