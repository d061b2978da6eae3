use std::ops::{Deref, DerefMut};

use crate::format::MAX_COMPONENTS;

/// Fixed-capacity storage for the components of one attribute value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentArray<T> {
    values: [T; MAX_COMPONENTS],
    len: u8,
}

impl<T: Copy + Default> ComponentArray<T> {
    /// Construct an array of `len` components, each produced by `f`.
    ///
    /// # Panics
    ///
    /// * `len` > [MAX_COMPONENTS]
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> T) -> Self {
        assert!(len <= MAX_COMPONENTS);
        let mut values = [T::default(); MAX_COMPONENTS];
        for (i, v) in values.iter_mut().enumerate().take(len) {
            *v = f(i);
        }
        Self {
            values,
            len: len as u8,
        }
    }

    /// # Panics
    ///
    /// * `slice.len()` > [MAX_COMPONENTS]
    #[inline]
    pub fn from_slice(slice: &[T]) -> Self {
        Self::from_fn(slice.len(), |i| slice[i])
    }
}

impl<T> Deref for ComponentArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.values[..self.len as usize]
    }
}

impl<T> DerefMut for ComponentArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.values[..self.len as usize]
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ComponentArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
