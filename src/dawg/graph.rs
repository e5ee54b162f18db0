//! Immutable DAWG handed from the builder to the double-array builder.

use super::bit_vector::BitVector;
use super::unit::DawgUnit;
use crate::error::{Error, Result};

pub struct Graph {
    pub(super) units: Vec<DawgUnit>,
    pub(super) labels: Vec<u8>,
    pub(super) is_intersections: BitVector,
}

impl Graph {
    pub fn root() -> u32 {
        0
    }

    pub fn size(&self) -> usize {
        self.units.len()
    }

    pub fn child(&self, id: u32) -> Result<u32> {
        self.units
            .get(id as usize)
            .map(|u| u.child())
            .ok_or(Error::IndexOutOfBounds)
    }

    pub fn sibling(&self, id: u32) -> Result<u32> {
        let unit = self.units.get(id as usize).ok_or(Error::IndexOutOfBounds)?;
        Ok(if unit.has_sibling() { id + 1 } else { 0 })
    }

    pub fn value(&self, id: u32) -> Result<u32> {
        self.units
            .get(id as usize)
            .map(|u| u.value())
            .ok_or(Error::IndexOutOfBounds)
    }

    pub fn label(&self, id: u32) -> Result<u8> {
        self.labels
            .get(id as usize)
            .copied()
            .ok_or(Error::IndexOutOfBounds)
    }

    pub fn is_leaf(&self, id: u32) -> Result<bool> {
        Ok(self.label(id)? == 0)
    }

    pub fn is_intersection(&self, id: u32) -> Result<bool> {
        self.is_intersections.get(id as usize)
    }

    /// Dense intersection-id namespace, derived from the bit vector's
    /// rank. `rank` counts the marked unit itself, so subtract one.
    pub fn intersection_id(&self, id: u32) -> Result<usize> {
        Ok(self.is_intersections.rank(id as usize)? as usize - 1)
    }

    pub fn num_intersections(&self) -> usize {
        self.is_intersections.num_ones() as usize
    }
}
