//! Composite finite elements.
//!
//! A [`CompositeElement`](composite::CompositeElement) combines an ordered collection of
//! (typically scalar) field elements into a single multi-field element, for example
//! to build a mixed velocity-pressure space from separate scalar bases. The degrees of freedom
//! of the fields are concatenated in a mesh-consistent order: grouped by entity category
//! (node, edge, facet, interior) and, within each entity, by field.
use nalgebra::{DimMin, DimName, RealField};

pub mod allocators;
pub mod composite;
pub mod element;
pub mod error;
pub mod mapping;

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub extern crate nalgebra;

/// Scalar types supported by the elements in this crate.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// A small, fixed-size dimension.
///
/// Used as a trait alias for various traits frequently needed by generic routines.
pub trait SmallDim: DimName + DimMin<Self, Output = Self> {}

impl<D> SmallDim for D where D: DimName + DimMin<Self, Output = Self> {}
