//! Errors produced when building or querying composite elements.
use crate::element::{EntityCategory, MeshType};
use std::error::Error;
use std::fmt;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeElementError {
    /// A composite element must consist of at least one field.
    NoFields,
    /// The field at the given index does not live on the same kind of mesh as the first field.
    IncompatibleElements {
        field: usize,
        expected: MeshType,
        found: MeshType,
    },
    /// A basis function index outside `0 .. num_basis_functions` was requested.
    IndexOutOfRange { index: usize, num_basis_functions: usize },
    /// The basis function count of a field in the given category cannot be laid out
    /// as a whole number of entities shared with the other fields.
    InconsistentBasisCounts {
        field: usize,
        category: EntityCategory,
        expected: usize,
        actual: usize,
    },
    /// The field reports fewer dof names than its per-entity dof counts require.
    MissingDofNames { field: usize, expected: usize, actual: usize },
    /// The field reports fewer dof locations than it has basis functions.
    MissingDofLocations { field: usize, expected: usize, actual: usize },
}

impl Display for CompositeElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFields => write!(f, "Composite element requires at least one field."),
            Self::IncompatibleElements {
                field,
                expected,
                found,
            } => write!(
                f,
                "Elements are incompatible: field {} has mesh type {:?}, expected {:?}.",
                field, found, expected
            ),
            Self::IndexOutOfRange {
                index,
                num_basis_functions,
            } => write!(
                f,
                "Basis function index {} is out of range for composite element with {} basis functions.",
                index, num_basis_functions
            ),
            Self::InconsistentBasisCounts {
                field,
                category,
                expected,
                actual,
            } => write!(
                f,
                "Field {} has {} basis functions in category {:?}, but the shared entity layout implies {}.",
                field, actual, category, expected
            ),
            Self::MissingDofNames {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Field {} provides {} dof names, but its dof counts require {}.",
                field, actual, expected
            ),
            Self::MissingDofLocations {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Field {} provides {} dof locations, but has {} basis functions.",
                field, actual, expected
            ),
        }
    }
}

impl Error for CompositeElementError {}
