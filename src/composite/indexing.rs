//! Mapping between composite basis function indices and field-local indices.
use itertools::izip;
use serde::{Deserialize, Serialize};

use crate::element::{DofCounts, EntityCategory};
use crate::error::CompositeElementError;

/// Identifies a basis function of a single field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasisIndex {
    /// The index of the field that owns the basis function.
    pub field: usize,
    /// The index of the basis function among the basis functions of the owning field.
    pub local: usize,
}

/// A bijection between composite basis function indices and `(field, local index)` pairs.
///
/// Composite basis functions are grouped by entity category in the order
/// node, edge, facet, interior. Within a category, the basis functions of each entity are
/// listed field by field, each field contributing as many consecutive basis functions as it has
/// degrees of freedom per entity of that category. This pattern is repeated for every entity.
/// Local indices are assigned to the basis functions of each field in increasing global order,
/// which reproduces the field's own basis function ordering.
///
/// For example, two fields with one degree of freedom per node on a cell with four nodes
/// give the owners `[0, 1, 0, 1, 0, 1, 0, 1]` and local indices `[0, 0, 1, 1, 2, 2, 3, 3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisIndexMap {
    owners: Vec<usize>,
    local_indices: Vec<usize>,
    /// Offsets into `global_indices` for each field, with a trailing total.
    field_offsets: Vec<usize>,
    global_indices: Vec<usize>,
}

impl BasisIndexMap {
    /// Builds the index map from the per-entity dof counts and the basis function counts of
    /// each field.
    ///
    /// Returns an error if the basis function count of a field in some category is not the
    /// number of shared entities of that category times the field's per-entity dof count.
    ///
    /// # Panics
    ///
    /// Panics if `dof_counts` and `basis_counts` have different lengths.
    pub fn from_counts(dof_counts: &[DofCounts], basis_counts: &[DofCounts]) -> Result<Self, CompositeElementError> {
        assert_eq!(
            dof_counts.len(),
            basis_counts.len(),
            "Must provide dof counts and basis function counts for every field"
        );
        let num_fields = dof_counts.len();

        let mut owners = Vec::new();
        for category in EntityCategory::ALL {
            let category_total: usize = basis_counts.iter().map(|counts| counts[category]).sum();
            if category_total == 0 {
                continue;
            }

            // The owners of the basis functions belonging to a single entity
            let entity_pattern: Vec<usize> = dof_counts
                .iter()
                .enumerate()
                .flat_map(|(field, counts)| std::iter::repeat(field).take(counts[category]))
                .collect();
            let num_entities = match entity_pattern.len() {
                0 => 0,
                n => category_total / n,
            };

            for (field, dofs, basis) in izip!(0.., dof_counts, basis_counts) {
                let expected = dofs[category] * num_entities;
                if basis[category] != expected {
                    return Err(CompositeElementError::InconsistentBasisCounts {
                        field,
                        category,
                        expected,
                        actual: basis[category],
                    });
                }
            }

            for _ in 0..num_entities {
                owners.extend_from_slice(&entity_pattern);
            }
        }

        let mut counters = vec![0; num_fields];
        let local_indices: Vec<usize> = owners
            .iter()
            .map(|&field| {
                let local = counters[field];
                counters[field] += 1;
                local
            })
            .collect();

        let mut field_offsets = Vec::with_capacity(num_fields + 1);
        field_offsets.push(0);
        for count in &counters {
            let offset = field_offsets.last().copied().unwrap_or(0);
            field_offsets.push(offset + count);
        }

        let mut global_indices = vec![0; owners.len()];
        for (global, &field, &local) in izip!(0.., &owners, &local_indices) {
            global_indices[field_offsets[field] + local] = global;
        }

        Ok(Self {
            owners,
            local_indices,
            field_offsets,
            global_indices,
        })
    }

    /// The total number of composite basis functions.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn num_fields(&self) -> usize {
        self.field_offsets.len() - 1
    }

    /// The number of basis functions owned by the given field.
    pub fn num_field_basis_functions(&self, field: usize) -> usize {
        match (self.field_offsets.get(field), self.field_offsets.get(field + 1)) {
            (Some(begin), Some(end)) => end - begin,
            _ => 0,
        }
    }

    /// Finds the owning field and local index of the composite basis function `index`.
    pub fn resolve(&self, index: usize) -> Result<BasisIndex, CompositeElementError> {
        match (self.owners.get(index), self.local_indices.get(index)) {
            (Some(&field), Some(&local)) => Ok(BasisIndex { field, local }),
            _ => Err(CompositeElementError::IndexOutOfRange {
                index,
                num_basis_functions: self.len(),
            }),
        }
    }

    /// The composite index of the given field-local basis function, if it exists.
    pub fn global_index(&self, field: usize, local: usize) -> Option<usize> {
        if local < self.num_field_basis_functions(field) {
            self.global_indices
                .get(self.field_offsets[field] + local)
                .copied()
        } else {
            None
        }
    }

    /// The owning field of each composite basis function.
    pub fn owners(&self) -> &[usize] {
        &self.owners
    }

    /// The field-local index of each composite basis function.
    pub fn local_indices(&self) -> &[usize] {
        &self.local_indices
    }

    /// Iterates over the resolved indices of all composite basis functions, in order.
    pub fn iter(&self) -> impl Iterator<Item = BasisIndex> + '_ {
        izip!(&self.owners, &self.local_indices).map(|(&field, &local)| BasisIndex { field, local })
    }
}
