//! Composite elements built from an ordered collection of field elements.
use std::fmt;
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::allocators::DimAllocator;
use crate::element::{DofCounts, DofLayout, EntityCategory, FieldElement, FieldValues, MeshType, ReferenceMapping};
use crate::error::CompositeElementError;
use crate::nalgebra::{DefaultAllocator, OPoint};
use crate::{Real, SmallDim};

mod indexing;

pub use indexing::*;

/// A field element that can be shared between composite elements and threads.
pub type SharedFieldElement<T, D> = Arc<dyn FieldElement<T, D> + Send + Sync>;

/// A multi-field element whose basis functions are the basis functions of its fields,
/// each embedded in its own field slot.
///
/// The degrees of freedom of the fields are concatenated category by category
/// (node, edge, facet, interior), and within each entity field by field. See [`BasisIndexMap`]
/// for the precise ordering. Composite basis function `i` is non-zero only in the slot of
/// the field that owns it.
///
/// All derived data is computed once on construction.
pub struct CompositeElement<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fields: Vec<SharedFieldElement<T, D>>,
    mesh_type: MeshType,
    dim: usize,
    maxdeg: usize,
    dof_counts: DofCounts,
    basis_function_counts: DofCounts,
    dof_names: Vec<String>,
    dof_locations: Vec<OPoint<T, D>>,
    index_map: BasisIndexMap,
}

impl<T, D> fmt::Debug for CompositeElement<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeElement")
            .field("num_fields", &self.fields.len())
            .field("mesh_type", &self.mesh_type)
            .field("dim", &self.dim)
            .field("maxdeg", &self.maxdeg)
            .field("dof_counts", &self.dof_counts)
            .field("basis_function_counts", &self.basis_function_counts)
            .field("dof_names", &self.dof_names)
            .finish()
    }
}

impl<T, D> CompositeElement<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Combines the given fields into a composite element.
    ///
    /// Fails if there are no fields, if the fields do not share the same mesh type, or if a
    /// field's counts, names and locations do not describe a consistent layout.
    pub fn new(fields: Vec<SharedFieldElement<T, D>>) -> Result<Self, CompositeElementError> {
        let first = fields.first().ok_or(CompositeElementError::NoFields)?;
        let mesh_type = first.mesh_type();
        let dim = first.dim();
        if let Some((field, element)) = fields
            .iter()
            .enumerate()
            .find(|(_, element)| element.mesh_type() != mesh_type)
        {
            return Err(CompositeElementError::IncompatibleElements {
                field,
                expected: mesh_type,
                found: element.mesh_type(),
            });
        }

        let field_dof_counts: Vec<DofCounts> = fields.iter().map(|e| e.dof_counts()).collect();
        let field_basis_counts: Vec<DofCounts> = fields.iter().map(|e| e.basis_function_counts()).collect();
        let index_map = BasisIndexMap::from_counts(&field_dof_counts, &field_basis_counts)?;

        let dof_names = collect_dof_names(&fields)?;
        let dof_locations = index_map
            .iter()
            .map(|BasisIndex { field, local }| {
                let locations = fields[field].dof_locations();
                locations
                    .get(local)
                    .cloned()
                    .ok_or(CompositeElementError::MissingDofLocations {
                        field,
                        expected: field_basis_counts[field].total(),
                        actual: locations.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let element = Self {
            mesh_type,
            dim,
            maxdeg: fields.iter().map(|e| e.maxdeg()).sum(),
            dof_counts: field_dof_counts.into_iter().sum(),
            basis_function_counts: field_basis_counts.into_iter().sum(),
            dof_names,
            dof_locations,
            index_map,
            fields,
        };
        debug!(
            "Built composite element with {} fields on {:?} mesh: {} basis functions, dof names {:?}",
            element.num_fields(),
            element.mesh_type,
            element.index_map.len(),
            element.dof_names
        );
        Ok(element)
    }

    pub fn builder() -> CompositeElementBuilder<T, D> {
        CompositeElementBuilder::new()
    }

    pub fn fields(&self) -> &[SharedFieldElement<T, D>] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&SharedFieldElement<T, D>> {
        self.fields.get(index)
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn index_map(&self) -> &BasisIndexMap {
        &self.index_map
    }

    /// Finds the field owning composite basis function `index` and the field-local index of
    /// that basis function.
    pub fn resolve(&self, index: usize) -> Result<BasisIndex, CompositeElementError> {
        self.index_map.resolve(index)
    }

    /// The composite index of basis function `local` of the given field.
    pub fn global_index(&self, field: usize, local: usize) -> Option<usize> {
        self.index_map.global_index(field, local)
    }

    /// Evaluates composite basis function `index` at the given reference points on the selected
    /// cells (all cells if `cells` is `None`).
    ///
    /// Returns one entry per field. The entry of the owning field holds the values of the
    /// corresponding field basis function, every other entry is zero with the shape that field
    /// produces. Only basis function values are returned: gradients must be obtained from the
    /// owning field directly.
    pub fn evaluate_basis(
        &self,
        mapping: &dyn ReferenceMapping<T, D>,
        points: &[OPoint<T, D>],
        index: usize,
        cells: Option<&[usize]>,
    ) -> eyre::Result<Vec<FieldValues<T>>> {
        let BasisIndex { field: owner, local } = self.resolve(index)?;
        self.fields
            .iter()
            .enumerate()
            .map(|(k, field)| {
                if k == owner {
                    Ok(field.evaluate_basis(mapping, points, local, cells)?.value)
                } else {
                    field.zero_value(mapping, points, cells)
                }
            })
            .collect()
    }

    /// Evaluates all composite basis functions in parallel.
    ///
    /// Entry `i` of the result is identical to `self.evaluate_basis(mapping, points, i, cells)`.
    pub fn evaluate_all_basis(
        &self,
        mapping: &(dyn ReferenceMapping<T, D> + Sync),
        points: &[OPoint<T, D>],
        cells: Option<&[usize]>,
    ) -> eyre::Result<Vec<Vec<FieldValues<T>>>>
    where
        OPoint<T, D>: Sync,
    {
        debug!(
            "Evaluating {} composite basis functions at {} points",
            self.index_map.len(),
            points.len()
        );
        (0..self.index_map.len())
            .into_par_iter()
            .map(|i| self.evaluate_basis(mapping, points, i, cells))
            .collect()
    }
}

impl<T, D> DofLayout<T, D> for CompositeElement<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }

    /// The dimension reported by the first field.
    fn dim(&self) -> usize {
        self.dim
    }

    fn maxdeg(&self) -> usize {
        self.maxdeg
    }

    fn dof_counts(&self) -> DofCounts {
        self.dof_counts
    }

    fn basis_function_counts(&self) -> DofCounts {
        self.basis_function_counts
    }

    fn dof_names(&self) -> &[String] {
        &self.dof_names
    }

    fn dof_locations(&self) -> &[OPoint<T, D>] {
        &self.dof_locations
    }
}

/// Lists the per-entity dof names category by category and, within each category, field by
/// field. Each name is suffixed with `^k`, where `k` is the 1-based index of its field.
fn collect_dof_names<T, D>(fields: &[SharedFieldElement<T, D>]) -> Result<Vec<String>, CompositeElementError>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    let mut dof_names = Vec::new();
    for category in EntityCategory::ALL {
        for (field, element) in fields.iter().enumerate() {
            let counts = element.dof_counts();
            let names = element.dof_names();
            let category_names = names
                .get(counts.range(category))
                .ok_or(CompositeElementError::MissingDofNames {
                    field,
                    expected: counts.total(),
                    actual: names.len(),
                })?;
            dof_names.extend(
                category_names
                    .iter()
                    .map(|name| format!("{}^{}", name, field + 1)),
            );
        }
    }
    Ok(dof_names)
}

/// Collects fields for a [`CompositeElement`].
pub struct CompositeElementBuilder<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fields: Vec<SharedFieldElement<T, D>>,
}

impl<T, D> CompositeElementBuilder<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_field(self, element: impl FieldElement<T, D> + Send + Sync + 'static) -> Self {
        self.with_shared_field(Arc::new(element))
    }

    pub fn with_shared_field(mut self, element: SharedFieldElement<T, D>) -> Self {
        self.fields.push(element);
        self
    }

    pub fn build(self) -> Result<CompositeElement<T, D>, CompositeElementError> {
        CompositeElement::new(self.fields)
    }
}

impl<T, D> Default for CompositeElementBuilder<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn default() -> Self {
        Self::new()
    }
}
