//! Field elements and the contract a composite element relies on.
//!
//! A *field element* is a (usually scalar) finite element defined on a reference cell. It
//! describes how many degrees of freedom it places on each kind of mesh entity, names and
//! locates those degrees of freedom, and evaluates its basis functions on a collection of
//! cells described by a [`ReferenceMapping`].
use std::ops::{Add, Index, Range};

use eyre::eyre;
use nalgebra::{DMatrix, DefaultAllocator, OPoint, OVector, Scalar};
use serde::{Deserialize, Serialize};

use crate::allocators::DimAllocator;
use crate::{Real, SmallDim};

mod quadrilateral;
mod segment;
mod triangle;

pub use quadrilateral::*;
pub use segment::*;
pub use triangle::*;

/// The topological category of a mesh entity that degrees of freedom may be attached to.
///
/// The declaration order is the order in which degrees of freedom are enumerated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityCategory {
    Node,
    Edge,
    Facet,
    Interior,
}

impl EntityCategory {
    /// All categories in enumeration order.
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Node,
        EntityCategory::Edge,
        EntityCategory::Facet,
        EntityCategory::Interior,
    ];

    pub fn index(&self) -> usize {
        match self {
            EntityCategory::Node => 0,
            EntityCategory::Edge => 1,
            EntityCategory::Facet => 2,
            EntityCategory::Interior => 3,
        }
    }
}

/// Counts associated with each [`EntityCategory`].
///
/// Used both for the number of degrees of freedom placed on a *single* entity of each
/// category and for the number of basis functions an element has in each category.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DofCounts {
    pub node: usize,
    pub edge: usize,
    pub facet: usize,
    pub interior: usize,
}

impl DofCounts {
    pub fn new(node: usize, edge: usize, facet: usize, interior: usize) -> Self {
        Self {
            node,
            edge,
            facet,
            interior,
        }
    }

    pub fn from_array([node, edge, facet, interior]: [usize; 4]) -> Self {
        Self::new(node, edge, facet, interior)
    }

    pub fn to_array(&self) -> [usize; 4] {
        [self.node, self.edge, self.facet, self.interior]
    }

    pub fn get(&self, category: EntityCategory) -> usize {
        match category {
            EntityCategory::Node => self.node,
            EntityCategory::Edge => self.edge,
            EntityCategory::Facet => self.facet,
            EntityCategory::Interior => self.interior,
        }
    }

    /// The sum of the counts over all categories.
    pub fn total(&self) -> usize {
        self.node + self.edge + self.facet + self.interior
    }

    /// The sum of the counts of all categories preceding the given category.
    pub fn offset(&self, category: EntityCategory) -> usize {
        EntityCategory::ALL
            .iter()
            .take_while(|&&c| c != category)
            .map(|&c| self.get(c))
            .sum()
    }

    /// The range that the given category occupies in a list ordered by category.
    pub fn range(&self, category: EntityCategory) -> Range<usize> {
        let offset = self.offset(category);
        offset..offset + self.get(category)
    }

    /// Multiplies the counts category by category.
    ///
    /// With per-entity dof counts on the left and the number of entities of each category on
    /// the right, this gives the number of basis functions in each category.
    pub fn entitywise_product(&self, other: &DofCounts) -> DofCounts {
        DofCounts::new(
            self.node * other.node,
            self.edge * other.edge,
            self.facet * other.facet,
            self.interior * other.interior,
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityCategory, usize)> + '_ {
        EntityCategory::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

impl Index<EntityCategory> for DofCounts {
    type Output = usize;

    fn index(&self, category: EntityCategory) -> &usize {
        match category {
            EntityCategory::Node => &self.node,
            EntityCategory::Edge => &self.edge,
            EntityCategory::Facet => &self.facet,
            EntityCategory::Interior => &self.interior,
        }
    }
}

impl Add for DofCounts {
    type Output = DofCounts;

    fn add(self, rhs: DofCounts) -> DofCounts {
        DofCounts::new(
            self.node + rhs.node,
            self.edge + rhs.edge,
            self.facet + rhs.facet,
            self.interior + rhs.interior,
        )
    }
}

impl std::iter::Sum for DofCounts {
    fn sum<I: Iterator<Item = DofCounts>>(iter: I) -> Self {
        iter.fold(DofCounts::default(), Add::add)
    }
}

/// The kind of mesh an element is defined on.
///
/// Elements can only be combined if they share the same mesh type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshType {
    Segment,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Hexahedron,
}

impl MeshType {
    /// The dimension of the reference cell.
    pub fn reference_dim(&self) -> usize {
        match self {
            MeshType::Segment => 1,
            MeshType::Triangle | MeshType::Quadrilateral => 2,
            MeshType::Tetrahedron | MeshType::Hexahedron => 3,
        }
    }

    /// The number of entities of each category in the reference cell.
    ///
    /// Edges are only counted for three-dimensional cells. In two dimensions, the sides of
    /// a cell are its facets, and in one dimension the facets are the end points.
    pub fn entity_counts(&self) -> DofCounts {
        match self {
            MeshType::Segment => DofCounts::new(2, 0, 2, 1),
            MeshType::Triangle => DofCounts::new(3, 0, 3, 1),
            MeshType::Quadrilateral => DofCounts::new(4, 0, 4, 1),
            MeshType::Tetrahedron => DofCounts::new(4, 6, 4, 1),
            MeshType::Hexahedron => DofCounts::new(8, 12, 6, 1),
        }
    }
}

/// Values of a basis function (or a derived quantity) evaluated on a set of cells.
///
/// Each component is a matrix whose rows correspond to the evaluated cells and whose columns
/// correspond to the evaluation points. Scalar values have a single component, gradients
/// have one component per reference dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues<T: Scalar> {
    components: Vec<DMatrix<T>>,
}

impl<T: Scalar> FieldValues<T> {
    pub fn from_components(components: Vec<DMatrix<T>>) -> Self {
        debug_assert!(
            components
                .windows(2)
                .all(|pair| pair[0].shape() == pair[1].shape()),
            "All components must have the same shape"
        );
        Self { components }
    }

    pub fn scalar(values: DMatrix<T>) -> Self {
        Self::from_components(vec![values])
    }

    pub fn components(&self) -> &[DMatrix<T>] {
        &self.components
    }

    pub fn into_components(self) -> Vec<DMatrix<T>> {
        self.components
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Returns `(components, cells, points)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let (cells, points) = self
            .components
            .first()
            .map(|c| c.shape())
            .unwrap_or((0, 0));
        (self.components.len(), cells, points)
    }
}

impl<T: Real> FieldValues<T> {
    /// Zero values with exactly the same shape as `self`.
    pub fn zeros_like(&self) -> Self {
        let components = self
            .components
            .iter()
            .map(|c| DMatrix::zeros(c.nrows(), c.ncols()))
            .collect();
        Self { components }
    }

    pub fn is_zero(&self) -> bool {
        self.components
            .iter()
            .all(|c| c.iter().all(|&x| x == T::zero()))
    }
}

/// The result of evaluating a single basis function of a field element.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisEvaluation<T: Scalar> {
    /// The basis function values.
    pub value: FieldValues<T>,
    /// Auxiliary output, the gradients of the basis function in physical coordinates.
    pub gradient: FieldValues<T>,
}

/// Maps reference coordinates to the physical coordinates of a collection of cells.
pub trait ReferenceMapping<T, D>
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn num_cells(&self) -> usize;

    /// Maps reference coordinates to physical coordinates in the given cell.
    ///
    /// # Panics
    ///
    /// May panic if `cell >= self.num_cells()`.
    fn map_reference_coords(&self, cell: usize, xi: &OPoint<T, D>) -> OPoint<T, D>;

    /// The Jacobian of the map from the reference cell to the given cell.
    ///
    /// # Panics
    ///
    /// May panic if `cell >= self.num_cells()`.
    fn reference_jacobian(&self, cell: usize, xi: &OPoint<T, D>) -> nalgebra::OMatrix<T, D, D>;
}

/// The degree of freedom layout of an element.
pub trait DofLayout<T, D>
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// The kind of mesh the element is defined on.
    fn mesh_type(&self) -> MeshType;

    /// The dimension of the reference cell.
    fn dim(&self) -> usize {
        D::dim()
    }

    /// An upper bound on the polynomial degree of the basis functions.
    fn maxdeg(&self) -> usize;

    /// The number of degrees of freedom placed on a single entity of each category.
    fn dof_counts(&self) -> DofCounts;

    /// The number of basis functions of the element in each category.
    fn basis_function_counts(&self) -> DofCounts {
        self.dof_counts()
            .entitywise_product(&self.mesh_type().entity_counts())
    }

    fn num_basis_functions(&self) -> usize {
        self.basis_function_counts().total()
    }

    /// Names of the per-entity degrees of freedom, ordered node, edge, facet, interior.
    fn dof_names(&self) -> &[String];

    /// Reference coordinates of each basis function's degree of freedom, in basis function order.
    fn dof_locations(&self) -> &[OPoint<T, D>];
}

/// A finite element whose basis functions can be evaluated.
pub trait FieldElement<T, D>: DofLayout<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Evaluates the basis function with the given local index at the given reference points
    /// on the selected cells of the mapping (all cells if `cells` is `None`).
    fn evaluate_basis(
        &self,
        mapping: &dyn ReferenceMapping<T, D>,
        points: &[OPoint<T, D>],
        local_index: usize,
        cells: Option<&[usize]>,
    ) -> eyre::Result<BasisEvaluation<T>>;

    /// Zero values with the shape a basis function evaluation of this element would have.
    fn zero_value(
        &self,
        mapping: &dyn ReferenceMapping<T, D>,
        points: &[OPoint<T, D>],
        cells: Option<&[usize]>,
    ) -> eyre::Result<FieldValues<T>> {
        Ok(self
            .evaluate_basis(mapping, points, 0, cells)?
            .value
            .zeros_like())
    }
}

/// Resolves an optional cell selection into an explicit list of cells.
pub fn select_cells(num_cells: usize, cells: Option<&[usize]>) -> eyre::Result<Vec<usize>> {
    match cells {
        Some(cells) => {
            if let Some(&cell) = cells.iter().find(|&&cell| cell >= num_cells) {
                return Err(eyre!(
                    "Cell index {} is out of bounds for mapping with {} cells",
                    cell,
                    num_cells
                ));
            }
            Ok(cells.to_vec())
        }
        None => Ok((0..num_cells).collect()),
    }
}

pub(crate) fn check_local_index(local_index: usize, num_basis_functions: usize) -> eyre::Result<()> {
    if local_index < num_basis_functions {
        Ok(())
    } else {
        Err(eyre!(
            "Local basis function index {} is out of bounds for element with {} basis functions",
            local_index,
            num_basis_functions
        ))
    }
}

/// Evaluates a scalar basis function given by its reference value and reference gradient.
///
/// Values are identical on all cells, while gradients are pushed forward with the inverse
/// transpose of the reference Jacobian of each cell.
pub fn evaluate_scalar_basis<T, D>(
    mapping: &dyn ReferenceMapping<T, D>,
    points: &[OPoint<T, D>],
    cells: Option<&[usize]>,
    reference_value: impl Fn(&OPoint<T, D>) -> T,
    reference_gradient: impl Fn(&OPoint<T, D>) -> OVector<T, D>,
) -> eyre::Result<BasisEvaluation<T>>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    let cells = select_cells(mapping.num_cells(), cells)?;
    let num_points = points.len();

    let values: Vec<T> = points.iter().map(&reference_value).collect();
    let value = DMatrix::from_fn(cells.len(), num_points, |_, q| values[q]);

    let mut gradient = vec![DMatrix::zeros(cells.len(), num_points); D::dim()];
    for (row, &cell) in cells.iter().enumerate() {
        for (q, xi) in points.iter().enumerate() {
            let j_inv_t = mapping
                .reference_jacobian(cell, xi)
                .try_inverse()
                .ok_or_else(|| eyre!("Singular element Jacobian encountered"))?
                .transpose();
            let grad = j_inv_t * reference_gradient(xi);
            for (component, &g) in gradient.iter_mut().zip(grad.iter()) {
                component[(row, q)] = g;
            }
        }
    }

    Ok(BasisEvaluation {
        value: FieldValues::scalar(value),
        gradient: FieldValues::from_components(gradient),
    })
}
