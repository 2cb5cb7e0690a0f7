//! Concrete reference mappings.
use eyre::eyre;
use itertools::izip;
use numeric_literals::replace_float_literals;

use crate::allocators::DimAllocator;
use crate::element::ReferenceMapping;
use crate::nalgebra::{DefaultAllocator, OMatrix, OPoint, OVector, Scalar};
use crate::{Real, SmallDim};

/// A collection of cells, each given by an affine map `x = J xi + b` from the reference cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineMapping<T, D>
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    jacobians: Vec<OMatrix<T, D, D>>,
    translations: Vec<OVector<T, D>>,
}

impl<T, D> AffineMapping<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    pub fn from_jacobians_and_translations(
        jacobians: Vec<OMatrix<T, D, D>>,
        translations: Vec<OVector<T, D>>,
    ) -> eyre::Result<Self> {
        if jacobians.len() != translations.len() {
            return Err(eyre!(
                "Number of Jacobians ({}) and translations ({}) must be equal",
                jacobians.len(),
                translations.len()
            ));
        }
        Ok(Self {
            jacobians,
            translations,
        })
    }

    /// `num_cells` copies of the identity map.
    pub fn identity(num_cells: usize) -> Self {
        Self {
            jacobians: vec![OMatrix::<T, D, D>::identity(); num_cells],
            translations: vec![OVector::<T, D>::zeros(); num_cells],
        }
    }

    /// Constructs the affine maps onto the given simplices.
    ///
    /// Each simplex must have `D + 1` vertices, ordered consistently with the reference simplex
    /// whose first vertex is `(-1, ..., -1)` and whose `k`-th vertex (`k >= 1`) additionally
    /// has its `(k - 1)`-th coordinate raised to `1`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn from_simplices(simplices: &[Vec<OPoint<T, D>>]) -> eyre::Result<Self> {
        let mut jacobians = Vec::with_capacity(simplices.len());
        let mut translations = Vec::with_capacity(simplices.len());
        for (cell, vertices) in simplices.iter().enumerate() {
            if vertices.len() != D::dim() + 1 {
                return Err(eyre!(
                    "Simplex {} has {} vertices, expected {}",
                    cell,
                    vertices.len(),
                    D::dim() + 1
                ));
            }
            let v0 = &vertices[0];
            // x = v0 + J (xi + 1)
            let j = OMatrix::<T, D, D>::from_fn(|i, k| (vertices[k + 1][i] - v0[i]) / 2.0);
            let b = &v0.coords + &j * OVector::<T, D>::repeat(1.0);
            jacobians.push(j);
            translations.push(b);
        }
        Self::from_jacobians_and_translations(jacobians, translations)
    }

    pub fn jacobians(&self) -> &[OMatrix<T, D, D>] {
        &self.jacobians
    }

    pub fn translations(&self) -> &[OVector<T, D>] {
        &self.translations
    }

    /// Iterates over `(jacobian, translation)` pairs of all cells.
    pub fn iter(&self) -> impl Iterator<Item = (&OMatrix<T, D, D>, &OVector<T, D>)> {
        izip!(&self.jacobians, &self.translations)
    }
}

impl<T, D> ReferenceMapping<T, D> for AffineMapping<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn num_cells(&self) -> usize {
        self.jacobians.len()
    }

    fn map_reference_coords(&self, cell: usize, xi: &OPoint<T, D>) -> OPoint<T, D> {
        OPoint::from(&self.jacobians[cell] * &xi.coords + &self.translations[cell])
    }

    fn reference_jacobian(&self, cell: usize, _xi: &OPoint<T, D>) -> OMatrix<T, D, D> {
        self.jacobians[cell].clone()
    }
}
