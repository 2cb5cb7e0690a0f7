use numeric_literals::replace_float_literals;

use crate::element::{
    check_local_index, evaluate_scalar_basis, BasisEvaluation, DofCounts, DofLayout, FieldElement, MeshType,
    ReferenceMapping,
};
use crate::nalgebra::{Point2, Scalar, Vector2, U2};
use crate::Real;

/// Continuous piecewise bilinear basis on quadrilaterals, with one degree of freedom per vertex.
///
/// The reference element is [-1, 1]^2, with vertices ordered counter-clockwise starting
/// from (-1, -1).
#[derive(Debug, Clone, PartialEq)]
pub struct QuadrilateralQ1<T: Scalar> {
    dof_names: Vec<String>,
    dof_locations: Vec<Point2<T>>,
}

impl<T: Real> QuadrilateralQ1<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn new() -> Self {
        Self {
            dof_names: vec!["u".to_string()],
            dof_locations: [
                Point2::new(-1.0, -1.0),
                Point2::new(1.0, -1.0),
                Point2::new(1.0, 1.0),
                Point2::new(-1.0, 1.0),
            ]
            .to_vec(),
        }
    }
}

impl<T: Real> Default for QuadrilateralQ1<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn quad4_basis<T: Real>(alpha: T, beta: T, xi: &Point2<T>) -> T {
    (1.0 + alpha * xi[0]) * (1.0 + beta * xi[1]) / 4.0
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn quad4_gradient<T: Real>(alpha: T, beta: T, xi: &Point2<T>) -> Vector2<T> {
    Vector2::new(alpha * (1.0 + beta * xi[1]) / 4.0, beta * (1.0 + alpha * xi[0]) / 4.0)
}

impl<T: Real> DofLayout<T, U2> for QuadrilateralQ1<T> {
    fn mesh_type(&self) -> MeshType {
        MeshType::Quadrilateral
    }

    fn maxdeg(&self) -> usize {
        2
    }

    fn dof_counts(&self) -> DofCounts {
        DofCounts::new(1, 0, 0, 0)
    }

    fn dof_names(&self) -> &[String] {
        &self.dof_names
    }

    fn dof_locations(&self) -> &[Point2<T>] {
        &self.dof_locations
    }
}

impl<T: Real> FieldElement<T, U2> for QuadrilateralQ1<T> {
    fn evaluate_basis(
        &self,
        mapping: &dyn ReferenceMapping<T, U2>,
        points: &[Point2<T>],
        local_index: usize,
        cells: Option<&[usize]>,
    ) -> eyre::Result<BasisEvaluation<T>> {
        check_local_index(local_index, self.num_basis_functions())?;
        // The dof location of each basis function is its reference vertex
        let vertex = self.dof_locations[local_index];
        let (alpha, beta) = (vertex.x, vertex.y);
        evaluate_scalar_basis(
            mapping,
            points,
            cells,
            |xi| quad4_basis(alpha, beta, xi),
            |xi| quad4_gradient(alpha, beta, xi),
        )
    }
}
