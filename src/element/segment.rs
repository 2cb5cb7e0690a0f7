use numeric_literals::replace_float_literals;

use crate::element::{
    check_local_index, evaluate_scalar_basis, BasisEvaluation, DofCounts, DofLayout, FieldElement, MeshType,
    ReferenceMapping,
};
use crate::nalgebra::{Point1, Scalar, Vector1, U1};
use crate::Real;

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn segment2_basis<T: Real>(xi: &Point1<T>) -> [T; 2] {
    [(1.0 - xi.x) / 2.0, (1.0 + xi.x) / 2.0]
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn segment2_gradients<T: Real>() -> [Vector1<T>; 2] {
    [Vector1::new(-0.5), Vector1::new(0.5)]
}

/// Continuous piecewise linear basis on line segments, with one degree of freedom per end point.
///
/// The reference element is the interval [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentP1<T: Scalar> {
    dof_names: Vec<String>,
    dof_locations: Vec<Point1<T>>,
}

impl<T: Real> SegmentP1<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn new() -> Self {
        Self {
            dof_names: vec!["u".to_string()],
            dof_locations: [Point1::new(-1.0), Point1::new(1.0)].to_vec(),
        }
    }
}

impl<T: Real> Default for SegmentP1<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> DofLayout<T, U1> for SegmentP1<T> {
    fn mesh_type(&self) -> MeshType {
        MeshType::Segment
    }

    fn maxdeg(&self) -> usize {
        1
    }

    fn dof_counts(&self) -> DofCounts {
        DofCounts::new(1, 0, 0, 0)
    }

    fn dof_names(&self) -> &[String] {
        &self.dof_names
    }

    fn dof_locations(&self) -> &[Point1<T>] {
        &self.dof_locations
    }
}

impl<T: Real> FieldElement<T, U1> for SegmentP1<T> {
    fn evaluate_basis(
        &self,
        mapping: &dyn ReferenceMapping<T, U1>,
        points: &[Point1<T>],
        local_index: usize,
        cells: Option<&[usize]>,
    ) -> eyre::Result<BasisEvaluation<T>> {
        check_local_index(local_index, self.num_basis_functions())?;
        evaluate_scalar_basis(
            mapping,
            points,
            cells,
            |xi| segment2_basis(xi)[local_index],
            |_| segment2_gradients()[local_index],
        )
    }
}
