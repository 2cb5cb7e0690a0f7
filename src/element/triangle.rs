use numeric_literals::replace_float_literals;

use crate::element::{
    check_local_index, evaluate_scalar_basis, BasisEvaluation, DofCounts, DofLayout, FieldElement, MeshType,
    ReferenceMapping,
};
use crate::nalgebra::{Point2, Scalar, Vector2, U2};
use crate::Real;

#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn tri3_basis<T: Real>(xi: &Point2<T>) -> [T; 3] {
    [
        -0.5 * xi.x - 0.5 * xi.y,
        0.5 * xi.x + 0.5,
        0.5 * xi.y + 0.5,
    ]
}

#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn tri3_gradients<T: Real>() -> [Vector2<T>; 3] {
    [
        Vector2::new(-0.5, -0.5),
        Vector2::new(0.5, 0.0),
        Vector2::new(0.0, 0.5),
    ]
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn reference_vertices<T: Real>() -> Vec<Point2<T>> {
    [Point2::new(-1.0, -1.0), Point2::new(1.0, -1.0), Point2::new(-1.0, 1.0)].to_vec()
}

/// Piecewise constant basis on triangles, with a single degree of freedom in the cell interior.
///
/// The reference element is chosen to be the triangle defined by the corners
/// (-1, -1), (1, -1), (-1, 1).
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleP0<T: Scalar> {
    dof_names: Vec<String>,
    dof_locations: Vec<Point2<T>>,
}

impl<T: Real> TriangleP0<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn new() -> Self {
        Self {
            dof_names: vec!["u".to_string()],
            dof_locations: [Point2::new(-1.0 / 3.0, -1.0 / 3.0)].to_vec(),
        }
    }
}

impl<T: Real> Default for TriangleP0<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> DofLayout<T, U2> for TriangleP0<T> {
    fn mesh_type(&self) -> MeshType {
        MeshType::Triangle
    }

    fn maxdeg(&self) -> usize {
        0
    }

    fn dof_counts(&self) -> DofCounts {
        DofCounts::new(0, 0, 0, 1)
    }

    fn dof_names(&self) -> &[String] {
        &self.dof_names
    }

    fn dof_locations(&self) -> &[Point2<T>] {
        &self.dof_locations
    }
}

impl<T: Real> FieldElement<T, U2> for TriangleP0<T> {
    fn evaluate_basis(
        &self,
        mapping: &dyn ReferenceMapping<T, U2>,
        points: &[Point2<T>],
        local_index: usize,
        cells: Option<&[usize]>,
    ) -> eyre::Result<BasisEvaluation<T>> {
        check_local_index(local_index, self.num_basis_functions())?;
        evaluate_scalar_basis(mapping, points, cells, |_| T::one(), |_| Vector2::zeros())
    }
}

/// Continuous piecewise linear basis on triangles, with one degree of freedom per vertex.
///
/// The reference element is chosen to be the triangle defined by the corners
/// (-1, -1), (1, -1), (-1, 1).
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleP1<T: Scalar> {
    dof_names: Vec<String>,
    dof_locations: Vec<Point2<T>>,
}

impl<T: Real> TriangleP1<T> {
    pub fn new() -> Self {
        Self {
            dof_names: vec!["u".to_string()],
            dof_locations: reference_vertices(),
        }
    }
}

impl<T: Real> Default for TriangleP1<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> DofLayout<T, U2> for TriangleP1<T> {
    fn mesh_type(&self) -> MeshType {
        MeshType::Triangle
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

    fn dof_locations(&self) -> &[Point2<T>] {
        &self.dof_locations
    }
}

impl<T: Real> FieldElement<T, U2> for TriangleP1<T> {
    fn evaluate_basis(
        &self,
        mapping: &dyn ReferenceMapping<T, U2>,
        points: &[Point2<T>],
        local_index: usize,
        cells: Option<&[usize]>,
    ) -> eyre::Result<BasisEvaluation<T>> {
        check_local_index(local_index, self.num_basis_functions())?;
        evaluate_scalar_basis(
            mapping,
            points,
            cells,
            |xi| tri3_basis(xi)[local_index],
            |_| tri3_gradients()[local_index],
        )
    }
}

/// Continuous piecewise quadratic basis on triangles.
///
/// One degree of freedom sits on each vertex and one on each side (facet). Basis functions
/// are ordered vertices first, then the sides (0, 1), (1, 2) and (0, 2).
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleP2<T: Scalar> {
    dof_names: Vec<String>,
    dof_locations: Vec<Point2<T>>,
}

impl<T: Real> TriangleP2<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn new() -> Self {
        let mut dof_locations = reference_vertices();
        dof_locations.extend([Point2::new(0.0, -1.0), Point2::new(0.0, 0.0), Point2::new(-1.0, 0.0)]);
        Self {
            dof_names: vec!["u".to_string(), "u".to_string()],
            dof_locations,
        }
    }
}

impl<T: Real> Default for TriangleP2<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tri6 basis functions expressed as products of the Tri3 basis functions.
#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn tri6_basis<T: Real>(xi: &Point2<T>) -> [T; 6] {
    let psi = tri3_basis(xi);
    [
        psi[0] * (2.0 * psi[0] - 1.0),
        psi[1] * (2.0 * psi[1] - 1.0),
        psi[2] * (2.0 * psi[2] - 1.0),
        4.0 * psi[0] * psi[1],
        4.0 * psi[1] * psi[2],
        4.0 * psi[0] * psi[2],
    ]
}

#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn tri6_gradients<T: Real>(xi: &Point2<T>) -> [Vector2<T>; 6] {
    let psi = tri3_basis(xi);
    let g = tri3_gradients::<T>();

    let vertex_gradient = |i: usize| g[i] * (4.0 * psi[i] - 1.0);
    // Side between vertex i and j
    let side_gradient = |i: usize, j: usize| g[i] * (4.0 * psi[j]) + g[j] * (4.0 * psi[i]);

    [
        vertex_gradient(0),
        vertex_gradient(1),
        vertex_gradient(2),
        side_gradient(0, 1),
        side_gradient(1, 2),
        side_gradient(0, 2),
    ]
}

impl<T: Real> DofLayout<T, U2> for TriangleP2<T> {
    fn mesh_type(&self) -> MeshType {
        MeshType::Triangle
    }

    fn maxdeg(&self) -> usize {
        2
    }

    fn dof_counts(&self) -> DofCounts {
        DofCounts::new(1, 0, 1, 0)
    }

    fn dof_names(&self) -> &[String] {
        &self.dof_names
    }

    fn dof_locations(&self) -> &[Point2<T>] {
        &self.dof_locations
    }
}

impl<T: Real> FieldElement<T, U2> for TriangleP2<T> {
    fn evaluate_basis(
        &self,
        mapping: &dyn ReferenceMapping<T, U2>,
        points: &[Point2<T>],
        local_index: usize,
        cells: Option<&[usize]>,
    ) -> eyre::Result<BasisEvaluation<T>> {
        check_local_index(local_index, self.num_basis_functions())?;
        evaluate_scalar_basis(
            mapping,
            points,
            cells,
            |xi| tri6_basis(xi)[local_index],
            |xi| tri6_gradients(xi)[local_index],
        )
    }
}
