use std::collections::HashSet;
use std::sync::Arc;

use fenris_composite::composite::{BasisIndex, CompositeElement, SharedFieldElement};
use fenris_composite::element::{
    DofCounts, DofLayout, FieldElement, MeshType, QuadrilateralQ1, TriangleP0, TriangleP1, TriangleP2,
};
use fenris_composite::error::CompositeElementError;
use fenris_composite::mapping::AffineMapping;
use fenris_composite::nalgebra::{Point2, U2};
use fenris_composite::proptest::field_dof_counts;

use insta::assert_snapshot;
use itertools::Itertools;
use proptest::prelude::*;

use crate::SyntheticField;

fn sample_points() -> Vec<Point2<f64>> {
    vec![Point2::new(-0.5, -0.5), Point2::new(0.1, -0.7), Point2::new(-0.2, 0.3)]
}

fn identity_mapping(num_cells: usize) -> AffineMapping<f64, U2> {
    AffineMapping::identity(num_cells)
}

fn synthetic_composite(mesh_type: MeshType, counts: &[DofCounts]) -> CompositeElement<f64, U2> {
    counts
        .iter()
        .enumerate()
        .fold(CompositeElement::<f64, U2>::builder(), |builder, (k, &c)| {
            builder.with_field(SyntheticField::new(mesh_type, c, k as f64))
        })
        .build()
        .unwrap()
}

#[test]
fn two_scalar_node_fields_interleave_per_node() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(QuadrilateralQ1::<f64>::new())
        .with_field(QuadrilateralQ1::<f64>::new())
        .build()
        .unwrap();

    assert_eq!(element.dof_counts(), DofCounts::new(2, 0, 0, 0));
    assert_eq!(element.basis_function_counts(), DofCounts::new(8, 0, 0, 0));
    assert_eq!(element.num_basis_functions(), 8);
    assert_eq!(element.resolve(0).unwrap(), BasisIndex { field: 0, local: 0 });
    assert_eq!(element.resolve(1).unwrap(), BasisIndex { field: 1, local: 0 });
    assert_eq!(element.resolve(2).unwrap(), BasisIndex { field: 0, local: 1 });
    assert_eq!(element.resolve(7).unwrap(), BasisIndex { field: 1, local: 3 });
    assert_eq!(element.index_map().owners(), &[0, 1, 0, 1, 0, 1, 0, 1]);
    assert_eq!(element.index_map().local_indices(), &[0, 0, 1, 1, 2, 2, 3, 3]);
}

#[test]
fn evaluation_places_owner_values_in_own_slot() {
    let q1 = QuadrilateralQ1::<f64>::new();
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(q1.clone())
        .with_field(q1.clone())
        .build()
        .unwrap();
    let mapping = identity_mapping(2);
    let points = sample_points();

    let expected_v = q1.evaluate_basis(&mapping, &points, 0, None).unwrap().value;
    let values = element.evaluate_basis(&mapping, &points, 0, None).unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0], expected_v);
    assert!(!values[0].is_zero());
    assert!(values[1].is_zero());
    assert_eq!(values[1].shape(), (1, 2, 3));

    let values = element.evaluate_basis(&mapping, &points, 1, None).unwrap();
    assert!(values[0].is_zero());
    assert_eq!(values[1], expected_v);

    // Second node of the first field
    let expected_w = q1.evaluate_basis(&mapping, &points, 1, None).unwrap().value;
    let values = element.evaluate_basis(&mapping, &points, 2, None).unwrap();
    assert_eq!(values[0], expected_w);
    assert!(values[1].is_zero());
}

#[test]
fn zero_slots_keep_the_shape_of_their_field() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(SyntheticField::new(MeshType::Triangle, DofCounts::new(1, 0, 0, 0), 0.0))
        .with_field(SyntheticField::new(MeshType::Triangle, DofCounts::new(0, 0, 0, 1), 1.0).with_components(3))
        .build()
        .unwrap();
    let mapping = identity_mapping(4);
    let points = sample_points();

    let values = element
        .evaluate_basis(&mapping, &points, 0, Some(&[1, 3][..]))
        .unwrap();
    assert_eq!(values[0].shape(), (1, 2, 3));
    assert_eq!(values[1].shape(), (3, 2, 3));
    assert!(!values[0].is_zero());
    assert!(values[1].is_zero());

    // The interior basis function comes last
    let values = element
        .evaluate_basis(&mapping, &points, 3, Some(&[1, 3][..]))
        .unwrap();
    assert_eq!(values[0].shape(), (1, 2, 3));
    assert!(values[0].is_zero());
    assert_eq!(values[1].shape(), (3, 2, 3));
    assert!(!values[1].is_zero());

    let owner_values = values.into_iter().nth(1).unwrap();
    assert_eq!(owner_values.num_components(), 3);
    for (c, component) in owner_values.into_components().into_iter().enumerate() {
        // Synthetic value of local function 0 on cell 1 at point 0
        assert_eq!(component[(0, 0)], (c + 1) as f64 + 100.0);
    }
}

#[test]
fn composite_dim_is_the_dim_of_the_first_field() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(SyntheticField::new(MeshType::Triangle, DofCounts::new(1, 0, 0, 0), 0.0).with_dim(1))
        .with_field(TriangleP1::new())
        .build()
        .unwrap();

    let first = element.field(0).unwrap();
    assert_eq!(first.dim(), 1);
    assert_eq!(element.dim(), 1);
    assert_eq!(element.field(1).unwrap().dim(), 2);
    assert!(element.field(2).is_none());
}

#[test]
fn incompatible_mesh_types_are_rejected() {
    let err = CompositeElement::<f64, U2>::builder()
        .with_field(TriangleP1::new())
        .with_field(TriangleP2::new())
        .with_field(QuadrilateralQ1::<f64>::new())
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        CompositeElementError::IncompatibleElements {
            field: 2,
            expected: MeshType::Triangle,
            found: MeshType::Quadrilateral,
        }
    );
}

#[test]
fn empty_composite_is_rejected() {
    let err = CompositeElement::<f64, U2>::new(Vec::new()).unwrap_err();
    assert_eq!(err, CompositeElementError::NoFields);
}

#[test]
fn taylor_hood_layout() {
    // Two quadratic velocity components and a linear pressure
    let p2: SharedFieldElement<f64, U2> = Arc::new(TriangleP2::<f64>::new());
    let p1: SharedFieldElement<f64, U2> = Arc::new(TriangleP1::<f64>::new());
    let element = CompositeElement::new(vec![p2.clone(), p2, p1]).unwrap();

    assert_eq!(element.num_fields(), 3);
    assert_eq!(element.mesh_type(), MeshType::Triangle);
    assert_eq!(element.dim(), 2);
    assert_eq!(element.maxdeg(), 5);
    assert_eq!(element.dof_counts(), DofCounts::new(3, 0, 2, 0));
    assert_eq!(element.basis_function_counts(), DofCounts::new(9, 0, 6, 0));
    assert_snapshot!(element.dof_names().join(" "), @"u^1 u^2 u^3 u^1 u^2");

    let owners = element.index_map().owners();
    assert_eq!(owners, &[0, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1, 0, 1, 0, 1]);
}

#[test]
fn dof_locations_follow_the_owning_field() {
    let p2 = TriangleP2::<f64>::new();
    let p1 = TriangleP1::<f64>::new();
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(p2.clone())
        .with_field(p1.clone())
        .build()
        .unwrap();

    assert_eq!(element.dof_locations().len(), 9);
    for (i, location) in element.dof_locations().iter().enumerate() {
        let BasisIndex { field, local } = element.resolve(i).unwrap();
        let expected = match field {
            0 => p2.dof_locations()[local],
            _ => p1.dof_locations()[local],
        };
        assert_eq!(location, &expected);
    }

    // Vertex dofs alternate between the fields, side midpoints belong to the quadratic field
    assert_eq!(element.dof_locations()[0], Point2::new(-1.0, -1.0));
    assert_eq!(element.dof_locations()[1], Point2::new(-1.0, -1.0));
    assert_eq!(element.dof_locations()[6], Point2::new(0.0, -1.0));
    assert_eq!(element.dof_locations()[8], Point2::new(-1.0, 0.0));
}

#[test]
fn interior_dofs_come_after_nodal_dofs() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(TriangleP0::new())
        .with_field(TriangleP1::new())
        .build()
        .unwrap();

    assert_eq!(element.index_map().owners(), &[1, 1, 1, 0]);
    assert_eq!(element.resolve(3).unwrap(), BasisIndex { field: 0, local: 0 });
    assert_eq!(element.dof_names(), &["u^2".to_string(), "u^1".to_string()]);
    assert_eq!(element.dof_locations()[3], Point2::new(-1.0 / 3.0, -1.0 / 3.0));
    assert_eq!(element.maxdeg(), 1);
}

#[test]
fn fields_without_dofs_contribute_nothing() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(SyntheticField::new(MeshType::Triangle, DofCounts::default(), 0.0))
        .with_field(TriangleP1::new())
        .build()
        .unwrap();

    assert_eq!(element.num_basis_functions(), 3);
    assert_eq!(element.index_map().owners(), &[1, 1, 1]);
    assert_eq!(element.dof_names(), &["u^2".to_string()]);

    let mapping = identity_mapping(1);
    let values = element
        .evaluate_basis(&mapping, &sample_points(), 0, None)
        .unwrap();
    assert_eq!(values.len(), 2);
    assert!(values[0].is_zero());
    assert!(!values[1].is_zero());
}

#[test]
fn out_of_range_index_is_reported() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(TriangleP1::new())
        .with_field(TriangleP1::new())
        .build()
        .unwrap();

    assert_eq!(
        element.resolve(6).unwrap_err(),
        CompositeElementError::IndexOutOfRange {
            index: 6,
            num_basis_functions: 6,
        }
    );

    let mapping = identity_mapping(1);
    let err = element
        .evaluate_basis(&mapping, &sample_points(), 6, None)
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<CompositeElementError>(),
        Some(&CompositeElementError::IndexOutOfRange {
            index: 6,
            num_basis_functions: 6,
        })
    );
}

#[test]
fn invalid_cell_selection_is_reported() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(TriangleP1::new())
        .with_field(TriangleP0::new())
        .build()
        .unwrap();
    let mapping = identity_mapping(2);
    assert!(element
        .evaluate_basis(&mapping, &sample_points(), 0, Some(&[0, 2][..]))
        .is_err());
}

#[test]
fn truncated_dof_names_are_rejected() {
    let field = SyntheticField::new(MeshType::Triangle, DofCounts::new(1, 0, 1, 0), 0.0)
        .with_dof_names(vec!["n0".to_string()]);
    let err = CompositeElement::<f64, U2>::builder()
        .with_field(TriangleP1::new())
        .with_field(field)
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        CompositeElementError::MissingDofNames {
            field: 1,
            expected: 2,
            actual: 1,
        }
    );
}

#[test]
fn truncated_dof_locations_are_rejected() {
    let field = SyntheticField::new(MeshType::Triangle, DofCounts::new(1, 0, 0, 0), 0.0)
        .with_dof_locations(vec![Point2::origin(); 2]);
    let err = CompositeElement::<f64, U2>::builder()
        .with_field(field)
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        CompositeElementError::MissingDofLocations {
            field: 0,
            expected: 3,
            actual: 2,
        }
    );
}

#[test]
fn parallel_evaluation_matches_serial_evaluation() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(TriangleP2::new())
        .with_field(TriangleP2::new())
        .with_field(TriangleP1::new())
        .build()
        .unwrap();
    let mapping = AffineMapping::from_simplices(&[
        vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(0.0, 1.0)],
        vec![Point2::new(2.0, 0.0), Point2::new(2.0, 1.0), Point2::new(0.0, 1.0)],
    ])
    .unwrap();
    let points = sample_points();

    let all = element.evaluate_all_basis(&mapping, &points, None).unwrap();
    assert_eq!(all.len(), element.num_basis_functions());
    for (i, values) in all.iter().enumerate() {
        let serial = element.evaluate_basis(&mapping, &points, i, None).unwrap();
        assert_eq!(values, &serial);
    }
}

#[test]
fn global_index_inverts_resolve() {
    let element = CompositeElement::<f64, U2>::builder()
        .with_field(TriangleP2::new())
        .with_field(TriangleP0::new())
        .with_field(TriangleP1::new())
        .build()
        .unwrap();

    for i in 0..element.num_basis_functions() {
        let BasisIndex { field, local } = element.resolve(i).unwrap();
        assert_eq!(element.global_index(field, local), Some(i));
    }
    assert_eq!(element.global_index(1, 1), None);
    assert_eq!(element.global_index(3, 0), None);
}

proptest! {
    #[test]
    fn resolve_is_a_bijection((mesh_type, counts) in field_dof_counts(4, 3)) {
        let element = synthetic_composite(mesh_type, &counts);
        let field_totals: Vec<usize> = element.fields().iter().map(|f| f.num_basis_functions()).collect();
        prop_assert_eq!(element.num_basis_functions(), field_totals.iter().sum::<usize>());

        let mut seen = HashSet::new();
        for i in 0 .. element.num_basis_functions() {
            let index = element.resolve(i).unwrap();
            prop_assert!(index.field < counts.len());
            prop_assert!(index.local < field_totals[index.field]);
            prop_assert!(seen.insert(index));
            prop_assert_eq!(element.resolve(i).unwrap(), index);
        }
        prop_assert_eq!(seen.len(), element.num_basis_functions());
        prop_assert!(element.resolve(element.num_basis_functions()).is_err());
    }

    #[test]
    fn local_indices_preserve_field_order((mesh_type, counts) in field_dof_counts(4, 3)) {
        let element = synthetic_composite(mesh_type, &counts);
        for field in 0 .. element.num_fields() {
            let globals: Vec<usize> = (0 .. element.fields()[field].num_basis_functions())
                .map(|local| element.global_index(field, local).unwrap())
                .collect();
            prop_assert!(globals.iter().tuple_windows().all(|(a, b)| a < b));
        }
    }

    #[test]
    fn dof_names_are_unique_and_suffixed((mesh_type, counts) in field_dof_counts(4, 3)) {
        let element = synthetic_composite(mesh_type, &counts);
        let names = element.dof_names();
        prop_assert_eq!(names.len(), element.dof_counts().total());
        prop_assert_eq!(names.iter().unique().count(), names.len());
        for name in names {
            let suffix = name.rsplit('^').next().unwrap();
            let field: usize = suffix.parse().unwrap();
            prop_assert!(1 <= field && field <= counts.len());
        }
    }

    #[test]
    fn aggregated_counts_are_field_sums((mesh_type, counts) in field_dof_counts(4, 3)) {
        let element = counts
            .iter()
            .enumerate()
            .fold(CompositeElement::<f64, U2>::builder(), |builder, (k, &c)| {
                builder.with_field(SyntheticField::new(mesh_type, c, 0.0).with_maxdeg(k + 1))
            })
            .build()
            .unwrap();
        let expected_counts: DofCounts = counts.iter().copied().sum();
        prop_assert_eq!(element.dof_counts(), expected_counts);
        prop_assert_eq!(element.maxdeg(), (1 ..= counts.len()).sum::<usize>());
        prop_assert_eq!(element.dim(), 2);
        prop_assert_eq!(element.mesh_type(), mesh_type);
    }

    #[test]
    fn only_the_owner_slot_is_nonzero((mesh_type, counts) in field_dof_counts(3, 2)) {
        let element = synthetic_composite(mesh_type, &counts);
        let mapping = identity_mapping(2);
        let points = sample_points();
        for i in 0 .. element.num_basis_functions() {
            let owner = element.resolve(i).unwrap().field;
            let values = element.evaluate_basis(&mapping, &points, i, None).unwrap();
            prop_assert_eq!(values.len(), counts.len());
            for (k, v) in values.iter().enumerate() {
                prop_assert_eq!(v.is_zero(), k != owner);
                prop_assert_eq!(v.shape(), (1, 2, 3));
            }
            let again = element.evaluate_basis(&mapping, &points, i, None).unwrap();
            prop_assert_eq!(&values, &again);
        }
    }
}
