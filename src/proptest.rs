//! Proptest strategies for dof layouts.
use crate::element::{DofCounts, EntityCategory, MeshType};
use ::proptest::collection::vec;
use ::proptest::prelude::*;

impl Arbitrary for MeshType {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(MeshType::Segment),
            Just(MeshType::Triangle),
            Just(MeshType::Quadrilateral),
            Just(MeshType::Tetrahedron),
            Just(MeshType::Hexahedron),
        ]
        .boxed()
    }
}

impl Arbitrary for EntityCategory {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        ::proptest::sample::select(EntityCategory::ALL.to_vec()).boxed()
    }
}

impl Arbitrary for DofCounts {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        dof_counts(3).boxed()
    }
}

/// Per-entity dof counts with at most `max_dofs_per_entity` dofs in each category.
pub fn dof_counts(max_dofs_per_entity: usize) -> impl Strategy<Value = DofCounts> {
    let range = 0..=max_dofs_per_entity;
    [range.clone(), range.clone(), range.clone(), range].prop_map(DofCounts::from_array)
}

/// Per-entity dof counts for between 1 and `max_fields` fields living on a common mesh type.
///
/// Categories without entities on the chosen mesh type (e.g. edges in 2D) are left empty,
/// so that the basis function counts derived from the mesh type are consistent.
pub fn field_dof_counts(
    max_fields: usize,
    max_dofs_per_entity: usize,
) -> impl Strategy<Value = (MeshType, Vec<DofCounts>)> {
    (any::<MeshType>(), vec(dof_counts(max_dofs_per_entity), 1..=max_fields.max(1))).prop_map(
        |(mesh_type, counts)| {
            let entities = mesh_type.entity_counts();
            let counts = counts
                .into_iter()
                .map(|c| DofCounts::from_array(restrict_to_entities(c, &entities)))
                .collect();
            (mesh_type, counts)
        },
    )
}

fn restrict_to_entities(counts: DofCounts, entities: &DofCounts) -> [usize; 4] {
    let mut restricted = counts.to_array();
    for (category, num_entities) in entities.iter() {
        if num_entities == 0 {
            restricted[category.index()] = 0;
        }
    }
    restricted
}
