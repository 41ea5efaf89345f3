use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use concept_construction::{
    CbOParams, ConceptConstruction, ConstructionError, IterationSide, Parallelism, close_by_one,
};
use formal_concept::Intent;
use formal_context::{BinaryContext, ClosureContext, IntervalContext};
use proptest::prelude::*;

const ANIMALS: [(&str, &[&str]); 16] = [
    ("dove", &["fly"]),
    ("hen", &[]),
    ("duck", &["fly", "swim"]),
    ("goose", &["fly", "swim"]),
    ("owl", &["fly", "hunt"]),
    ("hawk", &["fly", "hunt"]),
    ("eagle", &["fly", "hunt"]),
    ("fox", &["hunt", "run"]),
    ("dog", &["run"]),
    ("wolf", &["hunt", "run"]),
    ("cat", &["hunt", "run"]),
    ("tiger", &["hunt", "run"]),
    ("lion", &["hunt", "run"]),
    ("horse", &["run"]),
    ("zebra", &["run"]),
    ("cow", &["run"]),
];
const MOVES: [&str; 4] = ["fly", "hunt", "run", "swim"];

fn animals() -> BinaryContext {
    let mut builder = BinaryContext::builder()
        .object_names(ANIMALS.iter().map(|(name, _)| *name))
        .attribute_names(MOVES);
    for (g, (_, moves)) in ANIMALS.iter().enumerate() {
        for mv in moves.iter() {
            let m = MOVES.iter().position(|x| x == mv).expect("known move");
            builder = builder.incidence(g, m);
        }
    }
    builder.build().expect("valid context")
}

fn brute_force_extents(ctx: &BinaryContext) -> BTreeSet<Vec<usize>> {
    let m = ctx.n_attributes();
    (0u32..(1 << m))
        .map(|mask| {
            let attrs: Vec<usize> = (0..m).filter(|i| mask & (1 << i) != 0).collect();
            ctx.extension_of(&attrs, None)
        })
        .collect()
}

fn extents_of(ctx: &BinaryContext, side: IterationSide, parallelism: Parallelism) -> Vec<Vec<usize>> {
    ctx.close_by_one(side, parallelism)
        .expect("construction succeeds")
        .iter()
        .map(|c| c.extent().indices().to_vec())
        .collect()
}

#[test]
fn animal_context_closes_to_eight_concepts() {
    let ctx = animals();
    let concepts = ctx
        .close_by_one(IterationSide::Objects, Parallelism::Sequential)
        .expect("construction succeeds");
    assert_eq!(concepts.len(), 8);

    let mut supports: Vec<usize> = concepts.iter().map(|c| c.support()).collect();
    supports.sort_unstable();
    assert_eq!(supports, vec![0, 2, 3, 5, 6, 8, 9, 16]);

    let top = concepts.iter().find(|c| c.support() == 16).expect("top");
    assert!(top.intent().is_empty());
    let bottom = concepts.iter().find(|c| c.support() == 0).expect("bottom");
    assert_eq!(bottom.intent().len(), 4);
    assert!(concepts.iter().all(|c| c.context_hash() == Some(ctx.context_hash())));
}

#[test]
fn animal_context_galois_examples() {
    let ctx = animals();
    let fly_swim = ctx.extension_of(&[0, 3], None);
    let names: Vec<&str> = fly_swim.iter().map(|&g| ctx.object_names()[g].as_str()).collect();
    assert_eq!(names, vec!["duck", "goose"]);
    let dove_goose = ctx.intention(&[0, 3]);
    assert_eq!(dove_goose.names(), &["fly".to_string()]);
}

#[test]
fn both_sides_and_thread_counts_agree() {
    let ctx = animals();
    let threads = NonZeroUsize::new(4).map(Parallelism::Threads).expect("non-zero");
    let mut reference = extents_of(&ctx, IterationSide::Objects, Parallelism::Sequential);
    reference.sort();
    for (side, parallelism) in [
        (IterationSide::Attributes, Parallelism::Sequential),
        (IterationSide::Objects, threads),
        (IterationSide::Attributes, threads),
        (IterationSide::Auto, Parallelism::Sequential),
    ] {
        let mut extents = extents_of(&ctx, side, parallelism);
        extents.sort();
        assert_eq!(extents, reference, "{side} with {} jobs", parallelism.n_jobs());
    }
}

#[test]
fn seeds_resume_with_a_new_element() {
    // closed sets over {0, 1}, then extend with element 2 only
    let ctx = animals().transposed();
    let first = close_by_one(
        &ctx,
        &CbOParams {
            domain: Some(vec![0, 1]),
            ..CbOParams::default()
        },
        Parallelism::Sequential,
    )
    .expect("valid params");
    let seeds: Vec<Vec<usize>> = first.iter().map(|p| p.elements.clone()).collect();
    let resumed = close_by_one(
        &ctx,
        &CbOParams {
            domain: Some(vec![0, 1, 2]),
            initial_combinations: Some(seeds),
            iter_elements_to_check: Some(vec![2]),
        },
        Parallelism::Sequential,
    )
    .expect("valid params");
    let full = close_by_one(
        &ctx,
        &CbOParams {
            domain: Some(vec![0, 1, 2]),
            ..CbOParams::default()
        },
        Parallelism::Sequential,
    )
    .expect("valid params");
    let resumed: BTreeSet<Vec<usize>> = resumed.into_iter().map(|p| p.elements).collect();
    let full: BTreeSet<Vec<usize>> = full.into_iter().map(|p| p.elements).collect();
    assert_eq!(resumed, full);
}

#[test]
fn interval_context_iterates_objects_only() {
    let ctx = IntervalContext::new(
        None,
        None,
        vec![vec![1.0, 5.0], vec![2.0, 4.0], vec![3.0, 4.0]],
    )
    .expect("valid context");
    let concepts = ctx
        .close_by_one(IterationSide::Auto, Parallelism::Sequential)
        .expect("objects are supported");
    let extents: BTreeSet<Vec<usize>> =
        concepts.iter().map(|c| c.extent().indices().to_vec()).collect();
    let expected: BTreeSet<Vec<usize>> = [
        vec![],
        vec![0],
        vec![1],
        vec![2],
        vec![0, 1],
        vec![1, 2],
        vec![0, 1, 2],
    ]
    .into_iter()
    .collect();
    assert_eq!(extents, expected);
    assert!(matches!(
        ctx.close_by_one(IterationSide::Attributes, Parallelism::Sequential),
        Err(ConstructionError::UnsupportedSide(_))
    ));
}

proptest! {
    #[test]
    fn close_by_one_matches_brute_force(
        rows in (0usize..9, 0usize..7).prop_flat_map(|(n, m)| {
            prop::collection::vec(prop::collection::vec(any::<bool>(), m), n)
        }),
        jobs in 1usize..4,
    ) {
        let ctx = BinaryContext::from_bools(&rows).expect("rectangular rows");
        let parallelism = Parallelism::try_from(jobs).expect("positive");
        let expected = brute_force_extents(&ctx);
        for side in [IterationSide::Objects, IterationSide::Attributes] {
            let extents = extents_of(&ctx, side, parallelism);
            let unique: BTreeSet<Vec<usize>> = extents.iter().cloned().collect();
            prop_assert_eq!(unique.len(), extents.len());
            prop_assert_eq!(&unique, &expected);
        }
    }
}
