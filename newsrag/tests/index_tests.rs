//! Property tests for flat index search ordering.

use newsrag::document::Neighbor;
use newsrag::index::{DistanceMetric, FlatIndex, VectorIndex};
use proptest::prelude::*;

/// Generate an embedding of the given dimension with small integer-valued
/// coordinates, so that exact distance ties actually occur.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec((-3i8..=3).prop_map(f32::from), dim)
}

fn arb_metric() -> impl Strategy<Value = DistanceMetric> {
    prop_oneof![
        Just(DistanceMetric::SquaredEuclidean),
        Just(DistanceMetric::Euclidean),
        Just(DistanceMetric::InnerProduct),
        Just(DistanceMetric::Cosine),
    ]
}

fn is_sorted(hits: &[Neighbor]) -> bool {
    hits.windows(2).all(|w| {
        w[0].distance < w[1].distance
            || (w[0].distance == w[1].distance && w[0].position < w[1].position)
    })
}

/// *For any* set of vectors and any query, searching SHALL return at most
/// `min(k, len)` hits, ordered by ascending distance with ties broken by
/// lower position, each position referring to an indexed vector.
mod prop_flat_index_search_ordering {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_ascending_and_bounded_by_k(
            vectors in proptest::collection::vec(arb_embedding(DIM), 0..20),
            query in arb_embedding(DIM),
            metric in arb_metric(),
            k in 0usize..25,
        ) {
            let count = vectors.len();
            let index = FlatIndex::build(vectors, metric).unwrap();
            let hits = index.search(&query, k).unwrap();

            prop_assert_eq!(hits.len(), k.min(count));
            prop_assert!(hits.iter().all(|h| h.position < count));
            prop_assert!(is_sorted(&hits), "hits out of order: {:?}", hits);
        }

        #[test]
        fn repeated_searches_are_identical(
            vectors in proptest::collection::vec(arb_embedding(DIM), 1..20),
            query in arb_embedding(DIM),
            k in 1usize..25,
        ) {
            let index = FlatIndex::build(vectors, DistanceMetric::default()).unwrap();
            prop_assert_eq!(index.search(&query, k).unwrap(), index.search(&query, k).unwrap());
        }

        #[test]
        fn top_hits_are_a_prefix_of_longer_searches(
            vectors in proptest::collection::vec(arb_embedding(DIM), 1..20),
            query in arb_embedding(DIM),
            k in 1usize..20,
        ) {
            let index = FlatIndex::build(vectors, DistanceMetric::default()).unwrap();
            let short = index.search(&query, k).unwrap();
            let all = index.search(&query, index.len()).unwrap();
            prop_assert_eq!(&all[..short.len()], &short[..]);
        }
    }
}

#[test]
fn exact_match_is_nearest_under_every_metric() {
    let vectors = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
    for metric in [
        DistanceMetric::SquaredEuclidean,
        DistanceMetric::Euclidean,
        DistanceMetric::InnerProduct,
        DistanceMetric::Cosine,
    ] {
        let index = FlatIndex::build(vectors.clone(), metric).unwrap();
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 1).unwrap()[0].position, 1, "{metric:?}");
    }
}
