//! Property tests for the hashing embedding provider.

use newsrag::embedding::EmbeddingProvider;
use newsrag::hashing::HashingEmbeddingProvider;
use proptest::prelude::*;

/// *For any* texts `a` and `b`, embedding the batch `[a, b]` SHALL produce
/// the same first vector as embedding `[a]`, and repeated calls SHALL
/// produce identical vectors.
mod prop_hashing_batch_invariance {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn batch_matches_single(a in "[A-Za-z ,.?]{0,60}", b in "[A-Za-z ,.?]{0,60}") {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (pair, single, again) = rt.block_on(async {
                let provider = HashingEmbeddingProvider::new(128);
                let pair = provider.embed_batch(&[a.as_str(), b.as_str()]).await.unwrap();
                let single = provider.embed_batch(&[a.as_str()]).await.unwrap();
                let again = provider.embed(&a).await.unwrap();
                (pair, single, again)
            });

            prop_assert_eq!(pair.len(), 2);
            prop_assert_eq!(&pair[0], &single[0]);
            prop_assert_eq!(&single[0], &again);
        }

        #[test]
        fn vectors_have_fixed_dimension(text in ".{0,80}", dims in 1usize..512) {
            let provider = HashingEmbeddingProvider::new(dims);
            prop_assert_eq!(provider.embed_text(&text).len(), dims);
        }
    }
}

#[tokio::test]
async fn shared_words_are_closer_than_disjoint_words() {
    let provider = HashingEmbeddingProvider::default();
    let query = provider.embed("Tokyo Olympics").await.unwrap();
    let related = provider.embed("The Olympics were held in Tokyo.").await.unwrap();
    let unrelated = provider.embed("An infrastructure bill was passed in Congress.").await.unwrap();

    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&query, &related) > dot(&query, &unrelated));
}
