use rand::Rng;

/// Fisher-Yates shuffle: a uniform random permutation of the slice.
///
/// Walks from the last index down to 1, swapping each position with a
/// uniformly chosen index at or below it. Used independently for the
/// question order and for each question's choice order.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_handles_trivial_slices() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut empty: Vec<u32> = Vec::new();
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec![42];
        shuffle(&mut single, &mut rng);
        assert_eq!(single, vec![42]);
    }

    #[test]
    fn repeated_shuffles_produce_multiple_orderings() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let mut items = vec![1, 2, 3, 4];
            shuffle(&mut items, &mut rng);
            seen.insert(items);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn shuffle_is_roughly_uniform_over_permutations() {
        // 6000 trials over the 6 permutations of 3 elements. Expected count
        // per permutation is 1000 with sigma ~29, so 850..1150 leaves more
        // than 5 sigma of headroom against flakiness while still catching a
        // biased implementation.
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();
        for _ in 0..6000 {
            let mut items = vec![0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }

        assert_eq!(counts.len(), 6, "all permutations should occur");
        for (perm, count) in counts {
            assert!(
                (850..=1150).contains(&count),
                "permutation {perm:?} occurred {count} times"
            );
        }
    }
}
