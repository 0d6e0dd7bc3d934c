use std::collections::HashSet;
use std::hash::Hash;

/// Removes repeated identifiers, keeping the first occurrence of each
///
/// Surviving elements keep their relative order.
pub fn dedup_ids<T>(ids: impl IntoIterator<Item = T>) -> Vec<T>
where
    T: Eq + Hash + Copy,
{
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_occurrence() {
        assert_eq!(dedup_ids(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_ids(Vec::<i64>::new()).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let samples: Vec<Vec<i64>> = vec![
            vec![],
            vec![1],
            vec![5, 5, 5],
            vec![1, 2, 3],
            vec![9, 8, 9, 7, 8, 6, 9],
        ];

        for sample in samples {
            let once = dedup_ids(sample.clone());
            assert_eq!(dedup_ids(once.clone()), once);
        }
    }

    #[test]
    fn test_output_has_same_distinct_elements() {
        let input = vec![4, 2, 4, 8, 2, 1];
        let output = dedup_ids(input.clone());

        let input_set: HashSet<_> = input.into_iter().collect();
        let output_set: HashSet<_> = output.iter().copied().collect();

        assert_eq!(input_set, output_set);
        assert_eq!(output.len(), output_set.len());
    }
}
