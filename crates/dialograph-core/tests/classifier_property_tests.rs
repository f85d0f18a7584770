use dialograph_core::{
    edit_distance, Candidate, Classifier, LevenshteinClassifier, LevenshteinVector, Name, StateId,
};
use proptest::prelude::*;

fn phrase() -> impl Strategy<Value = String> {
    // Small alphabet so near-misses are common.
    proptest::string::string_regex("[абвгд ]{1,8}").unwrap()
}

fn candidates() -> impl Strategy<Value = Vec<Vec<String>>> {
    proptest::collection::vec(proptest::collection::vec(phrase(), 0..4), 1..5)
}

fn build(synonym_lists: &[Vec<String>]) -> Vec<Candidate> {
    synonym_lists
        .iter()
        .enumerate()
        .map(|(idx, synonyms)| {
            let mut vector = LevenshteinVector::new(Name::new(format!("v{idx}")).unwrap());
            for s in synonyms {
                // duplicates (after trimming) are rejected; skip them
                let _ = vector.add_synonym(s.clone());
            }
            Candidate {
                vector: vector.into(),
                target: StateId::new(idx as u64),
            }
        })
        .collect()
}

fn min_distance(candidate: &Candidate, input: &str) -> Option<usize> {
    let input: Vec<char> = input.to_lowercase().chars().collect();
    candidate.vector.distance(&input)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_accepts_iff_best_distance_below_half_length(lists in candidates(), input in phrase()) {
        let candidates = build(&lists);
        let classifier = LevenshteinClassifier::default();
        let n = input.chars().count();

        let best = candidates
            .iter()
            .filter_map(|c| min_distance(c, &input).map(|d| (d, c.target)))
            .fold(None, |acc: Option<(usize, StateId)>, (d, t)| match acc {
                Some((bd, _)) if bd <= d => acc,
                _ => Some((d, t)),
            });

        match (best, classifier.classify(&input, &candidates)) {
            (Some((d, target)), Ok(got)) => {
                prop_assert!(2 * d < n);
                prop_assert_eq!(got, target);
            }
            (Some((d, _)), Err(err)) => {
                prop_assert!(err.is_no_match());
                prop_assert!(2 * d >= n);
            }
            (None, result) => prop_assert!(result.is_err()),
        }
    }

    #[test]
    fn test_exact_synonym_wins_with_zero_distance(
        lists in candidates(),
        input in "[абвгд]{1,8}",
        pick in any::<prop::sample::Index>(),
    ) {
        let k = pick.index(lists.len());
        let mut lists = lists;
        lists[k].push(input.clone());
        let candidates = build(&lists);
        prop_assert_eq!(min_distance(&candidates[k], &input), Some(0));

        // the winner is the first candidate at distance zero, never later than `k`
        let first_exact = candidates
            .iter()
            .position(|c| min_distance(c, &input) == Some(0))
            .unwrap();
        prop_assert!(first_exact <= k);

        let got = LevenshteinClassifier::default()
            .classify(&input, &candidates)
            .unwrap();
        prop_assert_eq!(got, candidates[first_exact].target);
    }

    #[test]
    fn test_edit_distance_is_symmetric_and_bounded(a in phrase(), b in phrase()) {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let d = edit_distance(&a, &b);
        prop_assert_eq!(d, edit_distance(&b, &a));
        prop_assert!(d <= a.len().max(b.len()));
        prop_assert!(d >= a.len().abs_diff(b.len()));
    }
}
