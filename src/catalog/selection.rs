use std::cmp::Ordering;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::catalog::question::Question;
use crate::store::RecordId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("there are no enabled questions")]
    NoQuestions,
    #[error("{requested} questions requested but only {available} are enabled")]
    NotEnoughQuestions { requested: usize, available: usize },
    #[error("at least one question must be requested")]
    EmptyRequest,
}

/// Draw one id with probability proportional to its weight.
///
/// Falls back to a uniform draw when every weight is zero. Candidates are
/// re-weighted by the caller before every draw.
pub fn adaptive_pick(candidates: &[(RecordId, f64)], rng: &mut impl Rng) -> Option<RecordId> {
    if candidates.is_empty() {
        return None;
    }
    match WeightedIndex::<f64>::new(candidates.iter().map(|(_, weight)| *weight)) {
        Ok(dist) => Some(candidates[dist.sample(rng)].0),
        Err(_) => candidates.choose(rng).map(|(id, _)| *id),
    }
}

/// `count` distinct ids drawn uniformly from `pool`.
pub fn uniform_sample(
    pool: &[RecordId],
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<RecordId>, SelectionError> {
    if count == 0 {
        return Err(SelectionError::EmptyRequest);
    }
    if pool.is_empty() {
        return Err(SelectionError::NoQuestions);
    }
    if count > pool.len() {
        return Err(SelectionError::NotEnoughQuestions {
            requested: count,
            available: pool.len(),
        });
    }
    Ok(pool.choose_multiple(rng, count).copied().collect())
}

/// Statistics order: best success ratio first (never asked counts as 0),
/// then most asked, then lowest id.
pub fn rank_order(a: (RecordId, &Question), b: (RecordId, &Question)) -> Ordering {
    let ratio = |q: &Question| q.success_ratio().unwrap_or(0.0);
    ratio(b.1)
        .partial_cmp(&ratio(a.1))
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.1.times_asked.cmp(&a.1.times_asked))
        .then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn never_asked_question_is_drawn_more_often_than_mastered_one() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut mastered = Question::free_form("a", "a");
        mastered.times_asked = 10;
        mastered.times_correct = 10;
        let fresh = Question::free_form("b", "b");

        let candidates = [(1, mastered.weight()), (2, fresh.weight())];
        let mut hits = [0usize; 2];
        for _ in 0..1000 {
            match adaptive_pick(&candidates, &mut rng) {
                Some(1) => hits[0] += 1,
                Some(2) => hits[1] += 1,
                other => panic!("unexpected pick {other:?}"),
            }
        }
        assert!(hits[1] > hits[0]);
    }

    #[test]
    fn all_zero_weights_fall_back_to_uniform() {
        let mut rng = SmallRng::seed_from_u64(3);
        let candidates = [(4, 0.0), (9, 0.0)];
        let mut seen = [false; 2];
        for _ in 0..200 {
            match adaptive_pick(&candidates, &mut rng) {
                Some(4) => seen[0] = true,
                Some(9) => seen[1] = true,
                other => panic!("unexpected pick {other:?}"),
            }
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn empty_candidates_pick_nothing() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(adaptive_pick(&[], &mut rng), None);
    }

    #[test]
    fn uniform_sample_returns_distinct_ids() {
        let mut rng = SmallRng::seed_from_u64(11);
        let pool = [1, 2, 3, 5, 8, 13];
        let mut picked = uniform_sample(&pool, 4, &mut rng).unwrap();
        assert_eq!(picked.len(), 4);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|id| pool.contains(id)));
    }

    #[test]
    fn uniform_sample_rejects_bad_counts() {
        let mut rng = SmallRng::seed_from_u64(11);
        assert_eq!(
            uniform_sample(&[1, 2], 3, &mut rng),
            Err(SelectionError::NotEnoughQuestions {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(
            uniform_sample(&[1, 2], 0, &mut rng),
            Err(SelectionError::EmptyRequest)
        );
        assert_eq!(
            uniform_sample(&[], 1, &mut rng),
            Err(SelectionError::NoQuestions)
        );
    }

    #[test]
    fn ranking_prefers_ratio_then_experience_then_id() {
        let stats = |asked, correct| {
            let mut q = Question::free_form("q", "a");
            q.times_asked = asked;
            q.times_correct = correct;
            q
        };
        let mut rows = vec![
            (1, stats(0, 0)),
            (2, stats(4, 2)),
            (3, stats(2, 2)),
            (4, stats(8, 4)),
            (5, stats(0, 0)),
        ];
        rows.sort_by(|a, b| rank_order((a.0, &a.1), (b.0, &b.1)));
        let order: Vec<RecordId> = rows.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![3, 4, 2, 1, 5]);
    }
}
