use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use super::reward::sample_reward;
use super::types::{Phase, Shape, Trial};
use super::{TaskError, check_probability};

/// Generation parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialParams {
    pub trials_per_phase: usize,
    pub p_correct: f64,
    pub p_incorrect: f64,
}

impl TrialParams {
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.trials_per_phase == 0 {
            return Err(TaskError::NoTrials);
        }
        check_probability("p_correct", self.p_correct)?;
        check_probability("p_incorrect", self.p_incorrect)?;
        Ok(())
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Trial>, TaskError> {
        build_trials(rng, self.trials_per_phase, self.p_correct, self.p_incorrect)
    }
}

/// Balanced position labels for one phase: `n / 2` ones, the rest zeros,
/// uniformly permuted.
fn shuffled_positions<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<u8> {
    let half = n / 2;
    let mut positions: Vec<u8> = std::iter::repeat_n(1u8, half)
        .chain(std::iter::repeat_n(0u8, n - half))
        .collect();
    positions.shuffle(rng);
    positions
}

/// Builds the full pre/post sequence.
///
/// Randomness is consumed in a fixed order: the pre-reversal shape, the
/// pre positions, the post positions, then correct/incorrect rewards per
/// trial. A seeded generator therefore reproduces the run exactly.
pub fn build_trials<R: Rng + ?Sized>(
    rng: &mut R,
    trials_per_phase: usize,
    p_correct: f64,
    p_incorrect: f64,
) -> Result<Vec<Trial>, TaskError> {
    TrialParams {
        trials_per_phase,
        p_correct,
        p_incorrect,
    }
    .validate()?;

    let shape_pre = *Shape::ALL.choose(rng).unwrap_or(&Shape::Circle);
    let shape_post = shape_pre.complement();

    let pos_pre = shuffled_positions(rng, trials_per_phase);
    let pos_post = shuffled_positions(rng, trials_per_phase);

    let mut trials = Vec::with_capacity(2 * trials_per_phase);
    for (phase, shape, positions) in [
        (Phase::Pre, shape_pre, pos_pre),
        (Phase::Post, shape_post, pos_post),
    ] {
        trials.extend(positions.into_iter().map(|pos| Trial {
            phase,
            correct_shape: shape,
            correct_shape_position: pos,
            correct_reward: 0,
            incorrect_reward: 0,
        }));
    }

    for trial in &mut trials {
        trial.correct_reward = sample_reward(rng, p_correct)?;
        trial.incorrect_reward = sample_reward(rng, p_incorrect)?;
    }

    debug!(
        trials_per_phase,
        shape_pre = %shape_pre,
        shape_post = %shape_post,
        "built trial sequence"
    );
    Ok(trials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn count_left(trials: &[Trial]) -> usize {
        trials
            .iter()
            .filter(|t| t.correct_shape_position == 1)
            .count()
    }

    #[test]
    fn phases_are_ordered_and_balanced() {
        for n in 1..=41 {
            let mut rng = StdRng::seed_from_u64(n as u64);
            let trials = build_trials(&mut rng, n, 0.8, 0.2).unwrap();
            assert_eq!(trials.len(), 2 * n);
            let (pre, post) = trials.split_at(n);
            assert!(pre.iter().all(|t| t.phase == Phase::Pre));
            assert!(post.iter().all(|t| t.phase == Phase::Post));
            assert_eq!(count_left(pre), n / 2, "n={n}");
            assert_eq!(count_left(post), n / 2, "n={n}");
        }
    }

    #[test]
    fn shapes_reverse_between_phases() {
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let trials = build_trials(&mut rng, 5, 0.5, 0.5).unwrap();
            let pre = trials[0].correct_shape;
            assert!(trials[..5].iter().all(|t| t.correct_shape == pre));
            assert!(trials[5..].iter().all(|t| t.correct_shape == pre.complement()));
        }
    }

    #[test]
    fn both_shapes_can_start() {
        let mut seen = [false; 2];
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let trials = build_trials(&mut rng, 2, 0.5, 0.5).unwrap();
            match trials[0].correct_shape {
                Shape::Circle => seen[0] = true,
                Shape::Square => seen[1] = true,
            }
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn certain_rewards_are_fixed() {
        let mut rng = StdRng::seed_from_u64(3);
        let trials = build_trials(&mut rng, 30, 1.0, 0.0).unwrap();
        assert!(trials.iter().all(|t| t.correct_reward == 1));
        assert!(trials.iter().all(|t| t.incorrect_reward == 0));
    }

    #[test]
    fn odd_count_leaves_one_extra_right() {
        let mut rng = StdRng::seed_from_u64(11);
        let trials = build_trials(&mut rng, 7, 0.5, 0.5).unwrap();
        let left = count_left(&trials[..7]);
        assert_eq!(left, 3);
        assert_eq!(7 - left, left + 1);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = build_trials(&mut StdRng::seed_from_u64(99), 30, 0.8, 0.2).unwrap();
        let b = build_trials(&mut StdRng::seed_from_u64(99), 30, 0.8, 0.2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_params() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(build_trials(&mut rng, 0, 0.5, 0.5), Err(TaskError::NoTrials));
        assert!(matches!(
            build_trials(&mut rng, 4, 1.2, 0.5),
            Err(TaskError::ProbabilityOutOfRange {
                name: "p_correct",
                ..
            })
        ));
        assert!(matches!(
            build_trials(&mut rng, 4, 0.5, -0.5),
            Err(TaskError::ProbabilityOutOfRange {
                name: "p_incorrect",
                ..
            })
        ));
    }
}
