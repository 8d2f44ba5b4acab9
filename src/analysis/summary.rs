use std::collections::BTreeMap;

use super::dataset::Dataset;
use crate::task::Phase;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseAccuracy {
    pub phase: Phase,
    pub accuracy: f64,
    pub n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RtCell {
    pub phase: Phase,
    pub correct: u8,
    pub mean_rt: f64,
    pub n: usize,
}

/// Moving-average accuracy per trial index, averaged over subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyCurve {
    pub window: usize,
    pub points: Vec<(usize, f64)>,
    /// Last pre-reversal trial index.
    pub reversal_trial: Option<usize>,
}

/// Trailing mean over `window` values. The first `window - 1` slots have
/// no full window and stay `None`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    out
}

#[derive(Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn value(&self) -> f64 {
        if self.n == 0 { 0.0 } else { self.sum / self.n as f64 }
    }
}

impl Dataset {
    /// Mean `correct` per phase, misses included.
    pub fn accuracy_by_phase(&self) -> Vec<PhaseAccuracy> {
        let mut groups: BTreeMap<Phase, Mean> = BTreeMap::new();
        for row in &self.rows {
            groups
                .entry(row.result.phase)
                .or_default()
                .push(f64::from(row.result.correct));
        }
        groups
            .into_iter()
            .map(|(phase, m)| PhaseAccuracy {
                phase,
                accuracy: m.value(),
                n: m.n,
            })
            .collect()
    }

    /// Rolling accuracy per subject (trials in `trial_nr` order), then the
    /// mean across subjects at each trial index that has a full window.
    pub fn accuracy_curve(&self, window: usize) -> AccuracyCurve {
        let mut per_subject: BTreeMap<&str, Vec<(usize, f64)>> = BTreeMap::new();
        for row in &self.rows {
            per_subject
                .entry(row.subject.as_str())
                .or_default()
                .push((row.result.trial_nr, f64::from(row.result.correct)));
        }

        let mut by_trial: BTreeMap<usize, Mean> = BTreeMap::new();
        for trials in per_subject.values_mut() {
            trials.sort_by_key(|(nr, _)| *nr);
            let correct: Vec<f64> = trials.iter().map(|(_, c)| *c).collect();
            for ((nr, _), avg) in trials.iter().zip(moving_average(&correct, window)) {
                if let Some(avg) = avg {
                    by_trial.entry(*nr).or_default().push(avg);
                }
            }
        }

        let reversal_trial = self
            .rows
            .iter()
            .filter(|r| r.result.phase == Phase::Pre)
            .map(|r| r.result.trial_nr)
            .max();

        AccuracyCurve {
            window,
            points: by_trial.into_iter().map(|(nr, m)| (nr, m.value())).collect(),
            reversal_trial,
        }
    }

    /// Mean response time per (phase, correct); missed trials are skipped.
    pub fn response_time_by_phase_and_correct(&self) -> Vec<RtCell> {
        let mut groups: BTreeMap<(Phase, u8), Mean> = BTreeMap::new();
        for row in &self.rows {
            if let Some(rt) = row.result.response_time {
                groups
                    .entry((row.result.phase, row.result.correct))
                    .or_default()
                    .push(rt);
            }
        }
        groups
            .into_iter()
            .map(|((phase, correct), m)| RtCell {
                phase,
                correct,
                mean_rt: m.value(),
                n: m.n,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Response, Shape, TrialResult};
    use approx::assert_relative_eq;

    fn row(nr: usize, phase: Phase, correct: u8, rt: Option<f64>) -> TrialResult {
        TrialResult {
            trial_nr: nr,
            phase,
            correct_shape: Shape::Circle,
            correct_shape_position: 1,
            correct_reward: 1,
            incorrect_reward: 0,
            response: if rt.is_some() {
                Response::Left
            } else {
                Response::NoResponse
            },
            correct,
            rewarded: correct,
            response_time: rt,
        }
    }

    #[test]
    fn moving_average_fills_after_window() {
        let v = [1.0, 0.0, 1.0, 1.0, 0.0];
        let avg = moving_average(&v, 3);
        assert_eq!(avg[0], None);
        assert_eq!(avg[1], None);
        assert_relative_eq!(avg[2].unwrap(), 2.0 / 3.0);
        assert_relative_eq!(avg[3].unwrap(), 2.0 / 3.0);
        assert_relative_eq!(avg[4].unwrap(), 2.0 / 3.0);
        assert!(moving_average(&v, 10).iter().all(Option::is_none));
    }

    #[test]
    fn summaries_group_correctly() {
        let mut data = Dataset::default();
        data.extend(
            "a",
            vec![
                row(0, Phase::Pre, 1, Some(0.4)),
                row(1, Phase::Pre, 0, Some(0.8)),
                row(2, Phase::Post, 0, None),
                row(3, Phase::Post, 1, Some(0.6)),
            ],
        );
        data.extend(
            "b",
            vec![
                row(0, Phase::Pre, 1, Some(0.2)),
                row(1, Phase::Pre, 1, Some(0.4)),
                row(2, Phase::Post, 0, Some(1.0)),
                row(3, Phase::Post, 0, Some(1.2)),
            ],
        );

        let acc = data.accuracy_by_phase();
        assert_eq!(acc.len(), 2);
        assert_eq!(acc[0].phase, Phase::Pre);
        assert_relative_eq!(acc[0].accuracy, 0.75);
        assert_relative_eq!(acc[1].accuracy, 0.25);

        let rt = data.response_time_by_phase_and_correct();
        let post_wrong = rt
            .iter()
            .find(|c| c.phase == Phase::Post && c.correct == 0)
            .unwrap();
        assert_eq!(post_wrong.n, 2);
        assert_relative_eq!(post_wrong.mean_rt, 1.1);

        let curve = data.accuracy_curve(2);
        assert_eq!(curve.reversal_trial, Some(1));
        assert_eq!(curve.points.len(), 3);
        assert_eq!(curve.points[0].0, 1);
        assert_relative_eq!(curve.points[0].1, 0.75);
    }
}
