use super::types::{Response, Side, Trial, TrialResult};

/// 1 when the chosen side holds the correct shape. No response scores 0.
pub fn is_correct(response: Response, correct_shape_position: u8) -> u8 {
    u8::from(response.side() == Some(Side::of_position(correct_shape_position)))
}

/// Pays the reward of whichever branch applies: `correct_reward` on a
/// correct answer, `incorrect_reward` otherwise.
pub fn is_rewarded(correct: u8, correct_reward: u8, incorrect_reward: u8) -> u8 {
    if correct == 1 {
        correct_reward
    } else {
        incorrect_reward
    }
}

pub fn feedback_text(rewarded: u8, response_time: Option<f64>) -> String {
    match response_time {
        Some(_) => format!("+ {}", u32::from(rewarded) * 100),
        None => "Too slow!\n\n+ 0".to_string(),
    }
}

/// Scores a trial against the participant's response.
pub fn score(
    trial_nr: usize,
    trial: &Trial,
    response: Response,
    response_time: Option<f64>,
) -> TrialResult {
    let correct = u8::from(response.side() == Some(trial.correct_side()));
    let rewarded = is_rewarded(correct, trial.correct_reward, trial.incorrect_reward);
    TrialResult {
        trial_nr,
        phase: trial.phase,
        correct_shape: trial.correct_shape,
        correct_shape_position: trial.correct_shape_position,
        correct_reward: trial.correct_reward,
        incorrect_reward: trial.incorrect_reward,
        response,
        correct,
        rewarded,
        response_time: match response {
            Response::NoResponse => None,
            _ => response_time,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::types::{Phase, Shape};

    #[test]
    fn correctness_table() {
        assert_eq!(is_correct(Response::Left, 1), 1);
        assert_eq!(is_correct(Response::Right, 0), 1);
        assert_eq!(is_correct(Response::Left, 0), 0);
        assert_eq!(is_correct(Response::Right, 1), 0);
        assert_eq!(is_correct(Response::NoResponse, 0), 0);
        assert_eq!(is_correct(Response::NoResponse, 1), 0);
    }

    #[test]
    fn score_marks_the_side_holding_the_correct_shape() {
        for pos in 0..=1u8 {
            let trial = Trial {
                phase: Phase::Pre,
                correct_shape: Shape::Circle,
                correct_shape_position: pos,
                correct_reward: 1,
                incorrect_reward: 0,
            };
            for response in [Response::Left, Response::Right, Response::NoResponse] {
                let result = score(0, &trial, response, Some(0.3));
                let expected = u8::from(response.side() == Some(trial.correct_side()));
                assert_eq!(result.correct, expected, "pos={pos} response={response}");
                assert_eq!(result.correct, is_correct(response, pos));
            }
        }
    }

    #[test]
    fn reward_rule_matches_weighted_sum() {
        for c in 0..=1u8 {
            for cr in 0..=1u8 {
                for ir in 0..=1u8 {
                    let expected = c * cr + (1 - c) * ir;
                    assert_eq!(is_rewarded(c, cr, ir), expected, "c={c} cr={cr} ir={ir}");
                }
            }
        }
    }

    #[test]
    fn feedback_interpolates_points() {
        assert_eq!(feedback_text(1, Some(0.4)), "+ 100");
        assert_eq!(feedback_text(0, Some(0.4)), "+ 0");
        assert_eq!(feedback_text(1, None), "Too slow!\n\n+ 0");
    }

    #[test]
    fn missed_trial_can_still_pay_incorrect_reward() {
        let trial = Trial {
            phase: Phase::Post,
            correct_shape: Shape::Square,
            correct_shape_position: 0,
            correct_reward: 0,
            incorrect_reward: 1,
        };
        let result = score(3, &trial, Response::NoResponse, Some(1.0));
        assert_eq!(result.correct, 0);
        assert_eq!(result.rewarded, 1);
        assert_eq!(result.response_time, None);
    }
}
