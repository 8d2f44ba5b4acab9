use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Pre,
    Post,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Pre, Phase::Post];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Post => "post",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Circle,
    Square,
}

impl Shape {
    pub const ALL: [Shape; 2] = [Shape::Circle, Shape::Square];

    pub fn complement(self) -> Shape {
        match self {
            Shape::Circle => Shape::Square,
            Shape::Square => Shape::Circle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Screen side encoded by a `correct_shape_position` label.
    pub fn of_position(position: u8) -> Side {
        if position == 1 { Side::Left } else { Side::Right }
    }
}

/// Participant answer for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Left,
    Right,
    NoResponse,
}

impl Response {
    pub fn side(self) -> Option<Side> {
        match self {
            Response::Left => Some(Side::Left),
            Response::Right => Some(Side::Right),
            Response::NoResponse => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Response::Left => "left",
            Response::Right => "right",
            Response::NoResponse => "no response",
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        })*
    };
}

display_via_as_str!(Phase, Shape, Response);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} label {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseLabelError {}

impl FromStr for Phase {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pre" => Ok(Phase::Pre),
            "post" => Ok(Phase::Post),
            other => Err(ParseLabelError {
                kind: "phase",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Shape {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "circle" => Ok(Shape::Circle),
            "square" => Ok(Shape::Square),
            other => Err(ParseLabelError {
                kind: "shape",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Response {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left" => Ok(Response::Left),
            "right" => Ok(Response::Right),
            "no response" => Ok(Response::NoResponse),
            other => Err(ParseLabelError {
                kind: "response",
                value: other.to_string(),
            }),
        }
    }
}

/// One pre-generated trial. Immutable once the sequence is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    pub phase: Phase,
    pub correct_shape: Shape,
    /// 1 puts the correct shape on the left.
    pub correct_shape_position: u8,
    pub correct_reward: u8,
    pub incorrect_reward: u8,
}

impl Trial {
    pub fn correct_side(&self) -> Side {
        Side::of_position(self.correct_shape_position)
    }
}

/// One logged row: the trial plus what the participant did.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub trial_nr: usize,
    pub phase: Phase,
    pub correct_shape: Shape,
    pub correct_shape_position: u8,
    pub correct_reward: u8,
    pub incorrect_reward: u8,
    pub response: Response,
    pub correct: u8,
    pub rewarded: u8,
    /// Seconds from stimulus onset; `None` when the window ran out.
    pub response_time: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_complement_is_involutive() {
        for shape in Shape::ALL {
            assert_ne!(shape, shape.complement());
            assert_eq!(shape, shape.complement().complement());
        }
    }

    #[test]
    fn labels_parse_back() {
        for phase in Phase::ALL {
            assert_eq!(phase.to_string().parse::<Phase>(), Ok(phase));
        }
        for shape in Shape::ALL {
            assert_eq!(shape.to_string().parse::<Shape>(), Ok(shape));
        }
        for r in [Response::Left, Response::Right, Response::NoResponse] {
            assert_eq!(r.to_string().parse::<Response>(), Ok(r));
        }
        assert!("triangle".parse::<Shape>().is_err());
    }

    #[test]
    fn position_one_means_left() {
        let trial = Trial {
            phase: Phase::Pre,
            correct_shape: Shape::Circle,
            correct_shape_position: 1,
            correct_reward: 0,
            incorrect_reward: 0,
        };
        assert_eq!(trial.correct_side(), Side::Left);
        let trial = Trial {
            correct_shape_position: 0,
            ..trial
        };
        assert_eq!(trial.correct_side(), Side::Right);
    }
}
