use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use super::{Presenter, StimulusLayout};
use crate::task::Response;

/// Replays a fixed list of responses and records what was shown.
/// Once the script runs dry every further trial is a miss.
#[derive(Debug, Default)]
pub struct ScriptedPresenter {
    responses: VecDeque<(Response, Option<f64>)>,
    pub instructions: Vec<String>,
    pub layouts: Vec<StimulusLayout>,
    pub feedback: Vec<String>,
    pub closing: Option<String>,
}

impl ScriptedPresenter {
    pub fn new(responses: impl IntoIterator<Item = (Response, Option<f64>)>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Presenter for ScriptedPresenter {
    fn show_instructions(&mut self, text: &str) -> io::Result<()> {
        self.instructions.push(text.to_string());
        Ok(())
    }

    fn show_fixation(&mut self, _duration: Duration) -> io::Result<()> {
        Ok(())
    }

    fn show_stimuli(&mut self, layout: StimulusLayout) -> io::Result<()> {
        self.layouts.push(layout);
        Ok(())
    }

    fn await_response(&mut self, _window: Option<Duration>) -> io::Result<(Response, Option<f64>)> {
        Ok(self
            .responses
            .pop_front()
            .unwrap_or((Response::NoResponse, None)))
    }

    fn show_feedback(&mut self, text: &str, _duration: Duration) -> io::Result<()> {
        self.feedback.push(text.to_string());
        Ok(())
    }

    fn show_closing(&mut self, text: &str, _duration: Duration) -> io::Result<()> {
        self.closing = Some(text.to_string());
        Ok(())
    }
}
