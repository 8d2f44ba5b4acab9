use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use tracing::warn;

use super::{Presenter, StimulusLayout};
use crate::task::{Response, Shape};

const LEFT_KEY: &str = "f";
const RIGHT_KEY: &str = "j";

fn glyph(shape: Shape) -> &'static str {
    match shape {
        Shape::Circle => "( O )",
        Shape::Square => "[ # ]",
    }
}

fn eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")
}

/// Text stand-in for the stimulus window. Input lines arrive from a reader
/// thread so the response window can time out.
pub struct TerminalPresenter<W: Write> {
    out: W,
    lines: Receiver<String>,
    onset: Option<Instant>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new<R>(input: R, out: W) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = unbounded::<String>();
        thread::spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            out,
            lines: rx,
            onset: None,
        }
    }

    fn clear(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    fn parse_key(line: &str) -> Option<Response> {
        match line.trim().to_ascii_lowercase().as_str() {
            LEFT_KEY => Some(Response::Left),
            RIGHT_KEY => Some(Response::Right),
            _ => None,
        }
    }
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdio() -> Self {
        let stdin = io::BufReader::new(io::stdin());
        Self::new(stdin, io::stdout())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn show_instructions(&mut self, text: &str) -> io::Result<()> {
        self.clear()?;
        writeln!(self.out, "{text}")?;
        writeln!(self.out, "\n        .")?;
        self.out.flush()?;
        self.lines.recv().map(|_| ()).map_err(|_| eof())
    }

    fn show_fixation(&mut self, duration: Duration) -> io::Result<()> {
        self.clear()?;
        writeln!(self.out, "        .")?;
        self.out.flush()?;
        thread::sleep(duration);
        Ok(())
    }

    fn show_stimuli(&mut self, layout: StimulusLayout) -> io::Result<()> {
        self.clear()?;
        writeln!(
            self.out,
            "{}        {}    [{LEFT_KEY}] / [{RIGHT_KEY}]",
            glyph(layout.left),
            glyph(layout.right)
        )?;
        self.out.flush()?;
        // keys typed before onset do not count for this trial
        while self.lines.try_recv().is_ok() {}
        self.onset = Some(Instant::now());
        Ok(())
    }

    fn await_response(&mut self, window: Option<Duration>) -> io::Result<(Response, Option<f64>)> {
        let onset = self.onset.take().unwrap_or_else(Instant::now);
        let deadline = window.map(|w| onset + w);
        loop {
            let line = match deadline {
                None => self.lines.recv().map_err(|_| eof())?,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.lines.recv_timeout(remaining) {
                        Ok(line) => line,
                        Err(RecvTimeoutError::Timeout) => return Ok((Response::NoResponse, None)),
                        Err(RecvTimeoutError::Disconnected) => return Err(eof()),
                    }
                }
            };
            match Self::parse_key(&line) {
                Some(response) => {
                    return Ok((response, Some(onset.elapsed().as_secs_f64())));
                }
                None => warn!(input = %line.trim(), "ignoring key outside [f, j]"),
            }
        }
    }

    fn show_feedback(&mut self, text: &str, duration: Duration) -> io::Result<()> {
        self.clear()?;
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        thread::sleep(duration);
        Ok(())
    }

    fn show_closing(&mut self, text: &str, duration: Duration) -> io::Result<()> {
        self.clear()?;
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        thread::sleep(duration);
        Ok(())
    }
}
