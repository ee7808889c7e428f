//! Input sources feeding the environment poll.
//!
//! Hardware and windowing back ends implement [`InputSource`]. Two sources ship
//! with the crate:
//!
//! - [`ChannelInput`]: drains signals that any thread sent through an
//!   [`InputSender`] (used by the binary's stdin reader)
//! - [`ScriptedInput`]: replays fixed batches, one per poll (tests and demos)

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// One raw input occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSignal {
    /// Pointer (touch) pressed at a position.
    PointerDown {
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
    },
    /// Pointer (touch) released at a position.
    PointerUp {
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
    },
    /// A key was pressed; lowercase key name such as `"q"` or `"escape"`.
    Key(String),
    /// A rising edge on a digital input pin.
    Edge(u8),
    /// The window system or operator asked the process to stop.
    Quit,
}

/// Something that can be polled for input once per tick.
///
/// Implementations must not block: the loop thread calls this every tick.
pub trait InputSource {
    /// Returns every signal observed since the previous poll, oldest first.
    fn poll(&mut self) -> Vec<InputSignal>;
}

/// Sending side of a [`ChannelInput`]. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<InputSignal>,
}

impl InputSender {
    /// Sends a signal; silently ignored once the runtime has shut down.
    pub fn send(&self, signal: InputSignal) {
        let _ = self.sender.send(signal);
    }
}

/// Input source backed by an mpsc channel.
#[derive(Debug)]
pub struct ChannelInput {
    receiver: Receiver<InputSignal>,
}

impl ChannelInput {
    /// Creates the source and its sender.
    #[must_use]
    pub fn channel() -> (Self, InputSender) {
        let (sender, receiver) = mpsc::channel();
        (Self { receiver }, InputSender { sender })
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self) -> Vec<InputSignal> {
        let mut signals = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => signals.push(signal),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::trace!("input channel disconnected");
                    break;
                }
            }
        }
        signals
    }
}

/// Replays one pre-recorded batch per poll, then nothing.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputSignal>>,
}

impl ScriptedInput {
    /// Creates a script from per-tick batches.
    pub fn new<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<InputSignal>>,
    {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputSignal> {
        self.batches.pop_front().unwrap_or_default()
    }
}

/// Parses one line of operator input, as typed into the binary's stdin.
///
/// Accepted forms: `down X Y`, `up X Y`, `tap X Y` (down then up), `pin N`,
/// `quit`, and any other single word as a key name.
#[must_use]
pub fn parse_command(line: &str) -> Vec<InputSignal> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let point = |x: &str, y: &str| -> Option<(i32, i32)> { Some((x.parse().ok()?, y.parse().ok()?)) };
    match words.as_slice() {
        [] => vec![],
        ["quit"] => vec![InputSignal::Quit],
        ["down", x, y] => point(*x, *y)
            .map(|(x, y)| vec![InputSignal::PointerDown { x, y }])
            .unwrap_or_default(),
        ["up", x, y] => point(*x, *y)
            .map(|(x, y)| vec![InputSignal::PointerUp { x, y }])
            .unwrap_or_default(),
        ["tap", x, y] => point(*x, *y)
            .map(|(x, y)| {
                vec![
                    InputSignal::PointerDown { x, y },
                    InputSignal::PointerUp { x, y },
                ]
            })
            .unwrap_or_default(),
        ["pin", n] => n
            .parse()
            .map(|pin| vec![InputSignal::Edge(pin)])
            .unwrap_or_default(),
        [key] => vec![InputSignal::Key(key.to_lowercase())],
        _ => {
            tracing::debug!(line = %line, "unrecognised input command");
            vec![]
        }
    }
}
