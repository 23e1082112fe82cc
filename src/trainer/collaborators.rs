use std::{io, sync::Arc};

use parking_lot::Mutex;

use crate::{
    neural_net::{Network, Rect},
    KeyIdentifier,
};

/// What the sampler must capture for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleRequest {
    pub region: Rect,
    /// Sub region sampled at a finer granularity within the same grid.
    pub focus: Option<Rect>,
    pub width: usize,
    pub height: usize,
}

impl SampleRequest {
    pub fn for_network(net: &Network) -> Self {
        Self {
            region: net.region(),
            focus: net.focus(),
            width: net.input_width(),
            height: net.input_height(),
        }
    }
}

/// Captures the screen as a row major grid of grayscale intensities.
pub trait ScreenSampler: Send {
    /// # Returns
    /// `width * height` intensities in `0..=255`.
    fn sample(&mut self, request: &SampleRequest) -> io::Result<Vec<u8>>;
}

/// Turns output labels into keyboard and mouse effects.
pub trait ActionEmitter: Send {
    fn press(&mut self, key: KeyIdentifier) -> io::Result<()>;
    fn release(&mut self, key: KeyIdentifier) -> io::Result<()>;
    fn click_at(&mut self, x: i32, y: i32) -> io::Result<()>;
}

/// A global key hook reporting presses and releases into a `LabelSink`.
pub trait KeyObserver: Send {
    fn register(&mut self, sink: LabelSink) -> io::Result<()>;
    fn unregister(&mut self);
}

/// The key currently held by the human, shared between a key hook and the training loop.
///
/// Only keys that label one of the network's outputs are recorded, any release clears it.
#[derive(Clone, Debug)]
pub struct LabelSink {
    watched: Arc<[KeyIdentifier]>,
    pressed: Arc<Mutex<Option<KeyIdentifier>>>,
}

impl LabelSink {
    pub fn new(watched: impl IntoIterator<Item = KeyIdentifier>) -> Self {
        Self {
            watched: watched.into_iter().collect(),
            pressed: Arc::new(Mutex::new(None)),
        }
    }

    pub fn on_press(&self, key: KeyIdentifier) {
        if self.watched.contains(&key) {
            *self.pressed.lock() = Some(key);
        }
    }

    pub fn on_release(&self) {
        *self.pressed.lock() = None;
    }

    /// The held key, `None` meaning "no action".
    pub fn current(&self) -> Option<KeyIdentifier> {
        *self.pressed.lock()
    }
}

/// The outside world a session talks to. Handed to the scheduler while idle and owned by the
/// loop while running.
pub struct Collaborators {
    pub sampler: Box<dyn ScreenSampler>,
    pub emitter: Box<dyn ActionEmitter>,
    pub observer: Box<dyn KeyObserver>,
}

impl Collaborators {
    pub fn new(
        sampler: impl ScreenSampler + 'static,
        emitter: impl ActionEmitter + 'static,
        observer: impl KeyObserver + 'static,
    ) -> Self {
        Self {
            sampler: Box::new(sampler),
            emitter: Box::new(emitter),
            observer: Box::new(observer),
        }
    }
}
