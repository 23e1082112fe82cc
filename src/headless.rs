//! Collaborators that need no desktop: a recorded session replayed frame by frame and an
//! emitter that only logs. They let networks be trained and exercised from the command line.

use std::{fs::File, io, path::Path, sync::Arc};

use csv::ReaderBuilder;
use log::info;
use parking_lot::Mutex;

use crate::{
    trainer::{ActionEmitter, KeyObserver, LabelSink, SampleRequest, ScreenSampler},
    KeyIdentifier, NetErr, Result,
};

/// The label column value of frames where nothing was pressed.
const NO_ACTION: &str = "NONE";

#[derive(Clone, Debug, PartialEq)]
struct Frame {
    label: Option<KeyIdentifier>,
    pixels: Vec<u8>,
}

#[derive(Debug)]
struct Playback {
    frames: Vec<Frame>,
    next: usize,
    sink: Option<LabelSink>,
}

/// A recorded session: one row per frame, the held key (or `NONE`) followed by the grid's
/// intensities in row major order. Frames are replayed in a loop.
#[derive(Clone, Debug)]
pub struct Recording {
    playback: Arc<Mutex<Playback>>,
}

impl Recording {
    /// Loads a recording whose frames all hold `pixels` intensities.
    pub fn load(path: impl AsRef<Path>, pixels: usize) -> Result<Self> {
        Self::from_reader(File::open(path)?, pixels)
    }

    pub fn from_reader<R: io::Read>(reader: R, pixels: usize) -> Result<Self> {
        let mut rows = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut frames = Vec::new();
        for row in rows.records() {
            let row = row?;
            let line = row.position().map_or(0, |p| p.line());
            let malformed = |reason: String| NetErr::Malformed { line, reason };

            let label = match row.get(0).map(str::trim) {
                None | Some(NO_ACTION) => None,
                Some(name) => Some(name.parse()?),
            };

            let pixels_row = row
                .iter()
                .skip(1)
                .map(|v| {
                    v.trim()
                        .parse::<u8>()
                        .map_err(|_| malformed(format!("invalid intensity '{v}'")))
                })
                .collect::<Result<Vec<_>>>()?;

            if pixels_row.len() != pixels {
                return Err(malformed(format!(
                    "frame has {} intensities, expected {pixels}",
                    pixels_row.len()
                )));
            }

            frames.push(Frame {
                label,
                pixels: pixels_row,
            });
        }

        if frames.is_empty() {
            return Err(NetErr::Malformed {
                line: 0,
                reason: "the recording has no frames".into(),
            });
        }

        info!("loaded a recording of {} frames", frames.len());
        Ok(Self {
            playback: Arc::new(Mutex::new(Playback {
                frames,
                next: 0,
                sink: None,
            })),
        })
    }

    pub fn len(&self) -> usize {
        self.playback.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sampler half, replays the frames.
    pub fn sampler(&self) -> ReplaySampler {
        ReplaySampler(self.clone())
    }

    /// The key observer half, replays the labels of the frames the sampler hands out.
    pub fn observer(&self) -> ReplayObserver {
        ReplayObserver(self.clone())
    }
}

pub struct ReplaySampler(Recording);

impl ScreenSampler for ReplaySampler {
    fn sample(&mut self, request: &SampleRequest) -> io::Result<Vec<u8>> {
        let mut playback = self.0.playback.lock();
        let i = playback.next;
        playback.next = (i + 1) % playback.frames.len();

        let frame = playback.frames[i].clone();
        if frame.pixels.len() != request.width * request.height {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "recorded frame has {} intensities, the network samples {}x{}",
                    frame.pixels.len(),
                    request.width,
                    request.height
                ),
            ));
        }

        if let Some(sink) = &playback.sink {
            match frame.label {
                Some(key) => sink.on_press(key),
                None => sink.on_release(),
            }
        }

        Ok(frame.pixels)
    }
}

pub struct ReplayObserver(Recording);

impl KeyObserver for ReplayObserver {
    fn register(&mut self, sink: LabelSink) -> io::Result<()> {
        self.0.playback.lock().sink = Some(sink);
        Ok(())
    }

    fn unregister(&mut self) {
        self.0.playback.lock().sink = None;
    }
}

/// Logs every action instead of performing it.
#[derive(Debug, Default)]
pub struct LoggingEmitter;

impl ActionEmitter for LoggingEmitter {
    fn press(&mut self, key: KeyIdentifier) -> io::Result<()> {
        info!("press {key}");
        Ok(())
    }

    fn release(&mut self, key: KeyIdentifier) -> io::Result<()> {
        info!("release {key}");
        Ok(())
    }

    fn click_at(&mut self, x: i32, y: i32) -> io::Result<()> {
        info!("click at ({x}, {y})");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural_net::Rect;

    fn request() -> SampleRequest {
        SampleRequest {
            region: Rect::new(0, 0, 2, 1),
            focus: None,
            width: 2,
            height: 1,
        }
    }

    #[test]
    fn replays_frames_and_labels_in_a_loop() {
        let recording = Recording::from_reader("VK_A,1,2\nNONE,3,4\n".as_bytes(), 2).unwrap();
        let mut sampler = recording.sampler();
        let mut observer = recording.observer();
        let sink = LabelSink::new([KeyIdentifier::A]);
        observer.register(sink.clone()).unwrap();

        assert_eq!(sampler.sample(&request()).unwrap(), vec![1, 2]);
        assert_eq!(sink.current(), Some(KeyIdentifier::A));

        assert_eq!(sampler.sample(&request()).unwrap(), vec![3, 4]);
        assert_eq!(sink.current(), None);

        assert_eq!(sampler.sample(&request()).unwrap(), vec![1, 2]);
    }

    #[test]
    fn rejects_frames_of_the_wrong_size() {
        let err = Recording::from_reader("VK_A,1,2,3\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, NetErr::Malformed { line: 1, .. }));
    }

    #[test]
    fn rejects_out_of_range_intensities() {
        assert!(Recording::from_reader("NONE,1,256\n".as_bytes(), 2).is_err());
    }
}
