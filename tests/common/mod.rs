#![allow(dead_code)]

use std::{io, path::PathBuf, sync::Arc};

use parking_lot::Mutex;

use neural_pilot::{
    neural_net::ParamInit,
    trainer::{
        ActionEmitter, Collaborators, KeyObserver, LabelSink, SampleRequest, ScreenSampler,
        TrainerConfig,
    },
    KeyIdentifier, NetKind, Network, NetworkBuilder, NetworkSpec,
};

/// A fresh, empty directory unique to `test`.
pub fn temp_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("neural-pilot-{test}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

pub fn config(test: &str) -> TrainerConfig {
    TrainerConfig {
        tick_rate_hz: 10,
        learning_rate: 0.5,
        networks_dir: temp_dir(test),
        seed: Some(42),
        ..TrainerConfig::default()
    }
}

/// A 2x2 network over `outputs` whose parameters are all zero except the bias of output
/// `favourite`, which makes it the most activated.
pub fn network(name: &str, kind: NetKind, outputs: &[KeyIdentifier], favourite: usize) -> Network {
    let spec = NetworkSpec {
        name: name.into(),
        kind,
        input_width: 2,
        input_height: 2,
        hidden_layers: 1,
        hidden_units: 3,
        outputs: outputs.to_vec(),
        region: None,
        focus: None,
    };

    let mut net = NetworkBuilder::new()
        .weights(ParamInit::Constant(0.))
        .biases(ParamInit::Constant(0.))
        .build(&spec)
        .unwrap();

    net.output_mut(favourite).unwrap().set_bias(1.);
    net
}

pub fn biases(net: &Network) -> Vec<f64> {
    net.outputs().iter().map(|o| o.bias()).collect()
}

/// Always hands out the same grid.
pub struct FixedSampler(pub Vec<u8>);

impl ScreenSampler for FixedSampler {
    fn sample(&mut self, request: &SampleRequest) -> io::Result<Vec<u8>> {
        assert_eq!(self.0.len(), request.width * request.height);
        Ok(self.0.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Press(KeyIdentifier),
    Release(KeyIdentifier),
    Click(i32, i32),
}

/// Records every action it's asked to perform.
#[derive(Clone, Default)]
pub struct RecordingEmitter(pub Arc<Mutex<Vec<Action>>>);

impl RecordingEmitter {
    pub fn actions(&self) -> Vec<Action> {
        self.0.lock().clone()
    }
}

impl ActionEmitter for RecordingEmitter {
    fn press(&mut self, key: KeyIdentifier) -> io::Result<()> {
        self.0.lock().push(Action::Press(key));
        Ok(())
    }

    fn release(&mut self, key: KeyIdentifier) -> io::Result<()> {
        self.0.lock().push(Action::Release(key));
        Ok(())
    }

    fn click_at(&mut self, x: i32, y: i32) -> io::Result<()> {
        self.0.lock().push(Action::Click(x, y));
        Ok(())
    }
}

/// Hands the registered sink to the test so it can play the human.
#[derive(Clone, Default)]
pub struct ManualObserver {
    pub sink: Arc<Mutex<Option<LabelSink>>>,
    pub unregistered: Arc<Mutex<u32>>,
}

impl ManualObserver {
    pub fn sink(&self) -> Option<LabelSink> {
        self.sink.lock().clone()
    }
}

impl KeyObserver for ManualObserver {
    fn register(&mut self, sink: LabelSink) -> io::Result<()> {
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    fn unregister(&mut self) {
        *self.sink.lock() = None;
        *self.unregistered.lock() += 1;
    }
}

pub fn collaborators(emitter: &RecordingEmitter, observer: &ManualObserver) -> Collaborators {
    Collaborators::new(
        FixedSampler(vec![0, 64, 128, 255]),
        emitter.clone(),
        observer.clone(),
    )
}
