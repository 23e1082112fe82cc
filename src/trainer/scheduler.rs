use std::{net::SocketAddr, time::Duration};

use log::{debug, error, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;

use super::{
    Collaborators, LabelSink, LoopMetrics, LoopMode, Pacer, RateMeter, Result, RewardChannel,
    SampleRequest, Selection, TrainedClock, TrainerConfig, TrainerErr,
};
use crate::{
    feedforward::Feedforward,
    neural_net::{NetKind, Network},
    optimizer::{LabelPolicy, Optimizer},
    persistence::NetworkStore,
    sgd::Sgd,
    KeyIdentifier,
};

/// The reward assumed until the reward program sends one.
const INITIAL_REWARD: f64 = 1.;

/// What a scheduler is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running { kind: NetKind, mode: LoopMode },
}

/// The parameters of one session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSpec {
    pub mode: LoopMode,
    pub tick_rate_hz: u32,
    pub learning_rate: f64,
}

impl RunSpec {
    /// A session in `mode` with the rate and learning rate of `config`.
    pub fn from_config(config: &TrainerConfig, mode: LoopMode) -> Self {
        Self {
            mode,
            tick_rate_hz: config.tick_rate_hz,
            learning_rate: config.learning_rate,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tick_rate_hz == 0 {
            return Err(TrainerErr::InvalidConfig(
                "tick rate must be positive".into(),
            ));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return Err(TrainerErr::InvalidConfig(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }

        Ok(())
    }
}

/// What the loop hands back when it finishes.
type LoopOutcome = (Network, Collaborators, LoopMetrics);

struct Running {
    kind: NetKind,
    mode: LoopMode,
    token: CancellationToken,
    handle: JoinHandle<LoopOutcome>,
    reward_addr: Option<SocketAddr>,
}

enum State {
    Idle(Option<Collaborators>),
    Running(Running),
}

/// Runs one training or inference session at a time on a background task.
///
/// While a session runs, its network and collaborators belong to the loop task, they come
/// back when the session is stopped.
pub struct Scheduler {
    config: TrainerConfig,
    store: NetworkStore,
    state: State,
    last_metrics: LoopMetrics,
}

impl Scheduler {
    /// Creates a new idle `Scheduler`.
    ///
    /// # Arguments
    /// * `config` - Session settings, checkpoints go to its `networks_dir`.
    /// * `collaborators` - The sampler, emitter and key observer sessions use.
    pub fn new(config: TrainerConfig, collaborators: Collaborators) -> Self {
        Self {
            store: NetworkStore::new(config.networks_dir.clone()),
            config,
            state: State::Idle(Some(collaborators)),
            last_metrics: LoopMetrics::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        match &self.state {
            State::Idle(_) => LoopState::Idle,
            State::Running(running) => LoopState::Running {
                kind: running.kind,
                mode: running.mode,
            },
        }
    }

    pub fn store(&self) -> &NetworkStore {
        &self.store
    }

    /// Where the running reinforcement session waits for rewards.
    pub fn reward_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Running(running) => running.reward_addr,
            State::Idle(_) => None,
        }
    }

    /// The counters of the last finished session.
    pub fn last_metrics(&self) -> &LoopMetrics {
        &self.last_metrics
    }

    /// Starts a session on `net`.
    ///
    /// A reinforcement network in `Train` mode opens the reward channel before the loop
    /// starts, so a failing bind leaves the scheduler idle.
    ///
    /// # Errors
    /// `AlreadyRunning` if a session is active, `InvalidConfig` for an unusable `run` and
    /// `Io` if the reward channel can't be bound.
    pub async fn start(&mut self, net: Network, run: RunSpec) -> Result<()> {
        let collaborators = match &mut self.state {
            State::Running(_) => return Err(TrainerErr::AlreadyRunning),
            State::Idle(collaborators) => {
                run.validate()?;
                collaborators.take().ok_or(TrainerErr::CollaboratorsLost)?
            }
        };

        let reward = if net.kind() == NetKind::Reinforcement && run.mode == LoopMode::Train {
            match RewardChannel::bind(self.config.reward_addr).await {
                Ok(channel) => Some(channel),
                Err(e) => {
                    self.state = State::Idle(Some(collaborators));
                    return Err(e);
                }
            }
        } else {
            None
        };

        let reward_addr = reward.as_ref().and_then(|r| r.local_addr().ok());
        let kind = net.kind();
        let token = CancellationToken::new();

        info!(
            "starting {} session on '{}' at {} Hz",
            describe(kind, run.mode),
            net.name(),
            run.tick_rate_hz
        );

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let training_loop = TrainingLoop {
            labels: LabelSink::new(net.labels()),
            policy: LabelPolicy::from(kind),
            sgd: Sgd::new(run.learning_rate),
            pacer: Pacer::new(Duration::from_secs(1) / run.tick_rate_hz),
            save_interval: self.config.save_interval(),
            selection: self.config.selection,
            store: self.store.clone(),
            mode: run.mode,
            last_reward: INITIAL_REWARD,
            held: None,
            metrics: LoopMetrics::default(),
            collaborators,
            reward,
            rng,
            net,
        };

        let handle = tokio::spawn(training_loop.run(token.clone()));
        self.state = State::Running(Running {
            kind,
            mode: run.mode,
            token,
            handle,
            reward_addr,
        });

        Ok(())
    }

    /// Stops the running session and waits for its final checkpoint.
    ///
    /// # Returns
    /// The trained network, or `NotRunning` if there was no session.
    pub async fn stop(&mut self) -> Result<Network> {
        let running = match std::mem::replace(&mut self.state, State::Idle(None)) {
            State::Running(running) => running,
            idle => {
                self.state = idle;
                return Err(TrainerErr::NotRunning);
            }
        };

        running.token.cancel();
        match running.handle.await {
            Ok((net, collaborators, metrics)) => {
                info!(
                    "stopped session on '{}': {} ticks, {} trained, {} skipped",
                    net.name(),
                    metrics.ticks,
                    metrics.trained,
                    metrics.skipped
                );

                self.state = State::Idle(Some(collaborators));
                self.last_metrics = metrics;
                Ok(net)
            }
            Err(e) => {
                error!("training task failed: {e}");
                Err(TrainerErr::Join(e.to_string()))
            }
        }
    }
}

fn describe(kind: NetKind, mode: LoopMode) -> &'static str {
    match (kind, mode) {
        (_, LoopMode::Infer) => "inference",
        (NetKind::Supervised, LoopMode::Train) => "supervised training",
        (NetKind::Reinforcement, LoopMode::Train) => "reinforcement training",
    }
}

/// The state owned by the loop task for the length of a session.
struct TrainingLoop {
    net: Network,
    collaborators: Collaborators,
    mode: LoopMode,
    policy: LabelPolicy,
    sgd: Sgd,
    selection: Selection,
    rng: StdRng,
    pacer: Pacer,
    store: NetworkStore,
    save_interval: Duration,
    reward: Option<RewardChannel>,
    last_reward: f64,
    labels: LabelSink,
    held: Option<KeyIdentifier>,
    metrics: LoopMetrics,
}

impl TrainingLoop {
    fn emits_actions(&self) -> bool {
        self.mode == LoopMode::Infer || self.policy == LabelPolicy::Reinforcement
    }

    fn observes_keys(&self) -> bool {
        self.mode == LoopMode::Train && self.policy == LabelPolicy::Supervised
    }

    async fn run(mut self, token: CancellationToken) -> LoopOutcome {
        let observing = self.observes_keys() && self.register_observer();

        if self.emits_actions() {
            let (x, y) = self.net.region().center();
            if let Err(e) = self.collaborators.emitter.click_at(x, y) {
                warn!("failed to click the sample region: {e}");
            }
        }

        let mut clock = TrainedClock::default();
        let mut meter = RateMeter::default();
        let mut last_tick = Instant::now();
        let mut last_save = last_tick;

        while !token.is_cancelled() {
            let tick_start = Instant::now();
            let elapsed = tick_start - last_tick;
            last_tick = tick_start;

            if let Some(rate) = meter.tick(elapsed) {
                debug!("{rate} updates/s");
            }

            if self.mode == LoopMode::Train {
                self.net.add_trained_secs(clock.advance(elapsed));
            }

            let reward_ok = match self.reward.as_mut() {
                None => true,
                Some(channel) => match channel.next_reward(&token).await {
                    None => break,
                    Some(Ok(reward)) => {
                        self.last_reward = reward;
                        self.metrics.bump_reward();
                        true
                    }
                    Some(Err(e)) => {
                        warn!("no reward this tick: {e}");
                        false
                    }
                },
            };

            self.tick(reward_ok);

            if last_save.elapsed() >= self.save_interval {
                self.checkpoint();
                last_save = Instant::now();
            }

            if let Some(sleep) = self.pacer.sleep_for(tick_start.elapsed()) {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(sleep) => {}
                }
            }
        }

        self.shutdown(observing);
        (self.net, self.collaborators, self.metrics)
    }

    /// One sample, forward pass, optional emission and optional backward pass.
    /// Failures skip the rest of the tick.
    fn tick(&mut self, reward_ok: bool) {
        self.metrics.bump_tick();

        let request = SampleRequest::for_network(&self.net);
        let grid = match self.collaborators.sampler.sample(&request) {
            Ok(grid) => grid,
            Err(e) => {
                warn!("failed to sample the screen: {e}");
                self.metrics.bump_skipped();
                return;
            }
        };

        if let Err(e) = self.net.set_inputs(&grid) {
            warn!("discarding sample: {e}");
            self.metrics.bump_skipped();
            return;
        }

        self.net.forward();
        for output in self.net.outputs() {
            debug!("{}: {}", output.label(), output.value());
        }

        if self.emits_actions() {
            let action = self.selection.choose(&self.net, &mut self.rng);
            self.emit(action);
        }

        if self.mode == LoopMode::Infer {
            return;
        }

        if !reward_ok {
            self.metrics.bump_skipped();
            return;
        }

        if self.net.outputs().iter().any(|o| !o.value().is_finite()) {
            warn!("outputs are not finite, skipping update");
            self.metrics.bump_skipped();
            return;
        }

        let Some(signal) = self
            .policy
            .signal(self.labels.current(), self.held, self.last_reward)
        else {
            return;
        };

        match self.sgd.step(&mut self.net, signal) {
            Ok(()) => self.metrics.bump_trained(),
            Err(e) => {
                warn!("skipping update: {e}");
                self.metrics.bump_skipped();
            }
        }
    }

    /// Holds `action` down, releasing the previously held key if it differs.
    fn emit(&mut self, action: KeyIdentifier) {
        if self.held == Some(action) {
            return;
        }

        let emitter = &mut self.collaborators.emitter;
        if let Some(prev) = self.held.take() {
            if let Err(e) = emitter.release(prev) {
                warn!("failed to release {prev}: {e}");
            }
        }

        match emitter.press(action) {
            Ok(()) => self.held = Some(action),
            Err(e) => warn!("failed to press {action}: {e}"),
        }
    }

    fn register_observer(&mut self) -> bool {
        match self.collaborators.observer.register(self.labels.clone()) {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to register the key observer, nothing will be learned: {e}");
                false
            }
        }
    }

    fn checkpoint(&mut self) {
        match self.store.save(&self.net) {
            Ok(()) => {
                self.metrics.bump_checkpoint();
                info!(
                    "checkpointed '{}', trained {}",
                    self.net.name(),
                    self.net.trained_time()
                );
            }
            Err(e) => warn!("failed to checkpoint '{}': {e}", self.net.name()),
        }
    }

    fn shutdown(&mut self, observing: bool) {
        if observing {
            self.collaborators.observer.unregister();
        }

        if let Some(key) = self.held.take() {
            if let Err(e) = self.collaborators.emitter.release(key) {
                warn!("failed to release {key}: {e}");
            }
        }

        // Dropping the channel closes the listener and any open connection.
        self.reward = None;
        self.checkpoint();
    }
}
