mod collaborators;
mod config;
mod error;
mod metrics;
mod pacing;
mod reward;
mod scheduler;
mod selection;

pub use collaborators::{
    ActionEmitter, Collaborators, KeyObserver, LabelSink, SampleRequest, ScreenSampler,
};
pub use config::{
    LoopMode, TrainerConfig, DEFAULT_LEARNING_RATE, DEFAULT_REWARD_PORT,
    DEFAULT_SAVE_INTERVAL_SECS, DEFAULT_TICK_RATE_HZ,
};
pub use error::{Result, TrainerErr};
pub use metrics::LoopMetrics;
pub use pacing::{Pacer, RateMeter, TrainedClock};
pub use reward::{parse_reward, read_reward, RewardChannel};
pub use scheduler::{LoopState, RunSpec, Scheduler};
pub use selection::Selection;
