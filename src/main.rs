use std::{env, path::Path, process};

use anyhow::{bail, Context};
use log::info;
use neural_pilot::{
    headless::{LoggingEmitter, Recording},
    trainer::{Collaborators, LoopMode, RunSpec, Scheduler, TrainerConfig},
    NetworkBuilder, NetworkSpec, NetworkStore,
};
use tokio::signal;

const CONFIG_ENV: &str = "NEURAL_PILOT_CONFIG";

const USAGE: &str = "usage:
    neural-pilot create <name> <spec.json>
    neural-pilot list
    neural-pilot info <name>
    neural-pilot train <name> <recording.csv>
    neural-pilot play <name> <recording.csv>";

fn load_config() -> anyhow::Result<TrainerConfig> {
    match env::var(CONFIG_ENV) {
        Ok(path) => TrainerConfig::from_json_file(&path)
            .with_context(|| format!("failed to load the config at {path}")),
        Err(_) => Ok(TrainerConfig::default()),
    }
}

fn create(store: &NetworkStore, name: &str, spec_path: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(spec_path)
        .with_context(|| format!("failed to read {spec_path}"))?;
    let mut spec: NetworkSpec = serde_json::from_str(&content)?;
    spec.name = name.to_string();

    if store.exists(name) {
        bail!("network '{name}' already exists at {}", store.path(name).display());
    }

    let net = NetworkBuilder::new().build(&spec)?;
    store.save(&net)?;
    info!(
        "created {} network '{name}' with {} inputs, {} hidden layers and {} outputs",
        net.kind(),
        net.inputs().len(),
        net.hidden_layers().len(),
        net.outputs().len()
    );

    Ok(())
}

fn show_info(store: &NetworkStore, name: &str) -> anyhow::Result<()> {
    let net = store.load(name)?;
    let labels: Vec<_> = net.labels().map(|k| k.name()).collect();

    info!(
        "'{}' is a {} network sampling {}x{} at {:?}, trained {}",
        net.name(),
        net.kind(),
        net.input_width(),
        net.input_height(),
        net.region(),
        net.trained_time()
    );
    info!("outputs: {}", labels.join(", "));

    Ok(())
}

async fn run(
    config: TrainerConfig,
    name: &str,
    recording: &Path,
    mode: LoopMode,
) -> anyhow::Result<()> {
    let store = NetworkStore::new(config.networks_dir.clone());
    let net = store.load(name)?;
    let recording = Recording::load(recording, net.input_width() * net.input_height())?;

    let collaborators =
        Collaborators::new(recording.sampler(), LoggingEmitter, recording.observer());

    let run = RunSpec::from_config(&config, mode);
    let mut scheduler = Scheduler::new(config, collaborators);
    scheduler.start(net, run).await?;
    if let Some(addr) = scheduler.reward_addr() {
        info!("send rewards to {addr}");
    }

    signal::ctrl_c().await?;
    info!("received SIGINT, stopping");

    let net = scheduler.stop().await?;
    info!("'{}' trained {}", net.name(), net.trained_time());

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = load_config()?;
    let store = NetworkStore::new(config.networks_dir.clone());

    match args.iter().skip(1).map(String::as_str).collect::<Vec<_>>()[..] {
        ["create", name, spec] => create(&store, name, spec),
        ["list"] => {
            for name in store.list()? {
                println!("{name}");
            }
            Ok(())
        }
        ["info", name] => show_info(&store, name),
        ["train", name, recording] => {
            run(config, name, Path::new(recording), LoopMode::Train).await
        }
        ["play", name, recording] => {
            run(config, name, Path::new(recording), LoopMode::Infer).await
        }
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }
}
