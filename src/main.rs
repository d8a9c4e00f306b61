use std::{env, fs, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use comms::{CoordinatorClient, Tensor};
use coordinator::CoordinatorService;
use log::info;
use machine_learning::{ModelSnapshot, Sequential, codec, dataset::Row};
use orchestrator::{EasgdTrainer, configs::EasgdConfig, data::Dataset};
use serde::Serialize;
use tokio::{net, signal};
use worker::EasgdWorker;

const DEFAULT_HOST: &str = "127.0.0.1";
const USAGE: &str = "usage:
    easgd coordinator <config.json>
    easgd train <config.json> <dataset.json>
    easgd worker <config.json> <dataset.json> <partition_index>";

#[derive(Serialize)]
struct TensorSummary {
    shape: Vec<usize>,
    min: f32,
    max: f32,
    mean: f32,
}

impl TensorSummary {
    fn new(tensor: &Tensor) -> Self {
        let data = tensor.data();
        let (min, max) = data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Self {
            shape: tensor.shape().to_vec(),
            min,
            max,
            mean: data.iter().sum::<f32>() / data.len().max(1) as f32,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["coordinator", config] => run_coordinator(config).await,
        ["train", config, dataset] => run_training(config, dataset).await,
        ["worker", config, dataset, index] => {
            let index = index.parse().context("partition_index must be a number")?;
            run_worker(config, dataset, index).await
        }
        _ => bail!("{USAGE}"),
    }
}

fn node_addr() -> anyhow::Result<String> {
    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT").context("PORT must be set")?;
    Ok(format!("{host}:{port}"))
}

fn load_config(path: &str) -> anyhow::Result<EasgdConfig> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config = orchestrator::configs::from_json(&json)?;
    Ok(config)
}

fn load_rows(path: &str) -> anyhow::Result<Vec<Row>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&json).with_context(|| format!("parsing rows from {path}"))
}

/// Serves a coordinator for the configured master model until interrupted.
async fn run_coordinator(config: &str) -> anyhow::Result<()> {
    let config = load_config(config)?;
    config.validate()?;

    let master = config.model.build()?;
    let snapshot = ModelSnapshot::capture(&master);

    let service =
        CoordinatorService::start(node_addr()?, &snapshot, config.num_workers, config.aggregator)
            .await?;

    signal::ctrl_c().await?;
    info!("received SIGINT, stopping");

    let center = service.stop().await;
    print_weights(&center)
}

/// Runs a whole EASGD training in this process.
async fn run_training(config: &str, dataset: &str) -> anyhow::Result<()> {
    let trainer = EasgdTrainer::from_config(load_config(config)?)?;
    let rows = load_rows(dataset)?;

    let model = tokio::select! {
        model = trainer.train(Dataset::from_rows(rows)) => model?,
        _ = signal::ctrl_c() => bail!("training interrupted"),
    };

    print_weights(&model.get_weights())
}

/// Runs a single worker round against the coordinator at `HOST:PORT`.
async fn run_worker(config: &str, dataset: &str, index: usize) -> anyhow::Result<()> {
    let config = load_config(config)?;
    config.validate()?;

    let mut partitions = Dataset::from_rows(load_rows(dataset)?)
        .repartition(config.num_workers)
        .into_partitions();

    if index >= partitions.len() {
        bail!("partition_index {index} is out of range for {} workers", partitions.len());
    }
    let rows = partitions.swap_remove(index);

    let addr: SocketAddr = net::lookup_host(node_addr()?)
        .await?
        .next()
        .context("coordinator address didn't resolve")?;

    let master: Sequential = config.model.build()?;
    let master: Arc<[u8]> = codec::serialize(&master)?.into();
    let training = &config.training;
    let worker = EasgdWorker::new(
        master,
        CoordinatorClient::new(addr),
        training.worker_config(&training.label_col),
    );

    tokio::select! {
        ret = worker.train(index, rows) => {
            ret?;
            info!("round finished, disconnecting");
        }
        _ = signal::ctrl_c() => info!("received SIGINT"),
    }

    Ok(())
}

fn print_weights(weights: &[Tensor]) -> anyhow::Result<()> {
    let summary: Vec<_> = weights.iter().map(TensorSummary::new).collect();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
