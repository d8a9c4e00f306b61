use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::Duration,
};

use comms::{
    CoordinatorClient, Tensor,
    msg::Msg,
    specs::{
        coordinator::AggregatorSpec,
        machine_learning::{ActFnSpec, LayerSpec, ModelSpec, ParamGenSpec},
    },
};
use coordinator::CoordinatorService;
use machine_learning::{ModelBuilder, ModelSnapshot, Sequential, codec, dataset::Row};
use tokio::{net::TcpListener, task::JoinSet};
use worker::{EasgdWorker, EnsembleWorker, WorkerConfig, WorkerErr};

fn model() -> Sequential {
    let spec = ModelSpec::Sequential {
        layers: vec![LayerSpec::Dense {
            dim: (2, 2),
            act_fn: Some(ActFnSpec::Softmax),
        }],
    };

    ModelBuilder::new(ParamGenSpec::XavierUniform, Some(11))
        .build(&spec)
        .unwrap()
}

fn rows() -> Vec<Row> {
    [
        ([0f32, 0.], [1f32, 0.]),
        ([0., 1.], [1., 0.]),
        ([1., 0.], [1., 0.]),
        ([1., 1.], [0., 1.]),
    ]
    .into_iter()
    .map(|(x, y)| {
        Row::new()
            .with("features", x.to_vec())
            .with("label", y.to_vec())
    })
    .collect()
}

fn config() -> WorkerConfig {
    WorkerConfig::new("features", "label")
        .with_batch_size(NonZeroUsize::new(2).unwrap())
        .with_poll_interval(Duration::from_millis(5))
}

#[derive(Default)]
struct MockState {
    updates: Vec<(usize, Vec<Tensor>)>,
    ready_polls: usize,
}

/// Serves a fixed center variable and reports ready on the second poll.
async fn mock_coordinator(center: Vec<Tensor>) -> (SocketAddr, Arc<Mutex<MockState>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(Mutex::new(MockState::default()));

    let shared = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let (rx, tx) = stream.into_split();
            let (mut rx, mut tx) = comms::channel(rx, tx);

            let reply = match rx.recv::<Msg>().await.unwrap() {
                Msg::GetCenterVariable => Msg::CenterVariable(center.clone()),
                Msg::Update {
                    worker_id,
                    gradient,
                } => {
                    shared.lock().unwrap().updates.push((worker_id, gradient));
                    Msg::Ack
                }
                Msg::GetReady => {
                    let mut state = shared.lock().unwrap();
                    state.ready_polls += 1;
                    Msg::Ready(state.ready_polls > 1)
                }
                other => Msg::Err(format!("unexpected {}", other.kind())),
            };

            tx.send(&reply).await.unwrap();
        }
    });

    (addr, state)
}

#[tokio::test]
async fn worker_submits_the_delta_and_waits_for_ready() {
    let model = model();
    let center = model.get_weights();
    let (addr, state) = mock_coordinator(center.clone()).await;

    let master: Arc<[u8]> = codec::serialize(&model).unwrap().into();
    let worker = EasgdWorker::new(master, CoordinatorClient::new(addr), config());

    let out = worker.train(3, rows()).await.unwrap();
    assert!(out.is_empty());

    let state = state.lock().unwrap();
    assert_eq!(state.ready_polls, 2);
    assert_eq!(state.updates.len(), 1);

    let (worker_id, gradient) = &state.updates[0];
    assert_eq!(*worker_id, 3);
    assert_eq!(gradient.len(), center.len());
    for (delta, weights) in gradient.iter().zip(&center) {
        assert_eq!(delta.shape(), weights.shape());
    }
    assert!(gradient.iter().flat_map(Tensor::data).any(|&d| d != 0.));
}

#[tokio::test]
async fn empty_partition_submits_a_zero_gradient() {
    let model = model();
    let (addr, state) = mock_coordinator(model.get_weights()).await;

    let master: Arc<[u8]> = codec::serialize(&model).unwrap().into();
    let worker = EasgdWorker::new(master, CoordinatorClient::new(addr), config());

    worker.train(0, Vec::new()).await.unwrap();

    let state = state.lock().unwrap();
    let (_, gradient) = &state.updates[0];
    assert!(gradient.iter().flat_map(Tensor::data).all(|&d| d == 0.));
}

#[tokio::test]
async fn missing_column_fails_before_contacting_the_coordinator() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let master: Arc<[u8]> = codec::serialize(&model()).unwrap().into();
    let worker = EasgdWorker::new(
        master,
        CoordinatorClient::new(addr),
        WorkerConfig::new("features", "target"),
    );

    let err = worker.train(0, rows()).await.unwrap_err();
    assert!(matches!(err, WorkerErr::MissingColumn { row: 0, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_coordinator_is_an_io_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let master: Arc<[u8]> = codec::serialize(&model()).unwrap().into();
    let worker = EasgdWorker::new(master, CoordinatorClient::new(addr), config());

    assert!(matches!(
        worker.train(0, rows()).await,
        Err(WorkerErr::Io(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn two_workers_complete_one_iteration() {
    let model = model();
    let snapshot = ModelSnapshot::capture(&model);
    let workers = NonZeroUsize::new(2).unwrap();

    let service = CoordinatorService::start("127.0.0.1:0", &snapshot, workers, AggregatorSpec::Sum)
        .await
        .unwrap();

    let master: Arc<[u8]> = snapshot.to_bytes().unwrap().into();
    let worker = EasgdWorker::new(
        master,
        CoordinatorClient::new(service.local_addr()),
        config(),
    );

    let mut partitions = rows();
    let second = partitions.split_off(2);

    let mut tasks = JoinSet::new();
    for (index, partition) in [partitions, second].into_iter().enumerate() {
        let worker = worker.clone();
        tasks.spawn(async move { worker.train(index, partition).await });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap().unwrap();
    }

    assert_eq!(service.coordinator().iteration(), 1);
    assert!(service.coordinator().is_ready().await);

    let center = service.stop().await;
    assert_ne!(center, snapshot.weights());
}

#[tokio::test]
async fn ensemble_worker_trains_its_own_copy() {
    let model = model();
    let master: Arc<[u8]> = codec::serialize(&model).unwrap().into();
    let worker = EnsembleWorker::new(master, config());

    let (history, trained) = worker.train(rows()).await.unwrap();

    assert_eq!(history.epochs(), 1);
    assert_eq!(trained.spec(), model.spec());
    assert_ne!(trained.get_weights(), model.get_weights());
}
