use std::{num::NonZeroUsize, time::Duration};

use comms::specs::machine_learning::CompileSpec;

const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(1000).unwrap();
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Immutable settings shared by every worker of a training.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    features_col: String,
    label_col: String,
    batch_size: NonZeroUsize,
    poll_interval: Duration,
    compile: CompileSpec,
}

impl WorkerConfig {
    /// Creates a new worker configuration.
    ///
    /// Starts with a batch size of 1000, a poll interval of one second and the model compiled
    /// with categorical cross-entropy, RMSProp and the accuracy metric.
    ///
    /// # Args
    /// * `features_col` - The column holding the input vector of every row.
    /// * `label_col` - The column holding the expected output of every row.
    ///
    /// # Returns
    /// A `WorkerConfig` instance.
    pub fn new(features_col: impl Into<String>, label_col: impl Into<String>) -> Self {
        Self {
            features_col: features_col.into(),
            label_col: label_col.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            compile: CompileSpec::default(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_compile(mut self, compile: CompileSpec) -> Self {
        self.compile = compile;
        self
    }

    pub fn features_col(&self) -> &str {
        &self.features_col
    }

    pub fn label_col(&self) -> &str {
        &self.label_col
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// The pause between two readiness queries.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn compile(&self) -> &CompileSpec {
        &self.compile
    }
}
