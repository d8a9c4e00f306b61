use std::collections::HashMap;

use comms::Tensor;

/// The mutable state shared by every request to the coordinator.
///
/// `ready` is false from the first accepted gradient of an iteration until that iteration
/// gets aggregated, `pending` never holds more than one gradient per worker.
#[derive(Debug)]
pub struct CoordinatorState {
    pub(crate) center: Vec<Tensor>,
    pub(crate) pending: HashMap<usize, Vec<Tensor>>,
    pub(crate) ready: bool,
    pub(crate) iteration: u64,
}

impl CoordinatorState {
    /// Creates a new `CoordinatorState`.
    ///
    /// # Arguments
    /// * `center` - The initial center variable.
    ///
    /// # Returns
    /// A state with no pending gradients, at iteration zero and not ready.
    pub fn new(center: Vec<Tensor>) -> Self {
        Self {
            center,
            pending: HashMap::new(),
            ready: false,
            iteration: 0,
        }
    }

    pub fn center(&self) -> &[Tensor] {
        &self.center
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Takes the pending gradients out ordered by worker id.
    pub(crate) fn drain_pending(&mut self) -> Vec<(usize, Vec<Tensor>)> {
        let mut pending: Vec<_> = self.pending.drain().collect();
        pending.sort_unstable_by_key(|(worker_id, _)| *worker_id);
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: f32) -> Tensor {
        Tensor::new(vec![1], vec![value]).unwrap()
    }

    #[test]
    fn fresh_state() {
        let state = CoordinatorState::new(vec![t(0.)]);

        assert_eq!(state.center(), [t(0.)]);
        assert!(!state.ready());
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.pending_len(), 0);
    }

    #[test]
    fn drain_orders_by_worker_id() {
        let mut state = CoordinatorState::new(vec![t(0.)]);
        for id in [3, 0, 2, 1] {
            state.pending.insert(id, vec![t(id as f32)]);
        }

        let ids: Vec<_> = state.drain_pending().into_iter().map(|(id, _)| id).collect();

        assert_eq!(ids, [0, 1, 2, 3]);
        assert_eq!(state.pending_len(), 0);
    }
}
