//! A partitioned, in-memory collection of rows.
//!
//! Every partition is processed by its own task, the partitions themselves never share data.

use std::{future::Future, num::NonZeroUsize};

use machine_learning::dataset::Row;
use tokio::task::JoinSet;

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    partitions: Vec<Vec<Row>>,
}

impl Dataset {
    /// Creates a dataset with all of the rows in a single partition.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            partitions: vec![rows],
        }
    }

    pub fn from_partitions(partitions: Vec<Vec<Row>>) -> Self {
        Self { partitions }
    }

    /// Redistributes the rows into exactly `n` partitions.
    ///
    /// Rows are dealt round-robin in their current order, so partition sizes differ by at
    /// most one and some may be empty when there are fewer rows than partitions.
    pub fn repartition(self, n: NonZeroUsize) -> Self {
        let n = n.get();
        let per_partition = self.len().div_ceil(n);
        let mut partitions: Vec<_> = (0..n).map(|_| Vec::with_capacity(per_partition)).collect();

        for (i, row) in self.partitions.into_iter().flatten().enumerate() {
            partitions[i % n].push(row);
        }

        Self { partitions }
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// The total amount of rows.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn partitions(&self) -> &[Vec<Row>] {
        &self.partitions
    }

    pub fn into_partitions(self) -> Vec<Vec<Row>> {
        self.partitions
    }

    /// Maps every row keeping the partitioning, rows mapped to `None` are dropped.
    pub fn filter_map_rows<F>(self, mut f: F) -> Self
    where
        F: FnMut(Row) -> Option<Row>,
    {
        let partitions = self
            .partitions
            .into_iter()
            .map(|partition| partition.into_iter().filter_map(&mut f).collect())
            .collect();

        Self { partitions }
    }

    /// Runs `f` over every partition, each on its own task.
    ///
    /// # Returns
    /// The results in partition order, or a `Join` error if any task panicked.
    pub async fn map_partitions<F, Fut, T>(self, f: F) -> Result<Vec<T>>
    where
        F: Fn(Vec<Row>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.map_partitions_with_index(|_, rows| f(rows)).await
    }

    /// Runs `f` over every partition and its index, each on its own task.
    ///
    /// # Arguments
    /// * `f` - Builds the task of a partition given its index and its rows.
    ///
    /// # Returns
    /// The results in partition order, or a `Join` error if any task panicked.
    pub async fn map_partitions_with_index<F, Fut, T>(self, f: F) -> Result<Vec<T>>
    where
        F: Fn(usize, Vec<Row>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let n = self.partitions.len();
        let mut tasks = JoinSet::new();

        for (index, partition) in self.partitions.into_iter().enumerate() {
            let fut = f(index, partition);
            tasks.spawn(async move { (index, fut.await) });
        }

        let mut results: Vec<Option<T>> = (0..n).map(|_| None).collect();
        while let Some(res) = tasks.join_next().await {
            let (index, out) = res?;
            results[index] = Some(out);
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// Flattens the partitions back into a single list of rows.
    pub fn collect(self) -> Vec<Row> {
        self.partitions.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Row> {
        (0..n).map(|i| Row::new().with("i", i as f32)).collect()
    }

    fn ids(partition: &[Row]) -> Vec<f32> {
        partition
            .iter()
            .filter_map(|r| r.get("i").and_then(|v| v.as_scalar()))
            .collect()
    }

    #[test]
    fn repartition_deals_round_robin() {
        let dataset = Dataset::from_rows(rows(7)).repartition(NonZeroUsize::new(3).unwrap());

        assert_eq!(dataset.num_partitions(), 3);
        assert_eq!(dataset.len(), 7);
        assert_eq!(ids(&dataset.partitions()[0]), [0., 3., 6.]);
        assert_eq!(ids(&dataset.partitions()[1]), [1., 4.]);
        assert_eq!(ids(&dataset.partitions()[2]), [2., 5.]);
    }

    #[test]
    fn more_partitions_than_rows() {
        let dataset = Dataset::from_rows(rows(2)).repartition(NonZeroUsize::new(4).unwrap());

        assert_eq!(dataset.num_partitions(), 4);
        assert!(dataset.partitions()[2].is_empty());
        assert!(dataset.partitions()[3].is_empty());
    }

    #[test]
    fn filter_map_keeps_partitions() {
        let dataset = Dataset::from_rows(rows(6))
            .repartition(NonZeroUsize::new(2).unwrap())
            .filter_map_rows(|row| {
                let i = row.get("i")?.as_scalar()?;
                (i < 4.).then_some(row)
            });

        assert_eq!(dataset.num_partitions(), 2);
        assert_eq!(ids(&dataset.collect()), [0., 2., 1., 3.]);
    }

    #[tokio::test]
    async fn partition_results_come_back_in_order() {
        let dataset = Dataset::from_rows(rows(10)).repartition(NonZeroUsize::new(5).unwrap());

        let out = dataset
            .map_partitions_with_index(|index, rows| async move {
                tokio::task::yield_now().await;
                (index, rows.len())
            })
            .await
            .unwrap();

        assert_eq!(out, [(0, 2), (1, 2), (2, 2), (3, 2), (4, 2)]);
    }

    #[tokio::test]
    async fn panicking_partition_is_a_join_error() {
        let dataset = Dataset::from_rows(rows(2)).repartition(NonZeroUsize::new(2).unwrap());

        let res = dataset
            .map_partitions(|rows| async move {
                assert!(rows.len() > 5, "too few rows");
                rows.len()
            })
            .await;

        assert!(matches!(res, Err(crate::TrainerErr::Join(_))));
    }
}
