//! Task list and status bookkeeping
//!
//! The task list is the single shared mutable resource of a batch run. It is
//! owned by the invoking command and mutated in place by the orchestrator
//! only, one transition at a time, so no locking is involved; the sequential
//! loop makes racing mutations impossible by construction.

use serde::Serialize;

use crate::app::models::{DeliveryMethod, DownloadTask, TaskStatus};
use crate::errors::{DownloadError, DownloadResult};

/// Counts per lifecycle state, for display and summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub idle: usize,
    pub processing: usize,
    pub success: usize,
    pub error: usize,
}

/// Ordered collection of download tasks
///
/// Order is fixed at build time (ascending sort key); status fields are the
/// only thing that changes afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskList {
    tasks: Vec<DownloadTask>,
}

impl TaskList {
    /// Wrap an already built, ordered task vector
    pub fn from_tasks(tasks: Vec<DownloadTask>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Read access to the ordered tasks
    pub fn tasks(&self) -> &[DownloadTask] {
        &self.tasks
    }

    /// Truncate to the first `limit` tasks, keeping order
    pub fn truncate(&mut self, limit: usize) {
        self.tasks.truncate(limit);
    }

    /// Positions of every task that has not yet delivered, in list order.
    /// This is the subset a (re-)run of the orchestrator attempts.
    pub fn pending_positions(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| !task.is_success())
            .map(|(position, _)| position)
            .collect()
    }

    /// Task at a list position
    pub fn get(&self, position: usize) -> Option<&DownloadTask> {
        self.tasks.get(position)
    }

    /// Mark a task as currently being retrieved
    pub fn mark_processing(&mut self, identifier: &str) -> DownloadResult<()> {
        let task = self.find_mut(identifier)?;
        task.status = TaskStatus::Processing;
        Ok(())
    }

    /// Mark a task as delivered, recording which strategy satisfied it
    pub fn mark_success(
        &mut self,
        identifier: &str,
        method: DeliveryMethod,
    ) -> DownloadResult<()> {
        let task = self.find_mut(identifier)?;
        task.status = TaskStatus::Success;
        task.method = Some(method);
        Ok(())
    }

    /// Mark a task as failed by an unexpected fault
    pub fn mark_error(&mut self, identifier: &str) -> DownloadResult<()> {
        let task = self.find_mut(identifier)?;
        task.status = TaskStatus::Error;
        task.method = None;
        Ok(())
    }

    /// Current counts per lifecycle state
    pub fn stats(&self) -> TaskStats {
        let mut stats = TaskStats {
            total: self.tasks.len(),
            ..TaskStats::default()
        };
        for task in &self.tasks {
            match task.status {
                TaskStatus::Idle => stats.idle += 1,
                TaskStatus::Processing => stats.processing += 1,
                TaskStatus::Success => stats.success += 1,
                TaskStatus::Error => stats.error += 1,
            }
        }
        stats
    }

    fn find_mut(&mut self, identifier: &str) -> DownloadResult<&mut DownloadTask> {
        self.tasks
            .iter_mut()
            .find(|task| task.identifier == identifier)
            .ok_or_else(|| DownloadError::TaskNotFound {
                identifier: identifier.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::SortKey;

    fn task(identifier: &str) -> DownloadTask {
        DownloadTask::new(
            identifier,
            format!("https://drive.google.com/file/d/{}/view", identifier),
            format!("File_{}", identifier),
            2,
            SortKey {
                primary: identifier.to_string(),
                secondary: SortKey::epoch(),
            },
        )
    }

    #[test]
    fn test_status_transitions() {
        let mut list = TaskList::from_tasks(vec![task("A"), task("B")]);

        list.mark_processing("A").unwrap();
        assert_eq!(list.get(0).unwrap().status, TaskStatus::Processing);

        list.mark_success("A", DeliveryMethod::Renamed).unwrap();
        let done = list.get(0).unwrap();
        assert_eq!(done.status, TaskStatus::Success);
        assert_eq!(done.method, Some(DeliveryMethod::Renamed));

        list.mark_processing("B").unwrap();
        list.mark_error("B").unwrap();
        let failed = list.get(1).unwrap();
        assert_eq!(failed.status, TaskStatus::Error);
        assert!(failed.method.is_none());
    }

    #[test]
    fn test_unknown_identifier_is_an_error() {
        let mut list = TaskList::from_tasks(vec![task("A")]);
        let err = list.mark_processing("missing").unwrap_err();
        match err {
            DownloadError::TaskNotFound { identifier } => assert_eq!(identifier, "missing"),
            other => panic!("Expected TaskNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_pending_positions_exclude_delivered_tasks() {
        let mut list = TaskList::from_tasks(vec![task("A"), task("B"), task("C")]);
        list.mark_success("B", DeliveryMethod::Fallback).unwrap();

        assert_eq!(list.pending_positions(), vec![0, 2]);
    }

    #[test]
    fn test_error_tasks_stay_pending_for_retry_passes() {
        let mut list = TaskList::from_tasks(vec![task("A")]);
        list.mark_error("A").unwrap();
        assert_eq!(list.pending_positions(), vec![0]);
    }

    #[test]
    fn test_stats_counts() {
        let mut list = TaskList::from_tasks(vec![task("A"), task("B"), task("C"), task("D")]);
        list.mark_success("A", DeliveryMethod::Renamed).unwrap();
        list.mark_error("B").unwrap();
        list.mark_processing("C").unwrap();

        let stats = list.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.error, 1);
        assert_eq!(stats.processing, 1);
        assert_eq!(stats.idle, 1);
    }
}
