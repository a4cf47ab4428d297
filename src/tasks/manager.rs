//! Background task manager for tracking and controlling worker threads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use super::{BackgroundTask, TaskCompletionInfo, TaskId, TaskProgress, TaskState, TaskType, TaskUpdate};

pub struct BackgroundTaskManager {
    tasks: HashMap<TaskId, BackgroundTask>,
    /// Order in which tasks were added (for "most recent" cancellation).
    task_order: Vec<TaskId>,
}

impl BackgroundTaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            task_order: Vec::new(),
        }
    }

    /// Register a new background task.
    /// Returns the TaskId, a sender for the worker's updates and its cancel flag.
    pub fn register_task(&mut self, task_type: TaskType) -> (TaskId, mpsc::Sender<TaskUpdate>, Arc<AtomicBool>) {
        let (tx, rx) = mpsc::channel();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let task = BackgroundTask::new(task_type, cancel_flag.clone(), rx);
        let id = task.id;

        self.tasks.insert(id, task);
        self.task_order.push(id);

        (id, tx, cancel_flag)
    }

    /// Check if a task of the given type is already running.
    pub fn is_running(&self, task_type: TaskType) -> bool {
        self.tasks.values().any(|t| t.task_type == task_type && t.is_running())
    }

    /// Cancel the most recently started running task of `task_type`.
    pub fn cancel_type(&mut self, task_type: TaskType) -> bool {
        for id in self.task_order.iter().rev() {
            if let Some(task) = self.tasks.get(id) {
                if task.task_type == task_type && task.is_running() {
                    task.cancel();
                    return true;
                }
            }
        }
        false
    }

    /// Cancel the most recently started running task.
    /// Returns true if a task was cancelled.
    pub fn cancel_most_recent(&mut self) -> bool {
        for id in self.task_order.iter().rev() {
            if let Some(task) = self.tasks.get(id) {
                if task.is_running() {
                    task.cancel();
                    return true;
                }
            }
        }
        false
    }

    /// Poll all task channels for updates.
    /// Returns the tasks that finished, in registration order.
    pub fn poll_updates(&mut self) -> Vec<TaskCompletionInfo> {
        let mut completed = Vec::new();

        for id in self.task_order.clone() {
            let Some(task) = self.tasks.get_mut(&id) else {
                continue;
            };

            loop {
                let update = match task.receiver.try_recv() {
                    Ok(update) => update,
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        // Worker exited without reporting, most likely a panic.
                        if task.is_running() {
                            let error = "Worker stopped unexpectedly".to_string();
                            task.state = TaskState::Failed(error.clone());
                            completed.push(TaskCompletionInfo {
                                id,
                                task_type: task.task_type,
                                cancel_requested: task.cancel_flag.load(Ordering::SeqCst),
                                message: error,
                                success: false,
                                outcome: None,
                            });
                        }
                        break;
                    }
                };

                match update {
                    TaskUpdate::Started { total } => {
                        task.progress = Some(TaskProgress::new(0, total));
                    }
                    TaskUpdate::Progress(progress) => {
                        task.progress = Some(progress);
                    }
                    TaskUpdate::Completed { message, outcome } => {
                        task.state = TaskState::Completed;
                        completed.push(TaskCompletionInfo {
                            id,
                            task_type: task.task_type,
                            cancel_requested: task.cancel_flag.load(Ordering::SeqCst),
                            message,
                            success: true,
                            outcome,
                        });
                    }
                    TaskUpdate::Cancelled => {
                        task.state = TaskState::Cancelled;
                        completed.push(TaskCompletionInfo {
                            id,
                            task_type: task.task_type,
                            cancel_requested: task.cancel_flag.load(Ordering::SeqCst),
                            message: "Cancelled".to_string(),
                            success: false,
                            outcome: None,
                        });
                    }
                    TaskUpdate::Failed { error } => {
                        task.state = TaskState::Failed(error.clone());
                        completed.push(TaskCompletionInfo {
                            id,
                            task_type: task.task_type,
                            cancel_requested: task.cancel_flag.load(Ordering::SeqCst),
                            message: error,
                            success: false,
                            outcome: None,
                        });
                    }
                }

                if !task.is_running() {
                    break;
                }
            }
        }

        for info in &completed {
            self.tasks.remove(&info.id);
            self.task_order.retain(|id| *id != info.id);
        }

        completed
    }

    /// Get all running tasks for display.
    pub fn running_tasks(&self) -> Vec<&BackgroundTask> {
        self.task_order
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .filter(|t| t.is_running())
            .collect()
    }

    pub fn has_running_tasks(&self) -> bool {
        self.tasks.values().any(|t| t.is_running())
    }
}

impl Default for BackgroundTaskManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::{Category, NewPhoto};
    use crate::tasks::TaskOutcome;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_completion_is_reported_once_and_removed() {
        let mut manager = BackgroundTaskManager::new();
        let (id, tx, _cancel) = manager.register_task(TaskType::Upload);
        assert!(manager.is_running(TaskType::Upload));
        assert!(!manager.is_running(TaskType::Download));

        tx.send(TaskUpdate::Started { total: 2 }).unwrap();
        assert!(manager.poll_updates().is_empty());
        assert_eq!(manager.running_tasks()[0].progress.as_ref().unwrap().total, 2);

        let photo = NewPhoto {
            title: "Rex".to_string(),
            description: None,
            image_url: "file:///tmp/rex.png".to_string(),
            category: Category::Puppy,
            is_favorite: false,
        };
        tx.send(TaskUpdate::Completed {
            message: "Uploaded".to_string(),
            outcome: Some(TaskOutcome::Uploaded(photo)),
        })
        .unwrap();

        let done = manager.poll_updates();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, id);
        assert!(done[0].success);
        assert!(matches!(done[0].outcome, Some(TaskOutcome::Uploaded(ref p)) if p.title == "Rex"));
        assert!(!manager.has_running_tasks());
        assert!(manager.poll_updates().is_empty());
    }

    #[test]
    fn test_completion_after_cancel_is_flagged() {
        let mut manager = BackgroundTaskManager::new();
        let (_id, tx, _cancel) = manager.register_task(TaskType::Upload);
        tx.send(TaskUpdate::Completed {
            message: "Uploaded".to_string(),
            outcome: None,
        })
        .unwrap();
        assert!(manager.cancel_type(TaskType::Upload));

        let done = manager.poll_updates();
        assert_eq!(done.len(), 1);
        assert!(done[0].success);
        assert!(done[0].cancel_requested);
    }

    #[test]
    fn test_failure_is_reported() {
        let mut manager = BackgroundTaskManager::new();
        let (_id, tx, _cancel) = manager.register_task(TaskType::Download);
        tx.send(TaskUpdate::Failed { error: "disk full".to_string() }).unwrap();

        let done = manager.poll_updates();
        assert_eq!(done.len(), 1);
        assert!(!done[0].success);
        assert_eq!(done[0].message, "disk full");
        assert!(done[0].outcome.is_none());
        assert!(!done[0].cancel_requested);
    }

    #[test]
    fn test_dropped_worker_counts_as_failure() {
        let mut manager = BackgroundTaskManager::new();
        let (_id, tx, _cancel) = manager.register_task(TaskType::Upload);
        drop(tx);

        let done = manager.poll_updates();
        assert_eq!(done.len(), 1);
        assert!(!done[0].success);
        assert!(!manager.is_running(TaskType::Upload));
    }

    #[test]
    fn test_cancel_sets_flag_on_most_recent() {
        let mut manager = BackgroundTaskManager::new();
        let (_a, _tx_a, flag_a) = manager.register_task(TaskType::Upload);
        let (_b, _tx_b, flag_b) = manager.register_task(TaskType::Download);

        assert!(manager.cancel_most_recent());
        assert!(!flag_a.load(Ordering::SeqCst));
        assert!(flag_b.load(Ordering::SeqCst));

        assert!(manager.cancel_type(TaskType::Upload));
        assert!(flag_a.load(Ordering::SeqCst));
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(TaskProgress::new(1, 4).percent(), 25);
        assert_eq!(TaskProgress::new(3, 0).percent(), 0);
        assert_eq!(TaskProgress::new(9, 4).percent(), 100);
    }
}
