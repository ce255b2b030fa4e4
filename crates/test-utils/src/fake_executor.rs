use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sweepbuild::engine::TaskResult;
use sweepbuild::exec::TaskExecutor;
use sweepbuild::task::BuildTask;
use sweepbuild::types::Budget;

/// A fake executor that:
/// - records which budgets were "built", in dispatch order
/// - tracks how many executions overlap
/// - fails the budgets it was told to fail, succeeds the rest.
#[derive(Default)]
pub struct ScriptedExecutor {
    failing: HashSet<Budget>,
    delay: Duration,
    executed: Mutex<Vec<Budget>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, budgets: impl IntoIterator<Item = i64>) -> Self {
        self.failing = budgets.into_iter().map(Budget::new).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn executed(&self) -> Vec<Budget> {
        self.executed.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl TaskExecutor for ScriptedExecutor {
    fn execute(&self, task: BuildTask) -> Pin<Box<dyn Future<Output = TaskResult> + Send + '_>> {
        Box::pin(async move {
            self.executed.lock().unwrap().push(task.id());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&task.id()) {
                TaskResult::failure(&task, "exit status 1")
            } else {
                TaskResult::success(&task)
            }
        })
    }
}
