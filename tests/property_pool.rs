// tests/property_pool.rs

mod common;
use crate::common::builders::simple_tasks;
use crate::common::fake_executor::ScriptedExecutor;

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use tokio::sync::watch;

use sweepbuild::engine::{RunSummary, WorkerPool, run_sweep};
use sweepbuild::types::Budget;

fn sweep(budgets: &[i64], failing: &BTreeSet<i64>, jobs: usize) -> RunSummary {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let tasks = simple_tasks(budgets, dir.path());
        let executor = Arc::new(ScriptedExecutor::new().failing(failing.iter().copied()));
        let pool = WorkerPool::new(jobs).unwrap();
        let (_tx, rx) = watch::channel(false);
        run_sweep(tasks, executor, &pool, rx).await
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_task_is_classified_exactly_once(
        budgets in proptest::collection::btree_set(-1000i64..1000, 0..40),
        failing_mask in proptest::collection::vec(any::<bool>(), 40),
        jobs in 1usize..10,
    ) {
        let budgets: Vec<i64> = budgets.into_iter().collect();
        let failing: BTreeSet<i64> = budgets
            .iter()
            .zip(failing_mask.iter())
            .filter(|(_, fail)| **fail)
            .map(|(b, _)| *b)
            .collect();

        let summary = sweep(&budgets, &failing, jobs);

        prop_assert_eq!(summary.total, budgets.len());
        prop_assert_eq!(summary.succeeded.len() + summary.failed.len(), budgets.len());
        let failed: BTreeSet<Budget> = summary.failed_ids().collect();
        prop_assert!(summary.succeeded.is_disjoint(&failed));
        prop_assert!(summary.not_run.is_empty());

        let expected_failed: BTreeSet<Budget> = failing.iter().copied().map(Budget::new).collect();
        prop_assert_eq!(failed, expected_failed);
    }

    #[test]
    fn pool_size_does_not_change_classification(
        budgets in proptest::collection::btree_set(0i64..500, 1..25),
        failing in proptest::collection::btree_set(0i64..500, 0..25),
        jobs in 2usize..12,
    ) {
        let budgets: Vec<i64> = budgets.into_iter().collect();

        let sequential = sweep(&budgets, &failing, 1);
        let parallel = sweep(&budgets, &failing, jobs);

        prop_assert_eq!(&sequential.succeeded, &parallel.succeeded);
        prop_assert_eq!(
            sequential.failed_ids().collect::<Vec<_>>(),
            parallel.failed_ids().collect::<Vec<_>>()
        );
    }
}
