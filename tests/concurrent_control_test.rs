// ==========================================
// Concurrency control integration tests
// ==========================================
// CAS transition discipline: mutually exclusive writers get exactly
// one winner, identical completions are idempotent, and a failed
// re-sequence never leaves a torn renumbering.
// ==========================================

mod helpers;

use helpers::test_data_builder::{TestDb, WorkCenterBuilder, WorkOrderBuilder};
use mes_scheduler::domain::types::{DependencyMode, ExecutionStatus};
use mes_scheduler::engine::lifecycle::LifecycleController;
use mes_scheduler::engine::SchedulingError;
use mes_scheduler::logging;
use mes_scheduler::repository::RepositoryError;
use std::sync::Arc;
use std::thread;

#[test]
fn test_cancel_racing_complete_has_one_winner() {
    logging::init_test();
    let db = TestDb::new();
    let wc = WorkCenterBuilder::new("WC1").build(&db);
    let (_, ops) = WorkOrderBuilder::new("RN1").operation(wc.id, Some(30)).build(&db);
    let id = ops[0].id;

    let controller = Arc::new(LifecycleController::new(
        db.conn.clone(),
        DependencyMode::Advisory,
    ));
    controller
        .transition_operation(id, ExecutionStatus::InProgress)
        .unwrap();

    let mut handles = Vec::new();
    for target in [ExecutionStatus::Completed, ExecutionStatus::Cancelled] {
        let controller = controller.clone();
        handles.push(thread::spawn(move || {
            controller.transition_operation(id, target)
        }));
    }
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    // the loser observed the final state, not a masked write
    let loser = outcomes.into_iter().find(|r| r.is_err()).unwrap().unwrap_err();
    match loser {
        SchedulingError::Repository(RepositoryError::StaleState { .. })
        | SchedulingError::InvalidTransition { .. } => {}
        other => panic!("unexpected loser outcome: {:?}", other),
    }
    let final_status = db.operations().find_by_id(id).unwrap().status;
    assert!(matches!(
        final_status,
        ExecutionStatus::Completed | ExecutionStatus::Cancelled
    ));
}

#[test]
fn test_competing_completions_both_report_success() {
    logging::init_test();
    let db = TestDb::new();
    let wc = WorkCenterBuilder::new("WC1").build(&db);
    let (_, ops) = WorkOrderBuilder::new("RN1").operation(wc.id, Some(30)).build(&db);
    let id = ops[0].id;

    let controller = Arc::new(LifecycleController::new(
        db.conn.clone(),
        DependencyMode::Advisory,
    ));
    controller
        .transition_operation(id, ExecutionStatus::InProgress)
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let controller = controller.clone();
        handles.push(thread::spawn(move || {
            controller.transition_operation(id, ExecutionStatus::Completed)
        }));
    }
    for handle in handles {
        let op = handle.join().unwrap().unwrap();
        assert_eq!(op.status, ExecutionStatus::Completed);
    }
}

#[test]
fn test_competing_resequences_never_tear_the_numbering() {
    logging::init_test();
    let db = TestDb::new();
    let wc = WorkCenterBuilder::new("WC1").build(&db);
    let (_, a) = WorkOrderBuilder::new("A").operation(wc.id, Some(30)).build(&db);
    let (_, b) = WorkOrderBuilder::new("B").operation(wc.id, Some(30)).build(&db);
    let (_, c) = WorkOrderBuilder::new("C").operation(wc.id, Some(30)).build(&db);
    let ids = [a[0].id, b[0].id, c[0].id];

    let operations = Arc::new(db.operations());
    let wc_id = wc.id;
    let mut handles = Vec::new();
    for order in [
        vec![ids[0], ids[1], ids[2]],
        vec![ids[2], ids[1], ids[0]],
        vec![ids[1], ids[0], ids[2]],
    ] {
        let operations = operations.clone();
        handles.push(thread::spawn(move || {
            operations.commit_sequence(wc_id, &order)
        }));
    }
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // whichever commit landed last, the stored numbering is a
    // contiguous 1..=3 permutation
    let queue = operations.load_pending_for_work_center(wc_id, None).unwrap();
    let mut sequence: Vec<i64> = queue.iter().map(|c| c.operation.sequence_number).collect();
    sequence.sort_unstable();
    assert_eq!(sequence, vec![1, 2, 3]);
}
