// ==========================================
// Scheduling flow integration tests
// ==========================================
// End-to-end through SchedulingApi: optimize, reorder, read back,
// conflicts and warnings.
// ==========================================

mod helpers;

use helpers::test_data_builder::{date, TestDb, WorkCenterBuilder, WorkOrderBuilder};
use mes_scheduler::api::{ApiError, SchedulingApi};
use mes_scheduler::domain::types::{OptimizeCriterion, Priority};
use mes_scheduler::logging;

fn api(db: &TestDb) -> SchedulingApi {
    logging::init_test();
    SchedulingApi::from_connection(db.conn.clone())
}

#[test]
fn test_optimize_by_delivery_date_orders_and_projects() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").capacity_hours(8.0).build(&db);

    let (_, a_ops) = WorkOrderBuilder::new("A")
        .delivery(date(2024, 1, 10))
        .operation(wc.id, Some(200))
        .build(&db);
    let (_, b_ops) = WorkOrderBuilder::new("B")
        .delivery(date(2024, 1, 5))
        .operation(wc.id, Some(200))
        .build(&db);
    let (_, c_ops) = WorkOrderBuilder::new("C")
        .operation(wc.id, Some(100))
        .build(&db);

    let result = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByDeliveryDate, None)
        .unwrap();

    let ids: Vec<i64> = result.entries.iter().map(|e| e.operation_id).collect();
    assert_eq!(ids, vec![b_ops[0].id, a_ops[0].id, c_ops[0].id]);
    assert_eq!(result.total_operations(), 3);

    // contiguous 1-based sequence, projected instants chained
    let seq: Vec<i64> = result.entries.iter().map(|e| e.sequence_order).collect();
    assert_eq!(seq, vec![1, 2, 3]);
    for pair in result.entries.windows(2) {
        assert_eq!(pair[0].estimated_end, pair[1].estimated_start);
    }
    assert_eq!(
        result.estimated_completion,
        result.entries.last().unwrap().estimated_end
    );

    // 500 planned minutes on a 480-minute day
    assert_eq!(result.conflicts.len(), 1);
    assert!(result.conflicts[0].message.contains("overage 20 min"));

    // the committed order is what a plain read returns
    let schedule = api.get_schedule("WC1").unwrap();
    let stored: Vec<i64> = schedule.iter().map(|e| e.operation_id).collect();
    assert_eq!(stored, ids);
}

#[test]
fn test_optimize_twice_is_idempotent() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").build(&db);
    for (reference, delivery) in [("X", Some(date(2024, 3, 1))), ("Y", None), ("Z", Some(date(2024, 2, 1)))] {
        let mut builder = WorkOrderBuilder::new(reference);
        if let Some(d) = delivery {
            builder = builder.delivery(d);
        }
        builder.operation(wc.id, Some(60)).build(&db);
    }

    let first = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByDeliveryDate, None)
        .unwrap();
    let second = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByDeliveryDate, None)
        .unwrap();

    assert_eq!(
        first.entries.iter().map(|e| e.operation_id).collect::<Vec<_>>(),
        second.entries.iter().map(|e| e.operation_id).collect::<Vec<_>>()
    );
}

#[test]
fn test_urgency_criterion_puts_urgent_orders_first() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").build(&db);

    let (_, normal) = WorkOrderBuilder::new("NORMAL")
        .priority(Priority::Normal)
        .delivery(date(2024, 1, 2))
        .operation(wc.id, Some(30))
        .build(&db);
    let (_, urgent) = WorkOrderBuilder::new("URGENT")
        .priority(Priority::Urgent)
        .delivery(date(2024, 1, 20))
        .operation(wc.id, Some(30))
        .build(&db);

    let result = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByUrgency, None)
        .unwrap();
    let ids: Vec<i64> = result.entries.iter().map(|e| e.operation_id).collect();
    assert_eq!(ids, vec![urgent[0].id, normal[0].id]);
}

#[test]
fn test_assembly_and_tertiary_date_criteria() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").build(&db);

    let (_, late) = WorkOrderBuilder::new("LATE")
        .assembly(date(2024, 1, 20))
        .tertiary(date(2024, 1, 3))
        .operation(wc.id, Some(30))
        .build(&db);
    let (_, early) = WorkOrderBuilder::new("EARLY")
        .assembly(date(2024, 1, 8))
        .tertiary(date(2024, 1, 15))
        .operation(wc.id, Some(30))
        .build(&db);

    let by_assembly = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByAssemblyDate, None)
        .unwrap();
    let ids: Vec<i64> = by_assembly.entries.iter().map(|e| e.operation_id).collect();
    assert_eq!(ids, vec![early[0].id, late[0].id]);

    let by_tertiary = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByTertiaryDate, None)
        .unwrap();
    let ids: Vec<i64> = by_tertiary.entries.iter().map(|e| e.operation_id).collect();
    assert_eq!(ids, vec![late[0].id, early[0].id]);
}

#[test]
fn test_reorder_applies_and_bad_reorder_changes_nothing() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").build(&db);
    let (_, a) = WorkOrderBuilder::new("A").operation(wc.id, Some(30)).build(&db);
    let (_, b) = WorkOrderBuilder::new("B").operation(wc.id, Some(30)).build(&db);

    let result = api
        .reorder_schedule("WC1", vec![b[0].id, a[0].id])
        .unwrap();
    let ids: Vec<i64> = result.entries.iter().map(|e| e.operation_id).collect();
    assert_eq!(ids, vec![b[0].id, a[0].id]);

    // missing one id and naming a foreign one
    let err = api.reorder_schedule("WC1", vec![a[0].id, 9999]).unwrap_err();
    assert!(matches!(err, ApiError::InvalidSequence(_)));

    let schedule = api.get_schedule("WC1").unwrap();
    let stored: Vec<i64> = schedule.iter().map(|e| e.operation_id).collect();
    assert_eq!(stored, vec![b[0].id, a[0].id]);
}

#[test]
fn test_order_filter_limits_the_run() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").build(&db);
    let (order_a, a) = WorkOrderBuilder::new("A").operation(wc.id, Some(30)).build(&db);
    let (_order_b, _b) = WorkOrderBuilder::new("B").operation(wc.id, Some(30)).build(&db);

    let result = api
        .optimize_schedule(
            "WC1",
            &OptimizeCriterion::ByDeliveryDate,
            Some(&[order_a.id]),
        )
        .unwrap();
    let ids: Vec<i64> = result.entries.iter().map(|e| e.operation_id).collect();
    assert_eq!(ids, vec![a[0].id]);
}

#[test]
fn test_unestimated_operation_is_flagged_not_dropped() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").build(&db);
    let (_, ops) = WorkOrderBuilder::new("U").operation(wc.id, None).build(&db);

    let result = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByDeliveryDate, None)
        .unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.entries[0].estimated_start,
        result.entries[0].estimated_end
    );
    assert_eq!(result.entries[0].operation_id, ops[0].id);
}

#[test]
fn test_unknown_and_inactive_centers_are_rejected() {
    let db = TestDb::new();
    let api = api(&db);
    WorkCenterBuilder::new("WC1").build(&db);

    let err = api
        .optimize_schedule("NOPE", &OptimizeCriterion::ByDeliveryDate, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    api.set_work_center_active("WC1", false).unwrap();
    let err = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByDeliveryDate, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[test]
fn test_setup_time_extends_every_slot() {
    let db = TestDb::new();
    let api = api(&db);
    let wc = WorkCenterBuilder::new("WC1").setup_minutes(10).build(&db);
    WorkOrderBuilder::new("A").operation(wc.id, Some(50)).build(&db);
    WorkOrderBuilder::new("B").operation(wc.id, Some(50)).build(&db);

    let result = api
        .optimize_schedule("WC1", &OptimizeCriterion::ByDeliveryDate, None)
        .unwrap();
    for entry in &result.entries {
        let minutes = (entry.estimated_end.unwrap() - entry.estimated_start.unwrap()).num_minutes();
        assert_eq!(minutes, 60);
    }
}
