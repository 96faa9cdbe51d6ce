// ==========================================
// Test data builders for integration tests
// ==========================================

use chrono::NaiveDate;
use mes_scheduler::db;
use mes_scheduler::domain::operation::Operation;
use mes_scheduler::domain::types::{Priority, StandardTime};
use mes_scheduler::domain::work_center::WorkCenter;
use mes_scheduler::domain::work_order::WorkOrder;
use mes_scheduler::repository::operation_repo::{NewOperation, OperationRepository};
use mes_scheduler::repository::work_center_repo::{NewWorkCenter, WorkCenterRepository};
use mes_scheduler::repository::work_order_repo::{NewWorkOrder, WorkOrderRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// In-memory database fixture
// ==========================================

pub struct TestDb {
    pub conn: Arc<Mutex<Connection>>,
}

impl TestDb {
    pub fn new() -> Self {
        let conn = db::open_in_memory_connection().expect("open in-memory db");
        db::init_schema(&conn).expect("init schema");
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn work_centers(&self) -> WorkCenterRepository {
        WorkCenterRepository::from_connection(self.conn.clone())
    }

    pub fn work_orders(&self) -> WorkOrderRepository {
        WorkOrderRepository::from_connection(self.conn.clone())
    }

    pub fn operations(&self) -> OperationRepository {
        OperationRepository::from_connection(self.conn.clone())
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// WorkCenter builder
// ==========================================

pub struct WorkCenterBuilder {
    code: String,
    name: String,
    capacity_hours_per_day: f64,
    setup_time_minutes: i64,
}

impl WorkCenterBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: format!("center {}", code),
            capacity_hours_per_day: 8.0,
            setup_time_minutes: 0,
        }
    }

    pub fn capacity_hours(mut self, hours: f64) -> Self {
        self.capacity_hours_per_day = hours;
        self
    }

    pub fn setup_minutes(mut self, minutes: i64) -> Self {
        self.setup_time_minutes = minutes;
        self
    }

    pub fn build(self, db: &TestDb) -> WorkCenter {
        db.work_centers()
            .insert(NewWorkCenter {
                code: self.code,
                name: self.name,
                description: None,
                capacity_hours_per_day: self.capacity_hours_per_day,
                setup_time_minutes: self.setup_time_minutes,
            })
            .expect("insert work center")
    }
}

// ==========================================
// WorkOrder builder (with routing operations)
// ==========================================

pub struct WorkOrderBuilder {
    reference: String,
    quantity: i64,
    priority: Priority,
    delivery_date: Option<NaiveDate>,
    assembly_date: Option<NaiveDate>,
    tertiary_date: Option<NaiveDate>,
    operations: Vec<NewOperation>,
}

impl WorkOrderBuilder {
    pub fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            quantity: 1,
            priority: Priority::Normal,
            delivery_date: None,
            assembly_date: None,
            tertiary_date: None,
            operations: Vec::new(),
        }
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn delivery(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    pub fn assembly(mut self, date: NaiveDate) -> Self {
        self.assembly_date = Some(date);
        self
    }

    pub fn tertiary(mut self, date: NaiveDate) -> Self {
        self.tertiary_date = Some(date);
        self
    }

    /// Add a routing operation on the given work center.
    pub fn operation(self, work_center_id: i64, standard_minutes: Option<i64>) -> Self {
        self.operation_with_deps(work_center_id, standard_minutes, vec![])
    }

    pub fn operation_with_deps(
        mut self,
        work_center_id: i64,
        standard_minutes: Option<i64>,
        dependencies: Vec<i64>,
    ) -> Self {
        let seq = (self.operations.len() + 1) as i64;
        self.operations.push(NewOperation {
            work_center_id,
            sequence_number: seq,
            name: format!("{} op {}", self.reference, seq),
            standard_time: StandardTime::from(standard_minutes),
            quantity_target: Some(self.quantity),
            dependencies,
        });
        self
    }

    pub fn build(self, db: &TestDb) -> (WorkOrder, Vec<Operation>) {
        let order = db
            .work_orders()
            .insert_with_operations(
                NewWorkOrder {
                    reference_number: self.reference,
                    product_id: 1,
                    quantity: self.quantity,
                    priority: self.priority,
                    delivery_date: self.delivery_date,
                    assembly_date: self.assembly_date,
                    tertiary_date: self.tertiary_date,
                },
                self.operations,
            )
            .expect("insert work order");
        let operations = db
            .operations()
            .find_by_work_order(order.id)
            .expect("load operations");
        (order, operations)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
