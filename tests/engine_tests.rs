//! Integration tests for the assignment engine.
//!
//! These tests drive an `EntityStore` over an in-memory key-value backend.
//! Tests are organized by operation.

use crew_dispatch::error::{EngineError, ErrorCode};
use crew_dispatch::persist::{KeyValueStore, MemoryKv};
use crew_dispatch::store::EntityStore;
use crew_dispatch::types::{DAILY_CAPACITY_HOURS, Priority};
use std::cell::Cell;
use std::rc::Rc;

/// Helper to create an empty store with no seeded roster.
fn setup_store() -> EntityStore {
    EntityStore::open(Box::new(MemoryKv::new()), false).expect("Failed to open store")
}

/// Store with one worker, Ana (W001).
fn setup_store_with_ana() -> EntityStore {
    let mut store = setup_store();
    store.add_worker("Ana").expect("Failed to add worker");
    store
}

/// Backend whose writes can be switched off mid-test.
struct FlakyKv {
    inner: MemoryKv,
    fail_writes: Rc<Cell<bool>>,
}

impl KeyValueStore for FlakyKv {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_writes.get() {
            anyhow::bail!("disk full");
        }
        self.inner.set(key, value)
    }
}

fn assert_loads_consistent(store: &EntityStore) {
    let data = store.snapshot();
    for worker in &data.workers {
        assert!(worker.total_assigned_hours >= 0.0);
        assert!(worker.total_assigned_hours <= DAILY_CAPACITY_HOURS);
        assert!((worker.total_assigned_hours - data.held_hours(&worker.id)).abs() < 1e-9);
    }
}

mod worker_tests {
    use super::*;

    #[test]
    fn add_worker_mints_sequential_ids() {
        let mut store = setup_store();

        let a = store.add_worker("Ana").unwrap();
        let b = store.add_worker("  Ben  ").unwrap();

        assert_eq!(a.id, "W001");
        assert_eq!(b.id, "W002");
        assert_eq!(b.name, "Ben");
        assert!(b.availability);
        assert_eq!(b.total_assigned_hours, 0.0);
    }

    #[test]
    fn add_worker_rejects_blank_name() {
        let mut store = setup_store();

        let err = store.add_worker("   ").unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(store.get_workers().is_empty());
        assert_eq!(store.snapshot().next_worker_id, 1);
    }

    #[test]
    fn unavailable_worker_keeps_assignments_but_takes_no_more() {
        let mut store = setup_store_with_ana();
        let t1 = store.add_task("Mop", Priority::Low, 2.0, "2025-01-01").unwrap();
        let t2 = store.add_task("Dust", Priority::Low, 1.0, "2025-01-01").unwrap();
        store.assign_task_to_worker(&t1.id, "W001").unwrap();

        store.update_worker_availability("W001", false).unwrap();

        assert!(store.get_available_workers().is_empty());
        assert_eq!(store.get_worker("W001").unwrap().total_assigned_hours, 2.0);
        let err = store.assign_task_to_worker(&t2.id, "W001").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CapacityError);
    }

    #[test]
    fn availability_of_unknown_worker_is_not_found() {
        let mut store = setup_store();

        let err = store.update_worker_availability("W042", true).unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}

mod task_tests {
    use super::*;

    #[test]
    fn add_task_starts_unassigned_and_open() {
        let mut store = setup_store();

        let task = store
            .add_task("Clean lobby", Priority::High, 5.0, "2025-01-01")
            .unwrap();

        assert_eq!(task.id, "T001");
        assert!(task.assigned_to.is_none());
        assert!(!task.completed);
        assert_eq!(task.deadline.to_string(), "2025-01-01");
    }

    #[test]
    fn add_task_validates_inputs() {
        let mut store = setup_store();

        let cases = [
            ("", 1.0, "2025-01-01", "description"),
            ("Mop", 0.0, "2025-01-01", "time_estimate"),
            ("Mop", -2.0, "2025-01-01", "time_estimate"),
            ("Mop", f64::NAN, "2025-01-01", "time_estimate"),
            ("Mop", 1.0, "01/02/2025", "deadline"),
            ("Mop", 1.0, "2025-02-30", "deadline"),
        ];
        for (description, hours, deadline, field) in cases {
            let err = store
                .add_task(description, Priority::Medium, hours, deadline)
                .unwrap_err();
            match err {
                EngineError::Validation { field: f, .. } => assert_eq!(f, field),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
        assert!(store.get_tasks().is_empty());
        assert_eq!(store.snapshot().next_task_id, 1);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut store = setup_store();
        store.add_task("A", Priority::Low, 1.0, "2025-01-01").unwrap();
        let _ = store.add_task("", Priority::Low, 1.0, "2025-01-01");

        let next = store.add_task("B", Priority::Low, 1.0, "2025-01-01").unwrap();

        assert_eq!(next.id, "T002");
    }

    #[test]
    fn add_task_and_assign_keeps_task_when_assignment_fails() {
        let mut store = setup_store_with_ana();

        let intake = store
            .add_task_and_assign("Strip floors", Priority::High, 9.0, "2025-01-01", "W001")
            .unwrap();

        assert!(intake.worker.is_none());
        assert_eq!(
            intake.assign_error.as_ref().map(EngineError::code),
            Some(ErrorCode::CapacityError)
        );
        assert!(store.get_task(&intake.task.id).is_some());
        assert!(store.get_task(&intake.task.id).unwrap().assigned_to.is_none());
    }

    #[test]
    fn add_task_and_assign_assigns_on_success() {
        let mut store = setup_store_with_ana();

        let intake = store
            .add_task_and_assign("Polish", Priority::Low, 3.0, "2025-01-01", "W001")
            .unwrap();

        assert!(intake.assign_error.is_none());
        assert_eq!(intake.task.assigned_to.as_deref(), Some("W001"));
        assert_eq!(intake.worker.unwrap().total_assigned_hours, 3.0);
    }
}

mod assignment_tests {
    use super::*;

    #[test]
    fn lobby_scenario_tracks_capacity() {
        let mut store = setup_store_with_ana();
        let lobby = store
            .add_task("Clean lobby", Priority::High, 5.0, "2025-01-01")
            .unwrap();

        let assignment = store.assign_task_to_worker(&lobby.id, "W001").unwrap();
        assert_eq!(assignment.worker.unwrap().total_assigned_hours, 5.0);

        let extra = store
            .add_task("Windows", Priority::Medium, 4.0, "2025-01-01")
            .unwrap();
        let err = store.assign_task_to_worker(&extra.id, "W001").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CapacityError);
        assert_eq!(store.get_worker("W001").unwrap().total_assigned_hours, 5.0);
        assert!(store.get_task(&extra.id).unwrap().assigned_to.is_none());

        store.complete_task(&lobby.id).unwrap();
        assert_eq!(store.get_worker("W001").unwrap().total_assigned_hours, 0.0);
        assert_loads_consistent(&store);
    }

    #[test]
    fn unknown_task_is_not_found() {
        let mut store = setup_store_with_ana();

        let err = store.assign_task_to_worker("T999", "W001").unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "Task not found: T999");
    }

    #[test]
    fn unknown_worker_is_not_found() {
        let mut store = setup_store_with_ana();
        let task = store.add_task("Mop", Priority::Low, 2.0, "2025-01-01").unwrap();
        let before = store.snapshot();

        let err = store.assign_task_to_worker(&task.id, "W999").unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "Worker not found: W999");
        assert!(store.get_task(&task.id).unwrap().assigned_to.is_none());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn unassign_unknown_task_is_not_found() {
        let mut store = setup_store_with_ana();
        let before = store.snapshot();

        let err = store.unassign_task("T999").unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn exactly_full_day_is_allowed() {
        let mut store = setup_store_with_ana();
        let a = store.add_task("A", Priority::Low, 5.5, "2025-01-01").unwrap();
        let b = store.add_task("B", Priority::Low, 2.5, "2025-01-01").unwrap();

        store.assign_task_to_worker(&a.id, "W001").unwrap();
        store.assign_task_to_worker(&b.id, "W001").unwrap();

        assert_eq!(
            store.get_worker("W001").unwrap().total_assigned_hours,
            DAILY_CAPACITY_HOURS
        );
    }

    #[test]
    fn reassignment_requires_unassign() {
        let mut store = setup_store_with_ana();
        store.add_worker("Ben").unwrap();
        let task = store.add_task("Mop", Priority::Low, 2.0, "2025-01-01").unwrap();
        store.assign_task_to_worker(&task.id, "W001").unwrap();

        let err = store.assign_task_to_worker(&task.id, "W002").unwrap_err();
        assert_eq!(err.code(), ErrorCode::StateError);

        store.unassign_task(&task.id).unwrap();
        store.assign_task_to_worker(&task.id, "W002").unwrap();
        assert_eq!(store.get_worker("W001").unwrap().total_assigned_hours, 0.0);
        assert_eq!(store.get_worker("W002").unwrap().total_assigned_hours, 2.0);
    }

    #[test]
    fn unassign_then_reassign_restores_hours() {
        let mut store = setup_store_with_ana();
        let task = store.add_task("Mop", Priority::Low, 3.25, "2025-01-01").unwrap();
        store.assign_task_to_worker(&task.id, "W001").unwrap();
        let before = store.get_worker("W001").unwrap().total_assigned_hours;

        let released = store.unassign_task(&task.id).unwrap();
        assert_eq!(released.worker.unwrap().total_assigned_hours, 0.0);
        store.assign_task_to_worker(&task.id, "W001").unwrap();

        assert_eq!(store.get_worker("W001").unwrap().total_assigned_hours, before);
        assert_loads_consistent(&store);
    }

    #[test]
    fn unassigning_open_task_is_state_error() {
        let mut store = setup_store();
        let task = store.add_task("Mop", Priority::Low, 1.0, "2025-01-01").unwrap();

        let err = store.unassign_task(&task.id).unwrap_err();

        assert_eq!(err.code(), ErrorCode::StateError);
    }
}

mod completion_tests {
    use super::*;

    #[test]
    fn completed_task_keeps_assignee() {
        let mut store = setup_store_with_ana();
        let task = store.add_task("Mop", Priority::Low, 2.0, "2025-01-01").unwrap();
        store.assign_task_to_worker(&task.id, "W001").unwrap();

        let done = store.complete_task(&task.id).unwrap();

        assert!(done.task.completed);
        assert_eq!(done.task.assigned_to.as_deref(), Some("W001"));
        assert_eq!(done.worker.unwrap().total_assigned_hours, 0.0);
    }

    #[test]
    fn completed_task_is_terminal() {
        let mut store = setup_store_with_ana();
        let task = store.add_task("Mop", Priority::Low, 2.0, "2025-01-01").unwrap();
        store.assign_task_to_worker(&task.id, "W001").unwrap();
        store.complete_task(&task.id).unwrap();

        for err in [
            store.complete_task(&task.id).unwrap_err(),
            store.unassign_task(&task.id).unwrap_err(),
            store.assign_task_to_worker(&task.id, "W001").unwrap_err(),
        ] {
            assert_eq!(err.code(), ErrorCode::StateError);
        }
        assert_eq!(store.get_worker("W001").unwrap().total_assigned_hours, 0.0);
    }

    #[test]
    fn unassigned_task_cannot_be_completed() {
        let mut store = setup_store();
        let task = store.add_task("Mop", Priority::Low, 2.0, "2025-01-01").unwrap();

        let err = store.complete_task(&task.id).unwrap_err();

        assert_eq!(err.code(), ErrorCode::StateError);
        assert!(!store.get_task(&task.id).unwrap().completed);
    }

    #[test]
    fn complete_unknown_task_is_not_found() {
        let mut store = setup_store_with_ana();
        let before = store.snapshot();

        let err = store.complete_task("T999").unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "Task not found: T999");
        assert_eq!(store.snapshot(), before);
    }
}

mod atomicity_tests {
    use super::*;

    #[test]
    fn failed_write_leaves_store_unchanged() {
        let fail_writes = Rc::new(Cell::new(false));
        let backend = FlakyKv {
            inner: MemoryKv::new(),
            fail_writes: Rc::clone(&fail_writes),
        };
        let mut store = EntityStore::open(Box::new(backend), false).unwrap();
        store.add_worker("Ana").unwrap();
        let task = store.add_task("Mop", Priority::Low, 2.0, "2025-01-01").unwrap();
        let before = store.snapshot();

        fail_writes.set(true);
        let err = store.assign_task_to_worker(&task.id, "W001").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PersistenceError);
        assert!(store.add_worker("Ben").is_err());

        assert_eq!(store.snapshot(), before);

        fail_writes.set(false);
        store.assign_task_to_worker(&task.id, "W001").unwrap();
        assert_eq!(store.get_worker("W001").unwrap().total_assigned_hours, 2.0);
    }

    #[test]
    fn rejected_operation_does_not_write() {
        let mut store = setup_store_with_ana();
        let before = store.snapshot();

        let _ = store.assign_task_to_worker("T001", "W001");
        let _ = store.add_task("Mop", Priority::Low, 1.0, "tomorrow");

        assert_eq!(store.snapshot(), before);
    }
}
