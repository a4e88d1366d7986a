use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::{Employee, EmployeeFields, EmployeeId, HrError, HrResult, PageRequest};

/// Thread-safe in-memory employee store.
///
/// Reads share the lock; writes hold it exclusively. Identifier assignment and
/// insertion happen under the same write guard, so every issued id has a
/// record and ids never repeat.
#[derive(Debug, Default)]
pub struct EmployeeStore {
    state: RwLock<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<EmployeeId, Employee>,
    last_id: EmployeeId,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, fields: EmployeeFields) -> Employee {
        let mut state = self.state.write();
        state.last_id += 1;
        let employee = fields.into_employee(state.last_id);
        state.records.insert(employee.id, employee.clone());
        debug!(id = employee.id, "employee created");
        employee
    }

    pub fn get(&self, id: EmployeeId) -> HrResult<Employee> {
        self.state
            .read()
            .records
            .get(&id)
            .cloned()
            .ok_or(HrError::NotFound(id))
    }

    /// Replaces every field of the record at `id`. The id itself is kept.
    pub fn update(&self, id: EmployeeId, fields: EmployeeFields) -> HrResult<Employee> {
        let mut state = self.state.write();
        let slot = state.records.get_mut(&id).ok_or(HrError::NotFound(id))?;
        *slot = fields.into_employee(id);
        debug!(id, "employee updated");
        Ok(slot.clone())
    }

    pub fn delete(&self, id: EmployeeId) -> HrResult<()> {
        let mut state = self.state.write();
        state.records.remove(&id).ok_or(HrError::NotFound(id))?;
        debug!(id, "employee deleted");
        Ok(())
    }

    /// Snapshot of all records, ascending by id.
    pub fn list(&self) -> Vec<Employee> {
        self.state.read().records.values().cloned().collect()
    }

    /// One page of records, ascending by id, cut from a single snapshot.
    pub fn page(&self, request: PageRequest) -> Vec<Employee> {
        let state = self.state.read();
        match request.window(state.records.len()) {
            Some(range) => state
                .records
                .values()
                .skip(range.start)
                .take(range.len())
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;

    fn seeded(count: usize) -> EmployeeStore {
        let store = EmployeeStore::new();
        for n in 0..count {
            store.create(EmployeeFields::new(
                format!("Employee {n}"),
                "Engineer",
                1000.0 * n as f64,
            ));
        }
        store
    }

    #[test]
    fn creates_assign_strictly_increasing_ids() {
        let store = EmployeeStore::new();
        let ids: Vec<_> = (0..5)
            .map(|_| store.create(EmployeeFields::default()).id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn get_returns_created_fields() {
        let store = EmployeeStore::new();
        let fields = EmployeeFields::new("John Doe", "Manager", 120000.0);
        let created = store.create(fields.clone());
        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, fields.name);
        assert_eq!(fetched.salary, fields.salary);
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let store = EmployeeStore::new();
        let created = store.create(EmployeeFields::new("John Doe", "Manager", 120000.0));
        let updated = store
            .update(
                created.id,
                EmployeeFields::new("Jane Doe", "Senior Designer", 110000.0),
            )
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(store.get(created.id).unwrap(), updated);
        assert_eq!(updated.position, "Senior Designer");
    }

    #[test]
    fn update_of_missing_id_leaves_store_unchanged() {
        let store = seeded(3);
        let before = store.list();
        let err = store
            .update(99, EmployeeFields::new("Ghost", "None", 0.0))
            .unwrap_err();
        assert_eq!(err, HrError::NotFound(99));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let store = seeded(2);
        store.delete(1).unwrap();
        assert_eq!(store.get(1), Err(HrError::NotFound(1)));
        assert_eq!(store.delete(1), Err(HrError::NotFound(1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = seeded(2);
        store.delete(2).unwrap();
        let next = store.create(EmployeeFields::default());
        assert_eq!(next.id, 3);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let store = seeded(12);
        store.delete(4).unwrap();
        let ids: Vec<_> = store.list().iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn pages_over_twenty_five_records() {
        let store = seeded(25);
        let third = store.page(PageRequest::new(3, 10));
        assert_eq!(third.len(), 5);
        assert_eq!(third.first().map(|e| e.id), Some(21));
        assert_eq!(store.page(PageRequest::new(1, 25)).len(), 25);
        assert!(store.page(PageRequest::new(4, 10)).is_empty());
    }

    #[test]
    fn empty_store_pages_are_empty() {
        let store = EmployeeStore::new();
        assert!(store.is_empty());
        assert!(store.page(PageRequest::default()).is_empty());
    }

    #[test]
    fn concurrent_creates_yield_unique_contiguous_ids() {
        let store = EmployeeStore::new();
        let ids: Vec<EmployeeId> = thread::scope(|scope| {
            let handles: Vec<_> = (0..100)
                .map(|n| {
                    let store = &store;
                    scope.spawn(move || {
                        store
                            .create(EmployeeFields::new(format!("Worker {n}"), "Staff", 1.0))
                            .id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 100);
        assert_eq!(unique, (1..=100).collect::<HashSet<_>>());
        assert_eq!(store.len(), 100);
    }
}
