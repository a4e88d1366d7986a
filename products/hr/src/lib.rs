//! HR module: employee records kept in a concurrent in-memory store.

mod error;
mod pagination;
mod store;

use serde::{Deserialize, Serialize};

pub use error::{HrError, HrResult};
pub use pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, PageRequest};
pub use store::EmployeeStore;

/// Store-assigned employee identifier.
pub type EmployeeId = i64;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub position: String,
    pub salary: f64,
}

/// Client-supplied part of an employee record.
///
/// Missing fields decode to their zero value and unknown fields, including a
/// client-supplied `id`, are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmployeeFields {
    pub name: String,
    pub position: String,
    pub salary: f64,
}

impl EmployeeFields {
    pub fn new(name: impl Into<String>, position: impl Into<String>, salary: f64) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
            salary,
        }
    }

    fn into_employee(self, id: EmployeeId) -> Employee {
        Employee {
            id,
            name: self.name,
            position: self.position,
            salary: self.salary,
        }
    }
}
