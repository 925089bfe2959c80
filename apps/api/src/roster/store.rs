use std::path::PathBuf;

use tracing::info;
use uuid::Uuid;

use crate::roster::models::{Employee, SchedulingRules};
use crate::storage::{JsonFileStore, StoreError};

/// Employee roster and scheduling rules, each in its own JSON file.
///
/// Both are re-read on every call; there is no in-memory copy to drift from disk.
#[derive(Clone)]
pub struct RosterStore {
    employees: JsonFileStore<Vec<Employee>>,
    rules: JsonFileStore<SchedulingRules>,
}

impl RosterStore {
    pub fn new(employees_path: impl Into<PathBuf>, rules_path: impl Into<PathBuf>) -> Self {
        Self {
            employees: JsonFileStore::new(employees_path),
            rules: JsonFileStore::new(rules_path),
        }
    }

    pub async fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.employees.read().await
    }

    /// Stores a new employee under a freshly assigned id.
    pub async fn create_employee(&self, mut employee: Employee) -> Result<Employee, StoreError> {
        employee.id = Uuid::new_v4().to_string();
        let created = self
            .employees
            .mutate(|roster| {
                roster.push(employee.clone());
                (employee, true)
            })
            .await?;
        info!("Added employee {} ({})", created.name, created.id);
        Ok(created)
    }

    /// Replaces the employee with the same id. `None` if no such employee exists.
    pub async fn update_employee(
        &self,
        employee: Employee,
    ) -> Result<Option<Employee>, StoreError> {
        self.employees
            .mutate(|roster| match roster.iter_mut().find(|e| e.id == employee.id) {
                Some(slot) => {
                    *slot = employee.clone();
                    (Some(employee), true)
                }
                None => (None, false),
            })
            .await
    }

    /// Returns whether an employee was removed.
    pub async fn remove_employee(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .employees
            .mutate(|roster| {
                let before = roster.len();
                roster.retain(|e| e.id != id);
                let removed = roster.len() < before;
                (removed, removed)
            })
            .await?;
        if removed {
            info!("Removed employee {id}");
        }
        Ok(removed)
    }

    pub async fn rules(&self) -> Result<SchedulingRules, StoreError> {
        self.rules.read().await
    }

    pub async fn replace_rules(&self, rules: SchedulingRules) -> Result<(), StoreError> {
        self.rules
            .mutate(|current| {
                *current = rules;
                ((), true)
            })
            .await
    }
}
