//! Port for department reference data.

use async_trait::async_trait;

use crate::domain::{Department, DepartmentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by department repository adapters.
    pub enum DepartmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "department repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "department repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// All departments ordered by id.
    async fn list(&self) -> Result<Vec<Department>, DepartmentRepositoryError>;

    /// Whether a department with this id exists.
    async fn exists(&self, id: DepartmentId) -> Result<bool, DepartmentRepositoryError>;
}
