use platform_api::ApiError;
use thiserror::Error;

use crate::EmployeeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error("Employee not found")]
    NotFound(EmployeeId),
}

pub type HrResult<T> = Result<T, HrError>;

impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        match value {
            HrError::NotFound(_) => ApiError::NotFound(value.to_string()),
        }
    }
}
