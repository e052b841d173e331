// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Record types for the roster-reports service.
//!
//! Input structs (`*Input`) mirror request bodies and are turned into
//! validated values through `validate`, which reports every bad field.

mod error;
mod report;
mod user;

pub const CRATE_NAME: &str = "roster-model";

pub use error::{FieldError, ValidationError};
pub use report::{
    GenerateReportInput, GenerateReportRequest, NewReport, Report, ReportId, ReportType,
    DEFAULT_GENERATED_BY, REPORT_TYPE_MAX_LEN, TITLE_MAX_LEN,
};
pub use user::{
    CreateUserInput, NewUser, User, UserId, EMAIL_MAX_LEN, HIRE_DATE_FORMAT, NAME_MAX_LEN,
    PHONE_MAX_LEN, SALARY_MAX,
};
