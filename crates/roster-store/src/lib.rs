// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Persistence for employee records and report history.
//!
//! [`RecordStore`] is the seam the service depends on; [`SqliteStore`] is the
//! production implementation. The store handle is passed explicitly to whoever
//! needs it, there is no process-wide connection.

use async_trait::async_trait;
use roster_model::{
    CreateUserInput, NewReport, NewUser, Report, ReportId, User, UserId,
};

mod error;
mod schema;
mod seed;
mod sqlite;

pub const CRATE_NAME: &str = "roster-store";

pub use error::StoreError;
pub use schema::SQLITE_SCHEMA_VERSION;
pub use seed::sample_users;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Every user, most recently created first.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn get_user(&self, id: UserId) -> Result<User, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserId, StoreError>;

    /// Users whose id is in `ids`, ordered by name. Unknown ids are skipped.
    async fn list_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    /// Every user ordered by name.
    async fn list_users_by_name(&self) -> Result<Vec<User>, StoreError>;

    /// Every report, most recent first.
    async fn list_reports(&self) -> Result<Vec<Report>, StoreError>;

    async fn create_report(&self, report: NewReport) -> Result<ReportId, StoreError>;

    /// Validates a raw request body, then inserts it.
    async fn create_user_from_input(&self, input: CreateUserInput) -> Result<UserId, StoreError> {
        let user = NewUser::validate(input)?;
        self.create_user(user).await
    }
}
