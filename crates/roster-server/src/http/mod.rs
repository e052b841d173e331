// SPDX-License-Identifier: Apache-2.0

pub(crate) mod downloads;
pub(crate) mod handlers;
pub(crate) mod reports;
pub mod request_tracing;
pub mod response_contract;
pub(crate) mod users;
