// SPDX-License-Identifier: Apache-2.0

use crate::error::ValidationError;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const REPORT_TYPE_MAX_LEN: usize = 64;
pub const TITLE_MAX_LEN: usize = 200;
pub const DEFAULT_GENERATED_BY: &str = "System";

pub type ReportId = i64;

/// Template selector for a report, e.g. `summary`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportType(String);

impl ReportType {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError::single("reportType", "is required"));
        }
        if s.chars().count() > REPORT_TYPE_MAX_LEN {
            return Err(ValidationError::single(
                "reportType",
                format!("must be at most {REPORT_TYPE_MAX_LEN} characters"),
            ));
        }
        if s.chars().any(char::is_control) {
            return Err(ValidationError::single(
                "reportType",
                "must not contain control characters",
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the type can be used directly as a template file stem.
    #[must_use]
    pub fn is_file_stem(&self) -> bool {
        self.0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// `summary` -> `Summary Report`.
    #[must_use]
    pub fn default_title(&self) -> String {
        let mut chars = self.0.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{capitalized} Report")
    }
}

impl Display for ReportType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored record of one generated PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub description: Option<String>,
    pub report_type: String,
    pub generated_by: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub title: String,
    pub description: Option<String>,
    pub report_type: ReportType,
    pub generated_by: String,
    pub file_path: String,
}

/// Body of `POST /api/generate-pdf`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportInput {
    pub report_type: Option<String>,
    #[serde(default)]
    pub user_ids: Option<Vec<UserId>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub generated_by: Option<String>,
}

/// Validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReportRequest {
    pub report_type: ReportType,
    /// Empty means every user.
    pub user_ids: Vec<UserId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub generated_by: String,
}

impl GenerateReportRequest {
    pub fn validate(input: GenerateReportInput) -> Result<Self, ValidationError> {
        let report_type = ReportType::parse(input.report_type.as_deref().unwrap_or_default())?;
        let title = non_blank(input.title);
        if title
            .as_ref()
            .is_some_and(|t| t.chars().count() > TITLE_MAX_LEN)
        {
            return Err(ValidationError::single(
                "title",
                format!("must be at most {TITLE_MAX_LEN} characters"),
            ));
        }
        let mut user_ids = input.user_ids.unwrap_or_default();
        user_ids.sort_unstable();
        user_ids.dedup();
        Ok(Self {
            report_type,
            user_ids,
            title,
            description: non_blank(input.description),
            generated_by: non_blank(input.generated_by)
                .unwrap_or_else(|| DEFAULT_GENERATED_BY.to_string()),
        })
    }

    #[must_use]
    pub fn resolved_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| self.report_type.default_title())
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_title_capitalizes_first_letter() {
        let t = ReportType::parse("summary").expect("type");
        assert_eq!(t.default_title(), "Summary Report");
        let t = ReportType::parse("salary_review").expect("type");
        assert_eq!(t.default_title(), "Salary_review Report");
    }

    #[test]
    fn report_type_is_required() {
        let err = GenerateReportRequest::validate(GenerateReportInput::default())
            .expect_err("missing type");
        assert!(err.has_field("reportType"));
        assert!(ReportType::parse("   ").is_err());
    }

    #[test]
    fn file_stem_rejects_path_characters() {
        assert!(ReportType::parse("department-summary")
            .expect("type")
            .is_file_stem());
        assert!(!ReportType::parse("../etc/passwd")
            .expect("type")
            .is_file_stem());
        assert!(!ReportType::parse("monthly report")
            .expect("type")
            .is_file_stem());
    }

    #[test]
    fn request_defaults_are_applied() {
        let req = GenerateReportRequest::validate(GenerateReportInput {
            report_type: Some(" detailed ".to_string()),
            user_ids: Some(vec![3, 1, 3]),
            title: Some("  ".to_string()),
            description: None,
            generated_by: None,
        })
        .expect("valid request");
        assert_eq!(req.report_type.as_str(), "detailed");
        assert_eq!(req.user_ids, vec![1, 3]);
        assert_eq!(req.title, None);
        assert_eq!(req.resolved_title(), "Detailed Report");
        assert_eq!(req.generated_by, DEFAULT_GENERATED_BY);
    }

    #[test]
    fn explicit_title_wins() {
        let req = GenerateReportRequest::validate(GenerateReportInput {
            report_type: Some("summary".to_string()),
            title: Some("Q3 Headcount".to_string()),
            ..GenerateReportInput::default()
        })
        .expect("valid request");
        assert_eq!(req.resolved_title(), "Q3 Headcount");
    }
}
