// SPDX-License-Identifier: Apache-2.0

use crate::stats::{format_currency, RosterStats};
use chrono::{DateTime, Utc};
use roster_model::{ReportType, User};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::PathBuf;
use tera::{Context, Tera, Value};
use tracing::{debug, warn};

pub const DEFAULT_TEMPLATE_NAME: &str = "default_report.html";
pub const TEMPLATE_EXTENSION: &str = "html";

const DEFAULT_TEMPLATE: &str = include_str!("../templates/default_report.html");

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RenderError {
    TemplateMissing(String),
    Unreadable { template: String, reason: String },
    Syntax { template: String, reason: String },
    Render { template: String, reason: String },
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TemplateMissing(name) => write!(f, "template {name} not found"),
            Self::Unreadable { template, reason } => {
                write!(f, "template {template} unreadable: {reason}")
            }
            Self::Syntax { template, reason } => {
                write!(f, "template {template} has invalid syntax: {reason}")
            }
            Self::Render { template, reason } => {
                write!(f, "template {template} failed to render: {reason}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Which template produced a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Named(String),
    BuiltinDefault,
}

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub html: String,
    pub source: TemplateSource,
    /// Set when a named template was tried and rejected.
    pub fallback_reason: Option<RenderError>,
}

/// Caller-supplied parts of the template context.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub generated_at: DateTime<Utc>,
}

pub struct TemplateRenderer {
    template_dir: PathBuf,
    builtin: Tera,
}

impl TemplateRenderer {
    /// Fails only if the built-in default template does not compile.
    pub fn new(template_dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let mut builtin = new_engine();
        builtin
            .add_raw_template(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE)
            .map_err(|e| RenderError::Syntax {
                template: DEFAULT_TEMPLATE_NAME.to_string(),
                reason: error_chain(&e),
            })?;
        Ok(Self {
            template_dir: template_dir.into(),
            builtin,
        })
    }

    /// Renders with the template named after `report_type`, falling back to
    /// the built-in default when that template is missing or broken.
    ///
    /// Only a failure of the built-in default is returned as an error.
    pub fn render(
        &self,
        report_type: &ReportType,
        users: &[User],
        ctx: &ReportContext<'_>,
    ) -> Result<RenderedReport, RenderError> {
        let context = build_context(report_type, users, ctx);
        match self.render_named(report_type, &context) {
            Ok(html) => {
                debug!(report_type = %report_type, "rendered named template");
                Ok(RenderedReport {
                    html,
                    source: TemplateSource::Named(report_type.as_str().to_string()),
                    fallback_reason: None,
                })
            }
            Err(reason) => {
                warn!(
                    report_type = %report_type,
                    error = %reason,
                    "named template unusable; using default"
                );
                let html = self.render_default(&context)?;
                Ok(RenderedReport {
                    html,
                    source: TemplateSource::BuiltinDefault,
                    fallback_reason: Some(reason),
                })
            }
        }
    }

    /// Named template only, no fallback.
    pub fn render_named(
        &self,
        report_type: &ReportType,
        context: &Context,
    ) -> Result<String, RenderError> {
        let name = format!("{}.{TEMPLATE_EXTENSION}", report_type.as_str());
        if !report_type.is_file_stem() {
            return Err(RenderError::TemplateMissing(name));
        }
        let path = self.template_dir.join(&name);
        let source = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RenderError::TemplateMissing(name.clone()),
            _ => RenderError::Unreadable {
                template: name.clone(),
                reason: e.to_string(),
            },
        })?;

        let mut engine = new_engine();
        engine
            .add_raw_template(&name, &source)
            .map_err(|e| RenderError::Syntax {
                template: name.clone(),
                reason: error_chain(&e),
            })?;
        engine
            .render(&name, context)
            .map_err(|e| RenderError::Render {
                template: name,
                reason: error_chain(&e),
            })
    }

    pub fn render_default(&self, context: &Context) -> Result<String, RenderError> {
        self.builtin
            .render(DEFAULT_TEMPLATE_NAME, context)
            .map_err(|e| RenderError::Render {
                template: DEFAULT_TEMPLATE_NAME.to_string(),
                reason: error_chain(&e),
            })
    }
}

/// Context shared by the default and every named template.
#[must_use]
pub fn build_context(report_type: &ReportType, users: &[User], ctx: &ReportContext<'_>) -> Context {
    let stats = RosterStats::compute(users);
    let title = ctx
        .title
        .map(str::to_string)
        .unwrap_or_else(|| report_type.default_title());

    let mut context = Context::new();
    context.insert("title", &title);
    context.insert("description", ctx.description.unwrap_or(""));
    context.insert("report_type", report_type.as_str());
    context.insert("users", users);
    context.insert(
        "generated_at",
        &ctx.generated_at.format("%B %-d, %Y at %H:%M UTC").to_string(),
    );
    context.insert(
        "generated_date",
        &ctx.generated_at.format("%B %-d, %Y").to_string(),
    );
    context.insert(
        "generated_time",
        &ctx.generated_at.format("%H:%M:%S UTC").to_string(),
    );
    context.insert("total_users", &stats.total_users);
    context.insert("average_salary", &format_currency(stats.average_salary));
    context.insert("total_salary", &format_currency(stats.total_salary));
    context.insert("department_count", &stats.departments.len());
    context.insert("departments", &stats.departments);
    context
}

fn new_engine() -> Tera {
    let mut engine = Tera::default();
    engine.autoescape_on(vec![".html", ".htm"]);
    engine.register_filter("currency", currency_filter);
    engine
}

/// `{{ user.salary | currency }}` -> `$75,000`
fn currency_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => Some(0.0),
        _ => None,
    }
    .ok_or_else(|| tera::Error::msg("currency filter requires a number"))?;
    Ok(Value::String(format_currency(amount)))
}

fn error_chain(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = std::error::Error::source(inner);
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn ctx() -> ReportContext<'static> {
        ReportContext {
            title: None,
            description: None,
            generated_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap(),
        }
    }

    fn user(name: &str, salary: f64) -> User {
        User {
            id: 1,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            department: "Engineering".to_string(),
            position: "Engineer".to_string(),
            salary,
            hire_date: NaiveDate::from_ymd_opt(2020, 5, 1).expect("date"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn builtin_default_compiles() {
        TemplateRenderer::new("does-not-exist").expect("default template compiles");
    }

    #[test]
    fn context_carries_resolved_title_and_dates() {
        let t = ReportType::parse("summary").expect("type");
        let context = build_context(&t, &[], &ctx());
        let json = context.into_json();
        assert_eq!(json["title"], "Summary Report");
        assert_eq!(json["description"], "");
        assert_eq!(json["generated_date"], "March 5, 2024");
        assert_eq!(json["generated_at"], "March 5, 2024 at 14:07 UTC");
        assert_eq!(json["average_salary"], "$0");
        assert_eq!(json["total_users"], 0);
    }

    #[test]
    fn user_values_are_html_escaped() {
        let renderer = TemplateRenderer::new("does-not-exist").expect("renderer");
        let t = ReportType::parse("summary").expect("type");
        let out = renderer
            .render(&t, &[user("<script>", 10.0)], &ctx())
            .expect("render");
        assert!(!out.html.contains("<script>"));
        assert!(out.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn currency_filter_rejects_non_numbers() {
        let err = currency_filter(&Value::Bool(true), &HashMap::new());
        assert!(err.is_err());
        let ok = currency_filter(&Value::from(1234.4), &HashMap::new()).expect("number");
        assert_eq!(ok, Value::String("$1,234".to_string()));
    }
}
