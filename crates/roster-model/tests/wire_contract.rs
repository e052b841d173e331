// SPDX-License-Identifier: Apache-2.0

use chrono::{NaiveDate, TimeZone, Utc};
use roster_model::{
    CreateUserInput, GenerateReportInput, GenerateReportRequest, NewUser, Report, User,
};

#[test]
fn user_serializes_with_snake_case_fields() {
    let user = User {
        id: 7,
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: None,
        department: "Engineering".to_string(),
        position: "Rear Admiral".to_string(),
        salary: 120000.0,
        hire_date: NaiveDate::from_ymd_opt(2019, 1, 2).expect("date"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    };
    let value = serde_json::to_value(&user).expect("encode user");
    assert_eq!(value["hire_date"], "2019-01-02");
    assert_eq!(value["phone"], serde_json::Value::Null);
    assert!(value.get("created_at").is_some());
}

#[test]
fn report_serializes_report_type_and_file_path() {
    let report = Report {
        id: 1,
        title: "Summary Report".to_string(),
        description: None,
        report_type: "summary".to_string(),
        generated_by: "System".to_string(),
        file_path: "report_x.pdf".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    };
    let value = serde_json::to_value(&report).expect("encode report");
    assert_eq!(value["report_type"], "summary");
    assert_eq!(value["file_path"], "report_x.pdf");
    assert_eq!(value["generated_by"], "System");
}

#[test]
fn generate_input_reads_camel_case_body() {
    let raw = r#"{"reportType":"summary","userIds":[2,1],"title":"Team"}"#;
    let input: GenerateReportInput = serde_json::from_str(raw).expect("decode body");
    let req = GenerateReportRequest::validate(input).expect("valid");
    assert_eq!(req.report_type.as_str(), "summary");
    assert_eq!(req.user_ids, vec![1, 2]);
    assert_eq!(req.resolved_title(), "Team");
}

#[test]
fn create_user_body_accepts_form_style_strings() {
    let raw = r#"{
        "name": "Linus",
        "email": "linus@example.com",
        "department": "Kernel",
        "position": "Maintainer",
        "salary": "150000",
        "hireDate": "2020-06-01"
    }"#;
    let input: CreateUserInput = serde_json::from_str(raw).expect("decode body");
    let user = NewUser::validate(input).expect("valid user");
    assert_eq!(user.salary, 150000.0);
    assert_eq!(user.hire_date.to_string(), "2020-06-01");
}
