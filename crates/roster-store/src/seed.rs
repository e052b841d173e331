// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use roster_model::NewUser;

type SampleRow = (
    &'static str,
    &'static str,
    Option<&'static str>,
    &'static str,
    &'static str,
    f64,
    (i32, u32, u32),
);

const SAMPLE_ROSTER: [SampleRow; 5] = [
    (
        "John Doe",
        "john.doe@company.com",
        Some("+1-555-0101"),
        "Engineering",
        "Senior Developer",
        95000.0,
        (2020, 1, 15),
    ),
    (
        "Jane Smith",
        "jane.smith@company.com",
        Some("+1-555-0102"),
        "Marketing",
        "Marketing Manager",
        75000.0,
        (2019, 3, 22),
    ),
    (
        "Mike Johnson",
        "mike.johnson@company.com",
        None,
        "Sales",
        "Sales Representative",
        55000.0,
        (2021, 6, 10),
    ),
    (
        "Sarah Wilson",
        "sarah.wilson@company.com",
        Some("+1-555-0104"),
        "HR",
        "HR Specialist",
        60000.0,
        (2020, 9, 5),
    ),
    (
        "David Brown",
        "david.brown@company.com",
        Some("+1-555-0105"),
        "Engineering",
        "DevOps Engineer",
        85000.0,
        (2018, 11, 30),
    ),
];

/// Fixed demo employees used to populate an empty database.
#[must_use]
pub fn sample_users() -> Vec<NewUser> {
    SAMPLE_ROSTER
        .iter()
        .filter_map(|(name, email, phone, department, position, salary, (y, m, d))| {
            Some(NewUser {
                name: (*name).to_string(),
                email: (*email).to_string(),
                phone: phone.map(str::to_string),
                department: (*department).to_string(),
                position: (*position).to_string(),
                salary: *salary,
                hire_date: NaiveDate::from_ymd_opt(*y, *m, *d)?,
            })
        })
        .collect()
}
