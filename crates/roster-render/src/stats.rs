// SPDX-License-Identifier: Apache-2.0

use roster_model::User;
use std::collections::BTreeSet;

/// Aggregates computed over exactly the users passed to a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterStats {
    pub total_users: usize,
    pub total_salary: f64,
    pub average_salary: f64,
    pub departments: Vec<String>,
}

impl RosterStats {
    #[must_use]
    pub fn compute(users: &[User]) -> Self {
        let total_salary = users.iter().map(|u| u.salary).sum::<f64>();
        // Running mean stays finite even where the plain sum would not.
        let average_salary = users
            .iter()
            .enumerate()
            .fold(0.0_f64, |mean, (i, u)| mean + (u.salary - mean) / (i + 1) as f64);
        let departments = users
            .iter()
            .map(|u| u.department.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            total_users: users.len(),
            total_salary,
            average_salary,
            departments,
        }
    }
}

/// `$1,234` style, rounded to whole units. Non-finite input renders as `$0`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
