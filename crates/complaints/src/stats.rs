//! Complaint aggregation for the admin statistics view.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::Complaint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplaintStats {
    pub total: usize,
    /// Ascending by date.
    pub by_date: Vec<DateCount>,
    /// Descending by count, ties broken by reason.
    pub by_reason: Vec<ReasonCount>,
}

/// Aggregate complaints per UTC day and per reason.
pub fn summarize(complaints: &[Complaint]) -> ComplaintStats {
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut by_reason: HashMap<&str, usize> = HashMap::new();

    for c in complaints {
        *by_date.entry(c.created_at.date_naive()).or_default() += 1;
        *by_reason.entry(c.reason.as_str()).or_default() += 1;
    }

    let mut by_reason: Vec<ReasonCount> = by_reason
        .into_iter()
        .map(|(reason, count)| ReasonCount {
            reason: reason.to_string(),
            count,
        })
        .collect();
    by_reason.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.reason.cmp(&b.reason)));

    ComplaintStats {
        total: complaints.len(),
        by_date: by_date
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect(),
        by_reason,
    }
}
