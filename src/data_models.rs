use std::fmt;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Per-row classification written to the output table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Matched,
    NotMatched,
    Error,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Matched => "matched",
            Verdict::NotMatched => "not_matched",
            Verdict::Error => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one query. Unlike [`Verdict`] it remembers which
/// group id matched, or why the search failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched { group_id: String, url: String },
    NotMatched,
    Error(String),
}

impl Outcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            Outcome::Matched { .. } => Verdict::Matched,
            Outcome::NotMatched => Verdict::NotMatched,
            Outcome::Error(_) => Verdict::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    /// The record exactly as read, every column included.
    pub record: StringRecord,
    pub query: String,
    pub expected_groups: String,
    pub verdict: Option<Verdict>,
}

impl Row {
    pub fn new(record: StringRecord, query: String, expected_groups: String) -> Row {
        Row {
            record,
            query,
            expected_groups,
            verdict: None, // filled in by the runner.
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn verdicts(&self) -> Vec<Option<Verdict>> {
        self.rows.iter().map(|r| r.verdict).collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub matched: usize,
    pub not_matched: usize,
    pub errors: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>) -> RunSummary {
        RunSummary {
            total: 0,
            matched: 0,
            not_matched: 0,
            errors: 0,
            started_at,
            finished_at: started_at,
        }
    }

    pub fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Matched => self.matched += 1,
            Verdict::NotMatched => self.not_matched += 1,
            Verdict::Error => self.errors += 1,
        }
    }
}

#[test]
fn test_verdict_text() {
    assert_eq!(Verdict::Matched.to_string(), "matched");
    assert_eq!(Verdict::NotMatched.to_string(), "not_matched");
    assert_eq!(Verdict::Error.to_string(), "error");
    assert_eq!(
        serde_json::to_string(&Verdict::NotMatched).unwrap(),
        "\"not_matched\""
    );
}

#[test]
fn test_outcome_verdict() {
    let matched = Outcome::Matched {
        group_id: "1".into(),
        url: "https://www.facebook.com/groups/1".into(),
    };
    assert_eq!(matched.verdict(), Verdict::Matched);
    assert_eq!(Outcome::NotMatched.verdict(), Verdict::NotMatched);
    assert_eq!(Outcome::Error("boom".into()).verdict(), Verdict::Error);
}
