//! Submission preconditions.
//!
//! Unlike per-operation errors, submission checks are **accumulated**: the
//! caller gets every failed precondition in one pass so all of them can be
//! reported together.

use serde::{Deserialize, Serialize};

use crate::quote::Quotation;

/// A submission precondition that does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionIssue {
    /// No counterparty has been assigned to the draft.
    MissingCounterparty,
    /// The draft has no line items.
    EmptyQuotation,
}

impl core::fmt::Display for SubmissionIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SubmissionIssue::MissingCounterparty => f.write_str("no counterparty selected"),
            SubmissionIssue::EmptyQuotation => f.write_str("quotation has no line items"),
        }
    }
}

/// Check a draft against the submission preconditions.
///
/// Returns every issue that applies, in a stable order (counterparty first,
/// then lines); an empty vector means the draft can be submitted. Pure: the
/// draft is not mutated.
pub fn validate(quotation: &Quotation) -> Vec<SubmissionIssue> {
    let mut issues = Vec::new();

    if quotation.counterparty().is_none() {
        issues.push(SubmissionIssue::MissingCounterparty);
    }
    if quotation.lines().is_empty() {
        issues.push(SubmissionIssue::EmptyQuotation);
    }

    issues
}
