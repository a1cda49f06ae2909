//! Quotation drafting and lifecycle.
//!
//! This crate contains business rules for customer quotations: the quotation
//! aggregate (line items, draft-to-decision lifecycle), the cost aggregation
//! rules, the submission validator, and the interactive draft builder that
//! ties them to the catalog and counterparty seams. Pure domain logic plus an
//! in-process orchestration layer - no IO, no HTTP, no storage.

pub mod builder;
pub mod quote;
pub mod totals;
pub mod validate;

pub use builder::{QuoteBuilder, QuoteSnapshot, StagedSelection, SubmitError};
pub use quote::{
    AGGREGATE_TYPE, ApproveQuotation, AssignCounterparty, CommitLine, CounterpartyAssigned,
    DEFAULT_TERMS, LineCommitted, LineRemoved, OpenQuotation, QUOTE_VALIDITY_DAYS, Quotation,
    QuotationApproved, QuotationCommand, QuotationEvent, QuotationId, QuotationOpened,
    QuotationRejected, QuotationStatus, QuotationSubmitted, QuoteLine, RejectQuotation,
    RemoveLine, SubmitQuotation,
};
pub use validate::{SubmissionIssue, validate};
