//! Vendor procurement module (quote requests).
//!
//! This crate contains business rules for vendor quote requests (RFQs):
//! collecting one quote per vendor, moving the request through review, vendor
//! selection and engineering approval. Pure domain logic: no IO, no HTTP, no
//! storage.

pub mod request;

pub use request::{
    AGGREGATE_TYPE, CompleteRequest, MAX_REQUIRED_QUOTES, MIN_REQUIRED_QUOTES, OpenRequest,
    QuoteRequest, QuoteRequestCommand, QuoteRequestEvent, RecordVendorQuote, RequestCompleted,
    RequestId, RequestOpened, RequestPriority, RequestStatus, SelectVendor, SentForApproval,
    SubmitForApproval, VendorQuote, VendorQuoteRecorded, VendorSelected,
};
