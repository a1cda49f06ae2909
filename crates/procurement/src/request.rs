use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quoteworks_core::{
    Aggregate, AggregateId, AggregateRoot, CounterpartyCode, DomainError, Money,
};
use quoteworks_events::{Command, Event};

/// Aggregate type tag used in event envelopes.
pub const AGGREGATE_TYPE: &str = "procurement.request";

/// Smallest number of vendor quotes a request may demand.
pub const MIN_REQUIRED_QUOTES: u8 = 2;

/// Largest number of vendor quotes a request may demand.
pub const MAX_REQUIRED_QUOTES: u8 = 5;

/// Quote request identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub AggregateId);

impl RequestId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Urgency of a quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Low,
    Medium,
    High,
}

/// Quote request status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Collecting vendor quotes until the required count is reached.
    WaitingForQuotes,
    /// Enough quotes are in; the team is comparing them.
    InReview,
    /// A vendor was chosen; awaiting engineering sign-off request.
    VendorSelected,
    /// Before engineering for technical sign-off.
    EngineeringApproval,
    /// Signed off and done.
    Completed,
}

/// One vendor's quote for the requested product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorQuote {
    pub vendor: CounterpartyCode,
    pub amount: Money,
    pub received_at: DateTime<Utc>,
}

/// Aggregate root: QuoteRequest (RFQ for one product).
///
/// A request collects one quote per vendor until the required count is
/// reached, then moves through review, vendor selection and engineering
/// approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    id: RequestId,
    product_name: String,
    description: Option<String>,
    budget: Option<Money>,
    required_quotes: u8,
    priority: RequestPriority,
    quotes: Vec<VendorQuote>,
    selected_vendor: Option<CounterpartyCode>,
    status: RequestStatus,
    version: u64,
    created: bool,
}

impl QuoteRequest {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: RequestId) -> Self {
        Self {
            id,
            product_name: String::new(),
            description: None,
            budget: None,
            required_quotes: MIN_REQUIRED_QUOTES,
            priority: RequestPriority::Medium,
            quotes: Vec::new(),
            selected_vendor: None,
            status: RequestStatus::WaitingForQuotes,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> RequestId {
        self.id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn budget(&self) -> Option<Money> {
        self.budget
    }

    pub fn required_quotes(&self) -> u8 {
        self.required_quotes
    }

    pub fn priority(&self) -> RequestPriority {
        self.priority
    }

    pub fn quotes(&self) -> &[VendorQuote] {
        &self.quotes
    }

    pub fn selected_vendor(&self) -> Option<&CounterpartyCode> {
        self.selected_vendor.as_ref()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Whether further vendor quotes may be recorded.
    pub fn accepts_quotes(&self) -> bool {
        matches!(
            self.status,
            RequestStatus::WaitingForQuotes | RequestStatus::InReview
        )
    }

    /// The cheapest quote received so far, if any.
    pub fn lowest_quote(&self) -> Option<&VendorQuote> {
        self.quotes.iter().min_by_key(|q| q.amount)
    }

    fn has_quote_from(&self, vendor: &CounterpartyCode) -> bool {
        self.quotes.iter().any(|q| &q.vendor == vendor)
    }
}

impl AggregateRoot for QuoteRequest {
    type Id = RequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    pub request_id: RequestId,
    pub product_name: String,
    pub description: Option<String>,
    pub budget: Option<Money>,
    pub required_quotes: u8,
    pub priority: RequestPriority,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordVendorQuote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordVendorQuote {
    pub request_id: RequestId,
    pub vendor: CounterpartyCode,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectVendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectVendor {
    pub request_id: RequestId,
    pub vendor: CounterpartyCode,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitForApproval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitForApproval {
    pub request_id: RequestId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub request_id: RequestId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteRequestCommand {
    OpenRequest(OpenRequest),
    RecordVendorQuote(RecordVendorQuote),
    SelectVendor(SelectVendor),
    SubmitForApproval(SubmitForApproval),
    CompleteRequest(CompleteRequest),
}

impl Command for QuoteRequestCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            QuoteRequestCommand::OpenRequest(c) => c.request_id.0,
            QuoteRequestCommand::RecordVendorQuote(c) => c.request_id.0,
            QuoteRequestCommand::SelectVendor(c) => c.request_id.0,
            QuoteRequestCommand::SubmitForApproval(c) => c.request_id.0,
            QuoteRequestCommand::CompleteRequest(c) => c.request_id.0,
        }
    }
}

/// Event: RequestOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOpened {
    pub request_id: RequestId,
    pub product_name: String,
    pub description: Option<String>,
    pub budget: Option<Money>,
    pub required_quotes: u8,
    pub priority: RequestPriority,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VendorQuoteRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorQuoteRecorded {
    pub request_id: RequestId,
    pub vendor: CounterpartyCode,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VendorSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSelected {
    pub request_id: RequestId,
    pub vendor: CounterpartyCode,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SentForApproval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentForApproval {
    pub request_id: RequestId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RequestCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCompleted {
    pub request_id: RequestId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteRequestEvent {
    RequestOpened(RequestOpened),
    VendorQuoteRecorded(VendorQuoteRecorded),
    VendorSelected(VendorSelected),
    SentForApproval(SentForApproval),
    RequestCompleted(RequestCompleted),
}

impl Event for QuoteRequestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QuoteRequestEvent::RequestOpened(_) => "procurement.request.opened",
            QuoteRequestEvent::VendorQuoteRecorded(_) => "procurement.request.quote_recorded",
            QuoteRequestEvent::VendorSelected(_) => "procurement.request.vendor_selected",
            QuoteRequestEvent::SentForApproval(_) => "procurement.request.sent_for_approval",
            QuoteRequestEvent::RequestCompleted(_) => "procurement.request.completed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            QuoteRequestEvent::RequestOpened(e) => e.occurred_at,
            QuoteRequestEvent::VendorQuoteRecorded(e) => e.occurred_at,
            QuoteRequestEvent::VendorSelected(e) => e.occurred_at,
            QuoteRequestEvent::SentForApproval(e) => e.occurred_at,
            QuoteRequestEvent::RequestCompleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for QuoteRequest {
    type Command = QuoteRequestCommand;
    type Event = QuoteRequestEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            QuoteRequestEvent::RequestOpened(e) => {
                self.id = e.request_id;
                self.product_name = e.product_name.clone();
                self.description = e.description.clone();
                self.budget = e.budget;
                self.required_quotes = e.required_quotes;
                self.priority = e.priority;
                self.quotes.clear();
                self.selected_vendor = None;
                self.status = RequestStatus::WaitingForQuotes;
                self.created = true;
            }
            QuoteRequestEvent::VendorQuoteRecorded(e) => {
                self.quotes.push(VendorQuote {
                    vendor: e.vendor.clone(),
                    amount: e.amount,
                    received_at: e.occurred_at,
                });
                // Enough quotes in: the request moves into review.
                if self.status == RequestStatus::WaitingForQuotes
                    && self.quotes.len() >= self.required_quotes as usize
                {
                    self.status = RequestStatus::InReview;
                }
            }
            QuoteRequestEvent::VendorSelected(e) => {
                self.selected_vendor = Some(e.vendor.clone());
                self.status = RequestStatus::VendorSelected;
            }
            QuoteRequestEvent::SentForApproval(_) => {
                self.status = RequestStatus::EngineeringApproval;
            }
            QuoteRequestEvent::RequestCompleted(_) => {
                self.status = RequestStatus::Completed;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            QuoteRequestCommand::OpenRequest(cmd) => self.handle_open(cmd),
            QuoteRequestCommand::RecordVendorQuote(cmd) => self.handle_record_quote(cmd),
            QuoteRequestCommand::SelectVendor(cmd) => self.handle_select_vendor(cmd),
            QuoteRequestCommand::SubmitForApproval(cmd) => self.handle_submit_for_approval(cmd),
            QuoteRequestCommand::CompleteRequest(cmd) => self.handle_complete(cmd),
        }
    }
}

impl QuoteRequest {
    fn ensure_request_id(&self, request_id: RequestId) -> Result<(), DomainError> {
        if self.id != request_id {
            return Err(DomainError::invariant("request_id mismatch"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenRequest) -> Result<Vec<QuoteRequestEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("quote request already exists"));
        }

        if cmd.product_name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        if !(MIN_REQUIRED_QUOTES..=MAX_REQUIRED_QUOTES).contains(&cmd.required_quotes) {
            return Err(DomainError::validation(format!(
                "required quotes must be between {MIN_REQUIRED_QUOTES} and {MAX_REQUIRED_QUOTES}"
            )));
        }

        if cmd.budget.is_some_and(Money::is_negative) {
            return Err(DomainError::validation("budget cannot be negative"));
        }

        Ok(vec![QuoteRequestEvent::RequestOpened(RequestOpened {
            request_id: cmd.request_id,
            product_name: cmd.product_name.clone(),
            description: cmd.description.clone(),
            budget: cmd.budget,
            required_quotes: cmd.required_quotes,
            priority: cmd.priority,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_quote(
        &self,
        cmd: &RecordVendorQuote,
    ) -> Result<Vec<QuoteRequestEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_request_id(cmd.request_id)?;

        if !self.accepts_quotes() {
            return Err(DomainError::invariant(
                "quotes can no longer be recorded once a vendor is selected",
            ));
        }

        if cmd.amount.is_zero() || cmd.amount.is_negative() {
            return Err(DomainError::validation("quote amount must be positive"));
        }

        if self.has_quote_from(&cmd.vendor) {
            return Err(DomainError::conflict("vendor has already quoted"));
        }

        Ok(vec![QuoteRequestEvent::VendorQuoteRecorded(
            VendorQuoteRecorded {
                request_id: cmd.request_id,
                vendor: cmd.vendor.clone(),
                amount: cmd.amount,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_select_vendor(
        &self,
        cmd: &SelectVendor,
    ) -> Result<Vec<QuoteRequestEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_request_id(cmd.request_id)?;

        if self.status != RequestStatus::InReview {
            return Err(DomainError::invariant(
                "vendor selection requires the request to be in review",
            ));
        }

        if !self.has_quote_from(&cmd.vendor) {
            return Err(DomainError::validation(
                "cannot select a vendor that has not quoted",
            ));
        }

        Ok(vec![QuoteRequestEvent::VendorSelected(VendorSelected {
            request_id: cmd.request_id,
            vendor: cmd.vendor.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit_for_approval(
        &self,
        cmd: &SubmitForApproval,
    ) -> Result<Vec<QuoteRequestEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_request_id(cmd.request_id)?;

        if self.status != RequestStatus::VendorSelected {
            return Err(DomainError::invariant(
                "engineering approval requires a selected vendor",
            ));
        }

        Ok(vec![QuoteRequestEvent::SentForApproval(SentForApproval {
            request_id: cmd.request_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(
        &self,
        cmd: &CompleteRequest,
    ) -> Result<Vec<QuoteRequestEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_request_id(cmd.request_id)?;

        if self.status != RequestStatus::EngineeringApproval {
            return Err(DomainError::invariant(
                "only requests under engineering approval can be completed",
            ));
        }

        Ok(vec![QuoteRequestEvent::RequestCompleted(RequestCompleted {
            request_id: cmd.request_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoteworks_core::AggregateId;

    fn test_request_id() -> RequestId {
        RequestId::new(AggregateId::new())
    }

    fn vendor(code: &str) -> CounterpartyCode {
        CounterpartyCode::new(code).unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn open_cmd(request_id: RequestId, required_quotes: u8) -> OpenRequest {
        OpenRequest {
            request_id,
            product_name: "Custom Gearbox Housing".to_string(),
            description: Some("Machined housing per drawing D-4417".to_string()),
            budget: Some(Money::from_major_minor(12_000, 0)),
            required_quotes,
            priority: RequestPriority::High,
            occurred_at: test_time(),
        }
    }

    fn opened_request(required_quotes: u8) -> (QuoteRequest, RequestId) {
        let request_id = test_request_id();
        let mut request = QuoteRequest::empty(request_id);
        let events = request
            .handle(&QuoteRequestCommand::OpenRequest(open_cmd(
                request_id,
                required_quotes,
            )))
            .unwrap();
        request.apply(&events[0]);
        (request, request_id)
    }

    fn record_quote(request: &mut QuoteRequest, request_id: RequestId, code: &str, cents: i64) {
        let events = request
            .handle(&QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
                request_id,
                vendor: vendor(code),
                amount: Money::from_cents(cents),
                occurred_at: test_time(),
            }))
            .unwrap();
        request.apply(&events[0]);
    }

    #[test]
    fn open_request_emits_request_opened_event() {
        let request_id = test_request_id();
        let request = QuoteRequest::empty(request_id);
        let cmd = open_cmd(request_id, 3);

        let events = request
            .handle(&QuoteRequestCommand::OpenRequest(cmd.clone()))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            QuoteRequestEvent::RequestOpened(e) => {
                assert_eq!(e.request_id, request_id);
                assert_eq!(e.product_name, "Custom Gearbox Housing");
                assert_eq!(e.required_quotes, 3);
                assert_eq!(e.priority, RequestPriority::High);
            }
            _ => panic!("Expected RequestOpened event"),
        }
    }

    #[test]
    fn open_request_rejects_out_of_range_quote_count() {
        let request = QuoteRequest::empty(test_request_id());
        for required in [0, 1, 6] {
            let err = request
                .handle(&QuoteRequestCommand::OpenRequest(open_cmd(
                    test_request_id(),
                    required,
                )))
                .unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                _ => panic!("Expected Validation error for required quotes = {required}"),
            }
        }
    }

    #[test]
    fn open_request_rejects_empty_product_name() {
        let request = QuoteRequest::empty(test_request_id());
        let cmd = OpenRequest {
            product_name: "   ".to_string(),
            ..open_cmd(test_request_id(), 3)
        };
        let err = request
            .handle(&QuoteRequestCommand::OpenRequest(cmd))
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty product name"),
        }
    }

    #[test]
    fn request_moves_into_review_at_the_required_count() {
        let (mut request, request_id) = opened_request(3);
        assert_eq!(request.status(), RequestStatus::WaitingForQuotes);

        record_quote(&mut request, request_id, "VEND001", 1_150_000);
        assert_eq!(request.status(), RequestStatus::WaitingForQuotes);

        record_quote(&mut request, request_id, "VEND002", 1_275_500);
        assert_eq!(request.status(), RequestStatus::WaitingForQuotes);

        record_quote(&mut request, request_id, "VEND003", 998_000);
        assert_eq!(request.status(), RequestStatus::InReview);
        assert_eq!(request.quotes().len(), 3);
    }

    #[test]
    fn extra_quotes_are_accepted_while_in_review() {
        let (mut request, request_id) = opened_request(2);
        record_quote(&mut request, request_id, "VEND001", 500_000);
        record_quote(&mut request, request_id, "VEND002", 480_000);
        assert_eq!(request.status(), RequestStatus::InReview);

        record_quote(&mut request, request_id, "VEND003", 455_000);
        assert_eq!(request.quotes().len(), 3);
        assert_eq!(request.status(), RequestStatus::InReview);
    }

    #[test]
    fn duplicate_vendor_quotes_are_rejected() {
        let (mut request, request_id) = opened_request(3);
        record_quote(&mut request, request_id, "VEND001", 500_000);

        let err = request
            .handle(&QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
                request_id,
                vendor: vendor("VEND001"),
                amount: Money::from_cents(470_000),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate vendor quote"),
        }
        assert_eq!(request.quotes().len(), 1);
    }

    #[test]
    fn non_positive_quote_amounts_are_rejected() {
        let (request, request_id) = opened_request(2);
        for cents in [0, -100] {
            let err = request
                .handle(&QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
                    request_id,
                    vendor: vendor("VEND001"),
                    amount: Money::from_cents(cents),
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                _ => panic!("Expected Validation error for amount = {cents}"),
            }
        }
    }

    #[test]
    fn lowest_quote_tracks_the_cheapest_vendor() {
        let (mut request, request_id) = opened_request(2);
        assert!(request.lowest_quote().is_none());

        record_quote(&mut request, request_id, "VEND001", 500_000);
        record_quote(&mut request, request_id, "VEND002", 455_000);
        record_quote(&mut request, request_id, "VEND003", 480_000);

        let lowest = request.lowest_quote().unwrap();
        assert_eq!(lowest.vendor.as_str(), "VEND002");
        assert_eq!(lowest.amount.cents(), 455_000);
    }

    #[test]
    fn vendor_selection_requires_review_and_a_recorded_quote() {
        let (mut request, request_id) = opened_request(2);
        record_quote(&mut request, request_id, "VEND001", 500_000);

        // Still waiting for quotes.
        let err = request
            .handle(&QuoteRequestCommand::SelectVendor(SelectVendor {
                request_id,
                vendor: vendor("VEND001"),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation before review"),
        }

        record_quote(&mut request, request_id, "VEND002", 480_000);
        assert_eq!(request.status(), RequestStatus::InReview);

        // A vendor that never quoted cannot be selected.
        let err = request
            .handle(&QuoteRequestCommand::SelectVendor(SelectVendor {
                request_id,
                vendor: vendor("VEND009"),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for unknown vendor"),
        }

        let events = request
            .handle(&QuoteRequestCommand::SelectVendor(SelectVendor {
                request_id,
                vendor: vendor("VEND002"),
                occurred_at: test_time(),
            }))
            .unwrap();
        request.apply(&events[0]);
        assert_eq!(request.status(), RequestStatus::VendorSelected);
        assert_eq!(request.selected_vendor().unwrap().as_str(), "VEND002");
    }

    #[test]
    fn quotes_are_frozen_after_selection() {
        let (mut request, request_id) = opened_request(2);
        record_quote(&mut request, request_id, "VEND001", 500_000);
        record_quote(&mut request, request_id, "VEND002", 480_000);

        let events = request
            .handle(&QuoteRequestCommand::SelectVendor(SelectVendor {
                request_id,
                vendor: vendor("VEND001"),
                occurred_at: test_time(),
            }))
            .unwrap();
        request.apply(&events[0]);

        let err = request
            .handle(&QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
                request_id,
                vendor: vendor("VEND003"),
                amount: Money::from_cents(450_000),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation for late quote"),
        }
    }

    #[test]
    fn full_lifecycle_to_completed() {
        let (mut request, request_id) = opened_request(2);
        record_quote(&mut request, request_id, "VEND001", 500_000);
        record_quote(&mut request, request_id, "VEND002", 480_000);

        let events = request
            .handle(&QuoteRequestCommand::SelectVendor(SelectVendor {
                request_id,
                vendor: vendor("VEND002"),
                occurred_at: test_time(),
            }))
            .unwrap();
        request.apply(&events[0]);

        let events = request
            .handle(&QuoteRequestCommand::SubmitForApproval(SubmitForApproval {
                request_id,
                occurred_at: test_time(),
            }))
            .unwrap();
        request.apply(&events[0]);
        assert_eq!(request.status(), RequestStatus::EngineeringApproval);

        let events = request
            .handle(&QuoteRequestCommand::CompleteRequest(CompleteRequest {
                request_id,
                occurred_at: test_time(),
            }))
            .unwrap();
        request.apply(&events[0]);
        assert_eq!(request.status(), RequestStatus::Completed);
    }

    #[test]
    fn stage_transitions_only_happen_in_order() {
        let (request, request_id) = opened_request(2);

        let err = request
            .handle(&QuoteRequestCommand::SubmitForApproval(SubmitForApproval {
                request_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation for premature approval submission"),
        }

        let err = request
            .handle(&QuoteRequestCommand::CompleteRequest(CompleteRequest {
                request_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation for premature completion"),
        }
    }

    #[test]
    fn commands_reject_non_existent_request() {
        let request = QuoteRequest::empty(test_request_id());
        let err = request
            .handle(&QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
                request_id: test_request_id(),
                vendor: vendor("VEND001"),
                amount: Money::from_cents(100),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound for a request that was never opened"),
        }
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let (request, request_id) = opened_request(2);
        let before = request.clone();

        let cmd = QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
            request_id,
            vendor: vendor("VEND001"),
            amount: Money::from_cents(500_000),
            occurred_at: test_time(),
        });
        let events1 = request.handle(&cmd).unwrap();
        assert_eq!(request, before);

        let events2 = request.handle(&cmd).unwrap();
        assert_eq!(request, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn version_increments_on_apply() {
        let (mut request, request_id) = opened_request(2);
        assert_eq!(request.version(), 1);

        record_quote(&mut request, request_id, "VEND001", 500_000);
        assert_eq!(request.version(), 2);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the request enters review exactly when the required
            /// quote count is reached, never earlier.
            #[test]
            fn review_begins_exactly_at_required_count(
                required in MIN_REQUIRED_QUOTES..=MAX_REQUIRED_QUOTES,
                amounts in proptest::collection::vec(1i64..10_000_000, 5),
            ) {
                let (mut request, request_id) = opened_request(required);

                for (i, cents) in amounts.iter().enumerate() {
                    let code = format!("VEND{:03}", i + 1);
                    let events = request
                        .handle(&QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
                            request_id,
                            vendor: vendor(&code),
                            amount: Money::from_cents(*cents),
                            occurred_at: test_time(),
                        }))
                        .unwrap();
                    request.apply(&events[0]);

                    let expected = if request.quotes().len() >= required as usize {
                        RequestStatus::InReview
                    } else {
                        RequestStatus::WaitingForQuotes
                    };
                    prop_assert_eq!(request.status(), expected);
                }
            }

            /// Property: the lowest quote is the minimum of all recorded
            /// amounts.
            #[test]
            fn lowest_quote_is_the_minimum(
                amounts in proptest::collection::vec(1i64..10_000_000, 1..5),
            ) {
                let (mut request, request_id) = opened_request(MAX_REQUIRED_QUOTES);

                for (i, cents) in amounts.iter().enumerate() {
                    let code = format!("VEND{:03}", i + 1);
                    let events = request
                        .handle(&QuoteRequestCommand::RecordVendorQuote(RecordVendorQuote {
                            request_id,
                            vendor: vendor(&code),
                            amount: Money::from_cents(*cents),
                            occurred_at: test_time(),
                        }))
                        .unwrap();
                    request.apply(&events[0]);
                }

                let expected = amounts.iter().copied().min().unwrap();
                prop_assert_eq!(request.lowest_quote().unwrap().amount.cents(), expected);
            }
        }
    }
}
