use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use quoteworks_core::{
    Aggregate, AggregateId, AggregateRoot, CounterpartyCode, DiscountPercent, DomainError, Money,
    ProductCode, QuoteNumber,
};
use quoteworks_events::{Command, Event};

use crate::totals;

/// Aggregate type tag used in event envelopes.
pub const AGGREGATE_TYPE: &str = "quoting.quotation";

/// Default validity window for a new quotation, in days.
pub const QUOTE_VALIDITY_DAYS: i64 = 30;

/// Standard terms attached to a quotation when none are supplied.
pub const DEFAULT_TERMS: &str = "1. This quotation is valid for 30 days from the date of issue.\n\
     2. All prices are exclusive of taxes.\n\
     3. Delivery timeline starts from the date of order confirmation.\n\
     4. Payment terms: 50% advance, 50% before delivery.";

/// Quotation identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotationId(pub AggregateId);

impl QuotationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for QuotationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Quotation status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
}

/// One committed line: a product snapshot plus quantity, discount and the
/// derived total.
///
/// The name and unit price are frozen at commit time; later catalog changes
/// never alter a committed line. `line_total` is derived by the aggregation
/// rules and is never set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub line_no: u32,
    pub product_code: ProductCode,
    /// Product name at commit time (frozen).
    pub product_name: String,
    pub quantity: u32,
    /// Unit price at commit time, in smallest currency unit (frozen).
    pub unit_price: Money,
    pub discount: DiscountPercent,
    /// `quantity × unit_price × (1 − discount)`, rounded to cents.
    pub line_total: Money,
}

/// Aggregate root: Quotation.
///
/// A quotation is modifiable only while in `Draft`; submitting sends it to
/// the counterparty, after which it can only be approved or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quotation {
    id: QuotationId,
    number: Option<QuoteNumber>,
    counterparty: Option<CounterpartyCode>,
    issued_on: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    notes: Option<String>,
    terms: String,
    status: QuotationStatus,
    lines: Vec<QuoteLine>,
    rejection_reason: Option<String>,
    version: u64,
    created: bool,
}

impl Quotation {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: QuotationId) -> Self {
        Self {
            id,
            number: None,
            counterparty: None,
            issued_on: None,
            valid_until: None,
            notes: None,
            terms: String::new(),
            status: QuotationStatus::Draft,
            lines: Vec::new(),
            rejection_reason: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> QuotationId {
        self.id
    }

    pub fn number(&self) -> Option<&QuoteNumber> {
        self.number.as_ref()
    }

    pub fn counterparty(&self) -> Option<&CounterpartyCode> {
        self.counterparty.as_ref()
    }

    pub fn issued_on(&self) -> Option<DateTime<Utc>> {
        self.issued_on
    }

    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn terms(&self) -> &str {
        &self.terms
    }

    pub fn status(&self) -> QuotationStatus {
        self.status
    }

    pub fn lines(&self) -> &[QuoteLine] {
        &self.lines
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, QuotationStatus::Draft)
    }

    /// Grand total, recomputed on demand from the current lines (never
    /// cached, so it cannot go stale relative to the sequence).
    pub fn grand_total(&self) -> Money {
        totals::grand_total(self.lines.iter().map(|l| l.line_total))
    }
}

impl AggregateRoot for Quotation {
    type Id = QuotationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenQuotation {
    pub quotation_id: QuotationId,
    pub number: QuoteNumber,
    pub issued_on: DateTime<Utc>,
    /// Defaults to `issued_on` + [`QUOTE_VALIDITY_DAYS`] when absent.
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Defaults to [`DEFAULT_TERMS`] when absent.
    pub terms: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AssignCounterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignCounterparty {
    pub quotation_id: QuotationId,
    pub counterparty: CounterpartyCode,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CommitLine.
///
/// Carries the product snapshot the caller resolved from the catalog at this
/// instant; the aggregate derives the line total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitLine {
    pub quotation_id: QuotationId,
    pub product_code: ProductCode,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub discount: DiscountPercent,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveLine (positional).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLine {
    pub quotation_id: QuotationId,
    pub index: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitQuotation {
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveQuotation {
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectQuotation {
    pub quotation_id: QuotationId,
    /// Optional human-readable reason (e.g. "Budget constraints").
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationCommand {
    OpenQuotation(OpenQuotation),
    AssignCounterparty(AssignCounterparty),
    CommitLine(CommitLine),
    RemoveLine(RemoveLine),
    SubmitQuotation(SubmitQuotation),
    ApproveQuotation(ApproveQuotation),
    RejectQuotation(RejectQuotation),
}

impl Command for QuotationCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            QuotationCommand::OpenQuotation(c) => c.quotation_id.0,
            QuotationCommand::AssignCounterparty(c) => c.quotation_id.0,
            QuotationCommand::CommitLine(c) => c.quotation_id.0,
            QuotationCommand::RemoveLine(c) => c.quotation_id.0,
            QuotationCommand::SubmitQuotation(c) => c.quotation_id.0,
            QuotationCommand::ApproveQuotation(c) => c.quotation_id.0,
            QuotationCommand::RejectQuotation(c) => c.quotation_id.0,
        }
    }
}

/// Event: QuotationOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationOpened {
    pub quotation_id: QuotationId,
    pub number: QuoteNumber,
    pub issued_on: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
    pub terms: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CounterpartyAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyAssigned {
    pub quotation_id: QuotationId,
    pub counterparty: CounterpartyCode,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineCommitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCommitted {
    pub quotation_id: QuotationId,
    pub line: QuoteLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub quotation_id: QuotationId,
    pub index: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationSubmitted.
///
/// Carries the resolved counterparty and grand total so downstream consumers
/// do not need to re-derive them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationSubmitted {
    pub quotation_id: QuotationId,
    pub counterparty: CounterpartyCode,
    pub grand_total: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationApproved {
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationRejected {
    pub quotation_id: QuotationId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationEvent {
    QuotationOpened(QuotationOpened),
    CounterpartyAssigned(CounterpartyAssigned),
    LineCommitted(LineCommitted),
    LineRemoved(LineRemoved),
    QuotationSubmitted(QuotationSubmitted),
    QuotationApproved(QuotationApproved),
    QuotationRejected(QuotationRejected),
}

impl Event for QuotationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QuotationEvent::QuotationOpened(_) => "quoting.quotation.opened",
            QuotationEvent::CounterpartyAssigned(_) => "quoting.quotation.counterparty_assigned",
            QuotationEvent::LineCommitted(_) => "quoting.quotation.line_committed",
            QuotationEvent::LineRemoved(_) => "quoting.quotation.line_removed",
            QuotationEvent::QuotationSubmitted(_) => "quoting.quotation.submitted",
            QuotationEvent::QuotationApproved(_) => "quoting.quotation.approved",
            QuotationEvent::QuotationRejected(_) => "quoting.quotation.rejected",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            QuotationEvent::QuotationOpened(e) => e.occurred_at,
            QuotationEvent::CounterpartyAssigned(e) => e.occurred_at,
            QuotationEvent::LineCommitted(e) => e.occurred_at,
            QuotationEvent::LineRemoved(e) => e.occurred_at,
            QuotationEvent::QuotationSubmitted(e) => e.occurred_at,
            QuotationEvent::QuotationApproved(e) => e.occurred_at,
            QuotationEvent::QuotationRejected(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Quotation {
    type Command = QuotationCommand;
    type Event = QuotationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            QuotationEvent::QuotationOpened(e) => {
                self.id = e.quotation_id;
                self.number = Some(e.number.clone());
                self.counterparty = None;
                self.issued_on = Some(e.issued_on);
                self.valid_until = Some(e.valid_until);
                self.notes = e.notes.clone();
                self.terms = e.terms.clone();
                self.status = QuotationStatus::Draft;
                self.lines.clear();
                self.rejection_reason = None;
                self.created = true;
            }
            QuotationEvent::CounterpartyAssigned(e) => {
                self.counterparty = Some(e.counterparty.clone());
            }
            QuotationEvent::LineCommitted(e) => {
                self.lines.push(e.line.clone());
            }
            QuotationEvent::LineRemoved(e) => {
                if e.index < self.lines.len() {
                    self.lines.remove(e.index);
                }
            }
            QuotationEvent::QuotationSubmitted(_) => {
                self.status = QuotationStatus::Sent;
            }
            QuotationEvent::QuotationApproved(_) => {
                self.status = QuotationStatus::Approved;
            }
            QuotationEvent::QuotationRejected(e) => {
                self.status = QuotationStatus::Rejected;
                self.rejection_reason = e.reason.clone();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            QuotationCommand::OpenQuotation(cmd) => self.handle_open(cmd),
            QuotationCommand::AssignCounterparty(cmd) => self.handle_assign_counterparty(cmd),
            QuotationCommand::CommitLine(cmd) => self.handle_commit_line(cmd),
            QuotationCommand::RemoveLine(cmd) => self.handle_remove_line(cmd),
            QuotationCommand::SubmitQuotation(cmd) => self.handle_submit(cmd),
            QuotationCommand::ApproveQuotation(cmd) => self.handle_approve(cmd),
            QuotationCommand::RejectQuotation(cmd) => self.handle_reject(cmd),
        }
    }
}

impl Quotation {
    fn ensure_quotation_id(&self, quotation_id: QuotationId) -> Result<(), DomainError> {
        if self.id != quotation_id {
            return Err(DomainError::invariant("quotation_id mismatch"));
        }
        Ok(())
    }

    fn ensure_modifiable(&self) -> Result<(), DomainError> {
        if !self.is_modifiable() {
            return Err(DomainError::invariant(
                "cannot modify quotation once it has been sent",
            ));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("quotation already exists"));
        }

        let valid_until = cmd
            .valid_until
            .unwrap_or_else(|| cmd.issued_on + Duration::days(QUOTE_VALIDITY_DAYS));
        if valid_until <= cmd.issued_on {
            return Err(DomainError::validation(
                "valid_until must be after the issue date",
            ));
        }

        let terms = cmd
            .terms
            .clone()
            .unwrap_or_else(|| DEFAULT_TERMS.to_string());

        Ok(vec![QuotationEvent::QuotationOpened(QuotationOpened {
            quotation_id: cmd.quotation_id,
            number: cmd.number.clone(),
            issued_on: cmd.issued_on,
            valid_until,
            notes: cmd.notes.clone(),
            terms,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_assign_counterparty(
        &self,
        cmd: &AssignCounterparty,
    ) -> Result<Vec<QuotationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_quotation_id(cmd.quotation_id)?;
        self.ensure_modifiable()?;

        Ok(vec![QuotationEvent::CounterpartyAssigned(
            CounterpartyAssigned {
                quotation_id: cmd.quotation_id,
                counterparty: cmd.counterparty.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_commit_line(&self, cmd: &CommitLine) -> Result<Vec<QuotationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_quotation_id(cmd.quotation_id)?;
        self.ensure_modifiable()?;

        if cmd.product_name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        let line_total = totals::line_total(cmd.quantity, cmd.unit_price, cmd.discount)?;

        // Line numbers keep counting past removals so they stay unique.
        let next_line_no = self.lines.iter().map(|l| l.line_no).max().unwrap_or(0) + 1;

        Ok(vec![QuotationEvent::LineCommitted(LineCommitted {
            quotation_id: cmd.quotation_id,
            line: QuoteLine {
                line_no: next_line_no,
                product_code: cmd.product_code.clone(),
                product_name: cmd.product_name.clone(),
                quantity: cmd.quantity,
                unit_price: cmd.unit_price,
                discount: cmd.discount,
                line_total,
            },
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_line(&self, cmd: &RemoveLine) -> Result<Vec<QuotationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_quotation_id(cmd.quotation_id)?;
        self.ensure_modifiable()?;

        if cmd.index >= self.lines.len() {
            return Err(DomainError::index_out_of_range(cmd.index, self.lines.len()));
        }

        Ok(vec![QuotationEvent::LineRemoved(LineRemoved {
            quotation_id: cmd.quotation_id,
            index: cmd.index,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit(&self, cmd: &SubmitQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_quotation_id(cmd.quotation_id)?;

        if self.status != QuotationStatus::Draft {
            return Err(DomainError::invariant(
                "only draft quotations can be submitted",
            ));
        }

        let counterparty = self
            .counterparty
            .clone()
            .ok_or_else(|| DomainError::validation("cannot submit quotation without a counterparty"))?;

        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "cannot submit quotation without line items",
            ));
        }

        Ok(vec![QuotationEvent::QuotationSubmitted(QuotationSubmitted {
            quotation_id: cmd.quotation_id,
            counterparty,
            grand_total: self.grand_total(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_approve(&self, cmd: &ApproveQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_quotation_id(cmd.quotation_id)?;

        if self.status != QuotationStatus::Sent {
            return Err(DomainError::invariant(
                "only sent quotations can be approved",
            ));
        }

        Ok(vec![QuotationEvent::QuotationApproved(QuotationApproved {
            quotation_id: cmd.quotation_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reject(&self, cmd: &RejectQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_quotation_id(cmd.quotation_id)?;

        if self.status != QuotationStatus::Sent {
            return Err(DomainError::invariant(
                "only sent quotations can be rejected",
            ));
        }

        Ok(vec![QuotationEvent::QuotationRejected(QuotationRejected {
            quotation_id: cmd.quotation_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
