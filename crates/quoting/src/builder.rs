//! Interactive draft builder.
//!
//! [`QuoteBuilder`] is the stateful facade a quotation-entry flow drives: it
//! holds the staged line selection (the pending form row), resolves product
//! and counterparty codes through their read-only seams, and turns each user
//! action into a command against the [`Quotation`] aggregate. The aggregate
//! stays pure; everything that needs a lookup or a clock lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use quoteworks_catalog::Catalog;
use quoteworks_core::{
    AggregateId, AggregateRoot, CounterpartyCode, DiscountPercent, DomainError, DomainResult,
    Money, ProductCode, QuoteNumber,
};
use quoteworks_events::{Command, EventBus, EventEnvelope, execute};
use quoteworks_parties::Directory;

use crate::quote::{
    AGGREGATE_TYPE, AssignCounterparty, CommitLine, OpenQuotation, Quotation, QuotationCommand,
    QuotationEvent, QuotationId, QuoteLine, RemoveLine, SubmitQuotation,
};
use crate::validate::{SubmissionIssue, validate};

/// Why a submission attempt did not go through.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// One or more submission preconditions failed; every issue is reported
    /// so they can be displayed together.
    #[error("quotation is not ready to submit ({} issue(s))", .0.len())]
    NotReady(Vec<SubmissionIssue>),

    /// The submit command itself was rejected (e.g. already sent).
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// The staged line selection: product code, quantity, discount.
///
/// Mirrors a pending form row, so coercion is deliberately permissive - see
/// [`QuoteBuilder::stage_selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSelection {
    product_code: String,
    quantity: u32,
    discount: DiscountPercent,
}

impl Default for StagedSelection {
    fn default() -> Self {
        Self {
            product_code: String::new(),
            quantity: 1,
            discount: DiscountPercent::ZERO,
        }
    }
}

impl StagedSelection {
    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }
}

/// Immutable snapshot of a submitted quotation, handed to the downstream
/// document-creation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub number: QuoteNumber,
    pub counterparty: CounterpartyCode,
    pub issued_on: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub lines: Vec<QuoteLine>,
    pub grand_total: Money,
    pub notes: Option<String>,
    pub terms: String,
}

/// Stateful builder for one quotation draft.
///
/// Exclusively owns its draft for the draft's lifetime; dropping the builder
/// discards the draft. All operations are synchronous and atomic - a failed
/// operation leaves both the draft and the staged selection untouched.
pub struct QuoteBuilder<C, D> {
    catalog: C,
    directory: D,
    quotation: Quotation,
    staged: StagedSelection,
}

impl<C, D> QuoteBuilder<C, D>
where
    C: Catalog,
    D: Directory,
{
    /// Open a fresh draft with the given quote number.
    pub fn open(
        catalog: C,
        directory: D,
        number: QuoteNumber,
        notes: Option<String>,
    ) -> DomainResult<Self> {
        let quotation_id = QuotationId::new(AggregateId::new());
        let mut quotation = Quotation::empty(quotation_id);
        let now = Utc::now();

        execute(
            &mut quotation,
            &QuotationCommand::OpenQuotation(OpenQuotation {
                quotation_id,
                number,
                issued_on: now,
                valid_until: None,
                notes,
                terms: None,
                occurred_at: now,
            }),
        )?;
        info!(quotation = %quotation_id, "quotation draft opened");

        Ok(Self {
            catalog,
            directory,
            quotation,
            staged: StagedSelection::default(),
        })
    }

    pub fn quotation(&self) -> &Quotation {
        &self.quotation
    }

    pub fn staged(&self) -> &StagedSelection {
        &self.staged
    }

    /// Grand total of the draft, recomputed on demand.
    pub fn grand_total(&self) -> Money {
        self.quotation.grand_total()
    }

    /// Assign the counterparty the quotation is addressed to.
    ///
    /// The code must resolve through the directory; an unknown code fails
    /// with `NotFound` and changes nothing.
    pub fn set_counterparty(&mut self, code: &str) -> DomainResult<()> {
        let code = CounterpartyCode::new(code)?;
        self.directory.lookup(&code)?;

        let quotation_id = self.quotation.id_typed();
        execute(
            &mut self.quotation,
            &QuotationCommand::AssignCounterparty(AssignCounterparty {
                quotation_id,
                counterparty: code.clone(),
                occurred_at: Utc::now(),
            }),
        )?;
        debug!(counterparty = %code, "counterparty assigned");
        Ok(())
    }

    /// Replace the staged selection.
    ///
    /// Only type coercion happens here: a quantity or discount that does not
    /// parse as a number leaves that staged field at its prior value, the way
    /// a form input keeps its last accepted content. Range checks (quantity
    /// ≥ 1, discount ≤ 100%) are deferred to [`commit_line`](Self::commit_line),
    /// where failure is atomic.
    pub fn stage_selection(&mut self, product_code: &str, quantity: &str, discount: &str) {
        self.staged.product_code = product_code.trim().to_owned();
        if let Ok(quantity) = quantity.trim().parse::<u32>() {
            self.staged.quantity = quantity;
        }
        if let Ok(percent) = discount.trim().parse::<f64>() {
            if percent.is_finite() {
                self.staged.discount = DiscountPercent::from_percent(percent);
            }
        }
    }

    /// Commit the staged selection as a new line.
    ///
    /// Resolves the unit price from the catalog at this instant, appends a
    /// distinct row (repeated products are not merged) and resets the staged
    /// selection. On any failure the draft and the staged selection are left
    /// exactly as they were.
    pub fn commit_line(&mut self) -> DomainResult<&QuoteLine> {
        if self.staged.product_code.is_empty() {
            return Err(DomainError::validation("no product selected"));
        }
        let code = ProductCode::new(&self.staged.product_code)?;

        let (product_name, unit_price) = {
            let entry = self.catalog.lookup(&code)?;
            (entry.name().to_owned(), entry.unit_price())
        };

        let quotation_id = self.quotation.id_typed();
        execute(
            &mut self.quotation,
            &QuotationCommand::CommitLine(CommitLine {
                quotation_id,
                product_code: code,
                product_name,
                quantity: self.staged.quantity,
                unit_price,
                discount: self.staged.discount,
                occurred_at: Utc::now(),
            }),
        )?;
        self.staged = StagedSelection::default();

        let line = self
            .quotation
            .lines()
            .last()
            .ok_or_else(|| DomainError::invariant("committed line missing"))?;
        debug!(product = %line.product_code, total = %line.line_total, "line committed");
        Ok(line)
    }

    /// Remove the line at `index`; out of range fails and changes nothing.
    pub fn remove_line(&mut self, index: usize) -> DomainResult<()> {
        let quotation_id = self.quotation.id_typed();
        execute(
            &mut self.quotation,
            &QuotationCommand::RemoveLine(RemoveLine {
                quotation_id,
                index,
                occurred_at: Utc::now(),
            }),
        )?;
        debug!(index, "line removed");
        Ok(())
    }

    /// Check the submission preconditions without submitting.
    pub fn validate(&self) -> Vec<SubmissionIssue> {
        validate(&self.quotation)
    }

    /// Submit the draft.
    ///
    /// Runs the submission checks first and reports **all** failed
    /// preconditions in one pass. On success the quotation leaves Draft, the
    /// submission event is published on `bus`, and an immutable snapshot is
    /// returned for the downstream document-creation collaborator.
    pub fn submit<B>(&mut self, bus: &B) -> Result<QuoteSnapshot, SubmitError>
    where
        B: EventBus<EventEnvelope<QuotationEvent>>,
    {
        let issues = validate(&self.quotation);
        if !issues.is_empty() {
            return Err(SubmitError::NotReady(issues));
        }

        let cmd = QuotationCommand::SubmitQuotation(SubmitQuotation {
            quotation_id: self.quotation.id_typed(),
            occurred_at: Utc::now(),
        });
        let target = cmd.target_aggregate_id();
        let events = execute(&mut self.quotation, &cmd)?;

        for event in events {
            let envelope = EventEnvelope::new(
                Uuid::now_v7(),
                target,
                AGGREGATE_TYPE,
                self.quotation.version(),
                event,
            );
            if bus.publish(envelope).is_err() {
                // The submission already took effect; delivery is best-effort
                // and consumers tolerate redelivery.
                warn!(quotation = %self.quotation.id_typed(), "failed to publish submission event");
            }
        }

        let snapshot = self.snapshot()?;
        info!(
            quotation = %self.quotation.id_typed(),
            grand_total = %snapshot.grand_total,
            "quotation submitted"
        );
        Ok(snapshot)
    }

    fn snapshot(&self) -> DomainResult<QuoteSnapshot> {
        let q = &self.quotation;
        let number = q
            .number()
            .cloned()
            .ok_or_else(|| DomainError::invariant("quotation has no number"))?;
        let counterparty = q
            .counterparty()
            .cloned()
            .ok_or_else(|| DomainError::invariant("quotation has no counterparty"))?;
        let issued_on = q
            .issued_on()
            .ok_or_else(|| DomainError::invariant("quotation has no issue date"))?;
        let valid_until = q
            .valid_until()
            .ok_or_else(|| DomainError::invariant("quotation has no validity date"))?;

        Ok(QuoteSnapshot {
            number,
            counterparty,
            issued_on,
            valid_until,
            lines: q.lines().to_vec(),
            grand_total: q.grand_total(),
            notes: q.notes().map(str::to_owned),
            terms: q.terms().to_owned(),
        })
    }
}
