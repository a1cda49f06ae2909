use std::collections::BTreeMap;
use std::sync::Arc;

use quoteworks_core::{CounterpartyCode, DomainError, DomainResult};

use crate::counterparty::{Counterparty, CounterpartyKind};

/// Read-only counterparty lookup.
///
/// The quotation builder resolves customer codes through this seam before
/// assigning them to a draft; procurement resolves vendors the same way.
pub trait Directory {
    /// Resolve a counterparty by its code.
    ///
    /// Fails with [`DomainError::NotFound`] when the code is unknown.
    fn lookup(&self, code: &CounterpartyCode) -> DomainResult<&Counterparty>;

    fn contains(&self, code: &CounterpartyCode) -> bool {
        self.lookup(code).is_ok()
    }
}

impl<D> Directory for &D
where
    D: Directory + ?Sized,
{
    fn lookup(&self, code: &CounterpartyCode) -> DomainResult<&Counterparty> {
        (**self).lookup(code)
    }
}

impl<D> Directory for Arc<D>
where
    D: Directory + ?Sized,
{
    fn lookup(&self, code: &CounterpartyCode) -> DomainResult<&Counterparty> {
        (**self).lookup(code)
    }
}

/// In-memory directory keyed by counterparty code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    counterparties: BTreeMap<CounterpartyCode, Counterparty>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a list of counterparties, rejecting duplicate
    /// codes.
    pub fn from_counterparties(
        counterparties: impl IntoIterator<Item = Counterparty>,
    ) -> DomainResult<Self> {
        let mut directory = Self::new();
        for counterparty in counterparties {
            directory.insert(counterparty)?;
        }
        Ok(directory)
    }

    pub fn insert(&mut self, counterparty: Counterparty) -> DomainResult<()> {
        let code = counterparty.code().clone();
        if self.counterparties.contains_key(&code) {
            return Err(DomainError::conflict(format!(
                "duplicate counterparty code {code}"
            )));
        }
        self.counterparties.insert(code, counterparty);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.counterparties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counterparties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Counterparty> {
        self.counterparties.values()
    }

    /// Counterparties of one kind, in code order.
    pub fn of_kind(&self, kind: CounterpartyKind) -> impl Iterator<Item = &Counterparty> {
        self.counterparties
            .values()
            .filter(move |c| c.kind() == kind)
    }
}

impl Directory for InMemoryDirectory {
    fn lookup(&self, code: &CounterpartyCode) -> DomainResult<&Counterparty> {
        self.counterparties.get(code).ok_or(DomainError::NotFound)
    }
}
