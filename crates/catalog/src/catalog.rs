use std::collections::BTreeMap;
use std::sync::Arc;

use quoteworks_core::{DomainError, DomainResult, ProductCode};

use crate::entry::{CatalogEntry, ProductKind};

/// Read-only lookup of orderable entries.
///
/// The quoting side resolves unit prices through this seam and must not
/// commit a line for a code that fails to resolve. Implementations perform no
/// side effects.
pub trait Catalog {
    /// Resolve a catalog entry by its product code.
    ///
    /// Fails with [`DomainError::NotFound`] when the code is unknown.
    fn lookup(&self, code: &ProductCode) -> DomainResult<&CatalogEntry>;

    fn contains(&self, code: &ProductCode) -> bool {
        self.lookup(code).is_ok()
    }
}

impl<C> Catalog for &C
where
    C: Catalog + ?Sized,
{
    fn lookup(&self, code: &ProductCode) -> DomainResult<&CatalogEntry> {
        (**self).lookup(code)
    }
}

impl<C> Catalog for Arc<C>
where
    C: Catalog + ?Sized,
{
    fn lookup(&self, code: &ProductCode) -> DomainResult<&CatalogEntry> {
        (**self).lookup(code)
    }
}

/// In-memory catalog keyed by product code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: BTreeMap<ProductCode, CatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of entries, rejecting duplicate codes.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> DomainResult<Self> {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, entry: CatalogEntry) -> DomainResult<()> {
        let code = entry.code().clone();
        if self.entries.contains_key(&code) {
            return Err(DomainError::conflict(format!(
                "duplicate product code {code}"
            )));
        }
        self.entries.insert(code, entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries of one kind, in code order (standard vs. non-standard views).
    pub fn of_kind(&self, kind: ProductKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values().filter(move |e| e.kind() == kind)
    }
}

impl Catalog for InMemoryCatalog {
    fn lookup(&self, code: &ProductCode) -> DomainResult<&CatalogEntry> {
        self.entries.get(code).ok_or(DomainError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoteworks_core::Money;

    fn entry(code: &str, name: &str, kind: ProductKind, cents: i64) -> CatalogEntry {
        CatalogEntry::new(
            ProductCode::new(code).unwrap(),
            name,
            kind,
            Money::from_cents(cents),
        )
        .unwrap()
    }

    fn sample_catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_entries([
            entry(
                "PRD001",
                "Hydraulic Pump Assembly",
                ProductKind::Standard,
                129_999,
            ),
            entry(
                "PRD002",
                "Custom Valve Controller",
                ProductKind::NonStandard,
                349_999,
            ),
            entry(
                "PRD003",
                "Standard Pressure Sensor",
                ProductKind::Standard,
                19_999,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_resolves_known_codes() {
        let catalog = sample_catalog();
        let code = ProductCode::new("PRD001").unwrap();

        let found = catalog.lookup(&code).unwrap();
        assert_eq!(found.name(), "Hydraulic Pump Assembly");
        assert!(catalog.contains(&code));
    }

    #[test]
    fn lookup_misses_with_not_found() {
        let catalog = sample_catalog();
        let code = ProductCode::new("PRD999").unwrap();

        assert_eq!(catalog.lookup(&code).unwrap_err(), DomainError::NotFound);
        assert!(!catalog.contains(&code));
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let err = InMemoryCatalog::from_entries([
            entry("PRD001", "Pump", ProductKind::Standard, 100),
            entry("PRD001", "Pump again", ProductKind::Standard, 200),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn of_kind_filters_entries() {
        let catalog = sample_catalog();

        let standard: Vec<_> = catalog
            .of_kind(ProductKind::Standard)
            .map(|e| e.code().as_str().to_owned())
            .collect();
        assert_eq!(standard, ["PRD001", "PRD003"]);

        assert_eq!(catalog.of_kind(ProductKind::NonStandard).count(), 1);
    }

    #[test]
    fn lookup_works_through_references_and_arc() {
        let catalog = sample_catalog();
        let code = ProductCode::new("PRD003").unwrap();

        let by_ref: &dyn Catalog = &catalog;
        assert!(by_ref.contains(&code));

        let shared = std::sync::Arc::new(catalog);
        assert!(shared.lookup(&code).is_ok());
    }
}
