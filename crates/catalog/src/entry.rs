use serde::{Deserialize, Serialize};

use quoteworks_core::{DomainError, DomainResult, Entity, Money, ProductCode};

/// Whether a product is carried as-is or engineered to order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductKind {
    /// Off-the-shelf product with a fixed list price.
    Standard,
    /// Made-to-order product; the list price is a baseline for quoting.
    NonStandard,
}

/// An orderable catalog entry.
///
/// Entries are owned by the catalog and are read-only from the quoting side:
/// a quotation copies the name and unit price at commit time and never reads
/// the entry again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    code: ProductCode,
    name: String,
    kind: ProductKind,
    unit_price: Money,
}

impl CatalogEntry {
    pub fn new(
        code: ProductCode,
        name: impl Into<String>,
        kind: ProductKind,
        unit_price: Money,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if unit_price.is_negative() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }

        Ok(Self {
            code,
            name,
            kind,
            unit_price,
        })
    }

    pub fn code(&self) -> &ProductCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }
}

impl Entity for CatalogEntry {
    type Id = ProductCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ProductCode {
        ProductCode::new(s).unwrap()
    }

    #[test]
    fn entry_carries_code_name_kind_and_price() {
        let entry = CatalogEntry::new(
            code("PRD001"),
            "Hydraulic Pump Assembly",
            ProductKind::Standard,
            Money::from_major_minor(1299, 99),
        )
        .unwrap();

        assert_eq!(entry.code().as_str(), "PRD001");
        assert_eq!(entry.name(), "Hydraulic Pump Assembly");
        assert_eq!(entry.kind(), ProductKind::Standard);
        assert_eq!(entry.unit_price().cents(), 129_999);
    }

    #[test]
    fn entry_rejects_empty_name() {
        let err = CatalogEntry::new(
            code("PRD001"),
            "   ",
            ProductKind::Standard,
            Money::from_cents(100),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn entry_rejects_negative_price() {
        let err = CatalogEntry::new(
            code("PRD001"),
            "Valve",
            ProductKind::NonStandard,
            Money::from_cents(-1),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
