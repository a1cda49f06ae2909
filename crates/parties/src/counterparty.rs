use serde::{Deserialize, Serialize};

use quoteworks_core::{CounterpartyCode, DomainError, DomainResult, Entity, ValueObject};

/// Counterparty kind: the customer a quotation is addressed to, or a vendor
/// quotes are sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyKind {
    Customer,
    Vendor,
}

/// Postal address of a counterparty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl ValueObject for PostalAddress {}

/// Contact information for a counterparty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: PostalAddress,
}

impl ValueObject for ContactInfo {}

/// A counterparty record: customer or vendor.
///
/// Records are maintained outside this core (the directory is read-only from
/// the quoting side), so there is no lifecycle here - just the validated
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    code: CounterpartyCode,
    kind: CounterpartyKind,
    name: String,
    contact: ContactInfo,
    industry: Option<String>,
}

impl Counterparty {
    pub fn new(
        code: CounterpartyCode,
        kind: CounterpartyKind,
        name: impl Into<String>,
        contact: ContactInfo,
        industry: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("counterparty name cannot be empty"));
        }

        Ok(Self {
            code,
            kind,
            name,
            contact,
            industry,
        })
    }

    /// Customer with just a name, the common case in fixtures and tests.
    pub fn customer(code: CounterpartyCode, name: impl Into<String>) -> DomainResult<Self> {
        Self::new(
            code,
            CounterpartyKind::Customer,
            name,
            ContactInfo::default(),
            None,
        )
    }

    /// Vendor with just a name.
    pub fn vendor(code: CounterpartyCode, name: impl Into<String>) -> DomainResult<Self> {
        Self::new(
            code,
            CounterpartyKind::Vendor,
            name,
            ContactInfo::default(),
            None,
        )
    }

    pub fn code(&self) -> &CounterpartyCode {
        &self.code
    }

    pub fn kind(&self) -> CounterpartyKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    pub fn is_customer(&self) -> bool {
        self.kind == CounterpartyKind::Customer
    }

    pub fn is_vendor(&self) -> bool {
        self.kind == CounterpartyKind::Vendor
    }
}

impl Entity for Counterparty {
    type Id = CounterpartyCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CounterpartyCode {
        CounterpartyCode::new(s).unwrap()
    }

    #[test]
    fn counterparty_carries_its_fields() {
        let contact = ContactInfo {
            contact_person: Some("Jane Smith".to_string()),
            email: Some("jane@acme.example".to_string()),
            phone: Some("+1 555 0100".to_string()),
            address: PostalAddress {
                street: Some("1 Factory Way".to_string()),
                city: Some("Springfield".to_string()),
                ..PostalAddress::default()
            },
        };

        let customer = Counterparty::new(
            code("CUST001"),
            CounterpartyKind::Customer,
            "Acme Corporation",
            contact.clone(),
            Some("Manufacturing".to_string()),
        )
        .unwrap();

        assert_eq!(customer.code().as_str(), "CUST001");
        assert_eq!(customer.name(), "Acme Corporation");
        assert_eq!(customer.contact(), &contact);
        assert_eq!(customer.industry(), Some("Manufacturing"));
        assert!(customer.is_customer());
        assert!(!customer.is_vendor());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Counterparty::customer(code("CUST001"), "   ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn vendor_shortcut_builds_a_vendor() {
        let vendor = Counterparty::vendor(code("VEND001"), "Precision Parts Co").unwrap();
        assert!(vendor.is_vendor());
        assert_eq!(vendor.contact(), &ContactInfo::default());
    }
}
