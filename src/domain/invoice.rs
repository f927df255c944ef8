use crate::error::PaymentError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a non-negative monetary value.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific rules
/// and provide type safety for financial calculations. Invoice amounts may be zero
/// (a fully credited invoice) but never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::Validation(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A single outstanding invoice. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// The unique identifier referenced by the selection model.
    pub id: String,
    /// Human-facing invoice number, e.g. `INV-2024-001`.
    pub invoice_number: String,
    /// Date the invoice falls due.
    pub date_due: NaiveDate,
    /// Outstanding amount.
    pub amount: Amount,
}

/// The static set of invoices available for selection.
///
/// Preserves insertion order so that aggregation and display iterate the
/// catalog the way it was loaded. Identifiers are unique; construction
/// rejects duplicates.
#[derive(Debug, Clone, Default)]
pub struct InvoiceCatalog {
    invoices: Vec<Invoice>,
}

impl InvoiceCatalog {
    pub fn new(invoices: Vec<Invoice>) -> Result<Self, PaymentError> {
        {
            let mut seen = std::collections::HashSet::new();
            for invoice in &invoices {
                if !seen.insert(invoice.id.as_str()) {
                    return Err(PaymentError::Validation(format!(
                        "duplicate invoice id: {}",
                        invoice.id
                    )));
                }
            }
        }
        Ok(Self { invoices })
    }

    pub fn get(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invoice> {
        self.invoices.iter()
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(id: &str, amount: Decimal) -> Invoice {
        Invoice {
            id: id.to_string(),
            invoice_number: format!("INV-2024-{id:0>3}"),
            date_due: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: Amount::new(amount).unwrap(),
        }
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(Amount::new(dec!(0.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(PaymentError::Validation(_))
        ));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog =
            InvoiceCatalog::new(vec![invoice("1", dec!(1250.00)), invoice("2", dec!(3420.50))])
                .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("1"));
        assert!(!catalog.contains("99"));
        assert_eq!(catalog.get("2").unwrap().amount.value(), dec!(3420.50));
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let result =
            InvoiceCatalog::new(vec![invoice("1", dec!(10.0)), invoice("1", dec!(20.0))]);
        assert!(matches!(result, Err(PaymentError::Validation(_))));
    }

    #[test]
    fn test_invoice_deserialization_rejects_negative_amount() {
        let json = r#"{"id":"1","invoice_number":"INV-2024-001","date_due":"2024-01-15","amount":-5.0}"#;
        let result: Result<Invoice, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
