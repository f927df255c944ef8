use crate::domain::invoice::InvoiceCatalog;
use crate::domain::workflow::PaymentMethod;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

/// Rebate rate applied to the total when paying by bank transfer.
const BANK_REBATE_RATE: Decimal = dec!(0.01);

/// Derived count and total of the currently selected invoices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub count: usize,
    pub total: Decimal,
}

/// Tracks which catalog invoices are currently chosen.
///
/// Holds identifiers only; totals are recomputed from the catalog on every
/// call rather than cached.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`, returning the new membership. Fails with
    /// `InvalidReference` when `id` is not in the catalog, leaving the
    /// selection unchanged.
    pub fn toggle_one(&mut self, catalog: &InvoiceCatalog, id: &str) -> Result<bool> {
        if !catalog.contains(id) {
            return Err(PaymentError::InvalidReference(id.to_string()));
        }
        if self.selected.remove(id) {
            Ok(false)
        } else {
            self.selected.insert(id.to_string());
            Ok(true)
        }
    }

    /// Selects every catalog invoice, or clears the selection when
    /// everything was already selected.
    pub fn toggle_all(&mut self, catalog: &InvoiceCatalog) {
        if self.selected.len() == catalog.len() {
            self.selected.clear();
        } else {
            self.selected = catalog.iter().map(|invoice| invoice.id.clone()).collect();
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected identifiers in catalog order.
    pub fn ids<'a>(&'a self, catalog: &'a InvoiceCatalog) -> impl Iterator<Item = &'a str> {
        catalog
            .iter()
            .filter(|invoice| self.selected.contains(&invoice.id))
            .map(|invoice| invoice.id.as_str())
    }

    /// Count and total of the selected invoices, recomputed on each call.
    pub fn aggregate(&self, catalog: &InvoiceCatalog) -> Aggregate {
        let mut count = 0;
        let mut total = Decimal::ZERO;
        for invoice in catalog.iter() {
            if self.selected.contains(&invoice.id) {
                count += 1;
                total += invoice.amount.value();
            }
        }
        Aggregate { count, total }
    }
}

/// The 1% pay-by-bank rebate. Pure pricing rule; zero for any other method
/// or a non-positive total.
pub fn incentive(method: PaymentMethod, total: Decimal) -> Decimal {
    if method == PaymentMethod::Bank && total > Decimal::ZERO {
        total * BANK_REBATE_RATE
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::{Amount, Invoice};
    use chrono::NaiveDate;

    fn catalog() -> InvoiceCatalog {
        let invoices = [("1", dec!(1250.00)), ("2", dec!(3420.50)), ("3", dec!(875.25))]
            .into_iter()
            .map(|(id, amount)| Invoice {
                id: id.to_string(),
                invoice_number: format!("INV-2024-{id:0>3}"),
                date_due: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                amount: Amount::new(amount).unwrap(),
            })
            .collect();
        InvoiceCatalog::new(invoices).unwrap()
    }

    #[test]
    fn test_toggle_one_involution() {
        let catalog = catalog();
        let mut selection = Selection::new();

        assert!(selection.toggle_one(&catalog, "1").unwrap());
        assert!(selection.is_selected("1"));
        assert!(!selection.toggle_one(&catalog, "1").unwrap());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_one_unknown_id() {
        let catalog = catalog();
        let mut selection = Selection::new();

        let result = selection.toggle_one(&catalog, "99");
        assert!(matches!(result, Err(PaymentError::InvalidReference(_))));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_round_trip() {
        let catalog = catalog();
        let mut selection = Selection::new();

        selection.toggle_all(&catalog);
        assert_eq!(selection.len(), 3);
        selection.toggle_all(&catalog);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_from_partial_selects_everything() {
        let catalog = catalog();
        let mut selection = Selection::new();

        selection.toggle_one(&catalog, "2").unwrap();
        selection.toggle_all(&catalog);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_aggregate() {
        let catalog = catalog();
        let mut selection = Selection::new();

        assert_eq!(
            selection.aggregate(&catalog),
            Aggregate {
                count: 0,
                total: Decimal::ZERO
            }
        );

        selection.toggle_one(&catalog, "1").unwrap();
        selection.toggle_one(&catalog, "3").unwrap();
        assert_eq!(
            selection.aggregate(&catalog),
            Aggregate {
                count: 2,
                total: dec!(2125.25)
            }
        );
    }

    #[test]
    fn test_ids_follow_catalog_order() {
        let catalog = catalog();
        let mut selection = Selection::new();
        selection.toggle_one(&catalog, "3").unwrap();
        selection.toggle_one(&catalog, "1").unwrap();

        let ids: Vec<_> = selection.ids(&catalog).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_incentive() {
        assert_eq!(incentive(PaymentMethod::Bank, dec!(1250.00)), dec!(12.50));
        assert_eq!(incentive(PaymentMethod::Bank, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(incentive(PaymentMethod::Debit, dec!(1250.00)), Decimal::ZERO);
        assert_eq!(incentive(PaymentMethod::Credit, dec!(1250.00)), Decimal::ZERO);
    }
}
