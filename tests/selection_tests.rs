use invoiceflow::domain::invoice::InvoiceCatalog;
use invoiceflow::domain::selection::{Selection, incentive};
use invoiceflow::domain::workflow::PaymentMethod;
use invoiceflow::error::PaymentError;
use invoiceflow::interfaces::csv::invoice_reader::InvoiceReader;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs::File;

fn fixture_catalog() -> InvoiceCatalog {
    let file = File::open("tests/fixtures/invoices.csv").unwrap();
    InvoiceReader::new(file).into_catalog().unwrap()
}

#[test]
fn test_toggle_one_is_an_involution_for_every_invoice() {
    let catalog = fixture_catalog();
    let mut selection = Selection::new();

    for invoice in catalog.iter() {
        let before: Vec<_> = selection.ids(&catalog).map(str::to_string).collect();
        selection.toggle_one(&catalog, &invoice.id).unwrap();
        selection.toggle_one(&catalog, &invoice.id).unwrap();
        let after: Vec<_> = selection.ids(&catalog).map(str::to_string).collect();
        assert_eq!(before, after);
    }
}

#[test]
fn test_toggle_all_twice_returns_to_empty() {
    let catalog = fixture_catalog();
    let mut selection = Selection::new();

    selection.toggle_all(&catalog);
    assert_eq!(selection.len(), catalog.len());
    selection.toggle_all(&catalog);
    assert!(selection.is_empty());
}

#[test]
fn test_aggregate_matches_manual_sum() {
    let catalog = fixture_catalog();
    let mut selection = Selection::new();
    selection.toggle_all(&catalog);

    let manual: Decimal = catalog.iter().map(|invoice| invoice.amount.value()).sum();
    let aggregate = selection.aggregate(&catalog);
    assert_eq!(aggregate.count, 6);
    assert_eq!(aggregate.total, manual);
    assert_eq!(aggregate.total, dec!(13496.50));
}

#[test]
fn test_unknown_id_leaves_selection_untouched() {
    let catalog = fixture_catalog();
    let mut selection = Selection::new();
    selection.toggle_one(&catalog, "1").unwrap();

    let result = selection.toggle_one(&catalog, "not-an-invoice");
    assert!(matches!(result, Err(PaymentError::InvalidReference(_))));
    assert_eq!(selection.len(), 1);
    assert!(selection.is_selected("1"));
}

#[test]
fn test_incentive_rules() {
    for total in [dec!(0), dec!(0.01), dec!(1250.00), dec!(13496.50)] {
        let expected = if total > Decimal::ZERO {
            total * dec!(0.01)
        } else {
            Decimal::ZERO
        };
        assert_eq!(incentive(PaymentMethod::Bank, total), expected);
        assert_eq!(incentive(PaymentMethod::Debit, total), Decimal::ZERO);
        assert_eq!(incentive(PaymentMethod::Credit, total), Decimal::ZERO);
    }
}

#[test]
fn test_single_invoice_scenario() {
    let catalog = fixture_catalog();
    let mut selection = Selection::new();
    selection.toggle_one(&catalog, "1").unwrap();

    let aggregate = selection.aggregate(&catalog);
    assert_eq!(aggregate.count, 1);
    assert_eq!(aggregate.total, dec!(1250.00));
    assert_eq!(incentive(PaymentMethod::Bank, aggregate.total), dec!(12.50));
}
