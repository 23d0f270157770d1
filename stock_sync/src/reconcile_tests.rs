//! Tests for quantity/price rules and the feed/catalog join

use super::{clean_price, normalize_quantity, reconcile, STOCK_CAP};
use marketplace_common::{CatalogEntry, FeedRecord, RawQuantity, ReconciledUpdate, SyncError};

fn catalog(skus: &[&str]) -> Vec<CatalogEntry> {
    skus.iter().map(|s| CatalogEntry::new(*s)).collect()
}

fn update(sku: &str, quantity: u32, price: Option<u64>) -> ReconciledUpdate {
    ReconciledUpdate {
        sku: sku.to_string(),
        quantity,
        price,
    }
}

// ── normalize_quantity ───────────────────────────────────────────────

#[test]
fn quantities_above_ten_are_capped() {
    for q in [11, 15, 99, 100, 5000] {
        assert_eq!(normalize_quantity("A", &RawQuantity::Count(q)).unwrap(), STOCK_CAP);
        assert_eq!(
            normalize_quantity("A", &RawQuantity::Text(q.to_string())).unwrap(),
            STOCK_CAP
        );
    }
}

#[test]
fn vendor_more_than_ten_marker_is_capped() {
    assert_eq!(normalize_quantity("A", &RawQuantity::from(">10")).unwrap(), 100);
    assert_eq!(normalize_quantity("A", &RawQuantity::from(" > 10 ")).unwrap(), 100);
    assert_eq!(normalize_quantity("A", &RawQuantity::from(">50")).unwrap(), 100);
}

#[test]
fn single_unit_counts_as_out_of_stock() {
    assert_eq!(normalize_quantity("A", &RawQuantity::Count(1)).unwrap(), 0);
    assert_eq!(normalize_quantity("A", &RawQuantity::from("1")).unwrap(), 0);
}

#[test]
fn two_to_ten_pass_through() {
    for q in 2..=10u32 {
        assert_eq!(normalize_quantity("A", &RawQuantity::Count(q as i64)).unwrap(), q);
        assert_eq!(
            normalize_quantity("A", &RawQuantity::Text(format!(" {q} "))).unwrap(),
            q
        );
    }
}

#[test]
fn zero_stays_zero() {
    assert_eq!(normalize_quantity("A", &RawQuantity::Count(0)).unwrap(), 0);
    assert_eq!(normalize_quantity("A", &RawQuantity::from("0")).unwrap(), 0);
}

#[test]
fn malformed_quantities_fail_with_the_sku() {
    for raw in ["", "many", "-2", "2.5", ">", ">x", ">1", ">5", ">9"] {
        match normalize_quantity("MTP-1302D", &RawQuantity::from(raw)).unwrap_err() {
            SyncError::FeedParse { location, .. } => assert_eq!(location, "SKU MTP-1302D"),
            other => panic!("Expected SyncError::FeedParse for {raw:?}, got: {other:?}"),
        }
    }
    assert!(normalize_quantity("A", &RawQuantity::Count(-1)).is_err());
}

// ── clean_price ──────────────────────────────────────────────────────

#[test]
fn strips_currency_and_grouping() {
    assert_eq!(clean_price("A", "1 200,50 ₸").unwrap(), 1200);
    assert_eq!(clean_price("A", "5'990.00 руб.").unwrap(), 5990);
    assert_eq!(clean_price("A", "2 490 руб.").unwrap(), 2490);
    assert_eq!(clean_price("A", "$1,200").unwrap(), 1200);
    assert_eq!(clean_price("A", "1.234.567,89").unwrap(), 1234567);
    assert_eq!(clean_price("A", "  300  ").unwrap(), 300);
    assert_eq!(clean_price("A", "руб. 300").unwrap(), 300);
}

#[test]
fn fraction_is_truncated() {
    assert_eq!(clean_price("A", "99.99").unwrap(), 99);
    assert_eq!(clean_price("A", "99,9").unwrap(), 99);
}

#[test]
fn cleaning_is_idempotent() {
    for raw in ["1200", "5990", "1 200,50 ₸", "12'990.00 руб."] {
        let once = clean_price("A", raw).unwrap();
        let twice = clean_price("A", &once.to_string()).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn unparsable_prices_are_errors_not_zero() {
    for raw in [
        "", "руб.", "n/a", "1..2", "12345.6789", "1,2,3", "0", "0,00", "0.50", ".50", "₽ ,99",
    ] {
        match clean_price("GA-2100-1A", raw) {
            Err(SyncError::PriceFormat { sku, raw: kept }) => {
                assert_eq!(sku, "GA-2100-1A");
                assert_eq!(kept, raw);
            }
            other => panic!("Expected SyncError::PriceFormat for {raw:?}, got: {other:?}"),
        }
    }
}

#[test]
fn overflowing_price_is_an_error() {
    assert!(clean_price("A", "99999999999999999999999").is_err());
}

// ── reconcile ────────────────────────────────────────────────────────

#[test]
fn reference_scenario() {
    let feed = vec![
        FeedRecord::new("A", RawQuantity::Count(15), "1 200,50 ₸"),
        FeedRecord::new("B", RawQuantity::Count(1), "300"),
    ];

    let updates = reconcile(&catalog(&["A", "B", "C"]), &feed).unwrap();

    assert_eq!(
        updates,
        vec![
            update("A", 100, Some(1200)),
            update("B", 0, Some(300)),
            update("C", 0, None),
        ]
    );
}

#[test]
fn every_catalog_sku_appears_exactly_once() {
    let feed = vec![
        FeedRecord::new("X", "5", "100"),
        FeedRecord::new("B", "3", "200"),
        FeedRecord::new("B", "9", "999"),
        FeedRecord::new("Y", "7", "not a price"),
    ];

    let updates = reconcile(&catalog(&["A", "B", "C", "A"]), &feed).unwrap();

    let skus: Vec<&str> = updates.iter().map(|u| u.sku.as_str()).collect();
    assert_eq!(skus, vec!["B", "A", "C"]);
    // first feed row for B wins
    assert_eq!(updates[0], update("B", 3, Some(200)));
}

#[test]
fn feed_skus_outside_catalog_are_ignored() {
    let feed = vec![FeedRecord::new("ghost", ">10", "garbage")];

    let updates = reconcile(&catalog(&["A"]), &feed).unwrap();

    assert_eq!(updates, vec![update("A", 0, None)]);
}

#[test]
fn empty_catalog_yields_no_updates() {
    let feed = vec![FeedRecord::new("A", "5", "100")];
    assert!(reconcile(&[], &feed).unwrap().is_empty());
}

#[test]
fn bad_price_aborts_reconciliation() {
    let feed = vec![
        FeedRecord::new("A", "5", "100"),
        FeedRecord::new("B", "5", "по запросу"),
    ];

    match reconcile(&catalog(&["A", "B"]), &feed).unwrap_err() {
        SyncError::PriceFormat { sku, .. } => assert_eq!(sku, "B"),
        other => panic!("Expected SyncError::PriceFormat, got: {other:?}"),
    }
}

#[test]
fn bad_quantity_aborts_reconciliation() {
    let feed = vec![FeedRecord::new("A", "lots", "100")];

    let err = reconcile(&catalog(&["A"]), &feed).unwrap_err();
    assert!(matches!(err, SyncError::FeedParse { .. }));
    assert!(err.to_string().contains("SKU A"));
}
