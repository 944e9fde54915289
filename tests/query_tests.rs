//! Integration tests for the URL query bridge

use serde_json::{Value, json};
use tabula::prelude::*;

fn assets() -> Vec<Value> {
    (0..30)
        .map(|i| {
            let chain = if i % 3 == 0 { "sui" } else { "aptos" };
            json!({
                "symbol": format!("T{i}"),
                "chain": chain,
                "value_usd": i * 10,
            })
        })
        .collect()
}

fn table() -> TableState<Value> {
    let config = TableConfig {
        page_size: 5,
        enable_pagination: true,
        search_fields: vec!["symbol".to_string()],
        ..TableConfig::default()
    };
    TableState::new(assets(), config)
}

#[test]
fn test_apply_full_query() {
    let mut table = table();
    let query = TableQuery::from_query_string(
        "page=2&limit=4&sort=value_usd:desc&filter=%7B%22chain%22%3A%22aptos%22%7D",
    )
    .expect("query should decode");

    query.apply_to(&mut table);

    assert_eq!(table.page_size(), 4);
    assert_eq!(table.filtered_count(), 20);
    assert_eq!(table.sort_by(), Some("value_usd"));
    assert_eq!(table.sort_order(), SortOrder::Descending);
    assert_eq!(table.page(), 2);
    assert_eq!(table.display()[0]["value_usd"], json!(230));
}

#[test]
fn test_invalid_parts_are_skipped() {
    let mut table = table();
    let query = TableQuery {
        page: Some(2),
        filter: Some("{broken".to_string()),
        sort: Some("value_usd:sideways".to_string()),
        ..TableQuery::default()
    };
    query.apply_to(&mut table);

    assert!(!table.has_active_filters());
    assert_eq!(table.sort_by(), None);
    assert_eq!(table.page(), 2);
}

#[test]
fn test_out_of_range_page_is_ignored() {
    let mut table = table();
    let query = TableQuery::from_query_string("page=99").expect("query should decode");
    query.apply_to(&mut table);
    assert_eq!(table.page(), 1);
}

#[test]
fn test_search_parameter() {
    let mut table = table();
    let query = TableQuery::from_query_string("q=t1").expect("query should decode");
    query.apply_to(&mut table);
    // T1 and T10..T19
    assert_eq!(table.filtered_count(), 11);
    assert_eq!(table.search_query(), "t1");
}

#[test]
fn test_state_round_trips_through_query_string() {
    let mut table = table();
    table.set_filter("chain", FilterValue::categories(["sui"]));
    table.set_search("t");
    table.handle_sort("value_usd");
    table.go_to_page(2);

    let encoded = TableQuery::from_state(&table)
        .to_query_string()
        .expect("query should encode");

    let mut restored = self::table();
    TableQuery::from_query_string(&encoded)
        .expect("query should decode")
        .apply_to(&mut restored);

    assert_eq!(restored.filters(), table.filters());
    assert_eq!(restored.sort_by(), table.sort_by());
    assert_eq!(restored.sort_order(), table.sort_order());
    assert_eq!(restored.page(), table.page());
    assert_eq!(restored.display(), table.display());
}

#[test]
fn test_error_response() {
    let query = TableQuery {
        filter: Some("[1, 2]".to_string()),
        ..TableQuery::default()
    };
    let err = query.filter_set().unwrap_err();
    let response = err.to_response();
    assert_eq!(response.code, "INVALID_FILTER");
    assert!(response.message.contains("[1, 2]"));
}
