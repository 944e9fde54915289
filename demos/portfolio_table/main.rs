//! Portfolio Table Example
//!
//! Walks through the table pipeline the way a portfolio dashboard drives it:
//! - Views loaded from a YAML dashboard config
//! - Typed asset records with sorting, filtering and search
//! - Virtual scroll with delayed loads and a scroll listener
//! - A paginated transaction view restored from a URL query string
//! - Asset data served through a TTL cache and request deduplication
//!
//! Run with `RUST_LOG=tabula=debug` to see every state transition.

use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tabula::core::FieldValue;
use tabula::prelude::*;
use tabula::state::{load_more_delayed, shared};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize)]
struct Asset {
    symbol: String,
    name: String,
    chain: String,
    category: String,
    value_usd: Option<f64>,
    verified: bool,
}

impl Record for Asset {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "symbol" => Some(self.symbol.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "chain" => Some(self.chain.as_str().into()),
            "category" => Some(self.category.as_str().into()),
            "value_usd" => Some(self.value_usd.into()),
            "verified" => Some(self.verified.into()),
            _ => None,
        }
    }
}

/// Stand-in for the indexer client: parses the bundled snapshot
async fn fetch_assets() -> Result<Vec<Asset>, serde_json::Error> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    serde_json::from_str(include_str!("assets.json"))
}

fn print_rows(title: &str, rows: &[&Asset]) {
    println!("\n{title}");
    for asset in rows {
        let value = asset
            .value_usd
            .map(|v| format!("{v:>10.2}"))
            .unwrap_or_else(|| format!("{:>10}", "-"));
        println!("  {:<6} {:<24} {:<8} {}", asset.symbol, asset.name, asset.category, value);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dashboard = TablesConfig::from_yaml_str(include_str!("tables.yaml"))?;

    // Shared response cache for the data services
    let cache: Arc<TtlCache<Vec<Asset>>> = Arc::new(TtlCache::new(Duration::from_secs(300), 100));
    let dedup: Arc<RequestDeduplicator<Vec<Asset>>> = Arc::new(RequestDeduplicator::default());

    let load = |cache: Arc<TtlCache<Vec<Asset>>>, dedup: Arc<RequestDeduplicator<Vec<Asset>>>| async move {
        if let Some(hit) = cache.get("portfolio:assets") {
            return Ok::<_, DedupError>(hit);
        }
        let assets = dedup.dedupe("portfolio:assets", fetch_assets).await?;
        cache.insert("portfolio:assets", assets.clone());
        Ok(assets)
    };

    // Two widgets asking for the same data at once trigger a single fetch
    let (assets, _) = tokio::join!(
        load(cache.clone(), dedup.clone()),
        load(cache.clone(), dedup.clone())
    );
    let assets = assets?;
    println!("📦 Loaded {} assets ({:?})", assets.len(), dedup.stats());

    // === Assets: virtual scroll ===
    let config = dashboard
        .view("assets")
        .ok_or_else(|| anyhow::anyhow!("missing assets view"))?;
    let mut table = TableState::new(assets, config);

    print_rows("💰 Top assets by value (initial sort)", &table.display());

    table.handle_sort("symbol");
    print_rows("🔤 Sorted by symbol (column default: ascending)", &table.display());

    table.handle_sort("value_usd");
    table.set_filter("category", FilterValue::categories(["stable", "lst"]));
    print_rows("🏷️  Stables and LSTs", &table.display());

    table.clear_filters();
    table.set_search("usd -stable");
    print_rows("🔍 Search \"usd -stable\"", &table.display());

    table.clear_filters();
    for option in table.filter_options("category") {
        println!("  {:<8} {}", option.label, option.count);
    }

    // Delayed loading on a shared table
    let shared_table = shared(table);
    let revealed = load_more_delayed(&shared_table, Duration::from_millis(300)).await;
    {
        let table = shared_table.lock().await;
        println!(
            "\n📜 Load more: revealed={} showing {} of {}",
            revealed,
            table.display().len(),
            table.filtered_count()
        );
    }

    // Scroll events drive loads from a background listener
    let watcher = ScrollWatcher::spawn(shared_table.clone());
    watcher.notify(ScrollMetrics::new(900.0, 1200.0, 400.0));
    tokio::time::sleep(Duration::from_millis(400)).await;
    {
        let table = shared_table.lock().await;
        println!(
            "📜 After scrolling: showing {} of {}, more={}",
            table.display().len(),
            table.filtered_count(),
            table.has_more()
        );
    }
    watcher.stop();

    // === Transactions: pagination restored from a URL ===
    let transactions: Vec<serde_json::Value> = (1..=8)
        .map(|i| {
            let kind = if i % 2 == 0 { "swap" } else { "transfer" };
            serde_json::json!({ "hash": format!("0x{i:04x}"), "kind": kind, "amount": i * 25 })
        })
        .collect();
    let config = dashboard
        .view("transactions")
        .ok_or_else(|| anyhow::anyhow!("missing transactions view"))?;
    let mut txs = TableState::new(transactions, config);

    let query = TableQuery::from_query_string("sort=amount:desc&page=2")?;
    query.apply_to(&mut txs);

    let info = txs.page_info();
    println!("\n🧾 Transactions page {} of {} ({})", info.page, info.total_pages, info.range_label());
    for tx in txs.display() {
        println!("  {} {:<8} {}", tx["hash"], tx["kind"], tx["amount"]);
    }
    println!(
        "🔗 Shareable state: ?{}",
        TableQuery::from_state(&txs).to_query_string()?
    );

    Ok(())
}
