//! FlexiCache demo
//!
//! Runs a short workload against a cache configured from the environment
//! and prints the resulting statistics as JSON.

use anyhow::Context;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flexicache::{Cache, CacheConfig, CacheRegistry, Expiry, Value};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flexicache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: max_duration={:?}, max_length={:?}, auto_cleanup={}",
        config.max_duration, config.max_length, config.auto_cleanup
    );

    let cache: Cache = Cache::new(config);
    let mut registry = CacheRegistry::new();
    registry.register(&cache);

    run_workload(&cache).await?;

    println!("{}", serde_json::to_string_pretty(&registry.snapshots())?);
    Ok(())
}

/// Writes, reads, clones and removes a few entries, then runs a forced
/// cleanup pass. Returns true if the stored profile survived edits to its copy.
async fn run_workload(cache: &Cache) -> anyhow::Result<bool> {
    cache.set("greeting", Value::from("hello"));
    cache.set(1, Value::from(json!({"name": "foo", "tags": ["a", "b"]})));
    cache.set_with("session", Value::from("token"), Expiry::millis(10));

    let copy = cache.clone_value(1).context("profile was not stored")?;
    if let Some(fields) = copy.as_object() {
        fields.write().insert("name".to_string(), Value::from("changed"));
    }
    let stored = cache.get(1).context("profile was not stored")?;
    let isolated = stored.field("name") == Some(Value::from("foo"));
    info!("Clone isolated from stored value: {}", isolated);

    let removed = cache.remove("greeting")?;
    info!("Removed greeting: {:?}", removed);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let report = cache.cleanup(true);
    info!(
        "Cleanup removed {} entries, {} remain",
        report.removed(),
        cache.count()
    );

    Ok(isolated)
}
