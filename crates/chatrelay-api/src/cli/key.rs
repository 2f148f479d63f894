//! API key CLI commands: create.

use std::path::Path;

use anyhow::Result;
use console::style;

use chatrelay_infra::sqlite::api_key::SqliteApiKeyStore;
use chatrelay_infra::sqlite::pool::DatabasePool;

/// Mint a key for `user_id` and print it once.
///
/// ```bash
/// chatrelay key create alice --name laptop
/// ```
pub async fn create_key(data_dir: &Path, user_id: &str, name: &str) -> Result<()> {
    let pool = DatabasePool::open_in(data_dir).await?;
    let store = SqliteApiKeyStore::new(pool);
    let key = store.create(user_id, name).await?;

    println!();
    println!(
        "  {} API key for '{}' (save this -- it won't be shown again):",
        style("🔑").bold(),
        style(&key.user_id).cyan()
    );
    println!();
    println!("  {}", style(&key.plaintext).yellow().bold());
    println!();
    Ok(())
}
