//! Composio connection listing and one-shot connect/disconnect.
//!
//! The connect/disconnect commands run the same optimistic-store
//! discipline the chat loop uses: mutate first, reconcile on success,
//! roll back on failure.

use std::error::Error;

use crate::api::client::AtlasClient;
use crate::core::config::Config;
use crate::core::store::ConnectionStore;

fn client_from(config: &Config) -> Result<AtlasClient, Box<dyn Error + Send + Sync>> {
    Ok(AtlasClient::new(
        config.effective_base_url(),
        config.resolve_api_key()?,
    ))
}

pub async fn list_connections(config: &Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let client = client_from(config)?;
    let mut store = ConnectionStore::new();
    store.replace(client.list_connections().await?);

    println!("🔌 Composio connections");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if store.connections().is_empty() {
        println!("No connections yet. Run 'atlas-chat connect <APP_KEY>' to add one.");
        return Ok(());
    }

    for conn in store.connections() {
        println!(
            "  {} ({}) — {} since {}",
            conn.app_name,
            conn.app_key,
            conn.status.as_str(),
            conn.created_at.format("%Y-%m-%d")
        );
    }
    println!();
    println!(
        "{} of {} connected",
        store.connected_app_keys().len(),
        store.connections().len()
    );

    Ok(())
}

pub async fn connect_app(config: &Config, app_key: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let client = client_from(config)?;

    let mut store = ConnectionStore::new();
    store.replace(client.list_connections().await?);
    if let Some(existing) = store.find(app_key) {
        if existing.status == crate::core::connection::ConnectionStatus::Connected {
            println!("{app_key} is already connected.");
            return Ok(());
        }
    }

    let snapshot = store.begin_create(app_key, app_key);
    match client.create_connection(app_key).await {
        Ok(record) => {
            println!("✅ Connected {} ({})", record.app_name, record.app_key);
            store.commit_create(record);
            Ok(())
        }
        Err(e) => {
            store.rollback(snapshot);
            Err(format!("Failed to connect {app_key}: {e}").into())
        }
    }
}

pub async fn disconnect_app(config: &Config, app_key: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let client = client_from(config)?;

    let mut store = ConnectionStore::new();
    store.replace(client.list_connections().await?);
    let Some(snapshot) = store.begin_delete(app_key) else {
        println!("No connection found for {app_key}.");
        return Ok(());
    };

    match client.delete_connection(app_key).await {
        Ok(true) => {
            store.commit_delete();
            println!("✅ Disconnected {app_key}");
            Ok(())
        }
        Ok(false) => {
            store.rollback(snapshot);
            Err(format!("Server declined to delete the {app_key} connection.").into())
        }
        Err(e) => {
            store.rollback(snapshot);
            Err(format!("Failed to disconnect {app_key}: {e}").into())
        }
    }
}
