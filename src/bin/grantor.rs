// ABOUTME: Process bootstrap for the authorization server binary
// ABOUTME: Installs tracing, loads configuration, connects the store, and serves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use grantor::config::ServerConfig;
use grantor::database::Database;
use grantor::server;
use grantor::services::ServerResources;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;

    let database = Database::connect(&config.database.connection_url()).await?;
    database.migrate().await?;
    info!("data store ready ({})", database.backend_info());

    let resources = Arc::new(ServerResources::new(database, &config));
    server::serve(&config, resources).await
}
