//! End-to-end authorization-code flow with the local callback server
//!
//! Binds the redirect listener, opens the browser on the authorization URL
//! (printing it as a fallback), waits for the callback, exchanges the code,
//! then submits one sample statement to the warehouse and prints the raw
//! response.
//!
//! Environment: WORKSPACE_URL, WORKSPACE_CLIENT_ID, WORKSPACE_CLIENT_SECRET,
//! WAREHOUSE_ID, optional WORKSPACE_REDIRECT_URI.
//!
//! Run with: cargo run --example run_flow

use std::time::Duration;

use anyhow::Context;
use warehouse_auth::{
    CallbackServer, OAuthClient, OAuthConfig, StatementParameter, StatementRequest,
    StatementsClient, open_browser,
};

const SAMPLE_STATEMENT: &str =
    "SELECT count(1) as trip_count, pickup_zip FROM samples.nyctaxi.trips GROUP BY pickup_zip LIMIT 10";

const CALLBACK_DEADLINE: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warehouse_auth=info")),
        )
        .init();

    let config = OAuthConfig::from_env()?;
    let workspace = std::env::var("WORKSPACE_URL").context("WORKSPACE_URL is not set")?;
    let warehouse_id = std::env::var("WAREHOUSE_ID").context("WAREHOUSE_ID is not set")?;

    let port = config.redirect_port()?;
    let client = OAuthClient::new(config)?;

    // Step 1: the redirect listener, up before the user can authorize
    let mut server = CallbackServer::bind(port).await?;

    // Step 2: direct the user to the authorization endpoint
    let authorization_url = client.authorization_url()?;
    println!("Go to this URL to authorize the application:");
    println!("{}\n", authorization_url);

    if let Err(e) = open_browser(&authorization_url) {
        println!("Could not open a browser ({}); use the URL above.", e);
    }

    // Step 3: wait for the callback to deliver the code
    println!("Waiting for the authorization code...");
    let code = server.wait_for_code(CALLBACK_DEADLINE).await?;
    server.shutdown();
    println!("Authorization code received. Exchanging it for a token.");

    // Step 4: code -> token set
    let tokens = client.exchange_code(&code).await?;

    // Step 5: one statement against the warehouse, result printed as-is
    let statements = StatementsClient::for_workspace(&workspace, &tokens.access_token);
    let request = StatementRequest::new(SAMPLE_STATEMENT, warehouse_id)
        .with_parameter(StatementParameter::date("date", "2016-02-01"));

    let results = statements.submit(&request).await?;
    println!("Sample NYC Taxi Rides: {}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
