//! Authorization-code flow with manual code entry (blocking)
//!
//! No listener and no async runtime: visit the printed URL, authorize, and
//! paste the `code` query parameter from the redirect back into the
//! terminal. The rest of the sequence matches run_flow.
//!
//! Environment: WORKSPACE_URL, WORKSPACE_CLIENT_ID, WORKSPACE_CLIENT_SECRET,
//! WAREHOUSE_ID, optional WORKSPACE_REDIRECT_URI.
//!
//! Run with: cargo run --example manual_flow --no-default-features --features blocking

use std::io::{self, Write};

use anyhow::Context;
use warehouse_auth::{
    OAuthConfig, StatementParameter, StatementRequest,
    blocking::{OAuthClient, StatementsClient},
};

const SAMPLE_STATEMENT: &str =
    "SELECT count(1) as trip_count, pickup_zip FROM samples.nyctaxi.trips GROUP BY pickup_zip LIMIT 10";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warehouse_auth=info")),
        )
        .init();

    let config = OAuthConfig::from_env()?;
    let workspace = std::env::var("WORKSPACE_URL").context("WORKSPACE_URL is not set")?;
    let warehouse_id = std::env::var("WAREHOUSE_ID").context("WAREHOUSE_ID is not set")?;

    let client = OAuthClient::new(config)?;

    println!("Go to this URL to authorize the application:");
    println!("{}\n", client.authorization_url()?);

    print!("Paste the authorization code here: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    let code = code.trim();
    anyhow::ensure!(!code.is_empty(), "no authorization code entered");

    println!("Exchanging the code for a token...");
    let tokens = client.exchange_code(code)?;

    let statements = StatementsClient::for_workspace(&workspace, &tokens.access_token);
    let request = StatementRequest::new(SAMPLE_STATEMENT, warehouse_id)
        .with_parameter(StatementParameter::date("date", "2016-02-01"));

    let results = statements.submit(&request)?;
    println!("Sample NYC Taxi Rides: {}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
