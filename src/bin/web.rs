use anyhow::{Context, Result};
use betting_tracker::app_state;
use betting_tracker::config::Config;
use betting_tracker::web::router;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    if config.odds_api_key.is_none() {
        eprintln!("ODDS_API_KEY is not set, upstream requests will be rejected");
    }

    let state = Arc::new(app_state(&config));

    // Warm the cheat sheet so the first visitor doesn't wait on every sport
    println!("Fetching odds...");
    match state.cheat_sheet.cheat_sheet().await {
        Ok(entries) => println!("Data loaded successfully: {} underdog games", entries.len()),
        Err(e) => {
            eprintln!("Error fetching data: {:#}", e);
            eprintln!("Server will start but pages may show errors");
        }
    }

    let addr = config.listen_addr();
    println!("\nStarting web server at http://{}", addr);
    println!("Press Ctrl+C to stop\n");

    let app = router(state);

    // Run server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
