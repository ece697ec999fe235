use dotenvy::dotenv;
use restaurant_pos::app::AppContext;
use restaurant_pos::config::load_default_config;
use restaurant_pos::core::tables::TableStatus;
use restaurant_pos::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();

    // 3. Load the restaurant configuration
    let config = load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect, create tables, load orders, restore the session
    let ctx = AppContext::init(config)
        .await
        .inspect_err(|e| error!("Failed to start: {}", e))?;

    match ctx.session().await {
        Some(session) => info!("Signed in as '{}' ({})", session.username, session.role),
        None => info!("Nobody signed in"),
    }

    let tables = ctx.orders().tables().await;
    let occupied = tables
        .iter()
        .filter(|t| t.status == TableStatus::Occupied)
        .count();
    info!("{} of {} tables occupied", occupied, tables.len());
    info!(
        "{} orders waiting on the kitchen, {} open takeaway orders",
        ctx.orders().kitchen_queue().await.len(),
        ctx.orders().takeaway_orders().await.len()
    );

    // 5. Keep the order listener running until interrupted
    let mut orders = ctx.orders().subscribe();
    loop {
        tokio::select! {
            snapshot = orders.next() => match snapshot {
                Some(snapshot) => info!("Order list changed ({} orders)", snapshot.len()),
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Shutting down");
                break;
            }
        }
    }

    ctx.shutdown().await
}
