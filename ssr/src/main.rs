use component::leaderboard::{HttpRankingProvider, LeaderboardController};
use leaderboard_web::config::AppConfig;
use leaderboard_web::telemetry::init_telemetry;
use leaderboard_web::terminal;
use tracing::{error, info};

async fn main_impl() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_telemetry()?;

    let config = AppConfig::from_env()?;
    info!(
        "Leaderboard API at {} (page size {}, debounce {:?})",
        config.base_url, config.leaderboard.limit, config.leaderboard.debounce
    );

    let provider = HttpRankingProvider::new(config.base_url, config.leaderboard.request_timeout)?;
    let controller = LeaderboardController::new(provider, config.leaderboard);

    // A failed first load shows up in the table; the viewer can retry with `recalc`
    if let Err(e) = controller.reset().await {
        error!("Initial leaderboard load failed: {e}");
    }

    terminal::run(controller).await?;
    Ok(())
}

fn main() {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async {
            if let Err(e) = main_impl().await {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        });
}
