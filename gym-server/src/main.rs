use gym_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment: .env is optional
    dotenv::dotenv().ok();

    // 2. Configuration
    let config = Config::from_env()?;

    // 3. Logging
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database_path,
        "Gym server starting"
    );

    // 4. State (database, migrations, credential)
    let state = ServerState::initialize(&config).await?;

    // 5. Serve
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
