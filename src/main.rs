use gh_explore::explore::{
    Envelope, IntegrationListArgs, ShowcaseListArgs, TrendingArgs,
};
use gh_explore::logging::{init_logging, parse_log_level, LoggerConfig};
use gh_explore::{log_error, log_info, utils, Config, Explore, Result};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let config = if std::path::Path::new("config.toml").exists() {
        Config::from_file("config.toml")?
    } else {
        Config::default()
    };

    let logger_config = LoggerConfig {
        directory: config.logging.directory.clone(),
        file_name: config.logging.filename.clone(),
        rotation: tracing_appender::rolling::Rotation::DAILY,
        level: parse_log_level(&config.logging.level)?,
    };
    init_logging(logger_config)?;

    log_info!("[main] Starting explore run against {}", config.base_url);
    let explore = Explore::new(&config)?;

    let showcases = explore.showcases().list(&ShowcaseListArgs::default()).await;
    save_envelope("json_data/showcases.json", showcases)?;

    let integrations = explore
        .integrations()
        .list(&IntegrationListArgs::default())
        .await;
    save_envelope("json_data/integrations.json", integrations)?;

    let categories = explore.integrations().categories().await;
    save_envelope("json_data/integration_categories.json", categories)?;

    let repositories = explore.trending().list(&TrendingArgs::default()).await;
    save_envelope("json_data/trending_repositories.json", repositories)?;

    let developers = explore
        .trending()
        .list(&TrendingArgs {
            kind: Some("developers".to_string()),
            ..Default::default()
        })
        .await;
    save_envelope("json_data/trending_developers.json", developers)?;

    log_info!("[main] Explore run completed");
    Ok(())
}

fn save_envelope<T: Serialize>(path: &str, result: Result<T>) -> Result<()> {
    match &result {
        Ok(_) => log_info!("[main] Saving {}", path),
        Err(e) => log_error!("[main] Call failed, saving failure envelope to {}: {}", path, e),
    }

    utils::save_json(&Envelope::from(result), path)
}
