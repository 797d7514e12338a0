//! `rekkari serve` — Start the HTTP gateway.

use rekkari_config::AppConfig;

pub async fn run(config_path: &str, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(config_path)?;
    if let Some(port) = port {
        config.gateway.port = port;
    }
    rekkari_gateway::start(config).await
}
