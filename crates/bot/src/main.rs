use ledgerbot_infra::BotConfig;
use ledgerbot_observability::LogFormat;

#[tokio::main]
async fn main() {
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            ledgerbot_observability::init(LogFormat::default());
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    ledgerbot_observability::init(config.log_format);

    if let Err(err) = ledgerbot_bot::app::run(config).await {
        tracing::error!(error = ?err, "bot terminated with error");
        std::process::exit(1);
    }
}
