use port_checkmarx_sync::utils::logger::{self, LogFormat};
use port_checkmarx_sync::utils::validation::Validate;
use port_checkmarx_sync::{run_from_config, SyncConfig, SyncError};

fn exit_with(e: &SyncError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logger(LogFormat::from_env());

    tracing::info!("Starting port-checkmarx-sync");

    // 設定只來自環境變數
    let config = match SyncConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };
    tracing::debug!("Config: {:?}", config);

    match run_from_config(&config).await {
        Ok(report) => {
            tracing::info!(
                "✅ Sync finished: {} fetched, {} upserted, {} failed{}",
                report.fetched,
                report.upserted,
                report.failed.len(),
                if report.blueprint_created {
                    ", blueprint created"
                } else {
                    ""
                }
            );
            if report.has_failures() {
                tracing::warn!(
                    "⚠️ {} projects could not be synced: {}",
                    report.failed.len(),
                    report
                        .failed
                        .iter()
                        .map(|f| f.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        Err(e) => {
            tracing::error!("❌ Sync failed: {}", e);
            if let Some(body) = e.response_body() {
                tracing::error!("Response content: {}", body);
            }
            exit_with(&e);
        }
    }

    Ok(())
}
