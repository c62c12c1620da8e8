use clap::Parser;
use spotify_etl::config::cli::CliCommand;
use spotify_etl::core::archive;
use spotify_etl::utils::error::ErrorSeverity;
use spotify_etl::utils::{logger, validation::Validate};
use spotify_etl::{
    CliConfig, EtlEngine, EtlError, Extractor, LocalStorage, PipelineSettings, SpotifyClient,
    Transformer,
};

fn extractor(
    settings: &PipelineSettings,
    storage: LocalStorage,
) -> spotify_etl::Result<Extractor<LocalStorage, SpotifyClient>> {
    // 憑證缺少時在任何 API 呼叫或寫入之前就中止
    let credentials = settings.credentials()?;
    let source = SpotifyClient::with_endpoints(
        credentials,
        &settings.accounts_endpoint,
        &settings.api_endpoint,
    );
    Extractor::from_config(storage, source, settings)
}

async fn execute(config: &CliConfig) -> spotify_etl::Result<()> {
    let settings = config.settings()?;
    settings.validate()?;

    let storage = LocalStorage::new(settings.storage_target()?);
    tracing::debug!("Using storage root {}", storage.base_path().display());

    match &config.command {
        CliCommand::Extract => {
            let path = extractor(&settings, storage)?.run().await?;
            println!("📁 Staged raw payload: {}", path);
        }
        CliCommand::Transform { path } => {
            let summary = Transformer::from_config(storage, &settings)
                .run(path)
                .await?;
            println!(
                "✅ {} albums, {} artists, {} songs written; {} object(s) archived",
                summary.albums,
                summary.artists,
                summary.songs,
                summary.archive.archived.len()
            );
        }
        CliCommand::Archive => {
            let report = archive::sweep_staging(&storage).await?;
            println!(
                "🗄️ {} archived, {} already archived, {} failed",
                report.archived.len(),
                report.already_archived.len(),
                report.failed.len()
            );
            if let Some(first) = report.failed.first() {
                return Err(EtlError::PartialArchiveError {
                    object: first.clone(),
                    reason: format!("{} object(s) could not be archived", report.failed.len()),
                });
            }
        }
        CliCommand::Run => {
            let transformer = Transformer::from_config(storage.clone(), &settings);
            let engine = EtlEngine::new(extractor(&settings, storage)?, transformer);
            let summary = engine.run().await?;
            println!("✅ ETL process completed successfully!");
            println!("📁 Album table: {}", summary.outputs.album);
            println!("📁 Artist table: {}", summary.outputs.artist);
            println!("📁 Songs table: {}", summary.outputs.songs);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting spotify-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config.command);
    }

    if let Err(e) = execute(&config).await {
        tracing::error!(
            "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
