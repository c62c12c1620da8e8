#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::Serialize;
#[cfg(feature = "lambda")]
use spotify_etl::adapters::trigger::{Dispatch, TriggerEvent};
#[cfg(feature = "lambda")]
use spotify_etl::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use spotify_etl::{EtlError, Extractor, LambdaConfig, S3Storage, SpotifyClient, Transformer};

#[cfg(feature = "lambda")]
#[derive(Serialize, Default)]
pub struct Response {
    pub message: String,
    pub staged_object: Option<String>,
    pub transformed_objects: Vec<String>,
    pub records_processed: usize,
}

/// Shared by every invocation; built once at cold start.
#[cfg(feature = "lambda")]
struct Handler {
    config: LambdaConfig,
    storage: S3Storage,
}

#[cfg(feature = "lambda")]
fn into_lambda_error(e: EtlError) -> Error {
    tracing::error!(
        category = ?e.category(),
        severity = ?e.severity(),
        "❌ {} ({})",
        e,
        e.recovery_suggestion()
    );
    Box::new(e)
}

#[cfg(feature = "lambda")]
impl Handler {
    async fn on_schedule(&self) -> Result<Response, EtlError> {
        tracing::info!("Spotify extract triggered by schedule");

        let settings = &self.config.settings;
        let credentials = settings.credentials()?;
        let source = SpotifyClient::with_endpoints(
            credentials,
            &settings.accounts_endpoint,
            &settings.api_endpoint,
        );
        let extractor = Extractor::from_config(self.storage.clone(), source, settings)?;
        let staged = extractor.run().await?;

        Ok(Response {
            message: "Playlist extracted".to_string(),
            staged_object: Some(staged),
            ..Response::default()
        })
    }

    async fn on_object_created(&self, keys: &[String]) -> Result<Response, EtlError> {
        let transformer = Transformer::from_config(self.storage.clone(), &self.config.settings);
        let mut response = Response {
            message: "Staged objects transformed".to_string(),
            ..Response::default()
        };

        for key in keys {
            let summary = transformer.run(key).await?;
            response.records_processed += summary.albums + summary.artists + summary.songs;
            response.transformed_objects.push(key.clone());
        }

        Ok(response)
    }
}

#[cfg(feature = "lambda")]
async fn function_handler(
    handler: &Handler,
    event: LambdaEvent<TriggerEvent>,
) -> Result<Response, Error> {
    let result = match event.payload.dispatch().map_err(into_lambda_error)? {
        Dispatch::Extract => handler.on_schedule().await,
        Dispatch::Transform(keys) => handler.on_object_created(&keys).await,
    };
    result.map_err(into_lambda_error)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env().map_err(into_lambda_error)?;
    config.validate().map_err(into_lambda_error)?;
    let bucket = config.bucket().map_err(into_lambda_error)?.to_string();

    // 創建AWS配置和S3客戶端
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .region(Region::new(config.s3_region.clone()))
        .force_path_style(true)
        .build();
    let storage = S3Storage::new(S3Client::from_conf(s3_config), bucket);
    tracing::info!("Serving triggers for bucket {}", storage.bucket());

    let handler = Handler { config, storage };
    let handler = &handler;
    run(service_fn(move |event: LambdaEvent<TriggerEvent>| async move {
        function_handler(handler, event).await
    }))
    .await
}
