use crate::config::PipelineSettings;
use crate::core::ArchiveScope;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use std::env;

/// Settings for the Lambda host, read once from the process environment at cold start.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub settings: PipelineSettings,
    pub s3_region: String,
}

/// First non-empty value among `names`; credentials also accept lowercase aliases.
fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let mut settings = PipelineSettings {
            client_id: env_any(&["SPOTIFY_CLIENT_ID", "spotify_client_id"]),
            client_secret: env_any(&["SPOTIFY_CLIENT_SECRET", "spotify_client_secret"]),
            storage_target: env_any(&["S3_BUCKET"]),
            ..PipelineSettings::default()
        };

        if let Some(link) = env_any(&["PLAYLIST_LINK"]) {
            settings.playlist_link = link;
        }
        if let Some(endpoint) = env_any(&["SPOTIFY_ACCOUNTS_ENDPOINT"]) {
            settings.accounts_endpoint = endpoint;
        }
        if let Some(endpoint) = env_any(&["SPOTIFY_API_ENDPOINT"]) {
            settings.api_endpoint = endpoint;
        }
        if let Some(scope) = env_any(&["ARCHIVE_SCOPE"]) {
            settings.archive_scope =
                scope
                    .parse::<ArchiveScope>()
                    .map_err(|reason| EtlError::InvalidConfigValueError {
                        field: "ARCHIVE_SCOPE".to_string(),
                        value: scope.clone(),
                        reason,
                    })?;
        }

        Ok(Self {
            settings,
            s3_region: env_any(&["S3_REGION", "AWS_REGION"])
                .unwrap_or_else(|| "ap-southeast-2".to_string()),
        })
    }

    pub fn bucket(&self) -> Result<&str> {
        self.settings.storage_target()
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if let Some(bucket) = &self.settings.storage_target {
            validate_s3_bucket_name("S3_BUCKET", bucket)?;
        }
        validate_aws_region("S3_REGION", &self.s3_region)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    let invalid = |reason: &str| EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: bucket_name.to_string(),
        reason: reason.to_string(),
    };

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid("S3 bucket name must be between 3 and 63 characters"));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid("S3 bucket name cannot start or end with a hyphen"));
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}
