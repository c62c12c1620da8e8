use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

/// One bucket; storage keys are used verbatim as object keys, so the
/// `rawdata/` and `transformeddata/` containers become top-level prefixes.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `CopySource` must be URL-encoded; `/` separators stay literal.
    fn copy_source(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| {
                url::form_urlencoded::byte_serialize(segment.as_bytes())
                    .collect::<String>()
                    .replace('+', "%20")
            })
            .collect();
        format!("{}/{}", self.bucket, encoded.join("/"))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(EtlError::storage("head", key, DisplayErrorContext(&service_error)))
                }
            }
        }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_no_such_key() {
                    return Err(EtlError::ObjectNotFound {
                        path: path.to_string(),
                    });
                }
                return Err(EtlError::storage("get", path, DisplayErrorContext(&service_error)));
            }
        };

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| EtlError::storage("get", path, e))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| EtlError::storage("put", path, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| EtlError::storage("list", prefix, DisplayErrorContext(&e)))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .filter(|key| !key.ends_with('/'))
                    .map(str::to_string),
            );
        }

        keys.sort();
        Ok(keys)
    }

    async fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        match self
            .client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(self.copy_source(from))
            .key(to)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_error = err.into_service_error();
                // CopyObject 沒有 NoSuchKey 的具名變體，只能看錯誤碼
                if service_error.code() == Some("NoSuchKey") {
                    Err(EtlError::ObjectNotFound {
                        path: from.to_string(),
                    })
                } else {
                    Err(EtlError::storage("copy", from, DisplayErrorContext(&service_error)))
                }
            }
        }
    }

    async fn delete_file(&self, path: &str) -> Result<bool> {
        // DeleteObject succeeds for missing keys, so existence is checked first.
        if !self.exists(path).await? {
            return Ok(false);
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| EtlError::storage("delete", path, DisplayErrorContext(&e)))?;
        Ok(true)
    }
}
