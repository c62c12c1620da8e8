use crate::domain::model::TableRecord;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};

/// Renders records as CSV. The header row is always present, even for an
/// empty table; `None` renders as an empty field.
pub fn to_csv<R: TableRecord>(records: &[R]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(R::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush {} table: {}", R::TABLE, e.error()),
    })
}

pub fn from_csv<R: TableRecord>(data: &[u8]) -> Result<Vec<R>> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();
    if headers.iter().ne(R::HEADERS.iter().copied()) {
        return Err(EtlError::ProcessingError {
            message: format!(
                "Unexpected {} header: {:?}, expected {:?}",
                R::TABLE,
                headers,
                R::HEADERS
            ),
        });
    }

    reader
        .deserialize::<R>()
        .map(|row| row.map_err(EtlError::from))
        .collect()
}

/// One table rendered and ready to upload.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    pub table: &'static str,
    pub rows: usize,
    pub data: Vec<u8>,
}

pub fn encode<R: TableRecord>(records: &[R]) -> Result<EncodedTable> {
    Ok(EncodedTable {
        table: R::TABLE,
        rows: records.len(),
        data: to_csv(records)?,
    })
}

/// Writes an encoded table to `path`, returning the row count.
pub async fn upload_table<S: Storage>(storage: &S, path: &str, table: &EncodedTable) -> Result<usize> {
    tracing::debug!(
        "Writing {} table ({} rows, {} bytes) to {}",
        table.table,
        table.rows,
        table.data.len(),
        path
    );
    storage.write_file(path, &table.data).await?;
    tracing::info!("📄 Wrote {} {} rows to {}", table.rows, table.table, path);
    Ok(table.rows)
}
