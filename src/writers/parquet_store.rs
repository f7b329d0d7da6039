use crate::config::StorageConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{slot_column_name, ReportTable, ReportTableRow};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DATES_COLUMN, DEFAULT_ROW_GROUP_SIZE, STATION_COLUMN,
};
use crate::utils::filename::table_file_path;
use arrow::array::{Array, ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Date32Type, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// Storage backend for assembled station reports
pub trait ReportStore: Send + Sync {
    fn table_exists(&self, table_id: &str) -> Result<bool>;

    /// Replace the whole table; on failure the previous table is left as it was
    fn overwrite(&self, table_id: &str, table: &ReportTable) -> Result<()>;

    /// Rows dated within `[start, end]`, ordered by date
    fn query_by_date_range(
        &self,
        table_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReportTable>;

    fn table_columns(&self, table_id: &str) -> Result<Vec<String>>;

    /// Earliest and latest stored dates, `None` for an empty table
    fn date_range(&self, table_id: &str) -> Result<Option<(NaiveDate, NaiveDate)>>;
}

/// One Parquet file per table under `{root}/{dataset}/{table}.parquet`
pub struct ParquetStore {
    root: PathBuf,
    compression: Compression,
    row_group_size: usize,
}

impl ParquetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Ok(Self::new(&config.root)
            .with_compression(&config.compression)?
            .with_row_group_size(config.row_group_size))
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table_id: &str) -> PathBuf {
        table_file_path(&self.root, table_id)
    }

    /// Read a whole stored table
    pub fn read_table(&self, table_id: &str) -> Result<ReportTable> {
        let path = self.existing_table_path(table_id)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        let slot_count = slot_count_from_schema(reader.schema())?;

        let mut rows = Vec::new();
        for batch in reader.build()? {
            rows.extend(batch_to_rows(&batch?, slot_count)?);
        }
        sort_by_date(&mut rows);

        ReportTable::new(slot_count, rows)
    }

    /// File-level statistics of a stored table
    pub fn table_info(&self, table_id: &str) -> Result<TableFileInfo> {
        let path = self.existing_table_path(table_id)?;
        let reader = SerializedFileReader::new(File::open(&path)?)?;
        let metadata = reader.metadata();

        Ok(TableFileInfo {
            table_id: table_id.to_string(),
            path: path.clone(),
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: metadata.num_row_groups(),
            file_size: fs::metadata(&path)?.len(),
            compression: self.compression,
        })
    }

    fn existing_table_path(&self, table_id: &str) -> Result<PathBuf> {
        let path = self.table_path(table_id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ProcessingError::TableNotFound {
                table_id: table_id.to_string(),
            })
        }
    }

    fn write_parquet(&self, table: &ReportTable, file: File) -> Result<()> {
        let schema = create_schema(table.slot_count());
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        if !table.is_empty() {
            writer.write(&table_to_batch(table, schema)?)?;
        }
        writer.close()?;
        Ok(())
    }
}

impl ReportStore for ParquetStore {
    fn table_exists(&self, table_id: &str) -> Result<bool> {
        Ok(self.table_path(table_id).is_file())
    }

    fn overwrite(&self, table_id: &str, table: &ReportTable) -> Result<()> {
        let path = self.table_path(table_id);
        let parent = path
            .parent()
            .ok_or_else(|| ProcessingError::Config(format!("Invalid table id: {}", table_id)))?;
        fs::create_dir_all(parent)?;

        // Write beside the target and rename over it so readers never see a partial table
        let temp = NamedTempFile::new_in(parent)?;
        self.write_parquet(table, temp.as_file().try_clone()?)?;
        temp.persist(&path).map_err(|e| e.error)?;

        debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }

    fn query_by_date_range(
        &self,
        table_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReportTable> {
        self.read_table(table_id)?.filter_by_date_range(start, end)
    }

    fn table_columns(&self, table_id: &str) -> Result<Vec<String>> {
        let path = self.existing_table_path(table_id)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
        Ok(reader
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect())
    }

    fn date_range(&self, table_id: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let table = self.read_table(table_id)?;
        let (Some(first), Some(last)) = (table.rows().first(), table.rows().last()) else {
            return Ok(None);
        };
        Ok(Some((first.date()?, last.date()?)))
    }
}

/// Arrow schema for a report with `slot_count` parameter slots
fn create_schema(slot_count: usize) -> Arc<Schema> {
    let mut fields = vec![
        Field::new(STATION_COLUMN, DataType::Utf8, false),
        Field::new(DATES_COLUMN, DataType::Date32, false),
    ];
    fields.extend((1..=slot_count).map(|slot| Field::new(slot_column_name(slot), DataType::Float64, true)));

    Arc::new(Schema::new(fields))
}

fn slot_count_from_schema(schema: &Schema) -> Result<usize> {
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    if names.len() < 2 || names[0] != STATION_COLUMN || names[1] != DATES_COLUMN {
        return Err(ProcessingError::InvalidFormat(format!(
            "Unexpected report layout: {:?}",
            names
        )));
    }

    let slot_count = names.len() - 2;
    for (i, name) in names[2..].iter().enumerate() {
        if *name != slot_column_name(i + 1) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Unexpected slot column '{}' at position {}",
                name,
                i + 3
            )));
        }
    }
    Ok(slot_count)
}

fn table_to_batch(table: &ReportTable, schema: Arc<Schema>) -> Result<RecordBatch> {
    let stations: Vec<&str> = table.rows().iter().map(|r| r.station()).collect();
    let dates = table
        .rows()
        .iter()
        .map(|r| r.date().map(Date32Type::from_naive_date))
        .collect::<Result<Vec<i32>>>()?;

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(stations)),
        Arc::new(Date32Array::from(dates)),
    ];
    for slot in 1..=table.slot_count() {
        let values: Vec<Option<f64>> = table.rows().iter().map(|r| r.value(slot)).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn batch_to_rows(batch: &RecordBatch, slot_count: usize) -> Result<Vec<ReportTableRow>> {
    let stations = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ProcessingError::InvalidFormat("Invalid Station column type".to_string()))?;
    let dates = batch
        .column(1)
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| ProcessingError::InvalidFormat("Invalid Dates column type".to_string()))?;
    let slots = (0..slot_count)
        .map(|i| {
            batch
                .column(i + 2)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!(
                        "Invalid {} column type",
                        slot_column_name(i + 1)
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let date = dates.value_as_date(i).ok_or_else(|| {
            ProcessingError::InvalidFormat("Invalid date in Parquet file".to_string())
        })?;
        let values = slots
            .iter()
            .map(|column| (!column.is_null(i)).then(|| column.value(i)))
            .collect();
        rows.push(ReportTableRow::new(stations.value(i), date, values));
    }

    Ok(rows)
}

/// Stable sort on the canonical date text, which orders like the dates themselves
fn sort_by_date(rows: &mut [ReportTableRow]) {
    rows.sort_by(|a, b| a.dates().cmp(b.dates()).then_with(|| a.station().cmp(b.station())));
}

#[derive(Debug)]
pub struct TableFileInfo {
    pub table_id: String,
    pub path: PathBuf,
    pub total_rows: i64,
    pub row_groups: usize,
    pub file_size: u64,
    pub compression: Compression,
}

impl TableFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Table {}:\n\
            - File: {}\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.table_id,
            self.path.display(),
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}
