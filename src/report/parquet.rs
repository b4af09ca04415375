use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Date32Builder, Int64Builder, StringBuilder},
    datatypes::{DataType, Date32Type, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{fs::File, path::Path, sync::Arc};
use tracing::info;

use crate::process::aggregate::{CountrySummary, GlobalDailySummary};
use crate::process::merge::JoinedRecord;

/// Write the joined per-region/per-date table.
pub fn write_joined(path: &Path, records: &[JoinedRecord]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("province_state", DataType::Utf8, true),
        Field::new("country_region", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("cases", DataType::Int64, true),
        Field::new("deaths", DataType::Int64, true),
        Field::new("population", DataType::Int64, true),
        Field::new("daily_cases", DataType::Int64, true),
        Field::new("daily_deaths", DataType::Int64, true),
    ]));

    let mut province = StringBuilder::new();
    let mut country = StringBuilder::new();
    let mut date = Date32Builder::new();
    let mut cases = Int64Builder::new();
    let mut deaths = Int64Builder::new();
    let mut population = Int64Builder::new();
    let mut daily_cases = Int64Builder::new();
    let mut daily_deaths = Int64Builder::new();

    for record in records {
        province.append_option(record.province_state.as_deref());
        country.append_value(&record.country_region);
        date.append_value(Date32Type::from_naive_date(record.date));
        cases.append_option(record.cases);
        deaths.append_option(record.deaths);
        population.append_option(record.population);
        daily_cases.append_option(record.daily_cases);
        daily_deaths.append_option(record.daily_deaths);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(province.finish()),
        Arc::new(country.finish()),
        Arc::new(date.finish()),
        Arc::new(cases.finish()),
        Arc::new(deaths.finish()),
        Arc::new(population.finish()),
        Arc::new(daily_cases.finish()),
        Arc::new(daily_deaths.finish()),
    ];
    write_batch(path, RecordBatch::try_new(schema, columns)?)
}

/// Write the global per-date totals.
pub fn write_global_daily(path: &Path, summaries: &[GlobalDailySummary]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("daily_cases_total", DataType::Int64, false),
        Field::new("daily_deaths_total", DataType::Int64, false),
        Field::new("cumulative_deaths_total", DataType::Int64, false),
    ]));

    let mut date = Date32Builder::new();
    let mut daily_cases = Int64Builder::new();
    let mut daily_deaths = Int64Builder::new();
    let mut cumulative_deaths = Int64Builder::new();

    for summary in summaries {
        date.append_value(Date32Type::from_naive_date(summary.date));
        daily_cases.append_value(summary.daily_cases_total);
        daily_deaths.append_value(summary.daily_deaths_total);
        cumulative_deaths.append_value(summary.cumulative_deaths_total);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(date.finish()),
        Arc::new(daily_cases.finish()),
        Arc::new(daily_deaths.finish()),
        Arc::new(cumulative_deaths.finish()),
    ];
    write_batch(path, RecordBatch::try_new(schema, columns)?)
}

/// Write the top-20 country leaderboard.
pub fn write_leaderboard(path: &Path, leaderboard: &[CountrySummary]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("country_region", DataType::Utf8, false),
        Field::new("total_cases", DataType::Int64, false),
        Field::new("total_deaths", DataType::Int64, false),
        Field::new("population", DataType::Int64, true),
    ]));

    let mut country = StringBuilder::new();
    let mut total_cases = Int64Builder::new();
    let mut total_deaths = Int64Builder::new();
    let mut population = Int64Builder::new();

    for summary in leaderboard {
        country.append_value(&summary.country_region);
        total_cases.append_value(summary.total_cases);
        total_deaths.append_value(summary.total_deaths);
        population.append_option(summary.population);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(country.finish()),
        Arc::new(total_cases.finish()),
        Arc::new(total_deaths.finish()),
        Arc::new(population.finish()),
    ];
    write_batch(path, RecordBatch::try_new(schema, columns)?)
}

fn write_batch(path: &Path, batch: RecordBatch) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .with_context(|| format!("opening parquet writer for {}", path.display()))?;
    writer.write(&batch)?;
    writer.close()?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array, StringArray};
    use chrono::NaiveDate;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn joined(country: &str, day: u32, cases: Option<i64>) -> JoinedRecord {
        JoinedRecord {
            province_state: None,
            country_region: country.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            cases,
            deaths: None,
            population: None,
            daily_cases: None,
            daily_deaths: None,
        }
    }

    #[test]
    fn joined_roundtrips_with_nulls_intact() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("joined.parquet");
        let records = vec![joined("Alpha", 1, Some(10)), joined("Beta", 2, None)];
        write_joined(&path, &records)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>()?;
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 8);

        let country = batch
            .column_by_name("country_region")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .expect("country column");
        assert_eq!(country.value(0), "Alpha");
        assert_eq!(country.value(1), "Beta");

        let cases = batch
            .column_by_name("cases")
            .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
            .expect("cases column");
        assert_eq!(cases.value(0), 10);
        assert!(cases.is_null(1));
        Ok(())
    }

    #[test]
    fn leaderboard_writes_expected_rows() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("leaderboard.parquet");
        let board = vec![CountrySummary {
            country_region: "Alpha".to_string(),
            total_cases: 130,
            total_deaths: 3,
            population: None,
        }];
        write_leaderboard(&path, &board)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>()?;
        assert_eq!(batches[0].num_rows(), 1);
        Ok(())
    }

    #[test]
    fn empty_tables_still_write_a_valid_file() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("global_daily.parquet");
        write_global_daily(&path, &[])?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let total: usize = reader
            .collect::<std::result::Result<Vec<RecordBatch>, _>>()?
            .iter()
            .map(|b| b.num_rows())
            .sum();
        assert_eq!(total, 0);
        Ok(())
    }
}
