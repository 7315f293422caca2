use std::fs;
use std::path::Path;

use anyhow::Result;
use filing_metrics::common::error::{FilterError, LoadError, ProcessingError, RangeError};
use filing_metrics::config::PipelineConfig;
use filing_metrics::pipeline::processing::filter::FilterQuery;
use filing_metrics::{build_quarter_axis, filter_dataset, process_dataset};
use tempfile::{tempdir, TempDir};

const COMPANIES: &str = "\
symbol,companyName,cik
AAPL,Apple Inc.,0000320193
MSFT,Microsoft Corp,789019
BAD,,123
GOOG,Alphabet Inc.,1652044
";

const FILINGS: &str = "\
id,formName,cik,valueDate,filingDate,formURL
1,10-K,320193,2023-12-30,2024-02-02,https://www.sec.gov/Archives/1.htm
2,10-Q,320193,2020-03-28,2020-05-01,https://www.sec.gov/Archives/2.htm
3,10-Q,789019,2020-12-31,2021-01-26,https://www.sec.gov/Archives/3.htm
4,10-Q,789019,2020-09-30,2020-10-27,https://www.sec.gov/Archives/4.htm
5,10-Q,1652044,2021-06-30,2021-07-27,http://www.sec.gov/Archives/5.htm
6,10-Q,999999,2021-06-30,2021-07-27,https://www.sec.gov/Archives/6.htm
7,10-Q,789019,2021-02-30,2021-04-27,https://www.sec.gov/Archives/7.htm
0,10-K,789019,2019-06-30,2019-07-30,https://sec.gov/0.htm
";

const METRICS: &str = "\
formId,ccp,ltd,revenue,extraColumn
1,73100.0,106042.0,383285,x
2,40174,93735,,x
3,136527,47032,,x
3,1,1,,duplicate
4,0,0,,x
5,10,10,,filing rejected for http url
6,10,10,,company unknown
7,10,10,,filing rejected for bad date
42,10,10,,no such filing
0,5,5,,zero id
1,2e12,1,,duplicate of 1
";

struct Fixture {
    _dir: TempDir,
    config: PipelineConfig,
}

fn write(dir: &Path, name: &str, body: &str) -> Result<String> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    Ok(path.to_string_lossy().into_owned())
}

fn fixture(companies: &str, filings: &str, metrics: &str) -> Result<Fixture> {
    let dir = tempdir()?;
    let mut config = PipelineConfig::default();
    config.sources.companies = write(dir.path(), "companies.csv", companies)?;
    config.sources.filings = write(dir.path(), "filings.csv", filings)?;
    config.sources.metrics = write(dir.path(), "metrics.csv", metrics)?;
    Ok(Fixture { _dir: dir, config })
}

#[tokio::test]
async fn test_full_pipeline_from_files() -> Result<()> {
    let fixture = fixture(COMPANIES, FILINGS, METRICS)?;
    let dataset = process_dataset(fixture.config.clone()).await?;

    let ids: Vec<&str> = dataset.combined_data.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "2", "4", "3", "1"]);
    assert!(dataset
        .combined_data
        .windows(2)
        .all(|w| w[0].date <= w[1].date));

    assert_eq!(dataset.companies, vec!["Apple Inc.", "Microsoft Corp"]);
    assert_eq!(dataset.years, vec![2019, 2020, 2023]);
    assert_eq!(dataset.date_range.min, 2019);
    assert_eq!(dataset.date_range.max, 2023);

    let grouped_total: usize = dataset.grouped_data.values().map(Vec::len).sum();
    assert_eq!(grouped_total, dataset.combined_data.len());

    let stats = &dataset.stats;
    assert_eq!(stats.raw_companies, 4);
    assert_eq!(stats.valid_companies, 3);
    assert_eq!(stats.raw_filings, 8);
    assert_eq!(stats.valid_filings, 6);
    assert_eq!(stats.raw_metrics, 11);
    assert_eq!(stats.valid_metrics, 11);
    assert_eq!(stats.duplicate_metrics, 2);
    assert_eq!(stats.missing_filing, 3);
    assert_eq!(stats.missing_company, 1);
    assert_eq!(stats.combined_records, 5);
    assert!(stats.combined_records <= stats.raw_metrics);

    // First-seen duplicate wins
    let msft_q4 = dataset
        .combined_data
        .iter()
        .find(|r| r.id == "3")
        .expect("record 3 present");
    assert_eq!(msft_q4.ccp, 136527.0);
    assert_eq!(msft_q4.quarter_label, "Q4 2020");

    // Zero-valued metrics and a zero filing id survive
    assert!(dataset.combined_data.iter().any(|r| r.id == "4" && r.ccp == 0.0));
    assert!(dataset.combined_data.iter().any(|r| r.id == "0"));

    let apple = &dataset.combined_data.iter().find(|r| r.id == "1").unwrap();
    assert_eq!(apple.cik, "320193");
    assert_eq!((apple.year, apple.quarter), (2023, 4));
    Ok(())
}

#[tokio::test]
async fn test_filter_over_processed_dataset() -> Result<()> {
    let fixture = fixture(COMPANIES, FILINGS, METRICS)?;
    let config = fixture.config.clone();
    let dataset = process_dataset(config.clone()).await?;

    let all = filter_dataset(&dataset.grouped_data, &FilterQuery::new(vec![], 2019, 2023), &config)?;
    assert_eq!(all.len(), dataset.combined_data.len());

    let q4_2020 = filter_dataset(
        &dataset.grouped_data,
        &FilterQuery::new(vec![], 2020, 2020).with_quarters(4, 4),
        &config,
    )?;
    let ids: Vec<&str> = q4_2020.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3"]);

    let apple_only = filter_dataset(
        &dataset.grouped_data,
        &FilterQuery::new(vec!["Apple Inc.".to_string()], 2019, 2030),
        &config,
    )?;
    assert!(apple_only.iter().all(|r| r.symbol == "AAPL"));
    assert_eq!(apple_only.len(), 2);

    let err = filter_dataset(&dataset.grouped_data, &FilterQuery::new(vec![], 2023, 2019), &config)
        .unwrap_err();
    assert!(matches!(err, FilterError::StartAfterEnd { .. }));
    Ok(())
}

#[tokio::test]
async fn test_axis_for_dataset_range() -> Result<()> {
    let fixture = fixture(COMPANIES, FILINGS, METRICS)?;
    let config = fixture.config.clone();
    let dataset = process_dataset(config.clone()).await?;

    let axis = dataset.quarter_axis(&config.validation, &config.axis)?;
    assert_eq!(axis.len(), 5 * 4);
    assert_eq!(axis[0].label, "Q1 2019");
    assert_eq!(axis[19].label, "Q4 2023");

    let query = FilterQuery::from_axis(&axis, 7, 7, vec![])?;
    let records = filter_dataset(&dataset.grouped_data, &query, &config)?;
    assert!(records.iter().all(|r| r.quarter_label == "Q4 2020"));
    assert_eq!(records.len(), 1);

    let three_years = build_quarter_axis(2019, 2021, &config)?;
    assert_eq!(three_years.len(), 12);
    assert_eq!(
        build_quarter_axis(1900, 2000, &config),
        Err(RangeError::SpanTooLarge { span: 100, limit: 50 })
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_source_file_is_load_error() -> Result<()> {
    let mut fixture = fixture(COMPANIES, FILINGS, METRICS)?;
    fixture.config.sources.filings = "/definitely/not/here/filings.csv".to_string();

    let result = process_dataset(fixture.config.clone()).await;
    assert!(matches!(
        result,
        Err(ProcessingError::Load(LoadError::Io { .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn test_oversized_file_rejected() -> Result<()> {
    let mut fixture = fixture(COMPANIES, FILINGS, METRICS)?;
    fixture.config.limits.max_bytes = 64;

    let result = process_dataset(fixture.config.clone()).await;
    assert!(matches!(
        result,
        Err(ProcessingError::Load(LoadError::TooLarge { limit: 64, .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn test_row_cap_truncates_without_error() -> Result<()> {
    let mut fixture = fixture(COMPANIES, FILINGS, METRICS)?;
    fixture.config.limits.max_metric_rows = 1;

    let dataset = process_dataset(fixture.config.clone()).await?;
    assert_eq!(dataset.stats.raw_metrics, 1);
    assert_eq!(dataset.combined_data.len(), 1);
    assert_eq!(dataset.combined_data[0].id, "1");
    Ok(())
}

#[tokio::test]
async fn test_undecodable_metric_row_dropped_run_succeeds() -> Result<()> {
    let fixture = fixture(COMPANIES, FILINGS, "formId,ccp,ltd\n1,73100.0,106042.0\n")?;
    fs::write(
        &fixture.config.sources.metrics,
        b"formId,ccp,ltd\n1,73100.0,106042.0\n2,\xff\xfe,1\n3,1,2\n",
    )?;

    let dataset = process_dataset(fixture.config.clone()).await?;
    let ids: Vec<&str> = dataset.combined_data.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1"]);
    assert_eq!(dataset.stats.raw_metrics, 3);
    assert_eq!(dataset.stats.valid_metrics, 2);
    Ok(())
}

#[tokio::test]
async fn test_nothing_linkable_fails_run() -> Result<()> {
    let fixture = fixture(COMPANIES, FILINGS, "formId,ccp,ltd\n42,1,1\n")?;
    let result = process_dataset(fixture.config.clone()).await;
    assert!(matches!(result, Err(ProcessingError::NoCompanies { .. })));
    Ok(())
}

#[tokio::test]
async fn test_dataset_serializes_with_consumer_field_names() -> Result<()> {
    let fixture = fixture(COMPANIES, FILINGS, METRICS)?;
    let dataset = process_dataset(fixture.config.clone()).await?;

    let json = serde_json::to_value(&dataset)?;
    assert!(json.get("combinedData").is_some());
    assert!(json.get("groupedData").is_some());
    assert_eq!(json["dateRange"]["min"], 2019);
    let first = &json["combinedData"][0];
    assert_eq!(first["quarterLabel"], "Q2 2019");
    assert_eq!(first["dateString"], "2019-06-30");
    assert!(first.get("formURL").is_some());
    Ok(())
}
