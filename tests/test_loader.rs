//! Tests for mart loading through DuckDB: source kinds and type coercion.

mod common;

use campaign_dashboard::export::to_csv;
use campaign_dashboard::source::{SourceKind, SourceManager};
use campaign_dashboard::{Connection, DashboardError, MartLoader};
use common::date;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::time::Duration;

fn connection(tmp: &tempfile::TempDir) -> Connection {
    let sources = SourceManager::new(
        Some(tmp.path().join("cache")),
        true,
        Duration::from_secs(30),
    )
    .unwrap();
    Connection::new(sources).unwrap()
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

#[test]
fn csv_columns_are_coerced_best_effort() {
    let tmp = tempfile::tempdir().unwrap();
    let path = common::write_raw_csv(
        &tmp,
        "transaction_date,campaign_id,campaign_name,active_customers,transaction_count,total_revenue,average_ticket\n\
         2023-08-02,CMP_01,Cashback Reactivation,4,5,120.50,24.10\n\
         2023-08-01 13:45:00,CMP_02,Loyalty Points,2.9,3.7,abc,\n\
         soon,CMP_03,Broken,1,1,10,10\n\
         2023-08-03,CMP_04,,1,1,1e2,100\n",
    );
    let conn = connection(&tmp);
    let table = MartLoader::new(path.to_string_lossy(), "mrt_campaign_daily")
        .load(&conn)
        .unwrap();

    // the unparseable date is dropped, the rest are ordered by date
    assert_eq!(table.len(), 3);
    let rows = table.rows();

    assert_eq!(rows[0].transaction_date, date(2023, 8, 1));
    assert_eq!(rows[0].active_customers, 2);
    assert_eq!(rows[0].transaction_count, 3);
    assert_eq!(rows[0].total_revenue, 0.0);
    assert_eq!(rows[0].average_ticket, 0.0);

    assert_eq!(rows[1].campaign_name, "Cashback Reactivation");
    assert_eq!(rows[1].total_revenue, 120.5);

    assert_eq!(rows[2].campaign_name, "");
    assert_eq!(rows[2].total_revenue, 100.0);
}

#[test]
fn blank_names_are_left_out_of_options() {
    let tmp = tempfile::tempdir().unwrap();
    let path = common::write_raw_csv(
        &tmp,
        "transaction_date,campaign_id,campaign_name,active_customers,transaction_count,total_revenue,average_ticket\n\
         2023-08-01,CMP_01,,1,1,10,10\n\
         2023-08-02,CMP_02,Loyalty Points,1,1,10,10\n",
    );
    let table = MartLoader::new(path.to_string_lossy(), "mrt_campaign_daily")
        .load(&connection(&tmp))
        .unwrap();
    assert_eq!(table.campaign_names(), vec!["Loyalty Points".to_string()]);
    assert_eq!(table.campaign_ids().len(), 2);
}

#[test]
fn header_only_csv_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = common::write_mart_csv(&tmp, &[]);
    let table = MartLoader::new(path.to_string_lossy(), "mrt_campaign_daily")
        .load(&connection(&tmp))
        .unwrap();
    assert!(table.is_empty());
    let (min, max) = table.date_bounds();
    assert_eq!(min, max);
}

// ---------------------------------------------------------------------------
// Source kinds
// ---------------------------------------------------------------------------

#[test]
fn duckdb_file_is_attached_with_qualified_table() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("warehouse.duckdb");
    {
        let db = duckdb::Connection::open(&db_path).unwrap();
        db.execute_batch(
            "CREATE SCHEMA marts;
             CREATE TABLE marts.mrt_campaign_daily (
                 transaction_date DATE,
                 campaign_id VARCHAR,
                 campaign_name VARCHAR,
                 active_customers BIGINT,
                 transaction_count BIGINT,
                 total_revenue DECIMAL(12, 2),
                 average_ticket DECIMAL(12, 2)
             );
             INSERT INTO marts.mrt_campaign_daily VALUES
                 ('2023-08-01', 'CMP_01', 'Cashback Reactivation', 3, 4, 100.00, 25.00),
                 ('2023-08-05', 'CMP_01', 'Cashback Reactivation', 5, 8, 200.00, 25.00);",
        )
        .unwrap();
    }

    let conn = connection(&tmp);
    let loader = MartLoader::new(db_path.to_string_lossy(), "marts.mrt_campaign_daily");
    let table = loader.load(&conn).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[1].transaction_count, 8);
    assert_eq!(table.rows()[1].total_revenue, 200.0);

    // loading twice re-attaches cleanly
    assert_eq!(loader.load(&conn).unwrap().len(), 2);
}

#[test]
fn catalog_qualified_name_reads_from_attached_file() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("warehouse.duckdb");
    {
        let db = duckdb::Connection::open(&db_path).unwrap();
        db.execute_batch(
            "CREATE SCHEMA campaign_analytics;
             CREATE TABLE campaign_analytics.mrt_campaign_daily AS
                 SELECT DATE '2023-08-01' AS transaction_date, 'CMP_01' AS campaign_id,
                        'Cashback Reactivation' AS campaign_name, 3 AS active_customers,
                        4 AS transaction_count, 100.0 AS total_revenue, 25.0 AS average_ticket;",
        )
        .unwrap();
    }

    let table = MartLoader::new(
        db_path.to_string_lossy(),
        "warehouse.campaign_analytics.mrt_campaign_daily",
    )
    .load(&connection(&tmp))
    .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].campaign_id, "CMP_01");
}

#[test]
fn gzip_csv_export_loads() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("mrt_campaign_daily.csv.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    to_csv(&common::sample_rows(), &mut encoder).unwrap();
    encoder.finish().unwrap();

    let table = MartLoader::new(path.to_string_lossy(), "mrt_campaign_daily")
        .load(&connection(&tmp))
        .unwrap();
    assert_eq!(table.len(), 30);
    assert_eq!(table.date_bounds(), (date(2023, 7, 22), date(2023, 8, 10)));
}

#[test]
fn parquet_export_loads() {
    let tmp = tempfile::tempdir().unwrap();
    let csv_path = common::write_mart_csv(&tmp, &common::sample_rows());
    let parquet_path = tmp.path().join("mrt_campaign_daily.parquet");
    duckdb::Connection::open_in_memory()
        .unwrap()
        .execute_batch(&format!(
            "COPY (SELECT * FROM read_csv_auto('{}', header = true)) TO '{}' (FORMAT PARQUET)",
            csv_path.display(),
            parquet_path.display()
        ))
        .unwrap();

    let table = MartLoader::new(parquet_path.to_string_lossy(), "analytics.mrt_campaign_daily")
        .load(&connection(&tmp))
        .unwrap();
    assert_eq!(table.len(), 30);
    let loyalty: Vec<_> = table
        .rows()
        .iter()
        .filter(|r| r.campaign_id == "CMP_02")
        .collect();
    assert_eq!(loyalty.len(), 10);
    assert_eq!(loyalty[0].total_revenue, 10.0);
    assert_eq!(loyalty[0].transaction_date, date(2023, 8, 1));
}

#[test]
fn missing_table_in_database_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("empty.duckdb");
    drop(duckdb::Connection::open(&db_path).unwrap());

    let err = MartLoader::new(db_path.to_string_lossy(), "mrt_campaign_daily")
        .load(&connection(&tmp))
        .unwrap_err();
    assert!(matches!(err, DashboardError::DuckDb(_)));
}

#[test]
fn missing_local_source_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope.csv");
    let err = MartLoader::new(missing.to_string_lossy(), "mrt_campaign_daily")
        .load(&connection(&tmp))
        .unwrap_err();
    assert!(matches!(err, DashboardError::NotFound(_)));
}

#[test]
fn source_kind_detection() {
    assert_eq!(SourceKind::detect("w.duckdb").unwrap(), SourceKind::Database);
    assert_eq!(SourceKind::detect("W.DB").unwrap(), SourceKind::Database);
    assert_eq!(SourceKind::detect("mart.csv.gz").unwrap(), SourceKind::Csv);
    assert_eq!(
        SourceKind::detect("https://host/exports/mart.parquet?sig=abc").unwrap(),
        SourceKind::Parquet
    );
    assert!(matches!(
        SourceKind::detect("mart.xlsx"),
        Err(DashboardError::InvalidArgument(_))
    ));
}

#[test]
fn offline_remote_source_uses_cached_download() {
    let tmp = tempfile::tempdir().unwrap();
    let cache_dir = tmp.path().join("cache");
    let mut sources = SourceManager::new(Some(cache_dir.clone()), true, Duration::from_secs(30)).unwrap();

    let url = "https://example.invalid/exports/mrt_campaign_daily.csv?token=x";
    assert!(matches!(sources.resolve(url), Err(DashboardError::NotFound(_))));

    std::fs::write(cache_dir.join("mrt_campaign_daily.csv"), "transaction_date\n").unwrap();
    let resolved = sources.resolve(url).unwrap();
    assert_eq!(resolved.path, cache_dir.join("mrt_campaign_daily.csv"));
    assert_eq!(resolved.kind, SourceKind::Csv);
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[test]
fn query_selects_every_mart_column_in_order() {
    let sql = MartLoader::query("\"mrt_campaign_daily\"");
    assert!(sql.starts_with("SELECT CAST(TRY_CAST(TRY_CAST(\"transaction_date\" AS TIMESTAMP)"));
    assert!(sql.contains("TRY_CAST(\"total_revenue\" AS DOUBLE) AS total_revenue"));
    assert!(sql.contains("FROM \"mrt_campaign_daily\""));
    assert!(sql.ends_with("ORDER BY transaction_date ASC, campaign_id ASC"));
}
