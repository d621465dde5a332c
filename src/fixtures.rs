//! Synthetic CRM, transaction and campaign fixtures.
//!
//! Output is reproducible for a given seed and is dirty on purpose: external
//! ids repeat across customers, categorical fields can be null, `last_update`
//! can precede `signup_date`, amounts can be negative, and some activation
//! rows are duplicated. Downstream cleaning is expected to deal with all of it.
//!
//! Optionally a `mrt_campaign_daily` file is derived from the same data so
//! the dashboard can run end to end without a warehouse.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config;
use crate::error::{DashboardError, Result};
use crate::kpi::weighted_ticket;
use crate::models::DailyMetricRow;

const STATES: [Option<&str>; 6] = [Some("SP"), Some("RJ"), Some("MG"), Some("CE"), Some("BA"), None];
const SEGMENTS: [Option<&str>; 4] = [Some("low"), Some("mid"), Some("high"), None];
const EXTERNAL_ID_POOL: u32 = 900;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub customer_id: String,
    pub external_id: String,
    pub email: String,
    pub state: Option<String>,
    pub segment: Option<String>,
    pub signup_date: NaiveDate,
    pub last_update: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub customer_id: String,
    pub amount: f64,
    pub transaction_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub campaign_id: String,
    pub campaign_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activation {
    pub customer_id: String,
    pub campaign_id: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub activation_date: NaiveDateTime,
}

fn serialize_timestamp<S: serde::Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Everything one generator run produces, before it is written out.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSet {
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
    pub campaigns: Vec<Campaign>,
    pub activations: Vec<Activation>,
}

// ---------------------------------------------------------------------------
// FixtureConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub out_dir: PathBuf,
    pub seed: u64,
    pub customers: usize,
    pub transactions: usize,
    /// Distinct customers sampled for activation.
    pub activations: usize,
    /// Activation rows appended a second time.
    pub duplicate_activations: usize,
    /// Write `.csv.gz` instead of `.csv`.
    pub gzip: bool,
    /// Also derive `mrt_campaign_daily.csv` from the generated data.
    pub daily_mart: bool,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data/raw"),
            seed: 42,
            customers: 1200,
            transactions: 8000,
            activations: 600,
            duplicate_activations: 50,
            gzip: false,
            daily_mart: false,
        }
    }
}

impl FixtureConfig {
    fn validate(&self) -> Result<()> {
        if self.customers == 0 {
            return Err(DashboardError::InvalidArgument(
                "at least one customer is required".to_string(),
            ));
        }
        if self.activations > self.customers {
            return Err(DashboardError::InvalidArgument(format!(
                "cannot activate {} distinct customers out of {}",
                self.activations, self.customers
            )));
        }
        if self.duplicate_activations > self.activations {
            return Err(DashboardError::InvalidArgument(format!(
                "cannot duplicate {} of {} activation rows",
                self.duplicate_activations, self.activations
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// The two fixed campaigns every run uses.
pub fn campaigns() -> Vec<Campaign> {
    vec![
        Campaign {
            campaign_id: "CMP_01".to_string(),
            campaign_name: "Cashback Reactivation".to_string(),
            start_date: date(2023, 8, 1),
            end_date: date(2023, 8, 31),
        },
        Campaign {
            campaign_id: "CMP_02".to_string(),
            campaign_name: "Loyalty Points".to_string(),
            start_date: date(2023, 9, 1),
            end_date: date(2023, 9, 30),
        },
    ]
}

/// Generate the fixture records in memory.
pub fn generate(config: &FixtureConfig) -> Result<FixtureSet> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let signup_base = date(2023, 1, 1);
    let customers: Vec<Customer> = (0..config.customers)
        .map(|i| {
            let external_id = format!("EXT_{:05}", rng.gen_range(1..=EXTERNAL_ID_POOL));
            let email = format!("user{}@email.com", external_id.to_lowercase());
            let state = STATES.choose(&mut rng).copied().flatten().map(str::to_string);
            let segment = SEGMENTS.choose(&mut rng).copied().flatten().map(str::to_string);
            let signup_date = signup_base + Duration::days(rng.gen_range(0..=400));
            let last_update = signup_date + Duration::days(rng.gen_range(-30..=200));
            Customer {
                customer_id: format!("CUST_{:05}", i),
                external_id,
                email,
                state,
                segment,
                signup_date,
                last_update,
            }
        })
        .collect();

    let tx_base = date(2023, 6, 1);
    let transactions: Vec<Transaction> = (0..config.transactions)
        .map(|i| {
            let customer = &customers[rng.gen_range(0..customers.len())];
            let amount = (rng.gen_range(-20.0..=500.0_f64) * 100.0).round() / 100.0;
            Transaction {
                transaction_id: format!("TX_{:07}", i),
                customer_id: customer.customer_id.clone(),
                amount,
                transaction_date: tx_base + Duration::days(rng.gen_range(0..=200)),
            }
        })
        .collect();

    let campaigns = campaigns();
    let activation_base = date(2023, 8, 1).and_time(NaiveTime::MIN);
    let mut activations: Vec<Activation> = customers
        .choose_multiple(&mut rng, config.activations)
        .map(|customer| Activation {
            customer_id: customer.customer_id.clone(),
            campaign_id: campaigns[rng.gen_range(0..campaigns.len())].campaign_id.clone(),
            activation_date: activation_base + Duration::days(rng.gen_range(0..=30)),
        })
        .collect();

    let duplicates: Vec<Activation> = activations
        .choose_multiple(&mut rng, config.duplicate_activations)
        .cloned()
        .collect();
    activations.extend(duplicates);

    Ok(FixtureSet {
        customers,
        transactions,
        campaigns,
        activations,
    })
}

/// Derive daily mart rows from generated fixtures.
///
/// Each transaction is joined to every activation row of its customer and
/// counts toward that campaign when its date falls inside the campaign
/// window. Duplicate activations and negative amounts pass straight through.
pub fn derive_daily_mart(set: &FixtureSet) -> Vec<DailyMetricRow> {
    let mut activations_by_customer: HashMap<&str, Vec<&Activation>> = HashMap::new();
    for activation in &set.activations {
        activations_by_customer
            .entry(activation.customer_id.as_str())
            .or_default()
            .push(activation);
    }
    let campaigns_by_id: HashMap<&str, &Campaign> = set
        .campaigns
        .iter()
        .map(|c| (c.campaign_id.as_str(), c))
        .collect();

    #[derive(Default)]
    struct Bucket<'a> {
        customers: BTreeSet<&'a str>,
        count: i64,
        revenue: f64,
    }

    let mut buckets: BTreeMap<(NaiveDate, &str), Bucket> = BTreeMap::new();
    for tx in &set.transactions {
        let Some(activations) = activations_by_customer.get(tx.customer_id.as_str()) else {
            continue;
        };
        for activation in activations {
            let Some(campaign) = campaigns_by_id.get(activation.campaign_id.as_str()) else {
                continue;
            };
            if tx.transaction_date < campaign.start_date || tx.transaction_date > campaign.end_date {
                continue;
            }
            let bucket = buckets
                .entry((tx.transaction_date, campaign.campaign_id.as_str()))
                .or_default();
            bucket.customers.insert(tx.customer_id.as_str());
            bucket.count += 1;
            bucket.revenue += tx.amount;
        }
    }

    buckets
        .into_iter()
        .map(|((day, campaign_id), bucket)| {
            let revenue = (bucket.revenue * 100.0).round() / 100.0;
            DailyMetricRow {
                transaction_date: day,
                campaign_id: campaign_id.to_string(),
                campaign_name: campaigns_by_id
                    .get(campaign_id)
                    .map(|c| c.campaign_name.clone())
                    .unwrap_or_default(),
                active_customers: bucket.customers.len() as i64,
                transaction_count: bucket.count,
                total_revenue: revenue,
                average_ticket: weighted_ticket(revenue, bucket.count)
                    .map(|t| (t * 100.0).round() / 100.0)
                    .unwrap_or(0.0),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Generate fixtures and write them under `config.out_dir`.
///
/// Returns the paths written, in a fixed order.
pub fn write_fixtures(config: &FixtureConfig) -> Result<Vec<PathBuf>> {
    let set = generate(config)?;
    fs::create_dir_all(&config.out_dir)?;

    let mut written = vec![
        write_table(&config.out_dir, "customers_crm_raw", config.gzip, &set.customers)?,
        write_table(&config.out_dir, "transactions_raw", config.gzip, &set.transactions)?,
        write_table(&config.out_dir, "campaigns_raw", config.gzip, &set.campaigns)?,
        write_table(
            &config.out_dir,
            "campaign_activations_raw",
            config.gzip,
            &set.activations,
        )?,
    ];

    if config.daily_mart {
        let mart = derive_daily_mart(&set);
        written.push(write_table(&config.out_dir, config::DEFAULT_TABLE, config.gzip, &mart)?);
    }

    tracing::info!(
        seed = config.seed,
        customers = set.customers.len(),
        transactions = set.transactions.len(),
        activations = set.activations.len(),
        dir = %config.out_dir.display(),
        "synthetic fixtures written"
    );
    Ok(written)
}

fn write_table<S: Serialize>(dir: &Path, stem: &str, gzip: bool, records: &[S]) -> Result<PathBuf> {
    let extension = if gzip { "csv.gz" } else { "csv" };
    let path = dir.join(format!("{}.{}", stem, extension));
    let file = BufWriter::new(File::create(&path)?);

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_records(&mut encoder, records)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        write_records(&mut file, records)?;
        file.flush()?;
    }

    tracing::debug!(path = %path.display(), rows = records.len(), "wrote fixture table");
    Ok(path)
}

fn write_records<W: Write, S: Serialize>(out: &mut W, records: &[S]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
