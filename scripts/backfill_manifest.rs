//! Run manifest backfill.
//!
//! Lists the run folders of the enriched archive and writes a skip record to
//! the manifest table for every run stamped before `--startdate`, so the
//! pipeline does not process them again. Runs at or after the cutoff are
//! counted and left alone.

use std::sync::Arc;

use anyhow::{Context, Result};
use archive_listing::{ArchiveLocation, S3RunLister};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use clap::Parser;
use manifest_backfill::{Backfill, BackfillConfig};
use manifest_store::DynamoManifestStore;
use run_classifier::{CutoffDate, CUTOFF_FORMAT};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const CREDENTIALS_PROVIDER: &str = "backfill-manifest-cli";

#[derive(Debug, Parser)]
#[command(author, version, about = "Backfill the run manifest with archived runs")]
struct Args {
    /// AWS access key id for DynamoDB and S3
    #[arg(long, alias = "aws-access-key-id")]
    access_key_id: String,

    /// AWS secret access key for DynamoDB and S3
    #[arg(long, alias = "aws-secret-access-key")]
    secret_access_key: String,

    /// AWS region of the manifest table and the archive bucket
    #[arg(long)]
    region: String,

    /// DynamoDB run manifest table name
    #[arg(long)]
    manifest_table_name: String,

    /// Runs stamped before this date are marked as skipped (YYYY-MM-DD-HH-MM-SS)
    #[arg(long)]
    startdate: String,

    /// Enriched archive location, e.g. s3://bucket/enriched/archive
    #[arg(long, value_name = "S3_URL")]
    enriched_archive: ArchiveLocation,
}

/// Static credentials shared by the S3 and DynamoDB clients.
struct AwsSettings {
    access_key_id: String,
    secret_access_key: String,
    region: String,
}

impl AwsSettings {
    fn from_args(args: &Args) -> Self {
        Self {
            access_key_id: args.access_key_id.clone(),
            secret_access_key: args.secret_access_key.clone(),
            region: args.region.clone(),
        }
    }

    async fn load(self) -> SdkConfig {
        let credentials = Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            None,
            None,
            CREDENTIALS_PROVIDER,
        );
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region))
            .credentials_provider(credentials)
            .load()
            .await
    }
}

async fn run(args: Args, cutoff: CutoffDate) -> Result<()> {
    let sdk_config = AwsSettings::from_args(&args).load().await;
    let lister = S3RunLister::new(aws_sdk_s3::Client::new(&sdk_config));
    let store = DynamoManifestStore::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        args.manifest_table_name,
    );
    debug!(table = store.table_name(), region = %args.region, "clients ready");

    let backfill = Backfill::new(Arc::new(lister), Arc::new(store), BackfillConfig::new(cutoff));
    let report = backfill
        .run(&args.enriched_archive)
        .await
        .with_context(|| format!("backfilling manifest from {}", args.enriched_archive))?;

    info!(runs = report.total(), "run ids examined");
    println!("{} run ids added to manifest as skipped", report.added);
    println!("{} run ids will be processed", report.skipped);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    let cutoff = match CutoffDate::parse(&args.startdate) {
        Ok(cutoff) => cutoff,
        Err(err) => {
            debug!(%err, "rejected cutoff");
            println!("--startdate must conform to {CUTOFF_FORMAT} format");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args, cutoff).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
