//! Run command implementation
//!
//! This module implements the `run` command, which executes one full
//! extract → transform → load pass.

use crate::cli::load_cli_config;
use crate::core::pipeline::{Pipeline, PipelineReport};
use crate::domain::RunId;
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run identifier used to namespace intermediate files (random if omitted)
    #[arg(long)]
    pub run_id: Option<String>,

    /// Dry run mode - extract and transform without posting to the destination
    #[arg(long)]
    pub dry_run: bool,

    /// Do not check the API before starting
    #[arg(long)]
    pub skip_health_check: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_cli_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let run_id = match &self.run_id {
            Some(id) => match RunId::new(id.as_str()) {
                Ok(run_id) => run_id,
                Err(e) => {
                    eprintln!("Invalid run id: {e}");
                    return Ok(2);
                }
            },
            None => RunId::generate(),
        };

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - Nothing will be sent to the destination");
            println!();
        }

        let pipeline = match Pipeline::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pipeline");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        if !self.skip_health_check {
            let (source, destination) = pipeline.health_check().await;
            if !source || !destination {
                tracing::error!(
                    source = source,
                    destination = destination,
                    "Animals API health check failed"
                );
                eprintln!("❌ Animals API at {} is not healthy", config.api.base_url);
                return Ok(4); // Connection error exit code
            }
        }

        println!("🚀 Starting run {run_id}...");
        println!();

        let report = match pipeline.run(&run_id).await {
            Ok(report) => report,
            Err(e) => {
                eprintln!("❌ Run failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        print_report(&report);

        if report.has_failures() {
            Ok(1) // Partial failure exit code
        } else {
            Ok(0)
        }
    }
}

fn print_report(report: &PipelineReport) {
    println!("📊 Run Summary ({})", report.run_id);
    println!("  Listed animals:      {}", report.listed_animals);
    println!("  Detail failures:     {}", report.failed_detail_ids.len());
    println!("  Transform failures:  {}", report.transform_failures.total());
    for (category, keys) in report.transform_failures.iter() {
        println!("    {category}: {}", keys.len());
    }
    println!("  Skipped conversions: {}", report.skipped_conversions);
    println!(
        "  Prepared:            {} animals in {} batches",
        report.prepared_animals, report.prepared_batches
    );

    match &report.load {
        Some(load) => {
            println!(
                "  Loaded:              {} animals, {}/{} batches ({:.1}%)",
                load.total_animals,
                load.successful_batches,
                load.total_batches,
                load.success_rate()
            );
            if !load.failed_batch_indices.is_empty() {
                println!("  Failed batches:      {:?}", load.failed_batch_indices);
            }
        }
        None => println!("  Loaded:              skipped (dry run)"),
    }

    println!("  Duration:            {:.2}s", report.duration.as_secs_f64());
    println!();

    if report.has_failures() {
        println!("⚠️  Run completed with failures");
    } else {
        println!("✅ Run completed successfully");
    }
}
