//! Percentile binning of city air-quality medians.
//!
//! This example shows how to:
//! - Register several weekly exports as one logical table via a glob
//! - Summarize PM2.5 readings per city, plus an overall summary
//! - Derive bin boundaries from the overall quartiles and label each
//!   city's median with the band it falls in
//!
//! Run with:
//! ```bash
//! cargo run --example pollution_bins
//! ```

use std::fs::File;
use std::io::Write;

use datafusion::prelude::*;
use fivenum::log_data_op;
use fivenum::logging::setup::{init_logging, LoggingConfig};
use fivenum::prelude::*;
use tempfile::TempDir;

fn write_week(dir: &TempDir, name: &str, rows: &[(&str, f64)]) -> std::io::Result<()> {
    let mut file = File::create(dir.path().join(name))?;
    writeln!(file, "city,pm25")?;
    for (city, reading) in rows {
        writeln!(file, "{city},{reading}")?;
    }
    file.flush()
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;
    let log_config = LogConfig::balanced();

    // Three weekly sensor exports for three cities.
    let dir = TempDir::new()?;
    write_week(
        &dir,
        "week_01.csv",
        &[
            ("bogota", 7.8),
            ("bogota", 8.2),
            ("quito", 14.2),
            ("quito", 15.1),
            ("lima", 27.0),
            ("lima", 28.5),
        ],
    )?;
    write_week(
        &dir,
        "week_02.csv",
        &[
            ("bogota", 8.0),
            ("bogota", 7.9),
            ("quito", 15.8),
            ("quito", 14.9),
            ("lima", 29.1),
            ("lima", 27.8),
        ],
    )?;
    write_week(
        &dir,
        "week_03.csv",
        &[
            ("bogota", 8.4),
            ("bogota", 8.1),
            ("quito", 15.3),
            ("quito", 16.0),
            ("lima", 30.2),
            ("lima", 28.0),
        ],
    )?;

    let ctx = SessionContext::new();
    let pattern = dir.path().join("week_*.csv");
    let source = CsvSource::from_glob(pattern.to_str().unwrap()).await?;
    log_data_op!(
        log_config,
        "Registered {} weekly exports as one table",
        source.paths().len()
    );
    source.register(&ctx, "readings").await?;

    let report = GroupSummarizer::new("pm25")
        .with_table("readings")
        .with_grouping(GroupingConfig::new(vec!["city".to_string()]))
        .with_overall(true)
        .compute_summary(&ctx)
        .await?;

    println!("PM2.5 summary by city");
    println!("{}", "=".repeat(60));
    for record in report.records() {
        let s = &record.summary;
        println!(
            "{}: n={}, median={:.2}, quartiles [{:.2}, {:.2}]",
            record.group.join("/"),
            s.count,
            s.median.unwrap_or(f64::NAN),
            s.q1,
            s.q3
        );
    }

    let overall = report
        .overall
        .as_ref()
        .ok_or("overall summary not computed")?;
    let overall_median = overall.median.ok_or("overall median not computed")?;
    println!(
        "\nOverall: n={}, quartiles [{:.2}, {:.2}], fences [{:.2}, {:.2}]",
        overall.count, overall.q1, overall.q3, overall.fence_low, overall.fence_high
    );

    // Band boundaries come from the overall distribution, so a city's
    // label says where it sits relative to every reading collected.
    let bins = PercentileBins::builder()
        .bin(overall.fence_low, overall.q1, "bottom band")
        .bin(overall.q1, overall_median, "lower middle")
        .bin(overall_median, overall.q3, "upper middle")
        .bin(overall.q3, overall.fence_high, "top band")
        .undefined_label("out of range")
        .build()?;

    println!("\nCity medians vs. the overall distribution");
    println!("{}", "=".repeat(60));
    for record in report.records() {
        if let Some(median) = record.summary.median {
            println!(
                "{}: median {:.2} -> {}",
                record.group.join("/"),
                median,
                bins.assign(median)
            );
        }
    }

    Ok(())
}
