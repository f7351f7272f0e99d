//! Outlier detection over a messy attendance export.
//!
//! This example shows how to:
//! - Register a CSV export carrying formatted numbers ("41,234"), NA
//!   tokens, and free-text fields
//! - Compute per-season quartiles, IQR, and Tukey fences
//! - Flag the rows that fall outside their own season's fences
//!
//! Run with:
//! ```bash
//! cargo run --example attendance_outliers
//! ```

use std::io::Write;

use datafusion::prelude::*;
use fivenum::logging::setup::{init_logging, LoggingConfig};
use fivenum::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;

    // A season of gate reports, straight from the ticketing system: the
    // 2022 washout game drew a fraction of the usual crowd, and one 2023
    // row never got a number at all.
    let csv_data = r#"season,venue,attendance
2022,riverside,"41,234"
2022,riverside,"40,512"
2022,hilltop,"39,800"
2022,riverside,"41,977"
2022,hilltop,"12,400"
2022,hilltop,"40,100"
2023,riverside,"52,389"
2023,hilltop,NA
2023,riverside,"51,044"
2023,hilltop,sold out
2023,riverside,"50,233"
2023,hilltop,"49,876""#;

    let mut file = tempfile::NamedTempFile::with_suffix(".csv")?;
    file.write_all(csv_data.as_bytes())?;

    let ctx = SessionContext::new();
    CsvSource::new(file.path().to_str().unwrap())
        .register(&ctx, "data")
        .await?;

    let summarizer = GroupSummarizer::new("attendance")
        .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
        .with_parse_failures(ParseFailurePolicy::Drop)
        .with_mean(true);

    let report = summarizer.compute_summary(&ctx).await?;

    println!("Attendance summary by season");
    println!("{}", "=".repeat(60));
    for record in report.records() {
        let s = &record.summary;
        println!(
            "season {}: n={}, q1={:.0}, q3={:.0}, fences [{:.0}, {:.0}]",
            record.group.join("/"),
            s.count,
            s.q1,
            s.q3,
            s.fence_low,
            s.fence_high
        );
    }
    println!(
        "({} unusable values dropped)",
        report.metadata.dropped_values
    );

    let flags = summarizer.flag_outliers(&ctx, &report).await?;
    let rows: Vec<&str> = csv_data.lines().skip(1).collect();

    println!("\nFlagged rows");
    println!("{}", "=".repeat(60));
    for (row, flagged) in rows.iter().zip(&flags) {
        if *flagged {
            println!("🔴 {row}");
        }
    }
    println!(
        "\n{} of {} rows flagged as outliers",
        flags.iter().filter(|&&f| f).count(),
        flags.len()
    );

    println!("\nJSON report:\n{}", report.to_json_pretty()?);

    Ok(())
}
