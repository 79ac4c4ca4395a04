//! `journeylens inspect`: dataset structure at a glance.

use journeylens_core::{AnalysisConfig, RawPhaseKey};
use journeylens_ingest::{Cleaner, DataLoader};

pub fn run(config: &AnalysisConfig) -> anyhow::Result<()> {
    let dataset = DataLoader::new(&config.data_paths.data_dir).load()?;
    let (records, report) = Cleaner::new(config.normalize_text)
        .with_dedupe(config.dedupe_patients)
        .clean(&dataset);

    println!("=== Dataset ===");
    println!();
    println!("File:               {}", dataset.source.display());
    println!("Rows:               {}", report.rows);
    println!("Records:            {}", report.patients);
    println!("Parse failures:     {}", report.parse_failures);
    println!("Repeated ids:       {}", report.duplicate_ids);
    println!("Duplicates dropped: {}", report.duplicates_dropped);
    println!("Columns:            {}", dataset.columns.join(", "));

    println!();
    println!("Patients with text per phase:");
    for key in RawPhaseKey::ALL {
        let count = report.phase_counts.get(&key).copied().unwrap_or(0);
        println!("  {:<22} {}", key.as_str(), count);
    }

    match records.first() {
        Some(first) => {
            println!();
            println!("First patient ({}):", first.patient_id);
            println!("{}", serde_json::to_string_pretty(&first.summary)?);
        }
        None => {
            println!();
            println!("No patients in dataset.");
        }
    }

    Ok(())
}
