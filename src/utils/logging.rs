//! Log formatting helpers.

use std::fs;

use anyhow::Result;
use tracing::info;

use crate::services::ledger::RunLedger;

/// Write a dated header to the plain-text run log file.
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let header = format!(
        "{}\nLead submission log - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, header)?;
    Ok(())
}

pub fn log_startup(batch_size: usize, retry_attempts: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 Startup - sequential lead submission mode");
    info!("📦 Batch size: {}", batch_size);
    info!("🔁 Attempts per record: {}", retry_attempts);
    info!("{}", "=".repeat(60));
}

pub fn log_leads_loaded(total: usize, start_offset: usize, selected: usize) {
    info!("✓ {} lead record(s) in source", total);
    info!(
        "📋 Processing {} record(s) starting at offset {}",
        selected, start_offset
    );
}

pub fn log_lead_start(lead_index: usize, total: usize, source_row: usize, label: &str) {
    info!("\n{}", "─".repeat(30));
    info!(
        "Processing lead {}/{} (row {} in sheet): {}",
        lead_index,
        total,
        source_row,
        truncate_text(label, 60)
    );
}

pub fn print_final_stats(ledger: &RunLedger, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 PROCESSING SUMMARY");
    info!(
        "Completed: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("Total processed: {}", ledger.len());
    info!("✅ Successful: {}", ledger.success_count());
    info!("❌ Failed: {}", ledger.failure_count());
    info!("{}", "=".repeat(60));
    info!("\nLog saved to: {}", log_file_path);
}

/// Truncate long text for log display.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
