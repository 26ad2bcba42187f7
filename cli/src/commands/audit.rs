use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use fleetcheck_common::config::Config;
use fleetcheck_common::device::{BatchOutcome, DeviceAddress};
use fleetcheck_common::{info, success, warn};
use fleetcheck_core::archive::FileArchive;
use fleetcheck_core::audit::DeviceAuditor;
use fleetcheck_core::batch::BatchRunner;

use crate::terminal::{print, prompt};

/// Exit status when at least one device could not be audited.
const EXIT_PARTIAL_FAILURE: u8 = 2;

pub async fn audit(
    addresses: Vec<DeviceAddress>,
    cfg: &Config,
    username: Option<String>,
) -> anyhow::Result<ExitCode> {
    let credentials = prompt::credentials(username).context("failed to read credentials")?;

    info!(
        "Auditing {} devices over {}, backups go to {}",
        addresses.len(),
        cfg.transport.protocol,
        cfg.output_dir.display()
    );

    let archive = FileArchive::new(&cfg.output_dir);
    let auditor = DeviceAuditor::from_config(cfg, Box::new(archive));
    let runner = BatchRunner::new(fleetcheck_protocols::session_provider(cfg), auditor);

    let start_time: Instant = Instant::now();
    let batch = runner
        .run(&addresses, &credentials, |_, outcome| print::report(outcome))
        .await;

    print_summary(&batch, start_time.elapsed());

    Ok(if batch.has_failures() {
        ExitCode::from(EXIT_PARTIAL_FAILURE)
    } else {
        ExitCode::SUCCESS
    })
}

fn print_summary(batch: &BatchOutcome, total_time: Duration) {
    let audited = batch.len() - batch.failure_count();
    let audited_str: ColoredString = format!("{audited} of {}", batch.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Audit complete: {audited_str} devices audited in {total_time}");

    print::fat_separator();
    print::centerln(&output);

    if batch.has_failures() {
        warn!("{} devices failed", batch.failure_count());
    } else {
        success!("Every device was audited");
    }
}
