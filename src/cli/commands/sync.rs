//! CLI implementation for `alarmpkg sync`

use anyhow::{Context, Result};

use crate::cli::commands::Project;
use crate::cli::output::{create_build_bar, print_detail, print_line, print_success, print_warning, stage_line};
use crate::core::sync::{ArchPageExtractor, SyncOutcome, VersionSyncer};

/// Execute the sync command
pub async fn execute(project: &Project, no_backup: bool) -> Result<()> {
    let mut store = project.open_store()?;

    if project.config.backup_enabled() && !no_backup {
        let backup = store.backup().context("Failed to back up package database")?;
        print_detail(&format!("Backed up database to {}", backup.display()));
    }

    let fetcher = project.task_context().downloads;
    let syncer = VersionSyncer::new(fetcher, ArchPageExtractor::new(project.config.version_noise()))
        .with_template_package(project.config.template_package());

    let total = store.len();
    let bar = create_build_bar(total as u64);
    bar.set_message("syncing");
    let mut index = 0;

    let report = syncer
        .sync_all_with(&mut store, |entry| {
            index += 1;
            let line = stage_line("sync", &entry.package, index, total, &entry.to_string());
            bar.suspend(|| {
                if matches!(entry.outcome, SyncOutcome::Failed { .. }) {
                    print_warning(&line);
                } else {
                    print_line(&line);
                }
            });
            bar.inc(1);
        })
        .await;
    bar.finish_and_clear();

    print_success(&format!(
        "Sync: {} marked for build, {} up to date, {} unchanged, {} failed",
        report.updated(),
        report.up_to_date(),
        report.inconclusive(),
        report.failed()
    ));

    Ok(())
}
