//! CLI implementation for `alarmpkg prepare` and `alarmpkg build`

use anyhow::Result;
use indicatif::ProgressBar;
use std::sync::Arc;

use crate::cli::commands::Project;
use crate::cli::output::{create_download_bar, print_line, print_success, print_warning, stage_line};
use crate::core::orchestrator::BatchOrchestrator;
use crate::core::record::TaskKind;
use crate::infra::download::ProgressCallback;
use crate::tasks::{builtin_registry, ProgressFactory};

/// Run one stage over every record
///
/// Per-record failures are reported and do not fail the command.
pub async fn execute(project: &Project, kind: TaskKind) -> Result<()> {
    let store = project.open_store()?;
    let ctx = project.task_context().with_progress(download_progress());
    let registry = builtin_registry(&ctx);
    tracing::debug!(
        "Registered {kind} tasks: {}",
        registry.table(kind).names().collect::<Vec<_>>().join(", ")
    );

    let stage = kind.to_string();
    let total = store.len();
    let mut index = 0;

    let orchestrator = BatchOrchestrator::new(registry.table(kind), &store);
    let report = orchestrator
        .run_all_with(|notification| {
            index += 1;
            let line = stage_line(
                &stage,
                &notification.package,
                index,
                total,
                &notification.to_string(),
            );
            if notification.outcome.is_failure() {
                print_warning(&line);
            } else {
                print_line(&line);
            }
        })
        .await;

    print_success(&format!(
        "{}: {} completed, {} skipped, {} failed",
        capitalize(&stage),
        report.completed(),
        report.skipped(),
        report.failed()
    ));

    Ok(())
}

fn download_progress() -> ProgressFactory {
    Arc::new(|label: &str| -> ProgressCallback {
        let bar = create_download_bar(0);
        bar.set_message(label.to_string());
        bar_callback(bar)
    })
}

/// Clears its bar when the owning callback is dropped
struct ClearOnDrop(ProgressBar);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

/// Drive `bar` from download progress
///
/// The download owns the callback, so the bar is cleared when the transfer
/// ends even if it failed.
fn bar_callback(bar: ProgressBar) -> ProgressCallback {
    let guard = ClearOnDrop(bar);
    Box::new(move |downloaded, total| {
        let bar = &guard.0;
        if total > 0 {
            bar.set_length(total);
        }
        bar.set_position(downloaded);
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
