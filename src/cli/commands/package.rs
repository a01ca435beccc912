//! Package subcommand implementations
//!
//! Implements `alarmpkg package list|info|add|remove|mark|set-version`.

use anyhow::{Context, Result};

use crate::cli::commands::Project;
use crate::cli::output::{print_detail, print_info, print_line, print_success, print_warning};
use crate::core::add::{add_package, AddRequest};
use crate::core::record::PackageRecord;
use crate::core::remove::remove_package;
use crate::infra::layout::ProjectLayout;

/// Every field of a record, one line each
pub fn describe_record(layout: &ProjectLayout, record: &PackageRecord) -> Vec<String> {
    vec![
        format!("Package Name: {}", record.name),
        format!("Package Version: {}", record.version),
        "Package URLS:".to_string(),
        format!("    Type: {}", record.urls.source_type),
        format!("    Source URL: {}", record.urls.source_url),
        format!("    Upstream URL: {}", record.urls.upstream_url),
        "Package Paths:".to_string(),
        format!(
            "    Repo: {} ({})",
            record.paths.repository,
            layout.repository_dir(record).display()
        ),
        format!(
            "    PKGBUILD: {} ({})",
            record.paths.pkgbuild,
            layout.pkgbuild_dir(record).display()
        ),
        "Package Build:".to_string(),
        format!("    Marked For Build: {}", record.build.marked_for_build),
        format!("    Build Function Name: {}", record.build.build_task),
        format!("    Prepare Function Name: {}", record.build.prepare_task),
    ]
}

/// One summary line per record
pub fn summarize_record(record: &PackageRecord) -> String {
    let flag = if record.is_marked_for_build() {
        "marked for build"
    } else {
        "up to date"
    };
    format!("{} @ {} ({flag})", record.name, record.version)
}

/// Execute the package list command
pub async fn execute_list(project: &Project) -> Result<()> {
    let store = project.open_store()?;

    if store.is_empty() {
        print_info("No packages in the database.");
        return Ok(());
    }

    for record in store.list() {
        print_line(&summarize_record(&record));
    }
    print_line("");
    print_line(&format!("{} package(s).", store.len()));
    Ok(())
}

/// Execute the package info command
pub async fn execute_info(project: &Project, name: &str) -> Result<()> {
    let store = project.open_store()?;
    let record = store.get(name)?;

    for line in describe_record(&project.layout, &record) {
        print_line(&line);
    }
    Ok(())
}

/// Execute the package add command
pub async fn execute_add(project: &Project, request: AddRequest) -> Result<()> {
    let mut store = project.open_store()?;
    let name = request.name.clone();

    let result = add_package(&project.layout, &mut store, request)
        .with_context(|| format!("Failed to add package '{name}'"))?;

    print_success(&format!("Added package {} v{}", name, result.record.version));
    print_detail(&format!("PKGBUILD directory: {}", result.pkgbuild_dir.display()));
    print_detail(&format!("Repository directory: {}", result.repository_dir.display()));
    if !result.pkgbuild_created {
        print_detail("Kept existing PKGBUILD");
    }
    Ok(())
}

/// Execute the package remove command
pub async fn execute_remove(project: &Project, name: &str) -> Result<()> {
    let mut store = project.open_store()?;

    let result = remove_package(&project.layout, &mut store, name)
        .with_context(|| format!("Failed to remove package '{name}'"))?;

    print_success(&format!("Package \"{}\" was deleted!", result.record.name));
    for dir in &result.removed_dirs {
        print_detail(&format!("Deleted {}", dir.display()));
    }
    for stored in &result.refused_paths {
        print_warning(&format!("Left {stored} in place: outside pkgbuild/ and packages/"));
    }
    Ok(())
}

/// Execute the package mark command
pub async fn execute_mark(project: &Project, name: &str, marked: bool) -> Result<()> {
    let mut store = project.open_store()?;
    store.set_marked_for_build(name, marked)?;

    if marked {
        print_success(&format!("Marked {name} for build"));
    } else {
        print_success(&format!("Cleared build mark on {name}"));
    }
    Ok(())
}

/// Execute the package set-version command
pub async fn execute_set_version(project: &Project, name: &str, version: &str) -> Result<()> {
    let mut store = project.open_store()?;
    store.set_version(name, version)?;

    print_success(&format!("Set {name} to v{version}"));
    Ok(())
}
