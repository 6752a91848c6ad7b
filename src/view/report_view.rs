use std::fmt::Write;

use crate::model::StatisticsReport;
use crate::util::{format_size, format_timestamp};

use super::ui_fmt::{average, bar, format_count, percent};

const LABEL_WIDTH: usize = 20;

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn row(out: &mut String, label: &str, value: impl AsRef<str>) {
    let _ = writeln!(out, "  {:<width$}{}", label, value.as_ref(), width = LABEL_WIDTH);
}

/// Render the report as sectioned plain text
pub fn render(report: &StatisticsReport) -> String {
    let mut out = String::new();

    let size = &report.repository_size;
    section(&mut out, "Repository size");
    row(
        &mut out,
        "Commits",
        format!("{} ({})", format_count(size.commits.count), format_size(size.commits.size)),
    );
    row(
        &mut out,
        "Trees",
        format!(
            "{} ({}, {} entries)",
            format_count(size.trees.count),
            format_size(size.trees.size),
            format_count(size.trees.entries)
        ),
    );
    row(
        &mut out,
        "Blobs",
        format!("{} ({})", format_count(size.blobs.count), format_size(size.blobs.size)),
    );
    row(&mut out, "Annotated tags", format_count(size.annotated_tags.count));
    row(&mut out, "References", format_count(size.references.count));

    let biggest = &report.biggest_objects;
    section(&mut out, "Biggest objects");
    row(
        &mut out,
        "Commit size",
        format!(
            "{} (avg {})",
            format_size(biggest.commits.max_size),
            format_size(average(size.commits.size, size.commits.count))
        ),
    );
    row(&mut out, "Commit parents", format_count(biggest.commits.max_parents));
    row(
        &mut out,
        "Tree entries",
        format!(
            "{} (avg {})",
            format_count(biggest.trees.max_entries),
            format_count(average(size.trees.entries, size.trees.count))
        ),
    );
    let blob_share = percent(biggest.blobs.max_size, size.blobs.size);
    row(
        &mut out,
        "Blob size",
        format!(
            "{} {} {:.1}% of all blobs",
            format_size(biggest.blobs.max_size),
            bar(blob_share, 12),
            blob_share
        ),
    );

    let history = &report.history_structure;
    section(&mut out, "History structure");
    row(&mut out, "Max depth", format_count(history.max_depth));
    row(&mut out, "Max tag depth", format_count(history.max_tag_depth));

    let checkouts = &report.biggest_checkouts;
    section(&mut out, "Biggest checkouts");
    row(&mut out, "Directories", format_count(checkouts.num_directories));
    row(&mut out, "Max path depth", format_count(checkouts.max_path_depth));
    row(&mut out, "Max path length", format_count(checkouts.max_path_length));
    row(&mut out, "Files", format_count(checkouts.num_files));
    row(&mut out, "Total file size", format_size(checkouts.total_file_size));
    row(&mut out, "Symlinks", format_count(checkouts.num_symlinks));
    row(&mut out, "Submodules", format_count(checkouts.num_submodules));

    out
}

/// One-line note printed when a report comes from the cache
pub fn cached_note(cached_at: i64) -> String {
    format!("(cached report from {})", format_timestamp(cached_at))
}
