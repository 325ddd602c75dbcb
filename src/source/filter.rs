use std::collections::HashSet;

use crate::mihon::Backup;

use super::resolver::AllowSet;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub kept_manga: usize,
    pub dropped_manga: usize,
    pub kept_sources: usize,
    pub dropped_sources: usize,
}

/// Keeps only manga and source records whose source is representable on both
/// sides. Relative order is preserved and categories are never touched.
#[tracing::instrument(
    name = "filter to common sources",
    skip_all,
    fields(allowed = allowed.len())
)]
pub fn filter_to_common(backup: &mut Backup, allowed: &AllowSet<'_>) -> FilterReport {
    let admitted_by_name: HashSet<i64> = backup
        .backup_sources
        .iter()
        .filter(|source| allowed.admits(source.source_id, Some(&source.name)))
        .map(|source| source.source_id)
        .collect();

    let manga_before = backup.backup_manga.len();
    backup.backup_manga.retain(|manga| {
        let keep = allowed.contains_id(manga.source) || admitted_by_name.contains(&manga.source);
        if !keep {
            tracing::debug!(
                title = %manga.title,
                source = manga.source,
                "Dropping manga without a common source"
            );
        }
        keep
    });

    let sources_before = backup.backup_sources.len();
    backup
        .backup_sources
        .retain(|source| allowed.admits(source.source_id, Some(&source.name)));

    let report = FilterReport {
        kept_manga: backup.backup_manga.len(),
        dropped_manga: manga_before - backup.backup_manga.len(),
        kept_sources: backup.backup_sources.len(),
        dropped_sources: sources_before - backup.backup_sources.len(),
    };

    if report.dropped_manga > 0 {
        tracing::warn!(
            dropped = report.dropped_manga,
            kept = report.kept_manga,
            "Manga without a common source were removed"
        );
    }

    report
}
