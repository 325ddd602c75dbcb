//! Read-only diagnostics for backups and the mapping table.

use std::{collections::BTreeSet, path::Path};

use chrono::DateTime;

use crate::{
    error::Error,
    kotatsu::{self, KotatsuBackup},
    mihon::{self, Backup},
    pipeline::Direction,
    source::{
        Ecosystem, FallbackPolicy, MappingTable, NameCorpus, SourceReference, SourceResolver,
    },
};

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Manga whose source is 0 or an empty name.
    UnknownSource { count: usize },
    Uninitialized { count: usize },
    MissingDateAdded { count: usize },
    NoSourceRecords,
    CategoryWithoutId { position: usize, name: String },
    /// Kotatsu favourites without a chapter index entry.
    MissingChapterIndex { count: usize },
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InspectionReport {
    pub format: Ecosystem,
    pub manga: usize,
    pub categories: usize,
    pub sources: usize,
    pub chapters: usize,
    pub history: usize,
    pub oldest_added: Option<String>,
    pub newest_added: Option<String>,
    pub resolvable: usize,
    pub unresolvable: BTreeSet<String>,
    pub issues: Vec<Issue>,
}

/// Loads `path` according to its extension and reports on it.
#[tracing::instrument(name = "inspect backup", skip_all, fields(path = %path.display(), ?policy))]
pub fn inspect_file(
    path: &Path,
    table: &MappingTable,
    corpus: &dyn NameCorpus,
    policy: FallbackPolicy,
) -> Result<InspectionReport, Error> {
    match Direction::detect(path) {
        Some(Direction::MihonToKotatsu) => {
            let backup = mihon::load_backup(path)?;
            let resolver = SourceResolver::new(table, corpus, Ecosystem::Kotatsu, policy);
            Ok(inspect_mihon(&backup, &resolver))
        }
        Some(Direction::KotatsuToMihon) => {
            let backup = kotatsu::load_archive(path)?;
            let resolver = SourceResolver::new(table, corpus, Ecosystem::Mihon, policy);
            Ok(inspect_kotatsu(&backup, &resolver))
        }
        None => Err(Error::Usage(format!(
            "cannot tell the backup format of {}, expected .tachibk or .zip",
            path.display()
        ))),
    }
}

pub fn inspect_mihon(backup: &Backup, resolver: &SourceResolver<'_>) -> InspectionReport {
    let manga = &backup.backup_manga;
    let mut issues = Vec::new();

    let unknown = manga.iter().filter(|m| m.source == 0).count();
    push_count(&mut issues, unknown, |count| Issue::UnknownSource { count });
    let uninitialized = manga.iter().filter(|m| !m.initialized).count();
    push_count(&mut issues, uninitialized, |count| Issue::Uninitialized { count });
    let undated = manga.iter().filter(|m| m.date_added == 0).count();
    push_count(&mut issues, undated, |count| Issue::MissingDateAdded { count });
    if backup.backup_sources.is_empty() {
        issues.push(Issue::NoSourceRecords);
    }
    issues.extend(
        backup
            .backup_categories
            .iter()
            .enumerate()
            .filter(|(_, category)| category.id == 0)
            .map(|(position, category)| Issue::CategoryWithoutId {
                position,
                name: category.name.clone(),
            }),
    );

    let mut resolvable = 0;
    let mut unresolvable = BTreeSet::new();
    for m in manga {
        let reference = SourceReference::MihonId {
            source_id: m.source,
            observed_name: backup.source_name(m.source),
        };
        match resolver.resolve(reference) {
            Ok(_) => resolvable += 1,
            Err(error) => {
                unresolvable.insert(error.reference);
            }
        }
    }

    let (oldest_added, newest_added) = added_range(manga.iter().map(|m| m.date_added));

    InspectionReport {
        format: Ecosystem::Mihon,
        manga: manga.len(),
        categories: backup.backup_categories.len(),
        sources: backup.backup_sources.len(),
        chapters: manga.iter().map(|m| m.chapters.len()).sum(),
        history: manga.iter().map(|m| m.history.len()).sum(),
        oldest_added,
        newest_added,
        resolvable,
        unresolvable,
        issues,
    }
}

pub fn inspect_kotatsu(backup: &KotatsuBackup, resolver: &SourceResolver<'_>) -> InspectionReport {
    let favourites = &backup.favourites;
    let mut issues = Vec::new();

    let unknown = favourites
        .iter()
        .filter(|f| f.manga.source.trim().is_empty())
        .count();
    push_count(&mut issues, unknown, |count| Issue::UnknownSource { count });
    let undated = favourites.iter().filter(|f| f.created_at == 0).count();
    push_count(&mut issues, undated, |count| Issue::MissingDateAdded { count });
    if backup.sources.is_none() {
        issues.push(Issue::NoSourceRecords);
    }
    issues.extend(
        backup
            .categories
            .iter()
            .enumerate()
            .filter(|(_, category)| category.category_id == 0)
            .map(|(position, category)| Issue::CategoryWithoutId {
                position,
                name: category.title.clone(),
            }),
    );
    let unindexed = favourites
        .iter()
        .filter(|f| !backup.index.iter().any(|entry| entry.manga_id == f.manga.id))
        .count();
    push_count(&mut issues, unindexed, |count| Issue::MissingChapterIndex { count });

    let mut resolvable = 0;
    let mut unresolvable = BTreeSet::new();
    for favourite in favourites {
        match resolver.resolve(SourceReference::KotatsuName(&favourite.manga.source)) {
            Ok(_) => resolvable += 1,
            Err(error) => {
                unresolvable.insert(error.reference);
            }
        }
    }

    let (oldest_added, newest_added) = added_range(favourites.iter().map(|f| f.created_at));

    InspectionReport {
        format: Ecosystem::Kotatsu,
        manga: favourites.len(),
        categories: backup.categories.len(),
        sources: backup.source_names().len(),
        chapters: backup.index.iter().map(|entry| entry.chapters.len()).sum(),
        history: backup.history.len(),
        oldest_added,
        newest_added,
        resolvable,
        unresolvable,
        issues,
    }
}

fn push_count(issues: &mut Vec<Issue>, count: usize, issue: impl FnOnce(usize) -> Issue) {
    if count > 0 {
        issues.push(issue(count));
    }
}

fn added_range(timestamps: impl Iterator<Item = i64>) -> (Option<String>, Option<String>) {
    let timestamps: Vec<i64> = timestamps.filter(|millis| *millis > 0).collect();
    let format =
        |millis: i64| DateTime::from_timestamp_millis(millis).map(|date| date.to_rfc3339());

    (
        timestamps.iter().min().copied().and_then(format),
        timestamps.iter().max().copied().and_then(format),
    )
}

/// One row of the mapping table review.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub kotatsu_key: String,
    pub mihon_name: String,
    pub lang: String,
    pub revision: i32,
    pub source_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub fn mapping_rows(table: &MappingTable) -> Vec<MappingRow> {
    table
        .entries()
        .map(|entry| MappingRow {
            kotatsu_key: entry.kotatsu_key.clone(),
            mihon_name: entry.mihon_name.clone(),
            lang: entry.lang.clone(),
            revision: entry.revision,
            source_id: entry.source_id(),
            notes: entry.notes.clone(),
        })
        .collect()
}
