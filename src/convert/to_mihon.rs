use std::collections::{HashMap, HashSet};

use crate::{
    error::Error,
    kotatsu::{Category, Chapter, Favourite, KotatsuBackup},
    mihon::{Backup, BackupCategory, BackupChapter, BackupHistory, BackupManga, BackupSource},
    source::{SourceReference, SourceResolver, Unresolvable},
};

use super::OnUnresolved;

/// Maps a Kotatsu backup onto Mihon's schema, resolving each favourite's
/// source through `resolver`.
#[tracing::instrument(
    name = "map kotatsu to mihon",
    skip_all,
    fields(favourites = backup.favourites.len(), policy = ?resolver.policy())
)]
pub fn kotatsu_to_mihon(
    backup: &KotatsuBackup,
    resolver: &SourceResolver<'_>,
    on_unresolved: OnUnresolved,
) -> Result<Backup, Error> {
    let chapters_by_manga: HashMap<i64, &[Chapter]> = backup
        .index
        .iter()
        .map(|entry| (entry.manga_id, entry.chapters.as_slice()))
        .collect();

    let mut mihon = Backup::default();
    let mut position_by_manga: HashMap<i64, usize> = HashMap::new();
    let mut recorded_sources: HashSet<i64> = HashSet::new();
    let mut skipped: HashSet<i64> = HashSet::new();

    for favourite in &backup.favourites {
        let manga_id = favourite.manga.id;

        if skipped.contains(&manga_id) {
            continue;
        }
        if let Some(&position) = position_by_manga.get(&manga_id) {
            let categories = &mut mihon.backup_manga[position].categories;
            if !categories.contains(&favourite.category_id) {
                categories.push(favourite.category_id);
            }
            continue;
        }

        let (source_id, source_name) = match resolve_source(resolver, &favourite.manga.source) {
            Ok(source) => source,
            Err(unresolvable) => match on_unresolved {
                OnUnresolved::Skip => {
                    tracing::warn!(
                        title = %favourite.manga.title,
                        source = %favourite.manga.source,
                        "Skipping manga with an unmapped source"
                    );
                    skipped.insert(manga_id);
                    continue;
                }
                OnUnresolved::Abort => return Err(unresolvable.into()),
            },
        };

        if recorded_sources.insert(source_id) {
            mihon.backup_sources.push(BackupSource {
                name: source_name,
                source_id,
            });
        }

        let chapters = chapters_by_manga.get(&manga_id).copied().unwrap_or_default();

        position_by_manga.insert(manga_id, mihon.backup_manga.len());
        mihon
            .backup_manga
            .push(to_manga(favourite, source_id, chapters, backup));
    }

    mihon.backup_categories = backup.categories.iter().map(to_category).collect();

    tracing::info!(
        converted = mihon.backup_manga.len(),
        skipped = skipped.len(),
        sources = mihon.backup_sources.len(),
        "Favourites mapped"
    );

    Ok(mihon)
}

fn resolve_source(
    resolver: &SourceResolver<'_>,
    name: &str,
) -> Result<(i64, String), Unresolvable> {
    let resolved = resolver.resolve(SourceReference::KotatsuName(name))?;

    match resolved.source_id() {
        Some(source_id) => Ok((source_id, resolved.mihon_name().to_string())),
        None => Err(Unresolvable {
            reference: name.to_string(),
        }),
    }
}

fn to_manga(
    favourite: &Favourite,
    source_id: i64,
    chapters: &[Chapter],
    backup: &KotatsuBackup,
) -> BackupManga {
    let manga = &favourite.manga;

    let history = backup
        .history
        .iter()
        .filter(|history| history.manga_id == manga.id)
        .filter_map(|history| {
            chapters
                .iter()
                .find(|chapter| chapter.id == history.chapter_id)
                .map(|chapter| BackupHistory {
                    url: chapter.url.clone(),
                    last_read: history.updated_at,
                    read_duration: 0,
                })
        })
        .collect();

    BackupManga {
        source: source_id,
        url: manga.url.clone(),
        title: manga.title.clone(),
        artist: None,
        author: manga.author.clone().filter(|author| !author.is_empty()),
        description: None,
        genre: Vec::new(),
        status: 0,
        thumbnail_url: Some(manga.cover_url.clone()).filter(|url| !url.is_empty()),
        date_added: favourite.created_at,
        chapters: chapters.iter().map(to_chapter).collect(),
        categories: vec![favourite.category_id],
        favorite: true,
        history,
        ..Default::default()
    }
}

fn to_chapter(chapter: &Chapter) -> BackupChapter {
    BackupChapter {
        url: chapter.url.clone(),
        name: chapter.name.clone(),
        scanlator: chapter.scanlator.clone().filter(|s| !s.is_empty()),
        read: false,
        bookmark: false,
        last_page_read: 0,
        chapter_number: chapter.number,
        date_upload: chapter.upload_date,
        ..Default::default()
    }
}

fn to_category(category: &Category) -> BackupCategory {
    BackupCategory {
        name: category.title.clone(),
        order: category.created_at,
        id: category.category_id,
        flags: 0,
    }
}
