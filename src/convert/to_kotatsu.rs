use crate::{
    kotatsu::{
        Category, Chapter, Favourite, History, IndexEntry, KotatsuBackup, Manga,
        model::RATING_UNKNOWN,
    },
    mihon::{Backup, BackupCategory, BackupManga},
};

/// Kotatsu has no "no category" favourite; Mihon's default category is 0.
pub const DEFAULT_CATEGORY_ID: i64 = 0;

/// Maps a Mihon backup onto Kotatsu's schema. Manga get sequential ids in
/// backup order, starting at 1.
#[tracing::instrument(
    name = "map mihon to kotatsu",
    skip_all,
    fields(manga = backup.backup_manga.len())
)]
pub fn mihon_to_kotatsu(backup: &Backup) -> KotatsuBackup {
    let mut kotatsu = KotatsuBackup::default();
    let mut next_chapter_id = 1;

    for (position, manga) in backup.backup_manga.iter().enumerate() {
        let manga_id = position as i64 + 1;

        if manga.categories.len() > 1 {
            tracing::debug!(
                title = %manga.title,
                categories = manga.categories.len(),
                "Kotatsu keeps only the first category"
            );
        }

        kotatsu.favourites.push(Favourite {
            manga_id,
            category_id: manga
                .categories
                .first()
                .copied()
                .unwrap_or(DEFAULT_CATEGORY_ID),
            sort_key: position as i32,
            pinned: false,
            created_at: manga.date_added,
            deleted_at: None,
            manga: to_manga(manga_id, manga),
        });

        if manga.chapters.is_empty() {
            continue;
        }

        let chapters: Vec<Chapter> = manga
            .chapters
            .iter()
            .map(|chapter| {
                let id = next_chapter_id;
                next_chapter_id += 1;
                Chapter {
                    id,
                    name: chapter.name.clone(),
                    number: chapter.chapter_number,
                    url: chapter.url.clone(),
                    scanlator: chapter.scanlator.clone().filter(|s| !s.is_empty()),
                    upload_date: chapter.date_upload,
                    branch: None,
                }
            })
            .collect();

        if let Some(history) = latest_history(manga_id, manga, &chapters) {
            kotatsu.history.push(history);
        }

        kotatsu.index.push(IndexEntry { manga_id, chapters });
    }

    kotatsu.categories = backup
        .backup_categories
        .iter()
        .enumerate()
        .map(|(position, category)| to_category(position, category))
        .collect();

    kotatsu
}

fn to_manga(manga_id: i64, manga: &BackupManga) -> Manga {
    let thumbnail = manga.thumbnail_url.clone().filter(|url| !url.is_empty());

    Manga {
        id: manga_id,
        title: manga.title.clone(),
        alt_title: None,
        url: manga.url.clone(),
        public_url: manga.url.clone(),
        rating: RATING_UNKNOWN,
        nsfw: None,
        content_rating: None,
        cover_url: thumbnail.clone().unwrap_or_default(),
        large_cover_url: thumbnail,
        state: None,
        author: manga.author.clone().filter(|author| !author.is_empty()),
        source: String::new(),
        tags: Vec::new(),
    }
}

fn to_category(position: usize, category: &BackupCategory) -> Category {
    Category {
        category_id: category.id,
        created_at: category.order,
        sort_key: position as i32,
        title: category.name.clone(),
        order: None,
        track: None,
        show_in_lib: None,
    }
}

/// Kotatsu keeps one history row per manga: the most recently read chapter.
fn latest_history(manga_id: i64, manga: &BackupManga, chapters: &[Chapter]) -> Option<History> {
    manga
        .history
        .iter()
        .filter_map(|history| {
            chapters
                .iter()
                .find(|chapter| chapter.url == history.url)
                .map(|chapter| (history.last_read, chapter.id))
        })
        .max_by_key(|(last_read, _)| *last_read)
        .map(|(last_read, chapter_id)| History {
            manga_id,
            created_at: last_read,
            updated_at: last_read,
            chapter_id,
            ..Default::default()
        })
}
