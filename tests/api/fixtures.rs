use fake::{Fake, faker::name::en::Name};
use rustatsu_bkconv::{
    kotatsu::{Category, Chapter, Favourite, IndexEntry, KotatsuBackup, Manga},
    mihon::{Backup, BackupCategory, BackupChapter, BackupManga, BackupSource},
};

pub const MANGADEX_ID: i64 = 2499283573021220255;
pub const COMICK_ID: i64 = 3945939485632643695;

pub fn fake_mihon_manga(source: i64, categories: Vec<i64>, chapters: usize) -> BackupManga {
    let title: String = Name().fake();
    let slug = title.to_lowercase().replace(' ', "-");

    BackupManga {
        source,
        url: format!("/title/{}", slug),
        title,
        author: Some(Name().fake()),
        thumbnail_url: Some(format!("https://covers.example/{}.jpg", slug)),
        date_added: (1_600_000_000_000i64..1_700_000_000_000i64).fake(),
        chapters: (1..=chapters)
            .map(|number| BackupChapter {
                url: format!("/title/{}/chapter/{}", slug, number),
                name: format!("Chapter {}", number),
                chapter_number: number as f32,
                date_upload: 1_650_000_000_000,
                ..Default::default()
            })
            .collect(),
        categories,
        favorite: true,
        initialized: true,
        ..Default::default()
    }
}

pub fn fake_mihon_backup(manga: Vec<BackupManga>) -> Backup {
    Backup {
        backup_manga: manga,
        backup_categories: vec![
            BackupCategory {
                name: "Reading".to_string(),
                order: 0,
                id: 1,
                ..Default::default()
            },
            BackupCategory {
                name: "Plan to read".to_string(),
                order: 1,
                id: 2,
                ..Default::default()
            },
        ],
        backup_sources: vec![
            BackupSource {
                name: "MangaDex".to_string(),
                source_id: MANGADEX_ID,
            },
            BackupSource {
                name: "Comick".to_string(),
                source_id: COMICK_ID,
            },
        ],
    }
}

pub fn fake_favourite(id: i64, source: &str, category_id: i64) -> Favourite {
    Favourite {
        manga_id: id,
        category_id,
        sort_key: id as i32,
        created_at: (1_600_000_000_000i64..1_700_000_000_000i64).fake(),
        manga: Manga {
            id,
            title: Name().fake(),
            url: format!("/manga/{}", id),
            public_url: format!("https://reader.example/manga/{}", id),
            cover_url: format!("https://covers.example/{}.jpg", id),
            source: source.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn fake_kotatsu_backup(favourites: Vec<Favourite>) -> KotatsuBackup {
    let index = favourites
        .iter()
        .map(|favourite| IndexEntry {
            manga_id: favourite.manga.id,
            chapters: vec![Chapter {
                id: favourite.manga.id * 100,
                name: "Chapter 1".to_string(),
                number: 1.0,
                url: format!("{}/1", favourite.manga.url),
                ..Default::default()
            }],
        })
        .collect();

    KotatsuBackup {
        favourites,
        categories: vec![Category {
            category_id: 1,
            created_at: 1_600_000_000_000,
            sort_key: 0,
            title: "Reading".to_string(),
            ..Default::default()
        }],
        index,
        settings: Some(br#"{"theme":"dark"}"#.to_vec()),
        sources: Some(br#"[{"name":"MANGADEX"},{"name":"COMICK_FUN"}]"#.to_vec()),
        ..Default::default()
    }
}
