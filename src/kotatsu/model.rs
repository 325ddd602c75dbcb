/// Kotatsu's "unknown" rating marker.
pub const RATING_UNKNOWN: f32 = -1.0;

/// Parsed Kotatsu backup. Passthrough sections are kept as the raw bytes
/// found in the archive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct KotatsuBackup {
    pub favourites: Vec<Favourite>,
    pub categories: Vec<Category>,
    pub history: Vec<History>,
    pub bookmarks: Vec<Bookmark>,
    pub index: Vec<IndexEntry>,
    pub settings: Option<Vec<u8>>,
    pub reader_grid: Option<Vec<u8>>,
    pub sources: Option<Vec<u8>>,
}

impl KotatsuBackup {
    /// Names listed in the passthrough `sources` section, if it parses.
    pub fn source_names(&self) -> Vec<String> {
        let Some(raw) = &self.sources else {
            return Vec::new();
        };

        match serde_json::from_slice::<Vec<serde_json::Value>>(raw) {
            Ok(values) => values
                .iter()
                .filter_map(|value| value.get("name").and_then(|name| name.as_str()))
                .map(str::to_string)
                .collect(),
            Err(error) => {
                tracing::debug!(%error, "Ignoring unreadable sources section");
                Vec::new()
            }
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Manga {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_title: Option<String>,
    pub url: String,
    pub public_url: String,
    pub rating: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<String>,
    pub cover_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub source: String,
    pub tags: Vec<Tag>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Tag {
    pub id: i64,
    pub title: String,
    pub key: String,
    pub source: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Category {
    pub category_id: i64,
    pub created_at: i64,
    pub sort_key: i32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_lib: Option<bool>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Favourite {
    pub manga_id: i64,
    pub category_id: i64,
    pub sort_key: i32,
    pub pinned: bool,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
    pub manga: Manga,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct History {
    pub manga_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub chapter_id: i64,
    pub page: i32,
    pub scroll: f64,
    pub percent: f32,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Bookmark {
    pub manga_id: i64,
    pub page_id: i64,
    pub chapter_id: i64,
    pub page: i32,
    pub scroll: f64,
    pub image_url: String,
    pub created_at: i64,
    pub percent: f32,
}

/// Chapter list of one manga, joined to favourites by `manga_id`.
#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct IndexEntry {
    pub manga_id: i64,
    pub chapters: Vec<Chapter>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Chapter {
    pub id: i64,
    pub name: String,
    pub number: f32,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanlator: Option<String>,
    pub upload_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}
