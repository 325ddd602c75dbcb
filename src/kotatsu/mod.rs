pub mod archive;
pub mod model;

pub use archive::{load_archive, write_archive};
pub use model::{
    Bookmark, Category, Chapter, Favourite, History, IndexEntry, KotatsuBackup, Manga, Tag,
};
