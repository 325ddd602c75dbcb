pub mod backup;
pub mod model;

pub use backup::{load_backup, write_backup};
pub use model::{Backup, BackupCategory, BackupChapter, BackupHistory, BackupManga, BackupSource};
