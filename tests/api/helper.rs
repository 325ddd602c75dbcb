use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use rustatsu_bkconv::{
    pipeline::{ConversionPipeline, PipelineOptions},
    source::{MappingTable, NameCorpus},
    telemetry::{get_subscriber, init_subscriber},
};
use tempfile::TempDir;

static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

/// Scratch directory holding the input and output backups of one test.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub table: MappingTable,
}

impl TestWorkspace {
    pub fn new() -> Self {
        LazyLock::force(&TRACING);

        TestWorkspace {
            dir: tempfile::tempdir().expect("Failed to create temporary directory"),
            table: MappingTable::builtin().expect("Failed to load built-in mapping table"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn pipeline<'a>(
        &'a self,
        corpus: &'a dyn NameCorpus,
        options: PipelineOptions,
    ) -> ConversionPipeline<'a> {
        ConversionPipeline::new(&self.table, corpus, options)
    }

    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Creates a minimal reference checkout with one Mihon extension and one
/// Kotatsu parser site per name pair.
pub fn reference_tree(root: &Path, sources: &[(&str, &str)]) {
    for (mihon, kotatsu) in sources {
        let extension = root.join(format!(
            "extensions/src/en/{0}/src/eu/kanade/tachiyomi/extension/en/{0}",
            mihon
        ));
        std::fs::create_dir_all(&extension).unwrap();
        std::fs::write(extension.join("Source.kt"), "class Source").unwrap();

        let site = root.join(format!(
            "kotatsu-parsers-master/src/main/kotlin/org/koitharu/kotatsu/parsers/site/{}",
            kotatsu
        ));
        std::fs::create_dir_all(site).unwrap();
    }
}
