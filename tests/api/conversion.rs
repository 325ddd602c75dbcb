use rustatsu_bkconv::{
    convert::OnUnresolved,
    error::Error,
    kotatsu::{load_archive, write_archive},
    mihon::{load_backup, write_backup},
    pipeline::{Direction, PipelineOptions},
    source::{CorpusNames, FallbackPolicy, ReferenceTree, derive_source_id},
};

use crate::{
    COMICK_ID, MANGADEX_ID, TestWorkspace, fake_favourite, fake_kotatsu_backup,
    fake_mihon_backup, fake_mihon_manga, reference_tree,
};

#[test]
fn mihon_backup_converts_to_kotatsu_archive() {
    let workspace = TestWorkspace::new();
    let input = workspace.path("library.tachibk");
    let output = workspace.path("library.zip");

    let backup = fake_mihon_backup(vec![
        fake_mihon_manga(MANGADEX_ID, vec![2, 1], 3),
        fake_mihon_manga(COMICK_ID, vec![1], 0),
        fake_mihon_manga(MANGADEX_ID, vec![], 1),
        fake_mihon_manga(COMICK_ID, vec![2], 2),
    ]);
    write_backup(&input, &backup).unwrap();

    let corpus = CorpusNames::default();
    let summary = workspace
        .pipeline(&corpus, PipelineOptions::default())
        .run(Direction::MihonToKotatsu, &input, &output)
        .unwrap();

    assert_eq!(summary.read, 4);
    assert_eq!(summary.written, 4);

    let kotatsu = load_archive(&output).unwrap();
    assert_eq!(kotatsu.favourites.len(), 4);
    assert_eq!(kotatsu.categories.len(), 2);

    let titles: Vec<&str> = kotatsu
        .favourites
        .iter()
        .map(|f| f.manga.title.as_str())
        .collect();
    let expected: Vec<&str> = backup.backup_manga.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, expected);

    let categories: Vec<i64> = kotatsu.favourites.iter().map(|f| f.category_id).collect();
    assert_eq!(categories, vec![2, 1, 0, 2]);

    let chapter_counts: Vec<(i64, usize)> = kotatsu
        .index
        .iter()
        .map(|entry| (entry.manga_id, entry.chapters.len()))
        .collect();
    assert_eq!(chapter_counts, vec![(1, 3), (3, 1), (4, 2)]);
}

#[test]
fn kotatsu_archive_converts_to_mihon_backup() {
    let workspace = TestWorkspace::new();
    let input = workspace.path("backup.zip");
    let output = workspace.path("backup.tachibk");

    let backup = fake_kotatsu_backup(vec![
        fake_favourite(10, "MANGADEX", 1),
        fake_favourite(11, "SOMEWHERE_UNMAPPED", 1),
        fake_favourite(12, "COMICK_FUN", 1),
    ]);
    write_archive(&input, &backup).unwrap();

    let corpus = CorpusNames::default();
    let summary = workspace
        .pipeline(&corpus, PipelineOptions::default())
        .run(Direction::KotatsuToMihon, &input, &output)
        .unwrap();

    assert_eq!(summary.read, 3);
    assert_eq!(summary.written, 2);

    let mihon = load_backup(&output).unwrap();
    let urls: Vec<&str> = mihon.backup_manga.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(urls, vec!["/manga/10", "/manga/12"]);

    let sources: Vec<i64> = mihon.backup_manga.iter().map(|m| m.source).collect();
    assert_eq!(sources, vec![MANGADEX_ID, COMICK_ID]);

    let manga = &mihon.backup_manga[1];
    assert_eq!(manga.chapters.len(), 1);
    assert_eq!(manga.chapters[0].url, "/manga/12/1");
    assert!(!manga.chapters[0].read);
    assert_eq!(manga.categories, vec![1]);
    assert!(manga.favorite);

    assert_eq!(mihon.backup_categories[0].name, "Reading");
    assert_eq!(mihon.backup_sources.len(), 2);
}

#[test]
fn fallback_keeps_unmapped_sources() {
    let workspace = TestWorkspace::new();
    let input = workspace.path("backup.zip");
    let output = workspace.path("backup.tachibk");

    write_archive(
        &input,
        &fake_kotatsu_backup(vec![fake_favourite(1, "SOMEWHERE_UNMAPPED", 1)]),
    )
    .unwrap();

    let corpus = CorpusNames::default();
    workspace
        .pipeline(
            &corpus,
            PipelineOptions {
                policy: FallbackPolicy::Allowed,
                ..Default::default()
            },
        )
        .run(Direction::KotatsuToMihon, &input, &output)
        .unwrap();

    let mihon = load_backup(&output).unwrap();
    assert_eq!(
        mihon.backup_manga[0].source,
        derive_source_id("SOMEWHERE_UNMAPPED", "all", 1)
    );
}

#[test]
fn strict_failure_writes_nothing() {
    let workspace = TestWorkspace::new();
    let input = workspace.path("backup.zip");
    let output = workspace.path("backup.tachibk");

    write_archive(
        &input,
        &fake_kotatsu_backup(vec![
            fake_favourite(1, "MANGADEX", 1),
            fake_favourite(2, "SOMEWHERE_UNMAPPED", 1),
        ]),
    )
    .unwrap();

    let corpus = CorpusNames::default();
    let error = workspace
        .pipeline(
            &corpus,
            PipelineOptions {
                on_unresolved: OnUnresolved::Abort,
                ..Default::default()
            },
        )
        .run(Direction::KotatsuToMihon, &input, &output)
        .unwrap_err();

    assert!(matches!(error, Error::Unresolvable(_)));
    assert_eq!(error.exit_code(), 5);
    assert_eq!(workspace.files(), vec!["backup.zip".to_string()]);
}

#[test]
fn malformed_input_is_a_load_error() {
    let workspace = TestWorkspace::new();
    let input = workspace.path("broken.tachibk");
    let output = workspace.path("broken.zip");
    std::fs::write(&input, [0x1f, 0x8b, 0x00, 0x01, 0x02]).unwrap();

    let corpus = CorpusNames::default();
    let error = workspace
        .pipeline(&corpus, PipelineOptions::default())
        .run(Direction::MihonToKotatsu, &input, &output)
        .unwrap_err();

    assert_eq!(error.exit_code(), 3);
    assert!(!output.exists());
}

#[test]
fn round_trip_preserves_library_shape() {
    let workspace = TestWorkspace::new();
    let original_path = workspace.path("original.tachibk");
    let kotatsu_path = workspace.path("kotatsu.zip");

    let original = fake_mihon_backup(vec![
        fake_mihon_manga(MANGADEX_ID, vec![1], 2),
        fake_mihon_manga(COMICK_ID, vec![2], 1),
    ]);
    write_backup(&original_path, &original).unwrap();

    let corpus = CorpusNames::default();
    let pipeline = workspace.pipeline(&corpus, PipelineOptions::default());
    pipeline
        .run(Direction::MihonToKotatsu, &original_path, &kotatsu_path)
        .unwrap();

    // Kotatsu records its parser name on each title; emulate that before going back.
    let mut kotatsu = load_archive(&kotatsu_path).unwrap();
    kotatsu.favourites[0].manga.source = "MANGADEX".to_string();
    kotatsu.favourites[1].manga.source = "COMICK_FUN".to_string();

    let (back, _) = pipeline.kotatsu_to_mihon(&kotatsu).unwrap();

    let shape = |backup: &rustatsu_bkconv::mihon::Backup| {
        backup
            .backup_manga
            .iter()
            .map(|m| (m.source, m.title.clone(), m.categories.clone(), m.chapters.len()))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&back), shape(&original));

    let categories = |backup: &rustatsu_bkconv::mihon::Backup| {
        backup
            .backup_categories
            .iter()
            .map(|c| (c.name.clone(), c.order))
            .collect::<Vec<_>>()
    };
    assert_eq!(categories(&back), categories(&original));
}

#[test]
fn reference_tree_narrows_common_sources() {
    let workspace = TestWorkspace::new();
    let references = workspace.path("references");
    reference_tree(&references, &[("mangadex", "mangadex")]);

    let input = workspace.path("library.tachibk");
    let output = workspace.path("library.zip");
    let mut backup = fake_mihon_backup(vec![
        fake_mihon_manga(MANGADEX_ID, vec![1], 0),
        fake_mihon_manga(77, vec![1], 0),
        fake_mihon_manga(MANGADEX_ID, vec![2], 0),
    ]);
    backup.backup_sources.push(rustatsu_bkconv::mihon::BackupSource {
        name: "Local source".to_string(),
        source_id: 77,
    });
    write_backup(&input, &backup).unwrap();

    let corpus = ReferenceTree::new(&references);
    let summary = workspace
        .pipeline(
            &corpus,
            PipelineOptions {
                common_only: true,
                ..Default::default()
            },
        )
        .run(Direction::MihonToKotatsu, &input, &output)
        .unwrap();

    let report = summary.filtered.unwrap();
    assert_eq!(report.dropped_manga, 1);
    assert_eq!(report.dropped_sources, 1);

    let kotatsu = load_archive(&output).unwrap();
    let ids: Vec<i64> = kotatsu.favourites.iter().map(|f| f.manga.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(kotatsu.categories.len(), 2);
}
