use rustatsu_bkconv::{
    error::Error,
    inspect::{Issue, inspect_file},
    kotatsu::write_archive,
    mihon::write_backup,
    source::{CorpusNames, Ecosystem, FallbackPolicy},
};

use crate::{
    MANGADEX_ID, TestWorkspace, fake_favourite, fake_kotatsu_backup, fake_mihon_backup,
    fake_mihon_manga,
};

#[test]
fn inspects_a_mihon_backup() {
    let workspace = TestWorkspace::new();
    let path = workspace.path("library.tachibk");

    let mut unknown = fake_mihon_manga(0, vec![], 0);
    unknown.initialized = false;
    write_backup(
        &path,
        &fake_mihon_backup(vec![fake_mihon_manga(MANGADEX_ID, vec![1], 4), unknown]),
    )
    .unwrap();

    let report = inspect_file(
        &path,
        &workspace.table,
        &CorpusNames::default(),
        FallbackPolicy::Disabled,
    )
    .unwrap();

    assert_eq!(report.format, Ecosystem::Mihon);
    assert_eq!(report.manga, 2);
    assert_eq!(report.chapters, 4);
    assert_eq!(report.resolvable, 1);
    assert!(report.issues.contains(&Issue::UnknownSource { count: 1 }));
    assert!(report.issues.contains(&Issue::Uninitialized { count: 1 }));
}

#[test]
fn inspects_a_kotatsu_backup() {
    let workspace = TestWorkspace::new();
    let path = workspace.path("backup.zip");

    write_archive(
        &path,
        &fake_kotatsu_backup(vec![
            fake_favourite(1, "MANGADEX", 1),
            fake_favourite(2, "ELSEWHERE", 1),
        ]),
    )
    .unwrap();

    let report = inspect_file(
        &path,
        &workspace.table,
        &CorpusNames::default(),
        FallbackPolicy::Disabled,
    )
    .unwrap();

    assert_eq!(report.format, Ecosystem::Kotatsu);
    assert_eq!(report.sources, 2);
    assert_eq!(report.resolvable, 1);
    assert_eq!(
        report.unresolvable.iter().collect::<Vec<_>>(),
        vec!["ELSEWHERE"]
    );
    assert!(report.issues.is_empty());
}

#[test]
fn unknown_extension_is_a_usage_error() {
    let workspace = TestWorkspace::new();

    let result = inspect_file(
        &workspace.path("backup.json"),
        &workspace.table,
        &CorpusNames::default(),
        FallbackPolicy::Disabled,
    );

    assert!(matches!(result, Err(Error::Usage(_))));
}
