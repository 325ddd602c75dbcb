use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// Package fragment preceding `<lang>/<extension>/` in Mihon extension sources.
const MIHON_EXTENSION_FRAGMENT: &str = "/eu/kanade/tachiyomi/extension/";
const KOTATSU_SOURCE_ROOT: &str = "/src/main/kotlin/";
const KOTATSU_SITE_MARKER: &str = "/site/";

/// Source names observed outside of the mapping table, lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusNames {
    pub mihon: BTreeSet<String>,
    pub kotatsu: BTreeSet<String>,
}

impl CorpusNames {
    pub fn new<M, K>(mihon: M, kotatsu: K) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        CorpusNames {
            mihon: mihon.into_iter().map(|n| n.as_ref().to_lowercase()).collect(),
            kotatsu: kotatsu
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mihon.is_empty() && self.kotatsu.is_empty()
    }
}

/// Best-effort source of externally known source names.
///
/// Discovery never fails: an unavailable corpus reports no names.
pub trait NameCorpus {
    fn discover(&self) -> CorpusNames;
}

impl NameCorpus for CorpusNames {
    fn discover(&self) -> CorpusNames {
        self.clone()
    }
}

impl<T: NameCorpus> NameCorpus for Option<T> {
    fn discover(&self) -> CorpusNames {
        match self {
            Some(corpus) => corpus.discover(),
            None => CorpusNames::default(),
        }
    }
}

/// A checkout of the Mihon extension sources and the Kotatsu parsers living
/// under one root directory.
#[derive(Debug, Clone)]
pub struct ReferenceTree {
    root: PathBuf,
}

impl ReferenceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ReferenceTree { root: root.into() }
    }

    /// Uses `configured` when given, otherwise `../../references` relative to
    /// the working directory if it exists.
    pub fn locate(configured: Option<&Path>) -> Option<Self> {
        if let Some(root) = configured {
            return Some(Self::new(root));
        }

        let candidate = std::env::current_dir()
            .ok()?
            .join("..")
            .join("..")
            .join("references");

        candidate.is_dir().then(|| Self::new(candidate))
    }
}

impl NameCorpus for ReferenceTree {
    #[tracing::instrument(
        name = "discover reference names",
        skip_all,
        fields(root = %self.root.display())
    )]
    fn discover(&self) -> CorpusNames {
        let mut names = CorpusNames::default();

        if !self.root.is_dir() {
            tracing::info!("Reference root is not available, using the mapping table only");
            return names;
        }

        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path().to_string_lossy().replace('\\', "/");

            if entry.file_type().is_file() {
                if let Some(name) = mihon_extension_name(&path) {
                    names.mihon.insert(name);
                }
            } else if entry.file_type().is_dir() {
                if let Some(name) = kotatsu_site_name(&path) {
                    names.kotatsu.insert(name);
                }
            }
        }

        tracing::info!(
            mihon = names.mihon.len(),
            kotatsu = names.kotatsu.len(),
            "Reference names discovered"
        );

        names
    }
}

/// `.../eu/kanade/tachiyomi/extension/en/mangadex/MangaDex.kt` -> `mangadex`
fn mihon_extension_name(path: &str) -> Option<String> {
    if !path.ends_with(".kt") {
        return None;
    }

    let (_, rest) = path.split_once(MIHON_EXTENSION_FRAGMENT)?;
    let segments: Vec<&str> = rest.split('/').collect();

    // lang dir, extension dir and at least the file itself
    if segments.len() < 3 || segments[1].is_empty() {
        return None;
    }

    Some(segments[1].to_lowercase())
}

/// `.../src/main/kotlin/org/koitharu/kotatsu/parsers/site/mangadex` -> `mangadex`
fn kotatsu_site_name(path: &str) -> Option<String> {
    if !path.contains(KOTATSU_SOURCE_ROOT) {
        return None;
    }

    let (_, rest) = path.split_once(KOTATSU_SITE_MARKER)?;
    let segment = rest.split('/').next()?;

    (!segment.is_empty()).then(|| segment.to_lowercase())
}
