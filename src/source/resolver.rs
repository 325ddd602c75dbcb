use std::collections::{HashMap, HashSet};

use super::{
    corpus::{CorpusNames, NameCorpus},
    identifier::derive_source_id,
    mapping::{MappingEntry, MappingTable},
};

/// Language and revision used when hashing a raw Kotatsu source name.
const FALLBACK_LANG: &str = "all";
const FALLBACK_REVISION: i32 = 1;

/// The application a backup is being converted for.
#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Mihon,
    Kotatsu,
}

/// Whether unmapped Kotatsu sources may be turned into Mihon ids by hashing
/// their raw name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    #[default]
    Disabled,
    Allowed,
}

impl From<bool> for FallbackPolicy {
    fn from(allow: bool) -> Self {
        if allow {
            FallbackPolicy::Allowed
        } else {
            FallbackPolicy::Disabled
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("No source mapping found for `{reference}`")]
pub struct Unresolvable {
    pub reference: String,
}

/// Mihon source ids considered representable on both sides for one run.
#[derive(Debug, Clone)]
pub struct AllowSet<'t> {
    ids: HashMap<i64, &'t MappingEntry>,
    names: HashSet<String>,
}

impl<'t> AllowSet<'t> {
    /// Admits every table entry whose name for `target` was discovered in the
    /// corpus. When none was, every table entry is admitted.
    pub fn build(table: &'t MappingTable, discovered: &CorpusNames, target: Ecosystem) -> Self {
        let discovered_for_target = match target {
            Ecosystem::Mihon => &discovered.mihon,
            Ecosystem::Kotatsu => &discovered.kotatsu,
        };

        let mut ids: HashMap<i64, &'t MappingEntry> = table
            .entries()
            .filter(|entry| {
                let name = match target {
                    Ecosystem::Mihon => entry.mihon_name.to_lowercase(),
                    Ecosystem::Kotatsu => entry.kotatsu_key.to_lowercase(),
                };
                discovered_for_target.contains(&name)
            })
            .map(|entry| (entry.source_id(), entry))
            .collect();

        if ids.is_empty() {
            tracing::info!(
                ?target,
                "No table entry matched the reference corpus, allowing every known source"
            );
            ids = table
                .entries()
                .map(|entry| (entry.source_id(), entry))
                .collect();
        }

        let names = table
            .entries()
            .map(|entry| entry.mihon_name.to_lowercase())
            .chain(discovered.mihon.iter().cloned())
            .collect();

        AllowSet { ids, names }
    }

    pub fn contains_id(&self, source_id: i64) -> bool {
        source_id != 0 && self.ids.contains_key(&source_id)
    }

    pub fn entry(&self, source_id: i64) -> Option<&'t MappingEntry> {
        if source_id == 0 {
            return None;
        }
        self.ids.get(&source_id).copied()
    }

    pub fn knows_name(&self, name: &str) -> bool {
        !name.trim().is_empty() && self.names.contains(&name.to_lowercase())
    }

    /// Literal id membership, or a case-insensitive match on the source name
    /// recorded for that id. Id 0 is never admitted, whatever its name.
    pub fn admits(&self, source_id: i64, observed_name: Option<&str>) -> bool {
        if source_id == 0 {
            return false;
        }
        self.contains_id(source_id) || observed_name.is_some_and(|name| self.knows_name(name))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A source as referenced by one of the two applications. The numbering
/// spaces are disjoint and only meet through [`SourceResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceReference<'a> {
    /// Mihon source id, with the name the same backup records for it, if any.
    MihonId {
        source_id: i64,
        observed_name: Option<&'a str>,
    },
    /// Kotatsu parser source name.
    KotatsuName(&'a str),
}

impl std::fmt::Display for SourceReference<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceReference::MihonId {
                source_id,
                observed_name: Some(name),
            } => write!(f, "{} ({})", source_id, name),
            SourceReference::MihonId { source_id, .. } => write!(f, "{}", source_id),
            SourceReference::KotatsuName(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'t> {
    /// Verified through a mapping table entry.
    Known(&'t MappingEntry),
    /// Matched only by a discovered Mihon source name.
    Named(String),
    /// Hash of a raw Kotatsu name. May collide with an unrelated catalog.
    Synthesized { name: String, source_id: i64 },
}

impl Resolved<'_> {
    pub fn source_id(&self) -> Option<i64> {
        match self {
            Resolved::Known(entry) => Some(entry.source_id()),
            Resolved::Named(_) => None,
            Resolved::Synthesized { source_id, .. } => Some(*source_id),
        }
    }

    pub fn mihon_name(&self) -> &str {
        match self {
            Resolved::Known(entry) => &entry.mihon_name,
            Resolved::Named(name) => name,
            Resolved::Synthesized { name, .. } => name,
        }
    }

    pub fn kotatsu_key(&self) -> Option<&str> {
        match self {
            Resolved::Known(entry) => Some(&entry.kotatsu_key),
            _ => None,
        }
    }
}

/// Bridges source references between Mihon and Kotatsu for one conversion.
#[derive(Debug, Clone)]
pub struct SourceResolver<'t> {
    table: &'t MappingTable,
    allowed: AllowSet<'t>,
    policy: FallbackPolicy,
}

impl<'t> SourceResolver<'t> {
    pub fn new(
        table: &'t MappingTable,
        corpus: &dyn NameCorpus,
        target: Ecosystem,
        policy: FallbackPolicy,
    ) -> Self {
        let discovered = corpus.discover();
        let allowed = AllowSet::build(table, &discovered, target);

        tracing::debug!(
            ?target,
            ?policy,
            allowed = allowed.len(),
            "Source resolver ready"
        );

        SourceResolver {
            table,
            allowed,
            policy,
        }
    }

    pub fn allowed(&self) -> &AllowSet<'t> {
        &self.allowed
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn resolve(&self, reference: SourceReference<'_>) -> Result<Resolved<'t>, Unresolvable> {
        let resolved = match reference {
            SourceReference::MihonId {
                source_id,
                observed_name,
            } => self.resolve_mihon(source_id, observed_name),
            SourceReference::KotatsuName(name) => self.resolve_kotatsu(name),
        };

        resolved.ok_or_else(|| Unresolvable {
            reference: reference.to_string(),
        })
    }

    fn resolve_mihon(&self, source_id: i64, observed_name: Option<&str>) -> Option<Resolved<'t>> {
        if source_id == 0 {
            return None;
        }
        if let Some(entry) = self.allowed.entry(source_id) {
            return Some(Resolved::Known(entry));
        }

        let name = observed_name.filter(|name| self.allowed.knows_name(name))?;

        Some(match self.table.lookup_by_mihon_name(name) {
            Some(entry) => Resolved::Known(entry),
            None => Resolved::Named(name.to_string()),
        })
    }

    fn resolve_kotatsu(&self, name: &str) -> Option<Resolved<'t>> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        if let Some(entry) = self.table.lookup_by_key(name) {
            return Some(Resolved::Known(entry));
        }

        match self.policy {
            FallbackPolicy::Disabled => None,
            FallbackPolicy::Allowed => {
                let source_id = derive_source_id(name, FALLBACK_LANG, FALLBACK_REVISION);
                tracing::warn!(
                    source = name,
                    source_id,
                    "No mapping for source, synthesizing id from its raw name"
                );
                Some(Resolved::Synthesized {
                    name: name.to_string(),
                    source_id,
                })
            }
        }
    }
}
