use std::{collections::BTreeMap, path::Path};

use figment::{
    Figment,
    providers::{Format, Yaml},
};
use serde_aux::field_attributes::deserialize_number_from_string;
use validator::Validate;

use crate::error::Error;

use super::identifier::derive_source_id;

const BUILTIN_TABLE: &str = include_str!("../../configuration/sources.yaml");

#[derive(serde::Deserialize, Debug)]
struct TableFile {
    #[serde(default)]
    sources: BTreeMap<String, MappingRecord>,
}

#[derive(serde::Deserialize, Validate, Debug, Clone)]
struct MappingRecord {
    #[validate(length(min = 1))]
    mihon_name: String,
    #[serde(default = "default_lang")]
    #[validate(length(min = 1))]
    lang: String,
    #[serde(
        default = "default_revision",
        deserialize_with = "deserialize_number_from_string"
    )]
    #[validate(range(min = 1))]
    revision: i32,
    #[serde(default)]
    notes: Option<String>,
}

fn default_lang() -> String {
    "all".to_string()
}

fn default_revision() -> i32 {
    1
}

/// One known correspondence between a Kotatsu parser source and a Mihon
/// extension source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub kotatsu_key: String,
    pub mihon_name: String,
    pub lang: String,
    pub revision: i32,
    pub notes: Option<String>,
}

impl MappingEntry {
    pub fn source_id(&self) -> i64 {
        derive_source_id(&self.mihon_name, &self.lang, self.revision)
    }
}

/// Immutable table of known source correspondences, keyed by Kotatsu source
/// name (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: BTreeMap<String, MappingEntry>,
}

impl MappingTable {
    /// The table shipped in `configuration/sources.yaml`.
    pub fn builtin() -> Result<Self, Error> {
        Self::from_yaml(BUILTIN_TABLE)
    }

    /// Built-in table with entries from `extra` merged over it.
    #[tracing::instrument(name = "load mapping table", skip_all)]
    pub fn load(extra: Option<&Path>) -> Result<Self, Error> {
        let mut figment = Figment::new().merge(Yaml::string(BUILTIN_TABLE));

        if let Some(path) = extra {
            if !path.is_file() {
                return Err(Error::Usage(format!(
                    "mapping table {} does not exist",
                    path.display()
                )));
            }
            tracing::info!(path = %path.display(), "Merging user mapping table");
            figment = figment.merge(Yaml::file(path));
        }

        let table = Self::from_file(figment.extract()?)?;
        tracing::debug!(entries = table.len(), "Mapping table loaded");

        Ok(table)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Self::from_file(Figment::from(Yaml::string(yaml)).extract()?)
    }

    fn from_file(file: TableFile) -> Result<Self, Error> {
        let mut entries = BTreeMap::new();

        for (key, record) in file.sources {
            if key.trim().is_empty() {
                return Err(Error::Usage(
                    "mapping table contains an empty source key".to_string(),
                ));
            }
            record.validate().map_err(|errors| Error::Validation {
                key: key.clone(),
                errors,
            })?;

            entries.insert(
                key.to_uppercase(),
                MappingEntry {
                    kotatsu_key: key,
                    mihon_name: record.mihon_name,
                    lang: record.lang,
                    revision: record.revision,
                    notes: record.notes,
                },
            );
        }

        Ok(MappingTable { entries })
    }

    pub fn lookup_by_key(&self, key: &str) -> Option<&MappingEntry> {
        self.entries.get(&key.to_uppercase())
    }

    pub fn lookup_by_mihon_name(&self, name: &str) -> Option<&MappingEntry> {
        let name = name.to_lowercase();
        self.entries
            .values()
            .find(|entry| entry.mihon_name.to_lowercase() == name)
    }

    /// All entries, ordered by key.
    pub fn entries(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
