use std::path::Path;

use uuid::Uuid;

use crate::{
    convert::{OnUnresolved, kotatsu_to_mihon, mihon_to_kotatsu},
    error::Error,
    kotatsu::{self, KotatsuBackup},
    mihon::{self, Backup},
    source::{
        Ecosystem, FallbackPolicy, MappingTable, NameCorpus, SourceReference, SourceResolver,
        filter::FilterReport, filter_to_common,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    MihonToKotatsu,
    KotatsuToMihon,
}

impl Direction {
    /// Guesses the direction from the input file extension.
    pub fn detect(input: &Path) -> Option<Self> {
        let extension = input.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "zip" => Some(Direction::KotatsuToMihon),
            "tachibk" => Some(Direction::MihonToKotatsu),
            _ => None,
        }
    }

    pub fn target(self) -> Ecosystem {
        match self {
            Direction::MihonToKotatsu => Ecosystem::Kotatsu,
            Direction::KotatsuToMihon => Ecosystem::Mihon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptions {
    pub policy: FallbackPolicy,
    pub on_unresolved: OnUnresolved,
    pub common_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub direction: Direction,
    pub read: usize,
    pub resolved: usize,
    pub written: usize,
    pub categories: usize,
    pub filtered: Option<FilterReport>,
}

/// Load, resolve, filter, map, filter, emit. Single-threaded; every stage
/// runs to completion before the next.
pub struct ConversionPipeline<'a> {
    table: &'a MappingTable,
    corpus: &'a dyn NameCorpus,
    options: PipelineOptions,
}

impl<'a> ConversionPipeline<'a> {
    pub fn new(
        table: &'a MappingTable,
        corpus: &'a dyn NameCorpus,
        options: PipelineOptions,
    ) -> Self {
        ConversionPipeline {
            table,
            corpus,
            options,
        }
    }

    /// Converts `input` into `output`. Nothing is written unless every stage
    /// before emission succeeded.
    pub fn run(
        &self,
        direction: Direction,
        input: &Path,
        output: &Path,
    ) -> Result<ConversionSummary, Error> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "conversion",
            %run_id,
            ?direction,
            input = %input.display(),
            output = %output.display()
        );
        let _guard = span.enter();

        let summary = match direction {
            Direction::MihonToKotatsu => {
                let backup = mihon::load_backup(input)?;
                let (kotatsu, summary) = self.mihon_to_kotatsu(backup);
                kotatsu::write_archive(output, &kotatsu)?;
                summary
            }
            Direction::KotatsuToMihon => {
                let backup = kotatsu::load_archive(input)?;
                let (mihon, summary) = self.kotatsu_to_mihon(&backup)?;
                mihon::write_backup(output, &mihon)?;
                summary
            }
        };

        tracing::info!(
            read = summary.read,
            resolved = summary.resolved,
            written = summary.written,
            categories = summary.categories,
            "Conversion finished"
        );

        Ok(summary)
    }

    fn resolver(&self, direction: Direction) -> SourceResolver<'a> {
        SourceResolver::new(
            self.table,
            self.corpus,
            direction.target(),
            self.options.policy,
        )
    }

    #[tracing::instrument(name = "convert mihon to kotatsu", skip_all)]
    pub fn mihon_to_kotatsu(&self, mut backup: Backup) -> (KotatsuBackup, ConversionSummary) {
        let resolver = self.resolver(Direction::MihonToKotatsu);
        let read = backup.backup_manga.len();

        let resolved = backup
            .backup_manga
            .iter()
            .filter(|manga| {
                resolver
                    .resolve(SourceReference::MihonId {
                        source_id: manga.source,
                        observed_name: backup.source_name(manga.source),
                    })
                    .is_ok()
            })
            .count();
        if resolved < read {
            tracing::info!(
                unresolved = read - resolved,
                "Some manga come from sources without a Kotatsu counterpart"
            );
        }

        let filtered = self
            .options
            .common_only
            .then(|| filter_to_common(&mut backup, resolver.allowed()));

        let kotatsu = mihon_to_kotatsu(&backup);
        let summary = ConversionSummary {
            direction: Direction::MihonToKotatsu,
            read,
            resolved,
            written: kotatsu.favourites.len(),
            categories: kotatsu.categories.len(),
            filtered,
        };

        (kotatsu, summary)
    }

    #[tracing::instrument(name = "convert kotatsu to mihon", skip_all)]
    pub fn kotatsu_to_mihon(
        &self,
        backup: &KotatsuBackup,
    ) -> Result<(Backup, ConversionSummary), Error> {
        let resolver = self.resolver(Direction::KotatsuToMihon);

        let mut mihon = kotatsu_to_mihon(backup, &resolver, self.options.on_unresolved)?;
        let resolved = mihon.backup_manga.len();

        let filtered = self
            .options
            .common_only
            .then(|| filter_to_common(&mut mihon, resolver.allowed()));

        let summary = ConversionSummary {
            direction: Direction::KotatsuToMihon,
            read: backup.favourites.len(),
            resolved,
            written: mihon.backup_manga.len(),
            categories: mihon.backup_categories.len(),
            filtered,
        };

        Ok((mihon, summary))
    }
}
