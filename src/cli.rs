//! Command-line surface of the converter.

use std::{io::Write, path::{Path, PathBuf}};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::{
    configuration::{Config, read_config},
    error::Error,
    inspect::{inspect_file, mapping_rows},
    pipeline::{ConversionPipeline, Direction, PipelineOptions},
    source::{MappingTable, ReferenceTree},
};

/// Convert manga library backups between Mihon and Kotatsu
#[derive(Parser, Debug)]
#[command(name = "rustatsu-bkconv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Hash unmapped Kotatsu sources into Mihon ids instead of skipping them
    #[arg(long, global = true)]
    pub allow_fallback: bool,

    /// Fail on the first source that cannot be mapped
    #[arg(long, global = true)]
    pub strict: bool,

    /// Keep only entries whose source exists in both applications
    #[arg(long, global = true)]
    pub common_only: bool,

    /// Root of the Mihon extension and Kotatsu parser checkouts
    #[arg(long, global = true, value_name = "DIR")]
    pub references: Option<PathBuf>,

    /// Extra mapping table merged over the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Directory holding base.yaml
    #[arg(long, global = true, value_name = "DIR", env = "BKCONV_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Backup to read (.tachibk or .zip)
    #[arg(long = "in", global = true, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Where to write the converted backup
    #[arg(long = "out", global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Detected from the --in extension when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Convert a Mihon .tachibk into a Kotatsu .zip
    MihonToKotatsu,
    /// Convert a Kotatsu .zip into a Mihon .tachibk
    KotatsuToMihon,
    /// Report counts, common issues and source coverage of a backup
    Inspect,
    /// List the known source mappings with their Mihon ids
    Mappings,
}

impl Cli {
    /// Flags only ever switch settings on; paths replace configured ones.
    pub fn apply(&self, config: &mut Config) {
        config.conversion.allow_fallback |= self.allow_fallback;
        config.conversion.strict |= self.strict;
        config.conversion.common_only |= self.common_only;

        if let Some(references) = &self.references {
            config.references.root = Some(references.clone());
        }
        if let Some(mapping) = &self.mapping {
            config.mapping.table = Some(mapping.clone());
        }
    }

    fn required_input(&self) -> Result<&Path, Error> {
        self.input
            .as_deref()
            .ok_or_else(|| Error::Usage("--in is required".to_string()))
    }

    fn required_output(&self) -> Result<&Path, Error> {
        self.output
            .as_deref()
            .ok_or_else(|| Error::Usage("--out is required".to_string()))
    }
}

pub fn run(cli: Cli) -> Result<(), Error> {
    let mut config = read_config(cli.config.as_deref())?;
    cli.apply(&mut config);

    let table = MappingTable::load(config.mapping.table.as_deref())?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            let input = cli.required_input()?;
            match Direction::detect(input) {
                Some(Direction::MihonToKotatsu) => Command::MihonToKotatsu,
                Some(Direction::KotatsuToMihon) => Command::KotatsuToMihon,
                None => {
                    return Err(Error::Usage(format!(
                        "cannot detect the conversion direction of {}, pass a command",
                        input.display()
                    )));
                }
            }
        }
    };

    let corpus = ReferenceTree::locate(config.references.root.as_deref());
    if corpus.is_none() {
        tracing::debug!("No reference corpus configured or found");
    }

    let options = PipelineOptions {
        policy: config.conversion.allow_fallback.into(),
        on_unresolved: config.conversion.strict.into(),
        common_only: config.conversion.common_only,
    };

    match command {
        Command::Mappings => print_json(&mapping_rows(&table)),
        Command::Inspect => {
            let report = inspect_file(cli.required_input()?, &table, &corpus, options.policy)?;
            print_json(&report)
        }
        Command::MihonToKotatsu | Command::KotatsuToMihon => {
            let direction = if command == Command::MihonToKotatsu {
                Direction::MihonToKotatsu
            } else {
                Direction::KotatsuToMihon
            };
            let input = cli.required_input()?;
            let output = cli.required_output()?;

            let pipeline = ConversionPipeline::new(&table, &corpus, options);
            let summary = pipeline.run(direction, input, output)?;

            println!(
                "Wrote {} of {} entries and {} categories to {}",
                summary.written,
                summary.read,
                summary.categories,
                output.display()
            );
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Error> {
    let mut stdout = std::io::stdout().lock();

    serde_json::to_writer_pretty(&mut stdout, value)
        .context("Failed to serialize report")
        .and_then(|_| writeln!(stdout).context("Failed to write report"))
        .map_err(|source| Error::Write {
            path: PathBuf::from("-"),
            source,
        })
}
