use std::{
    fs::File,
    io::{Read, Seek, Write},
    path::Path,
};

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::{error::Error, util::write_atomically};

use super::model::KotatsuBackup;

pub const FAVOURITES: &str = "favourites";
pub const CATEGORIES: &str = "categories";
pub const HISTORY: &str = "history";
pub const BOOKMARKS: &str = "bookmarks";
pub const INDEX: &str = "index";
pub const SETTINGS: &str = "settings";
pub const READER_GRID: &str = "reader_grid";
pub const SOURCES: &str = "sources";

/// Reads a Kotatsu backup zip. Missing members stay empty, unknown members
/// are ignored.
#[tracing::instrument(name = "load kotatsu backup", skip_all, fields(path = %path.display()))]
pub fn load_archive(path: &Path) -> Result<KotatsuBackup, Error> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let backup = read_archive(file)?;

    tracing::info!(
        favourites = backup.favourites.len(),
        categories = backup.categories.len(),
        history = backup.history.len(),
        bookmarks = backup.bookmarks.len(),
        index = backup.index.len(),
        "Kotatsu backup loaded"
    );

    Ok(backup)
}

pub fn read_archive<R: Read + Seek>(reader: R) -> Result<KotatsuBackup, Error> {
    let mut archive = ZipArchive::new(reader).map_err(Error::Archive)?;
    let mut backup = KotatsuBackup::default();

    for i in 0..archive.len() {
        let mut member = archive.by_index(i).map_err(Error::Archive)?;
        let name = member.name().to_string();

        match name.as_str() {
            FAVOURITES => backup.favourites = decode_member(&mut member, FAVOURITES)?,
            CATEGORIES => backup.categories = decode_member(&mut member, CATEGORIES)?,
            HISTORY => backup.history = decode_member(&mut member, HISTORY)?,
            BOOKMARKS => backup.bookmarks = decode_member(&mut member, BOOKMARKS)?,
            INDEX => backup.index = decode_member(&mut member, INDEX)?,
            SETTINGS => backup.settings = Some(read_raw(&mut member, SETTINGS)?),
            READER_GRID => backup.reader_grid = Some(read_raw(&mut member, READER_GRID)?),
            SOURCES => backup.sources = Some(read_raw(&mut member, SOURCES)?),
            other => tracing::debug!(member = other, "Skipping unknown archive member"),
        }
    }

    Ok(backup)
}

fn decode_member<T: DeserializeOwned>(
    reader: &mut impl Read,
    member: &'static str,
) -> Result<Vec<T>, Error> {
    serde_json::from_reader(reader).map_err(|source| Error::Member { member, source })
}

fn read_raw(reader: &mut impl Read, member: &'static str) -> Result<Vec<u8>, Error> {
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(|source| Error::ReadMember { member, source })?;
    Ok(raw)
}

/// Writes a Kotatsu backup zip. `favourites` and `categories` are always
/// present; other sections only when they hold data.
#[tracing::instrument(name = "write kotatsu backup", skip_all, fields(path = %path.display()))]
pub fn write_archive(path: &Path, backup: &KotatsuBackup) -> Result<(), Error> {
    write_atomically(path, |file| {
        write_members(file, backup)?;
        Ok(())
    })?;

    tracing::info!(
        favourites = backup.favourites.len(),
        categories = backup.categories.len(),
        "Kotatsu backup written"
    );

    Ok(())
}

pub fn write_members<W: Write + Seek>(writer: W, backup: &KotatsuBackup) -> anyhow::Result<W> {
    let mut zip = ZipWriter::new(writer);

    write_member(&mut zip, FAVOURITES, &backup.favourites)?;
    write_member(&mut zip, CATEGORIES, &backup.categories)?;

    if !backup.history.is_empty() {
        write_member(&mut zip, HISTORY, &backup.history)?;
    }
    if !backup.bookmarks.is_empty() {
        write_member(&mut zip, BOOKMARKS, &backup.bookmarks)?;
    }
    if !backup.index.is_empty() {
        write_member(&mut zip, INDEX, &backup.index)?;
    }

    for (name, raw) in [
        (SETTINGS, &backup.settings),
        (READER_GRID, &backup.reader_grid),
        (SOURCES, &backup.sources),
    ] {
        if let Some(raw) = raw {
            zip.start_file(name, SimpleFileOptions::default())
                .with_context(|| format!("Failed to start `{}` member", name))?;
            zip.write_all(raw)
                .with_context(|| format!("Failed to copy `{}` member", name))?;
        }
    }

    zip.finish().context("Failed to finish archive")
}

fn write_member<W: Write + Seek, T: Serialize>(
    zip: &mut ZipWriter<W>,
    name: &str,
    value: &T,
) -> anyhow::Result<()> {
    zip.start_file(name, SimpleFileOptions::default())
        .with_context(|| format!("Failed to start `{}` member", name))?;
    serde_json::to_writer(&mut *zip, value)
        .with_context(|| format!("Failed to serialize `{}` member", name))?;
    Ok(())
}
