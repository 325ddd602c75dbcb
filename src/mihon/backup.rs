use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use prost::Message;

use crate::{error::Error, util::write_atomically};

use super::model::Backup;

/// Reads a `.tachibk` file, gzip-compressed or not.
#[tracing::instrument(name = "load mihon backup", skip_all, fields(path = %path.display()))]
pub fn load_backup(path: &Path) -> Result<Backup, Error> {
    let raw = fs::read(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let backup = decode_backup(&raw)?;

    tracing::info!(
        manga = backup.backup_manga.len(),
        categories = backup.backup_categories.len(),
        sources = backup.backup_sources.len(),
        "Mihon backup loaded"
    );

    Ok(backup)
}

pub fn decode_backup(raw: &[u8]) -> Result<Backup, Error> {
    if is_gzip(raw) {
        let mut data = Vec::new();
        GzDecoder::new(raw)
            .read_to_end(&mut data)
            .map_err(Error::Inflate)?;
        Ok(Backup::decode(data.as_slice())?)
    } else {
        Ok(Backup::decode(raw)?)
    }
}

/// Writes a gzip-compressed `.tachibk` file.
#[tracing::instrument(name = "write mihon backup", skip_all, fields(path = %path.display()))]
pub fn write_backup(path: &Path, backup: &Backup) -> Result<(), Error> {
    let data = backup.encode_to_vec();

    write_atomically(path, |file| {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&data)?;
        encoder.finish()?;
        Ok(())
    })?;

    tracing::info!(bytes = data.len(), "Mihon backup written");

    Ok(())
}

fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}
