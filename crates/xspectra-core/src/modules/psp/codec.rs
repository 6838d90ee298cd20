//! Pack/unpack codec for pseudopotential archives.
//!
//! An archive is one JSON object mapping filename to
//! `base64(bzip2(content))`. Only UTF-8 text assets are supported; entries
//! are content-addressed by filename alone. Unpacking is partial: only the
//! files needed for the requested symbols are materialized.

use super::catalog::CutoffCatalog;
use crate::domain::{XsError, XsResult};
use crate::modules::helpers::write_text_artifact;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bzip2::Compression;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

pub type Archive = BTreeMap<String, String>;

pub fn encode_entry(name: &str, content: &str) -> XsResult<String> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(content.as_bytes())
        .and_then(|_| encoder.finish())
        .map(|compressed| BASE64.encode(compressed))
        .map_err(|error| XsError::codec(name, format!("compression failed: {error}")))
}

pub fn decode_entry(name: &str, encoded: &str) -> XsResult<String> {
    let compressed = BASE64
        .decode(encoded)
        .map_err(|error| XsError::codec(name, format!("base64 decode failed: {error}")))?;
    let mut decoder = BzDecoder::new(compressed.as_slice());
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .map_err(|error| XsError::codec(name, format!("decompression failed: {error}")))?;
    Ok(content)
}

/// Packs every catalog entry read from `psp_dir` into an archive value.
/// Deterministic for identical inputs: entries are keyed and serialized in
/// filename order, and the compression parameters are fixed.
pub fn pack(psp_dir: &Path, catalog: &CutoffCatalog) -> XsResult<Archive> {
    let mut archive = Archive::new();
    for (_, entry) in catalog.entries() {
        let source = psp_dir.join(&entry.filename);
        let content = match fs::read_to_string(&source) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(XsError::missing_asset(
                    source.to_string_lossy(),
                    "pseudopotential file does not exist",
                ));
            }
            Err(error) => return Err(XsError::filesystem(&source, error)),
        };
        archive.insert(entry.filename.clone(), encode_entry(&entry.filename, &content)?);
    }
    Ok(archive)
}

pub fn pack_to_file(psp_dir: &Path, catalog: &CutoffCatalog, output: &Path) -> XsResult<()> {
    let archive = pack(psp_dir, catalog)?;
    let rendered = serde_json::to_string(&archive)
        .map_err(|source| XsError::parse(output, source))?;
    write_text_artifact(output, &rendered)
}

/// Loads an archive file. Absence is the recoverable `MissingConfig`
/// condition used for tier fall-through.
pub fn load_archive(path: &Path) -> XsResult<Archive> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(XsError::missing_config(
                path.to_string_lossy(),
                "packed pseudopotential archive does not exist",
            ));
        }
        Err(error) => return Err(XsError::filesystem(path, error)),
    };
    serde_json::from_str(&source).map_err(|source| XsError::parse(path, source))
}

/// Materializes the files needed for `symbols` into `destination`, returning
/// the symbol-to-filename mapping of what was written. A symbol without a
/// catalog entry, or a filename without an archive entry, is `MissingAsset`.
pub fn unpack(
    archive: &Archive,
    catalog: &CutoffCatalog,
    symbols: &[String],
    destination: &Path,
) -> XsResult<BTreeMap<String, String>> {
    let mut written = BTreeMap::new();
    for symbol in symbols {
        if written.contains_key(symbol) {
            continue;
        }
        let entry = catalog.entry(symbol).ok_or_else(|| {
            XsError::missing_asset(symbol, "symbol has no cutoff-table entry")
        })?;
        let encoded = archive.get(&entry.filename).ok_or_else(|| {
            XsError::missing_asset(&entry.filename, "archive has no entry for this filename")
        })?;
        let content = decode_entry(&entry.filename, encoded)?;
        write_text_artifact(&destination.join(&entry.filename), &content)?;
        written.insert(symbol.clone(), entry.filename.clone());
    }
    Ok(written)
}
