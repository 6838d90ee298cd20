//! Layered pseudopotential resolution.
//!
//! Three ordered tiers: direct copy from the asset directory, unpack from the
//! packed archive, placeholder filenames. Each tier falls through to the next
//! on a recoverable missing-asset condition; the outcome is a per-call value,
//! so a degraded call never poisons later ones.

pub mod catalog;
pub mod codec;

mod corehole;
mod indexer;

pub use corehole::inject_core_hole;
pub use indexer::absorber_index;

use crate::domain::{Diagnostic, XsResult};
use crate::modules::helpers::copy_asset;
use catalog::CutoffCatalog;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Filesystem locations of the pseudopotential assets. All optional; anything
/// unconfigured short-circuits resolution to the placeholder tier.
#[derive(Debug, Clone, Default)]
pub struct PspAssets {
    pub psp_directory: Option<PathBuf>,
    pub cutoff_table: Option<String>,
    pub archive: Option<String>,
    pub chpsp_directory: Option<PathBuf>,
}

/// Default wavefunction/charge-density cutoffs supplied by the caller.
/// Resolution only ever raises them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffPair {
    pub ecutwfc: f64,
    pub ecutrho: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    Direct,
    Archive,
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct PspResolution {
    pub pseudo: BTreeMap<String, String>,
    pub cutoffs: CutoffPair,
    pub tier: ResolutionTier,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves pseudopotential filenames and cutoffs for the given element
/// symbols, copying or unpacking asset files into `target_dir`.
pub fn resolve(
    assets: &PspAssets,
    defaults: CutoffPair,
    symbols: &[String],
    target_dir: &Path,
) -> XsResult<PspResolution> {
    let mut diagnostics = Vec::new();

    match (&assets.psp_directory, &assets.cutoff_table) {
        (Some(directory), Some(table)) => {
            match resolve_direct(directory, table, defaults, symbols, target_dir) {
                Ok(resolution) => return Ok(resolution),
                Err(error) if error.is_recoverable() => {
                    tracing::warn!(%error, "direct pseudopotential lookup failed");
                    diagnostics.push(Diagnostic::new("psp.direct", error.to_string()));
                }
                Err(error) => return Err(error),
            }

            if let Some(archive) = &assets.archive {
                match resolve_archive(directory, table, archive, defaults, symbols, target_dir) {
                    Ok(mut resolution) => {
                        resolution.diagnostics.splice(0..0, diagnostics);
                        return Ok(resolution);
                    }
                    Err(error) if error.is_recoverable() => {
                        tracing::warn!(%error, "archive pseudopotential unpack failed");
                        diagnostics.push(Diagnostic::new("psp.archive", error.to_string()));
                    }
                    Err(error) => return Err(error),
                }
            }
        }
        _ => {
            tracing::warn!(
                "pseudopotential directory or cutoff table not configured; \
                 neutral pseudopotential files will not be written"
            );
            diagnostics.push(Diagnostic::new(
                "psp.assets",
                "pseudopotential directory or cutoff table not configured; \
                 neutral pseudopotential files will not be written",
            ));
        }
    }

    Ok(resolve_placeholder(defaults, symbols, diagnostics))
}

fn resolve_direct(
    directory: &Path,
    table: &str,
    defaults: CutoffPair,
    symbols: &[String],
    target_dir: &Path,
) -> XsResult<PspResolution> {
    let catalog = CutoffCatalog::load(&directory.join(table))?;
    let mut pseudo = BTreeMap::new();
    let mut cutoffs = defaults;

    for symbol in symbols {
        if pseudo.contains_key(symbol) {
            continue;
        }
        let entry = catalog.entry(symbol).ok_or_else(|| {
            crate::domain::XsError::missing_asset(symbol, "symbol has no cutoff-table entry")
        })?;
        copy_asset(
            &directory.join(&entry.filename),
            &target_dir.join(&entry.filename),
        )?;
        pseudo.insert(symbol.clone(), entry.filename.clone());
        raise_cutoffs(&mut cutoffs, entry.cutoff_wfc, entry.cutoff_rho);
    }

    Ok(PspResolution {
        pseudo,
        cutoffs,
        tier: ResolutionTier::Direct,
        diagnostics: Vec::new(),
    })
}

fn resolve_archive(
    directory: &Path,
    table: &str,
    archive_name: &str,
    defaults: CutoffPair,
    symbols: &[String],
    target_dir: &Path,
) -> XsResult<PspResolution> {
    let catalog = CutoffCatalog::load(&directory.join(table))?;
    let archive = codec::load_archive(&directory.join(archive_name))?;
    let pseudo = codec::unpack(&archive, &catalog, symbols, target_dir)?;

    let mut cutoffs = defaults;
    for symbol in pseudo.keys() {
        if let Some(entry) = catalog.entry(symbol) {
            raise_cutoffs(&mut cutoffs, entry.cutoff_wfc, entry.cutoff_rho);
        }
    }

    Ok(PspResolution {
        pseudo,
        cutoffs,
        tier: ResolutionTier::Archive,
        diagnostics: Vec::new(),
    })
}

fn resolve_placeholder(
    defaults: CutoffPair,
    symbols: &[String],
    diagnostics: Vec<Diagnostic>,
) -> PspResolution {
    let pseudo = symbols
        .iter()
        .map(|symbol| (symbol.clone(), format!("{symbol}.upf")))
        .collect();
    PspResolution {
        pseudo,
        cutoffs: defaults,
        tier: ResolutionTier::Placeholder,
        diagnostics,
    }
}

fn raise_cutoffs(cutoffs: &mut CutoffPair, cutoff_wfc: f64, cutoff_rho: f64) {
    cutoffs.ecutwfc = cutoffs.ecutwfc.max(cutoff_wfc);
    cutoffs.ecutrho = cutoffs.ecutrho.max(cutoff_rho);
}
