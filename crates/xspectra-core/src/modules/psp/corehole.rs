//! Core-hole pseudopotential injection for the absorbing element.

use crate::domain::{Diagnostic, XsResult};
use crate::modules::helpers::copy_asset;
use std::collections::BTreeMap;
use std::path::Path;

/// Extends the resolved mapping with the ionized entry
/// `"{element}+" -> "{element}.fch.upf"` and copies the two conventionally
/// named core-hole assets into the target directory.
///
/// The mapping entry stays registered even when the asset files are missing;
/// the rendered decks will still cite it. That dangling reference is the
/// documented degradation path, surfaced through the returned diagnostics.
pub fn inject_core_hole(
    pseudo: &mut BTreeMap<String, String>,
    element: &str,
    chpsp_directory: Option<&Path>,
    target_dir: &Path,
) -> XsResult<Vec<Diagnostic>> {
    pseudo.insert(format!("{element}+"), format!("{element}.fch.upf"));

    let mut diagnostics = Vec::new();
    let Some(directory) = chpsp_directory else {
        tracing::warn!(
            element,
            "core-hole directory not configured; core-hole files will not be written"
        );
        diagnostics.push(Diagnostic::new(
            "corehole.assets",
            "core-hole directory not configured; core-hole files will not be written",
        ));
        return Ok(diagnostics);
    };

    for name in [format!("{element}.fch.upf"), format!("Core_{element}.wfc")] {
        match copy_asset(&directory.join(&name), &target_dir.join(&name)) {
            Ok(()) => {}
            Err(error) if error.is_recoverable() => {
                tracing::warn!(asset = %name, directory = %directory.display(), "core-hole asset missing");
                diagnostics.push(Diagnostic::new(format!("corehole.{name}"), error.to_string()));
            }
            Err(error) => return Err(error),
        }
    }

    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::inject_core_hole;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn ionized_entry_is_registered_without_a_configured_directory() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut pseudo = BTreeMap::from([("Ti".to_string(), "Ti.pbe.upf".to_string())]);

        let diagnostics = inject_core_hole(&mut pseudo, "Ti", None, temp.path())
            .expect("injection should succeed");

        assert_eq!(pseudo.get("Ti+").map(String::as_str), Some("Ti.fch.upf"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key, "corehole.assets");
    }

    #[test]
    fn configured_directory_copies_both_conventional_files() {
        let temp = TempDir::new().expect("tempdir should be created");
        let chpsp = temp.path().join("chpsp");
        let target = temp.path().join("target");
        fs::create_dir_all(&chpsp).expect("chpsp dir should be created");
        fs::create_dir_all(&target).expect("target dir should be created");
        fs::write(chpsp.join("Ti.fch.upf"), "ionized potential\n").expect("write");
        fs::write(chpsp.join("Core_Ti.wfc"), "core wavefunction\n").expect("write");

        let mut pseudo = BTreeMap::new();
        let diagnostics = inject_core_hole(&mut pseudo, "Ti", Some(&chpsp), &target)
            .expect("injection should succeed");

        assert!(diagnostics.is_empty());
        assert!(target.join("Ti.fch.upf").is_file());
        assert!(target.join("Core_Ti.wfc").is_file());
    }

    #[test]
    fn missing_source_files_degrade_but_keep_the_mapping_entry() {
        let temp = TempDir::new().expect("tempdir should be created");
        let chpsp = temp.path().join("chpsp");
        let target = temp.path().join("target");
        fs::create_dir_all(&chpsp).expect("chpsp dir should be created");
        fs::create_dir_all(&target).expect("target dir should be created");
        fs::write(chpsp.join("Ti.fch.upf"), "ionized potential\n").expect("write");

        let mut pseudo = BTreeMap::new();
        let diagnostics = inject_core_hole(&mut pseudo, "Ti", Some(&chpsp), &target)
            .expect("injection should succeed");

        assert_eq!(pseudo.get("Ti+").map(String::as_str), Some("Ti.fch.upf"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key, "corehole.Core_Ti.wfc");
        assert!(target.join("Ti.fch.upf").is_file());
        assert!(!target.join("Core_Ti.wfc").exists());
    }
}
