//! The per-element cutoff-table catalog (SSSP-style JSON).

use crate::domain::{XsError, XsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub filename: String,
    pub cutoff_wfc: f64,
    pub cutoff_rho: f64,
    /// Integrity hash carried by SSSP-style tables. Parsed and preserved but
    /// never checked against unpacked content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CutoffCatalog(BTreeMap<String, CatalogEntry>);

impl CutoffCatalog {
    /// Loads the catalog file. Absence is the recoverable `MissingConfig`
    /// condition so the resolver can fall through a tier.
    pub fn load(path: &Path) -> XsResult<Self> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(XsError::missing_config(
                    path.to_string_lossy(),
                    "cutoff table does not exist",
                ));
            }
            Err(error) => return Err(XsError::filesystem(path, error)),
        };
        serde_json::from_str(&source).map_err(|source| XsError::parse(path, source))
    }

    pub fn entry(&self, symbol: &str) -> Option<&CatalogEntry> {
        self.0.get(symbol)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.0.iter().map(|(symbol, entry)| (symbol.as_str(), entry))
    }

    pub fn insert(&mut self, symbol: impl Into<String>, entry: CatalogEntry) {
        self.0.insert(symbol.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogEntry, CutoffCatalog};
    use crate::domain::XsError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn catalog_round_trips_through_json() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("cutoffs.json");
        fs::write(
            &path,
            r#"{"Ti": {"filename": "Ti.pbe.upf", "cutoff_wfc": 70.0, "cutoff_rho": 560.0, "md5": "abc123"},
                "O": {"filename": "O.pbe.upf", "cutoff_wfc": 50.0, "cutoff_rho": 400.0}}"#,
        )
        .expect("catalog should be written");

        let catalog = CutoffCatalog::load(&path).expect("catalog should load");
        assert_eq!(catalog.len(), 2);
        let titanium = catalog.entry("Ti").expect("Ti entry should exist");
        assert_eq!(titanium.filename, "Ti.pbe.upf");
        assert_eq!(titanium.cutoff_wfc, 70.0);
        assert_eq!(titanium.md5.as_deref(), Some("abc123"));
        assert_eq!(
            catalog.entry("O").expect("O entry should exist").md5,
            None
        );
    }

    #[test]
    fn absent_catalog_is_a_recoverable_missing_config() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = CutoffCatalog::load(&temp.path().join("nope.json"))
            .expect_err("load should fail");
        assert!(matches!(error, XsError::MissingConfig { .. }));
        assert!(error.is_recoverable());
    }

    #[test]
    fn malformed_catalog_is_a_fatal_parse_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").expect("file should be written");

        let error = CutoffCatalog::load(&path).expect_err("load should fail");
        assert!(matches!(error, XsError::Parse { .. }));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn insert_and_lookup_are_symbol_keyed() {
        let mut catalog = CutoffCatalog::default();
        assert!(catalog.is_empty());
        catalog.insert(
            "Si",
            CatalogEntry {
                filename: "Si.upf".to_string(),
                cutoff_wfc: 30.0,
                cutoff_rho: 240.0,
                md5: None,
            },
        );
        assert_eq!(catalog.entry("Si").map(|entry| entry.cutoff_rho), Some(240.0));
        assert_eq!(catalog.entry("Ge"), None);
    }
}
