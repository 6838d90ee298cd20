pub mod errors;

pub use errors::{XsError, XsResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One atomic site: a species label and fractional coordinates.
///
/// The label is normally a bare element symbol; during excited-state deck
/// rendering a derived structure carries the ionized label (`"Ti+"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub species: String,
    pub frac_coords: [f64; 3],
}

/// An immutable crystal structure: lattice rows in angstrom plus ordered sites.
///
/// Generation never mutates a structure in place; per-site ionized rendering
/// goes through [`Structure::with_species_at`], which derives a fresh copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub lattice: [[f64; 3]; 3],
    pub sites: Vec<Site>,
}

impl Structure {
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn site(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    /// Species labels of every site, in site order.
    pub fn species_labels(&self) -> Vec<String> {
        self.sites.iter().map(|site| site.species.clone()).collect()
    }

    /// Distinct species labels in order of first appearance.
    pub fn distinct_species(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for site in &self.sites {
            if !seen.contains(&site.species) {
                seen.push(site.species.clone());
            }
        }
        seen
    }

    /// Derives a copy with the species label at `index` replaced.
    pub fn with_species_at(&self, index: usize, label: &str) -> Option<Structure> {
        let mut derived = self.clone();
        let site = derived.sites.get_mut(index)?;
        site.species = label.to_string();
        Some(derived)
    }
}

/// Strips the ionization marker from a species label (`"Ti+"` -> `"Ti"`).
pub fn bare_element(label: &str) -> &str {
    label.trim_end_matches('+')
}

/// Photon polarization variant for one XANES deck.
#[derive(Debug, Clone, PartialEq)]
pub enum Polarization {
    Dipole {
        direction: [f64; 3],
        weight: f64,
    },
    Quadrupole {
        direction: [f64; 3],
        k_vector: [f64; 3],
        weight: f64,
    },
}

impl Polarization {
    /// The canonical triplet: one dipole along each axis, equal weight.
    pub fn canonical_dipoles() -> Vec<Polarization> {
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
            .into_iter()
            .map(|direction| Polarization::Dipole {
                direction,
                weight: 1.0,
            })
            .collect()
    }

    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Dipole { .. } => "dipole",
            Self::Quadrupole { .. } => "quadrupole",
        }
    }

    pub const fn direction(&self) -> [f64; 3] {
        match self {
            Self::Dipole { direction, .. } | Self::Quadrupole { direction, .. } => *direction,
        }
    }

    pub const fn weight(&self) -> f64 {
        match self {
            Self::Dipole { weight, .. } | Self::Quadrupole { weight, .. } => *weight,
        }
    }

    pub const fn k_vector(&self) -> Option<[f64; 3]> {
        match self {
            Self::Dipole { .. } => None,
            Self::Quadrupole { k_vector, .. } => Some(*k_vector),
        }
    }
}

/// Everything one generation call consumes. The structure, the requested site
/// indices in the expanded cell, the expanded-to-underlying index map, the
/// target directory, and the polarization set to fan out over.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub structure: Structure,
    pub sites: Vec<usize>,
    pub index_map: BTreeMap<usize, usize>,
    pub target_dir: PathBuf,
    pub polarizations: Vec<Polarization>,
}

impl GenerationRequest {
    /// Builds a request with an identity index map and the canonical dipole
    /// triplet.
    pub fn new(
        structure: Structure,
        sites: Vec<usize>,
        target_dir: impl Into<PathBuf>,
    ) -> Self {
        let index_map = sites.iter().map(|&site| (site, site)).collect();
        Self {
            structure,
            sites,
            index_map,
            target_dir: target_dir.into(),
            polarizations: Polarization::canonical_dipoles(),
        }
    }

    pub fn with_index_map(mut self, index_map: BTreeMap<usize, usize>) -> Self {
        self.index_map = index_map;
        self
    }

    pub fn with_polarizations(mut self, polarizations: Vec<Polarization>) -> Self {
        self.polarizations = polarizations;
        self
    }
}

/// A non-fatal degradation notice raised during resolution or injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub key: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Status record returned by one generation call. Every diagnostic raised
/// while resolving or injecting assets lands in `errors`; `pass` is true only
/// when that map is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub pass: bool,
    pub errors: BTreeMap<String, String>,
}

impl GenerationReport {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let errors: BTreeMap<String, String> = diagnostics
            .into_iter()
            .map(|diagnostic| (diagnostic.key, diagnostic.message))
            .collect();
        Self {
            pass: errors.is_empty(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationReport, Diagnostic, Polarization, Site, Structure};

    fn two_atom_structure() -> Structure {
        Structure {
            lattice: [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]],
            sites: vec![
                Site {
                    species: "Ti".to_string(),
                    frac_coords: [0.0, 0.0, 0.0],
                },
                Site {
                    species: "O".to_string(),
                    frac_coords: [0.5, 0.5, 0.5],
                },
            ],
        }
    }

    #[test]
    fn derived_ionized_copy_leaves_original_untouched() {
        let structure = two_atom_structure();
        let derived = structure
            .with_species_at(0, "Ti+")
            .expect("index should be in bounds");

        assert_eq!(derived.sites[0].species, "Ti+");
        assert_eq!(structure.sites[0].species, "Ti");
        assert_eq!(structure.species_labels(), vec!["Ti", "O"]);
    }

    #[test]
    fn out_of_bounds_derivation_is_rejected() {
        assert!(two_atom_structure().with_species_at(5, "Ti+").is_none());
    }

    #[test]
    fn distinct_species_preserve_first_appearance_order() {
        let mut structure = two_atom_structure();
        structure.sites.push(Site {
            species: "Ti".to_string(),
            frac_coords: [0.5, 0.0, 0.0],
        });
        assert_eq!(structure.distinct_species(), vec!["Ti", "O"]);
    }

    #[test]
    fn canonical_dipole_triplet_has_axis_directions_and_equal_weight() {
        let triplet = Polarization::canonical_dipoles();
        assert_eq!(triplet.len(), 3);
        assert_eq!(triplet[0].direction(), [1.0, 0.0, 0.0]);
        assert_eq!(triplet[2].direction(), [0.0, 0.0, 1.0]);
        assert!(triplet.iter().all(|pol| pol.weight() == 1.0));
        assert!(triplet.iter().all(|pol| pol.k_vector().is_none()));
    }

    #[test]
    fn report_passes_only_without_diagnostics() {
        assert!(GenerationReport::from_diagnostics(Vec::new()).pass);

        let degraded = GenerationReport::from_diagnostics(vec![Diagnostic::new(
            "psp.assets",
            "pseudopotential directory not configured",
        )]);
        assert!(!degraded.pass);
        assert_eq!(degraded.errors.len(), 1);
    }
}
