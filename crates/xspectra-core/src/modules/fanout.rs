//! Directory fan-out: one generation call turns a structure, a site list,
//! and the merged cards into the full input-deck tree.
//!
//! All per-call state lives in local values: the cards snapshot, the resolved
//! pseudopotential mapping, and the derived ionized structure copies. The
//! caller's structure and the stored configuration are never mutated.

use crate::common::cards::{CardValue, Cards, ConfigStore};
use crate::common::kpoints::{FullCellProbe, KpointEstimator, KpointMesh, PrimitiveCellProbe};
use crate::domain::{Diagnostic, GenerationReport, GenerationRequest, XsError, XsResult};
use crate::modules::deck::{
    EXCITED_STATE_DECK, GROUND_STATE_DECK, PwDeck, WEIGHT_ARTIFACT, XANES_DECK, XanesDeck,
    render_pw_deck, render_xanes_deck,
};
use crate::modules::helpers::{create_dir_tree, write_text_artifact};
use crate::modules::psp::{CutoffPair, PspAssets, absorber_index, inject_core_hole, resolve};

const DEFAULT_EDGE: &str = "K";
const DEFAULT_CONV_PER_ATOM: f64 = 1.0e-10;

pub struct Generator {
    store: ConfigStore,
    assets: PspAssets,
    edge: String,
    conv_per_atom: f64,
    estimator: Box<dyn KpointEstimator>,
    probe: Box<dyn PrimitiveCellProbe>,
}

impl Generator {
    pub fn new(assets: PspAssets, estimator: Box<dyn KpointEstimator>) -> Self {
        Self {
            store: ConfigStore::new(),
            assets,
            edge: DEFAULT_EDGE.to_string(),
            conv_per_atom: DEFAULT_CONV_PER_ATOM,
            estimator,
            probe: Box::new(FullCellProbe),
        }
    }

    pub fn with_overrides(mut self, overrides: &Cards) -> Self {
        self.store = ConfigStore::with_overrides(overrides);
        self
    }

    pub fn with_edge(mut self, edge: impl Into<String>) -> Self {
        self.edge = edge.into();
        self
    }

    pub fn with_conv_per_atom(mut self, conv_per_atom: f64) -> Self {
        self.conv_per_atom = conv_per_atom;
        self
    }

    pub fn with_probe(mut self, probe: Box<dyn PrimitiveCellProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Materializes the deck tree for one request and reports every
    /// degradation encountered along the way.
    pub fn write(&self, request: &GenerationRequest) -> XsResult<GenerationReport> {
        validate_request(request)?;

        let structure = &request.structure;
        create_dir_tree(&request.target_dir)?;

        let element = absorbing_element(request)?;
        let symbols = structure.distinct_species();

        let mut cards = self.store.snapshot();
        cards.set(
            "XS",
            "input_xspectra",
            "edge",
            CardValue::Str(self.edge.clone()),
        );
        cards.set(
            "XS",
            "absorber",
            "element",
            CardValue::Str(element.clone()),
        );
        cards.set(
            "QE",
            "electrons",
            "conv_thr",
            CardValue::Real(self.conv_per_atom * structure.num_sites() as f64),
        );

        // Supercells get a Gamma-only SCF mesh; the XANES mesh always comes
        // from the estimator.
        let supercell = self.probe.primitive_site_count(structure) != structure.num_sites();
        let scf_mesh = if supercell {
            KpointMesh::GAMMA
        } else {
            self.estimator.estimate(structure)
        };
        let xas_mesh = self.estimator.estimate(structure);
        cards.set("XS", "kpts", "kpts", CardValue::Str(xas_mesh.to_string()));

        let defaults = CutoffPair {
            ecutwfc: cards.require_real("QE", "system", "ecutwfc")?,
            ecutrho: cards.require_real("QE", "system", "ecutrho")?,
        };
        let resolution = resolve(&self.assets, defaults, &symbols, &request.target_dir)?;
        let mut diagnostics: Vec<Diagnostic> = resolution.diagnostics.clone();
        cards.set(
            "QE",
            "system",
            "ecutwfc",
            CardValue::Real(resolution.cutoffs.ecutwfc),
        );
        cards.set(
            "QE",
            "system",
            "ecutrho",
            CardValue::Real(resolution.cutoffs.ecutrho),
        );
        cards.set("QE", "control", "pseudo_dir", CardValue::Str("../".into()));

        let gs_dir = request.target_dir.join("GS");
        create_dir_tree(&gs_dir)?;
        let gs_deck = render_pw_deck(&PwDeck {
            structure,
            pseudo: &resolution.pseudo,
            cards: &cards,
            kpoints: scf_mesh,
        })?;
        write_text_artifact(&gs_dir.join(GROUND_STATE_DECK), &gs_deck)?;

        let mut pseudo = resolution.pseudo;
        diagnostics.extend(inject_core_hole(
            &mut pseudo,
            &element,
            self.assets.chpsp_directory.as_deref(),
            &request.target_dir,
        )?);
        let iabs = absorber_index(&pseudo, &element)?;

        let total_weight: f64 = request.polarizations.iter().map(|pol| pol.weight()).sum();

        for &site in &request.sites {
            let mapped = request.index_map[&site];
            let specie = structure.sites[mapped].species.clone();
            let site_dir = request.target_dir.join(format!("{site:03}_{specie}"));
            create_dir_tree(&site_dir)?;

            let ionized = structure
                .with_species_at(mapped, &format!("{element}+"))
                .ok_or_else(|| {
                    XsError::input_validation(format!("site index {mapped} is out of bounds"))
                })?;
            let es_deck = render_pw_deck(&PwDeck {
                structure: &ionized,
                pseudo: &pseudo,
                cards: &cards,
                kpoints: scf_mesh,
            })?;
            write_text_artifact(&site_dir.join(EXCITED_STATE_DECK), &es_deck)?;

            for (position, polarization) in request.polarizations.iter().enumerate() {
                let pol_dir = site_dir.join(format!("{}{}", polarization.mode(), position + 1));
                create_dir_tree(&pol_dir)?;

                let xanes = render_xanes_deck(&XanesDeck {
                    cards: &cards,
                    polarization,
                    absorber_index: iabs,
                    element: &element,
                })?;
                write_text_artifact(&pol_dir.join(XANES_DECK), &xanes)?;

                let weight = polarization.weight() / total_weight;
                write_text_artifact(&pol_dir.join(WEIGHT_ARTIFACT), &format!("{weight}"))?;
            }
        }

        Ok(GenerationReport::from_diagnostics(diagnostics))
    }
}

fn validate_request(request: &GenerationRequest) -> XsResult<()> {
    if request.sites.is_empty() {
        return Err(XsError::input_validation("no absorption sites requested"));
    }
    for &site in &request.sites {
        let mapped = request.index_map.get(&site).ok_or_else(|| {
            XsError::input_validation(format!("site {site} is missing from the index map"))
        })?;
        if *mapped >= request.structure.num_sites() {
            return Err(XsError::input_validation(format!(
                "site {site} maps to index {mapped}, beyond the {}-site structure",
                request.structure.num_sites()
            )));
        }
    }
    if request.polarizations.is_empty() {
        return Err(XsError::input_validation("no polarization variants supplied"));
    }
    let total_weight: f64 = request.polarizations.iter().map(|pol| pol.weight()).sum();
    if total_weight <= 0.0 {
        return Err(XsError::input_validation(
            "polarization weights must sum to a positive value",
        ));
    }
    Ok(())
}

fn absorbing_element(request: &GenerationRequest) -> XsResult<String> {
    let first = request.sites[0];
    let mapped = request.index_map[&first];
    Ok(request.structure.sites[mapped].species.clone())
}
