//! XANES deck rendering, one deck per (site, polarization) pair.

use crate::common::cards::Cards;
use crate::domain::{Polarization, XsResult};

#[derive(Debug, Clone, Copy)]
pub struct XanesDeck<'a> {
    pub cards: &'a Cards,
    pub polarization: &'a Polarization,
    pub absorber_index: usize,
    pub element: &'a str,
}

pub fn render_xanes_deck(deck: &XanesDeck<'_>) -> XsResult<String> {
    let cards = deck.cards;
    let mode = deck.polarization.mode();
    let direction = deck.polarization.direction();

    let mut lines = vec![
        "&input_xspectra".to_string(),
        format!("    calculation = 'xanes_{mode}'"),
        format!(
            "    edge = {}",
            cards.require("XS", "input_xspectra", "edge")?.render_namelist()
        ),
        format!(
            "    prefix = {}",
            cards.require("XS", "input_xspectra", "prefix")?.render_namelist()
        ),
        format!(
            "    outdir = {}",
            cards.require("XS", "input_xspectra", "outdir")?.render_namelist()
        ),
        format!(
            "    xniter = {}",
            cards.require("XS", "input_xspectra", "xniter")?.render()
        ),
        format!("    xiabs = {}", deck.absorber_index),
        format!(
            "    xerror = {}",
            cards.require("XS", "input_xspectra", "xerror")?.render()
        ),
        format!(
            "    xcoordcrys = {}",
            cards.require("XS", "input_xspectra", "xcoordcrys")?.render()
        ),
        format!(
            "    xcheck_conv = {}",
            cards.require("XS", "input_xspectra", "xcheck_conv")?.render()
        ),
        format!("    xepsilon(1) = {}", direction[0]),
        format!("    xepsilon(2) = {}", direction[1]),
        format!("    xepsilon(3) = {}", direction[2]),
    ];

    if let Some(k_vector) = deck.polarization.k_vector() {
        for (component, value) in k_vector.into_iter().enumerate() {
            lines.push(format!("    xkvec({}) = {value:.10}", component + 1));
        }
    }

    lines.extend([
        "/".to_string(),
        "&plot".to_string(),
        format!(
            "    xnepoint = {}",
            cards.require("XS", "plot", "xnepoint")?.render()
        ),
        format!("    xemin = {}", cards.require("XS", "plot", "xemin")?.render()),
        format!("    xemax = {}", cards.require("XS", "plot", "xemax")?.render()),
        format!(
            "    terminator = {}",
            cards.require("XS", "plot", "terminator")?.render()
        ),
        format!(
            "    cut_occ_states = {}",
            cards.require("XS", "plot", "cut_occ_states")?.render()
        ),
        // Constant broadening with a very small smearing value (0.01 eV).
        "    gamma_mode = 'constant'".to_string(),
        "    xgamma = 0.01".to_string(),
        "/".to_string(),
        "&pseudos".to_string(),
        format!("    filecore = '../../Core_{}.wfc'", deck.element),
        "/".to_string(),
        "&cut_occ".to_string(),
        format!(
            "    cut_desmooth = {}",
            cards.require("XS", "cut_occ", "cut_desmooth")?.render()
        ),
        "/".to_string(),
        format!(
            "{} {}",
            cards.require("XS", "kpts", "kpts")?.render(),
            cards.require("XS", "kpts", "shift")?.render()
        ),
    ]);

    Ok(lines.join("\n"))
}
