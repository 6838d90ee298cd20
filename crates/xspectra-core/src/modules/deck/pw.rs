//! pw.x deck rendering for the ground-state and excited-state calculations.

use crate::common::cards::Cards;
use crate::common::elements::atomic_mass;
use crate::common::kpoints::KpointMesh;
use crate::domain::{Structure, XsError, XsResult, bare_element};
use std::collections::BTreeMap;

/// Inputs for one pw.x deck. The ground-state deck uses the unperturbed
/// structure; the excited-state deck uses a derived copy whose absorbing
/// site carries the ionized label.
#[derive(Debug, Clone, Copy)]
pub struct PwDeck<'a> {
    pub structure: &'a Structure,
    pub pseudo: &'a BTreeMap<String, String>,
    pub cards: &'a Cards,
    pub kpoints: KpointMesh,
}

pub fn render_pw_deck(deck: &PwDeck<'_>) -> XsResult<String> {
    let distinct = deck.structure.distinct_species();
    let mut lines = Vec::new();

    push_namelist(&mut lines, deck.cards, "control", &[])?;
    push_namelist(
        &mut lines,
        deck.cards,
        "system",
        &[
            ("ibrav", "0".to_string()),
            ("nat", deck.structure.num_sites().to_string()),
            ("ntyp", distinct.len().to_string()),
        ],
    )?;
    push_namelist(&mut lines, deck.cards, "electrons", &[])?;

    lines.push("ATOMIC_SPECIES".to_string());
    for label in &distinct {
        let element = bare_element(label);
        let mass = atomic_mass(element).ok_or_else(|| {
            XsError::input_validation(format!("unknown element symbol '{element}'"))
        })?;
        let filename = deck.pseudo.get(label).ok_or_else(|| {
            XsError::input_validation(format!(
                "no pseudopotential registered for species '{label}'"
            ))
        })?;
        lines.push(format!("  {label} {mass:.4} {filename}"));
    }

    lines.push("ATOMIC_POSITIONS crystal".to_string());
    for site in &deck.structure.sites {
        let [x, y, z] = site.frac_coords;
        lines.push(format!("  {} {x:.6} {y:.6} {z:.6}", site.species));
    }

    lines.push("K_POINTS automatic".to_string());
    lines.push(format!("  {} 0 0 0", deck.kpoints));

    lines.push("CELL_PARAMETERS angstrom".to_string());
    for row in &deck.structure.lattice {
        let [a, b, c] = row;
        lines.push(format!("  {a:.6} {b:.6} {c:.6}"));
    }

    Ok(lines.join("\n"))
}

/// Emits one `&name ... /` namelist: the fixed leading pairs first, then the
/// cards of the `QE.{name}` section in key order.
fn push_namelist(
    lines: &mut Vec<String>,
    cards: &Cards,
    name: &str,
    leading: &[(&str, String)],
) -> XsResult<()> {
    let section = cards.section("QE", name).ok_or_else(|| {
        XsError::missing_config(format!("QE.{name}"), "namelist section is not configured")
    })?;

    lines.push(format!("&{name}"));
    for (key, value) in leading {
        lines.push(format!("  {key} = {value}"));
    }
    for (key, value) in section {
        lines.push(format!("  {key} = {}", value.render_namelist()));
    }
    lines.push("/".to_string());
    Ok(())
}
