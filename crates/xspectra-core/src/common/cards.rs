//! Hierarchical solver-configuration ("cards") values.
//!
//! Cards form a three-level mapping: group (`QE`, `XS`) -> section
//! (`system`, `plot`, ...) -> key -> value. A [`ConfigStore`] merges caller
//! overrides into the static defaults once at construction and is never
//! mutated afterwards; each generation call works on a private snapshot.

use crate::domain::{XsError, XsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single card value. Boolean-like parameters are stored as the literal
/// Fortran tokens (`".true."` / `".false."`), matching the deck text format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardValue {
    Int(i64),
    Real(f64),
    Str(String),
}

impl CardValue {
    /// Bare rendering: integers and reals as numeric literals, strings as-is.
    pub fn render(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Real(value) => render_real(*value),
            Self::Str(value) => value.clone(),
        }
    }

    /// Namelist rendering: like [`render`](Self::render) except that strings
    /// which are not Fortran tokens get single-quoted.
    pub fn render_namelist(&self) -> String {
        match self {
            Self::Str(value) if !is_fortran_token(value) => format!("'{value}'"),
            other => other.render(),
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

fn is_fortran_token(value: &str) -> bool {
    value.len() > 1 && value.starts_with('.') && value.ends_with('.')
}

fn render_real(value: f64) -> String {
    // Small thresholds keep exponent form so the deck stays readable.
    if value != 0.0 && value.abs() < 1.0e-3 {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

pub type CardSection = BTreeMap<String, CardValue>;
pub type CardGroup = BTreeMap<String, CardSection>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cards(BTreeMap<String, CardGroup>);

impl Cards {
    /// The static defaults template for an XSpectra calculation.
    pub fn defaults() -> Self {
        let mut cards = Cards::default();

        cards.set("QE", "control", "restart_mode", CardValue::Str("from_scratch".into()));
        cards.set("QE", "electrons", "conv_thr", CardValue::Real(1.0e-8));
        cards.set("QE", "electrons", "mixing_beta", CardValue::Real(0.4));
        cards.set("QE", "system", "degauss", CardValue::Real(0.002));
        cards.set("QE", "system", "ecutrho", CardValue::Int(320));
        cards.set("QE", "system", "ecutwfc", CardValue::Int(40));
        cards.set("QE", "system", "nspin", CardValue::Int(1));
        cards.set("QE", "system", "occupations", CardValue::Str("smearing".into()));
        cards.set("QE", "system", "smearing", CardValue::Str("gauss".into()));

        cards.set("XS", "cut_occ", "cut_desmooth", CardValue::Real(0.3));
        cards.set("XS", "input_xspectra", "outdir", CardValue::Str("../".into()));
        cards.set("XS", "input_xspectra", "prefix", CardValue::Str("pwscf".into()));
        cards.set("XS", "input_xspectra", "xcheck_conv", CardValue::Int(200));
        cards.set("XS", "input_xspectra", "xerror", CardValue::Real(0.01));
        cards.set("XS", "input_xspectra", "xniter", CardValue::Int(5000));
        cards.set("XS", "input_xspectra", "xcoordcrys", CardValue::Str(".false.".into()));
        cards.set("XS", "kpts", "kpts", CardValue::Str("2 2 2".into()));
        cards.set("XS", "kpts", "shift", CardValue::Str("0 0 0".into()));
        cards.set("XS", "plot", "cut_occ_states", CardValue::Str(".true.".into()));
        cards.set("XS", "plot", "terminator", CardValue::Str(".true.".into()));
        cards.set("XS", "plot", "xemax", CardValue::Int(70));
        cards.set("XS", "plot", "xemin", CardValue::Real(-15.0));
        cards.set("XS", "plot", "xnepoint", CardValue::Int(400));

        cards
    }

    pub fn get(&self, group: &str, section: &str, key: &str) -> Option<&CardValue> {
        self.0.get(group)?.get(section)?.get(key)
    }

    /// Like [`get`](Self::get), but missing entries become a `MissingConfig`
    /// error naming the full card path.
    pub fn require(&self, group: &str, section: &str, key: &str) -> XsResult<&CardValue> {
        self.get(group, section, key).ok_or_else(|| {
            XsError::missing_config(
                format!("{group}.{section}.{key}"),
                "card is not present in the configuration",
            )
        })
    }

    pub fn require_real(&self, group: &str, section: &str, key: &str) -> XsResult<f64> {
        self.require(group, section, key)?.as_real().ok_or_else(|| {
            XsError::missing_config(
                format!("{group}.{section}.{key}"),
                "card is present but not numeric",
            )
        })
    }

    pub fn set(&mut self, group: &str, section: &str, key: &str, value: CardValue) {
        self.0
            .entry(group.to_string())
            .or_default()
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn section(&self, group: &str, section: &str) -> Option<&CardSection> {
        self.0.get(group)?.get(section)
    }

    /// Deep-merges `overrides` into this value, key by key. Sibling keys that
    /// the overrides do not mention are left alone.
    pub fn merge(&mut self, overrides: &Cards) {
        for (group, sections) in &overrides.0 {
            for (section, keys) in sections {
                for (key, value) in keys {
                    self.set(group, section, key, value.clone());
                }
            }
        }
    }
}

/// Holds the merged cards for a generator instance. Construction is the only
/// mutation point; callers take snapshots per generation call.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    cards: Cards,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            cards: Cards::defaults(),
        }
    }

    pub fn with_overrides(overrides: &Cards) -> Self {
        let mut cards = Cards::defaults();
        cards.merge(overrides);
        Self { cards }
    }

    pub fn cards(&self) -> &Cards {
        &self.cards
    }

    pub fn snapshot(&self) -> Cards {
        self.cards.clone()
    }
}
