//! Contracts for the external k-point estimator and primitive-cell probe.
//!
//! Both are collaborators the generation engine only consumes: the estimator
//! turns a structure into a 3-integer mesh, the probe reports the primitive
//! cell's site count so the fan-out can detect supercells.

use crate::domain::Structure;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KpointMesh {
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
}

impl KpointMesh {
    pub const GAMMA: KpointMesh = KpointMesh { nx: 1, ny: 1, nz: 1 };

    pub const fn new(nx: u32, ny: u32, nz: u32) -> Self {
        Self { nx, ny, nz }
    }
}

impl Display for KpointMesh {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.nx, self.ny, self.nz)
    }
}

pub trait KpointEstimator {
    fn estimate(&self, structure: &Structure) -> KpointMesh;
}

pub trait PrimitiveCellProbe {
    fn primitive_site_count(&self, structure: &Structure) -> usize;
}

/// Estimator returning the same mesh for every structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMesh(pub KpointMesh);

impl KpointEstimator for FixedMesh {
    fn estimate(&self, _structure: &Structure) -> KpointMesh {
        self.0
    }
}

/// Probe that treats every structure as already primitive, so supercell
/// detection never triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullCellProbe;

impl PrimitiveCellProbe for FullCellProbe {
    fn primitive_site_count(&self, structure: &Structure) -> usize {
        structure.num_sites()
    }
}

/// Probe carrying a caller-declared primitive site count, for callers that
/// ran symmetry reduction elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredPrimitiveCell(pub usize);

impl PrimitiveCellProbe for DeclaredPrimitiveCell {
    fn primitive_site_count(&self, _structure: &Structure) -> usize {
        self.0
    }
}
