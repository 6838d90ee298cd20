pub mod common;
pub mod domain;
pub mod modules;

pub use domain::{
    Diagnostic, GenerationReport, GenerationRequest, Polarization, Site, Structure, XsError,
    XsResult,
};
pub use modules::fanout::Generator;
