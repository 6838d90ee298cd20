pub mod cards;
pub mod elements;
pub mod kpoints;
