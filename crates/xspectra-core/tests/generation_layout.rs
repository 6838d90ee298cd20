use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use xspectra_core::common::kpoints::{DeclaredPrimitiveCell, FixedMesh, KpointMesh};
use xspectra_core::domain::{GenerationRequest, Polarization, Site, Structure};
use xspectra_core::modules::fanout::Generator;
use xspectra_core::modules::psp::PspAssets;

fn two_atom_structure() -> Structure {
    Structure {
        lattice: [[4.6, 0.0, 0.0], [0.0, 4.6, 0.0], [0.0, 0.0, 2.95]],
        sites: vec![
            Site {
                species: "Ti".to_string(),
                frac_coords: [0.0, 0.0, 0.0],
            },
            Site {
                species: "O".to_string(),
                frac_coords: [0.3, 0.3, 0.0],
            },
        ],
    }
}

fn generator() -> Generator {
    Generator::new(
        PspAssets::default(),
        Box::new(FixedMesh(KpointMesh::new(2, 2, 2))),
    )
}

fn relative_files_under(root: &Path) -> BTreeSet<PathBuf> {
    fn walk(dir: &Path, root: &Path, found: &mut BTreeSet<PathBuf>) {
        for entry in fs::read_dir(dir).expect("directory should be readable") {
            let path = entry.expect("entry should be readable").path();
            if path.is_dir() {
                walk(&path, root, found);
            } else {
                found.insert(
                    path.strip_prefix(root)
                        .expect("path should be under root")
                        .to_path_buf(),
                );
            }
        }
    }
    let mut found = BTreeSet::new();
    walk(root, root, &mut found);
    found
}

#[test]
fn default_generation_produces_exactly_the_contracted_tree() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0], temp.path());

    let report = generator().write(&request).expect("generation should succeed");

    let expected: BTreeSet<PathBuf> = [
        "GS/gs.in",
        "000_Ti/es.in",
        "000_Ti/dipole1/xanes.in",
        "000_Ti/dipole1/weight.txt",
        "000_Ti/dipole2/xanes.in",
        "000_Ti/dipole2/weight.txt",
        "000_Ti/dipole3/xanes.in",
        "000_Ti/dipole3/weight.txt",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(relative_files_under(temp.path()), expected);

    // Nothing configured, so the report carries the degradation entries.
    assert!(!report.pass);
    assert!(report.errors.contains_key("psp.assets"));
    assert!(report.errors.contains_key("corehole.assets"));
}

#[test]
fn placeholder_resolution_names_flow_into_the_ground_state_deck() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0], temp.path());

    generator().write(&request).expect("generation should succeed");

    let gs = fs::read_to_string(temp.path().join("GS/gs.in")).expect("gs.in should exist");
    assert!(gs.contains("  Ti 47.9000 Ti.upf"));
    assert!(gs.contains("  O 15.9990 O.upf"));
    assert!(gs.contains("  ecutwfc = 40"));
    assert!(gs.contains("  ecutrho = 320"));
    assert!(gs.contains("  pseudo_dir = '../'"));
    assert!(gs.contains("  2 2 2 0 0 0"));
    // conv_thr was rescaled per atom.
    assert!(gs.contains("  conv_thr = 2e-10"));
}

#[test]
fn excited_state_deck_cites_the_ionized_species() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0], temp.path());

    generator().write(&request).expect("generation should succeed");

    let es = fs::read_to_string(temp.path().join("000_Ti/es.in")).expect("es.in should exist");
    assert!(es.contains("  Ti+ 47.9000 Ti.fch.upf"));
    assert!(es.contains("  ntyp = 2"));
    assert!(!es.contains("\n  Ti 47.9000"));
}

#[test]
fn structure_is_unchanged_after_generation() {
    let temp = TempDir::new().expect("tempdir should be created");
    let structure = two_atom_structure();
    let labels_before = structure.species_labels();
    let request = GenerationRequest::new(structure, vec![0], temp.path());

    generator().write(&request).expect("generation should succeed");

    assert_eq!(request.structure.species_labels(), labels_before);
}

#[test]
fn canonical_weights_are_thirds_and_sum_to_one() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0], temp.path());

    generator().write(&request).expect("generation should succeed");

    let mut total = 0.0;
    for direction in 1..=3 {
        let raw = fs::read_to_string(
            temp.path()
                .join(format!("000_Ti/dipole{direction}/weight.txt")),
        )
        .expect("weight artifact should exist");
        let weight: f64 = raw.trim().parse().expect("weight should parse");
        assert!((weight - 1.0 / 3.0).abs() < 1.0e-12);
        total += weight;
    }
    assert!((total - 1.0).abs() < 1.0e-12);
}

#[test]
fn xanes_decks_embed_the_absorber_index_and_mesh_line() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0], temp.path());

    generator().write(&request).expect("generation should succeed");

    let xanes = fs::read_to_string(temp.path().join("000_Ti/dipole1/xanes.in"))
        .expect("xanes.in should exist");
    // Sorted keys O < Ti < Ti+, so titanium's ionized entry ranks third.
    assert!(xanes.contains("    xiabs = 3"));
    assert!(xanes.contains("    calculation = 'xanes_dipole'"));
    assert!(xanes.contains("    edge = 'K'"));
    assert!(xanes.contains("    xepsilon(1) = 1"));
    assert_eq!(
        xanes.trim_end().lines().last().expect("deck should have lines"),
        "2 2 2 0 0 0"
    );
}

#[test]
fn supercell_detection_forces_gamma_scf_but_not_xanes_mesh() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0], temp.path());

    let generator = Generator::new(
        PspAssets::default(),
        Box::new(FixedMesh(KpointMesh::new(4, 4, 4))),
    )
    .with_probe(Box::new(DeclaredPrimitiveCell(1)));
    generator.write(&request).expect("generation should succeed");

    let gs = fs::read_to_string(temp.path().join("GS/gs.in")).expect("gs.in should exist");
    assert!(gs.contains("  1 1 1 0 0 0"));

    let xanes = fs::read_to_string(temp.path().join("000_Ti/dipole1/xanes.in"))
        .expect("xanes.in should exist");
    assert!(xanes.trim_end().ends_with("4 4 4 0 0 0"));
}

#[test]
fn caller_supplied_quadrupole_variants_reach_the_fanout() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0], temp.path())
        .with_polarizations(vec![
            Polarization::Dipole {
                direction: [1.0, 0.0, 0.0],
                weight: 1.0,
            },
            Polarization::Quadrupole {
                direction: [0.0, 1.0, 0.0],
                k_vector: [0.5, 0.5, 0.0],
                weight: 1.0,
            },
        ]);

    generator().write(&request).expect("generation should succeed");

    assert!(temp.path().join("000_Ti/dipole1/xanes.in").is_file());
    let quad = fs::read_to_string(temp.path().join("000_Ti/quadrupole2/xanes.in"))
        .expect("quadrupole deck should exist");
    assert!(quad.contains("    calculation = 'xanes_quadrupole'"));
    assert!(quad.contains("    xkvec(1) = 0.5000000000"));

    let weight = fs::read_to_string(temp.path().join("000_Ti/quadrupole2/weight.txt"))
        .expect("weight artifact should exist");
    assert_eq!(weight.trim(), "0.5");
}

#[test]
fn multiple_sites_fan_out_into_separate_directories() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request = GenerationRequest::new(two_atom_structure(), vec![0, 1], temp.path());

    generator().write(&request).expect("generation should succeed");

    assert!(temp.path().join("000_Ti/es.in").is_file());
    assert!(temp.path().join("001_O/es.in").is_file());
}
