use super::CliError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use xspectra_core::common::cards::Cards;
use xspectra_core::common::kpoints::{DeclaredPrimitiveCell, FixedMesh, FullCellProbe, KpointMesh};
use xspectra_core::domain::{GenerationRequest, Structure, XsError};
use xspectra_core::modules::fanout::Generator;
use xspectra_core::modules::psp::catalog::CutoffCatalog;
use xspectra_core::modules::psp::{PspAssets, codec};

#[derive(clap::Args)]
pub(super) struct GenerateArgs {
    /// Crystal structure JSON ({"lattice": [[...]], "sites": [...]})
    #[arg(long)]
    structure: PathBuf,

    /// Requested site indices in the expanded structure
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    sites: Vec<usize>,

    /// Target directory for the generated deck tree
    #[arg(long)]
    target: PathBuf,

    /// Directory holding neutral pseudopotential files and the cutoff table
    #[arg(long)]
    psp_dir: Option<PathBuf>,

    /// Cutoff-table filename inside the pseudopotential directory
    #[arg(long)]
    cutoff_table: Option<String>,

    /// Packed archive filename inside the pseudopotential directory
    #[arg(long)]
    psp_archive: Option<String>,

    /// Directory holding core-hole pseudopotential files
    #[arg(long)]
    chpsp_dir: Option<PathBuf>,

    /// Absorption edge
    #[arg(long, default_value = "K")]
    edge: String,

    /// Fixed k-point mesh used by the estimator contract
    #[arg(long, num_args = 3, value_names = ["NX", "NY", "NZ"], default_values_t = [2u32, 2, 2])]
    kmesh: Vec<u32>,

    /// Declared primitive-cell site count (enables supercell detection)
    #[arg(long)]
    primitive_sites: Option<usize>,

    /// JSON file mapping expanded-structure indices to structure indices
    #[arg(long)]
    index_map: Option<PathBuf>,

    /// Cards-override JSON merged into the defaults template
    #[arg(long)]
    cards: Option<PathBuf>,

    /// Electronic convergence threshold per atom
    #[arg(long, default_value_t = 1.0e-10)]
    conv_per_atom: f64,
}

#[derive(clap::Args)]
pub(super) struct PackArgs {
    /// Directory holding the pseudopotential files and the cutoff table
    #[arg(long)]
    psp_dir: PathBuf,

    /// Cutoff-table filename inside the pseudopotential directory
    #[arg(long)]
    cutoff_table: String,

    /// Output path for the packed archive JSON
    #[arg(long)]
    output: PathBuf,
}

pub(super) fn run_generate(args: GenerateArgs) -> Result<i32, CliError> {
    let structure: Structure = read_json(&args.structure)?;

    let mesh = KpointMesh::new(args.kmesh[0], args.kmesh[1], args.kmesh[2]);
    let assets = PspAssets {
        psp_directory: args.psp_dir,
        cutoff_table: args.cutoff_table,
        archive: args.psp_archive,
        chpsp_directory: args.chpsp_dir,
    };

    let mut generator = Generator::new(assets, Box::new(FixedMesh(mesh)))
        .with_edge(args.edge)
        .with_conv_per_atom(args.conv_per_atom);
    generator = match args.primitive_sites {
        Some(count) => generator.with_probe(Box::new(DeclaredPrimitiveCell(count))),
        None => generator.with_probe(Box::new(FullCellProbe)),
    };
    if let Some(cards_path) = &args.cards {
        let overrides: Cards = read_json(cards_path)?;
        generator = generator.with_overrides(&overrides);
    }

    let mut request = GenerationRequest::new(structure, args.sites, args.target);
    if let Some(map_path) = &args.index_map {
        let index_map: BTreeMap<usize, usize> = read_json(map_path)?;
        request = request.with_index_map(index_map);
    }

    let report = generator.write(&request).map_err(CliError::Core)?;
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|source| CliError::Core(XsError::parse(&request.target_dir, source)))?;
    println!("{rendered}");

    Ok(if report.pass { 0 } else { 1 })
}

pub(super) fn run_pack(args: PackArgs) -> Result<i32, CliError> {
    let catalog = CutoffCatalog::load(&args.psp_dir.join(&args.cutoff_table))
        .map_err(CliError::Core)?;
    codec::pack_to_file(&args.psp_dir, &catalog, &args.output).map_err(CliError::Core)?;
    println!("packed {} entries into {}", catalog.len(), args.output.display());
    Ok(0)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let source = fs::read_to_string(path)
        .map_err(|source| CliError::Core(XsError::filesystem(path, source)))?;
    serde_json::from_str(&source).map_err(|source| CliError::Core(XsError::parse(path, source)))
}
