pub mod deck;
pub mod fanout;
pub mod psp;

mod helpers;

pub use helpers::{copy_asset, create_dir_tree, normalize_text_artifact, write_text_artifact};
