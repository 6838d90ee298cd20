//! Rendering of the three deck flavors.
//!
//! Shared format contract: named parameter blocks opened by a `&blockname`
//! line and closed by a bare `/`, parameters as `key = value`, boolean-like
//! parameters as the literal `.true.`/`.false.` tokens.

mod pw;
mod xanes;

pub use pw::{PwDeck, render_pw_deck};
pub use xanes::{XanesDeck, render_xanes_deck};

pub const GROUND_STATE_DECK: &str = "gs.in";
pub const EXCITED_STATE_DECK: &str = "es.in";
pub const XANES_DECK: &str = "xanes.in";
pub const WEIGHT_ARTIFACT: &str = "weight.txt";
