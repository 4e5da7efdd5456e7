mod composite;
mod rotary;
pub(crate) mod types;
pub use composite::*;
pub use rotary::*;
pub use types::*;
