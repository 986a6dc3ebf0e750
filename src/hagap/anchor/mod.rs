mod locator;
mod patterns;

pub use locator::{find_in_prefix, locate, Anchor};
pub use patterns::{AnchorPattern, AnchorTable, Check, Stage};
