//! Page cache and cursor navigation for one content region
//!
//! A `Section` keeps every page a region has received, in arrival order, and
//! lets the user step back and forth through them. New pages are appended by
//! whoever fetched them; the section itself never touches the network.

mod navigator;
mod surface;

pub use navigator::{Section, SectionNotice};
pub use surface::{DisplayRegion, EmptyBanner, EmptyStateRegion, TextPane};
