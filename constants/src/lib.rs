pub mod lighting;
pub mod path;
pub mod placement;
