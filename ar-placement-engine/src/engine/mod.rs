pub mod core;
pub mod lighting;
pub mod objects;
pub mod placement;
pub mod session;
