pub mod base;
pub mod events;
pub mod viewfield;
