//! Traits describing read-only data and injected services.
//!
//! The effect catalog is the only static table the engine consults; the
//! random source is the only service. Both are supplied by the host so the
//! engine stays testable with fixture catalogs and scripted rolls.
mod catalog;
mod rng;

pub use catalog::{CatalogError, EffectCatalog, StaticCatalog, StaticCatalogBuilder};
pub use rng::{PcgRng, RandomSource, SequenceRng};
