//! Crossmodal Search - the embedding-aggregation and ranking pipeline
//!
//! This crate holds the core of the system: turning a catalog of
//! text/image items into an embedded catalog ([`catalog`]), scoring an
//! embedded item against a query embedding with best-of aggregation
//! ([`scorer`]), ordering the catalog by score ([`ranker`]), and tying
//! the pieces together for repeated queries ([`session`]).

pub mod catalog;
pub mod ranker;
pub mod scorer;
pub mod session;

pub use catalog::CatalogEmbedder;
pub use ranker::rank;
pub use scorer::score;
pub use session::SearchSession;
