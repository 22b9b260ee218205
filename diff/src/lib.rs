//! This crate is part of [Sophia],
//! an [RDF] and [Linked Data] toolkit in Rust.
//!
//! This crate computes diffs between two versions of an RDF graph
//! (typically a working copy and a committed revision)
//! that are stable under blank node relabelling.
//! A textual diff of N-Quads is of little use for RDF,
//! because graphs are compared up to [isomorphism],
//! not character-for-character.
//!
//! The pipeline is:
//! 1. [normalize literals](literal) so that `"01"^^xsd:integer` and `"1"^^xsd:integer` agree;
//! 2. [canonicalize](canon) both sides with [RDFC-1.0];
//! 3. if both sides are proved isomorphic but still spelled differently,
//!    [realign](align) the right side's blank node labels on the left side's;
//! 4. compute a [line-level diff](diff) of the results.
//!
//! Independently, [`matcher`] searches an explicit blank node bijection between two graphs,
//! pruned by [structural signatures](signature).
//!
//! [`DiffService`] exposes all of this as request/response operations
//! that never fail on a per-request basis.
//!
//! [Sophia]: https://docs.rs/sophia/latest/sophia/
//! [RDF]: https://www.w3.org/TR/rdf-primer/
//! [Linked Data]: http://linkeddata.org/
//! [isomorphism]: https://www.w3.org/TR/rdf11-concepts/#graph-isomorphism
//! [RDFC-1.0]: https://www.w3.org/TR/rdf-canon/
#![deny(missing_docs)]

mod _nq;
mod _term_impl;

pub mod align;
pub mod canon;
pub mod diff;
pub mod error;
pub mod literal;
pub mod matcher;
pub mod options;
pub mod parser;
pub mod pipeline;
pub mod service;
pub mod signature;
pub mod term;

pub use canon::{CanonDetail, Canonicalizer};
pub use diff::{compute_diff, LineDiff};
pub use error::DiffError;
pub use matcher::{find_mapping, Mapping};
pub use options::DiffOptions;
pub use pipeline::DiffReport;
pub use service::{CanonPair, DiffService};
pub use term::{GraphData, Literal, Term, Triple};


#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
