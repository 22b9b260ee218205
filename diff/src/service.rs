//! Request/response operations, ready to be exposed over an RPC transport.
//!
//! Apart from [`DiffService::new`], which checks the canonicalization backend,
//! and the operations lowering Turtle (whose syntax errors belong to the caller),
//! these operations never fail:
//! internal errors are logged and the best available fallback is returned.

use crate::align::align_by_signature;
use crate::canon::{sorted_form, Canonicalizer};
use crate::diff::{compute_diff, LineDiff};
use crate::literal::normalize_triple;
use crate::matcher::{find_mapping_with, Mapping};
use crate::parser::{normalize_line_endings, parse_nquads, turtle_to_nquads};
use crate::pipeline::{diff_documents, DiffReport};
use crate::term::{GraphData, Triple};
use crate::{DiffError, DiffOptions};

/// Two documents, prepared to be compared with each other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanonPair {
    /// The left document
    pub left: String,
    /// The right document
    pub right: String,
}

/// Entry point of the diff operations.
#[derive(Clone, Copy, Debug)]
pub struct DiffService {
    canonicalizer: Canonicalizer,
}

impl DiffService {
    /// Build a [`DiffService`].
    ///
    /// # Error
    /// [`DiffError::BackendUnavailable`] if the canonicalization backend is not usable.
    /// This should be considered fatal.
    pub fn new(options: DiffOptions) -> Result<Self, DiffError> {
        Ok(DiffService {
            canonicalizer: Canonicalizer::new(options)?,
        })
    }

    /// Build a [`DiffService`] configured from the environment
    /// (see [`DiffOptions::from_env`]).
    pub fn from_env() -> Result<Self, DiffError> {
        Self::new(DiffOptions::from_env()?)
    }

    /// The options of this service.
    pub fn options(&self) -> &DiffOptions {
        self.canonicalizer.options()
    }

    /// Lower a Turtle document to N-Quads.
    ///
    /// Return `Ok(None)` if the document is empty or only contains whitespace.
    pub fn ttl_to_nquads(&self, text: &str, base: Option<&str>) -> Result<Option<String>, DiffError> {
        turtle_to_nquads(text, base)
    }

    /// Normalize the literals of an N-Quads document,
    /// then either canonicalize its blank nodes, or merely sort and deduplicate its lines.
    pub fn canonicalize(&self, nquads: &str, canonicalize_bnodes: bool) -> String {
        let res = normalized_triples(nquads).and_then(|triples| {
            if canonicalize_bnodes {
                self.canonicalizer
                    .canonicalize_triples(&triples)
                    .map(|detail| detail.canonical_form)
            } else {
                Ok(sorted_form(&triples))
            }
        });
        res.unwrap_or_else(|err| {
            log::warn!("canonicalize: {err}; falling back to sorted lines");
            fallback(nquads)
        })
    }

    /// Prepare two N-Quads documents to be compared:
    /// normalize their literals, and optionally canonicalize their blank nodes.
    ///
    /// If blank nodes are canonicalized and `align_right_to_left` is set,
    /// the blank nodes of `right` are [aligned](align_by_signature) on those of `left`.
    ///
    /// On failure, both documents are returned normalized and sorted,
    /// with their blank nodes untouched.
    pub fn canon_pair(
        &self,
        left: &str,
        right: &str,
        canonicalize_bnodes: bool,
        align_right_to_left: bool,
    ) -> CanonPair {
        self.try_canon_pair(left, right, canonicalize_bnodes, align_right_to_left)
            .unwrap_or_else(|err| {
                log::warn!("canon_pair: {err}; falling back to sorted lines");
                CanonPair {
                    left: fallback(left),
                    right: fallback(right),
                }
            })
    }

    fn try_canon_pair(
        &self,
        left: &str,
        right: &str,
        canonicalize_bnodes: bool,
        align_right_to_left: bool,
    ) -> Result<CanonPair, DiffError> {
        let left = normalized_triples(left)?;
        let right = normalized_triples(right)?;
        if !canonicalize_bnodes {
            return Ok(CanonPair {
                left: sorted_form(&left),
                right: sorted_form(&right),
            });
        }
        let left = self.canonicalizer.canonicalize_triples(&left)?.canonical_form;
        let mut right = self.canonicalizer.canonicalize_triples(&right)?.canonical_form;
        if align_right_to_left {
            right = align_by_signature(&left, &right)?;
        }
        Ok(CanonPair { left, right })
    }

    /// Lower two Turtle documents to N-Quads, then [prepare them](Self::canon_pair).
    ///
    /// A document that can not be lowered is passed as is.
    pub fn ttl_canon_pair(
        &self,
        left: &str,
        right: &str,
        base: Option<&str>,
        canonicalize_bnodes: bool,
        align_right_to_left: bool,
    ) -> CanonPair {
        let lower = |text: &str| match turtle_to_nquads(text, base) {
            Ok(nquads) => nquads.unwrap_or_default(),
            Err(err) => {
                log::warn!("ttl_canon_pair: {err}; using the source text");
                text.to_string()
            }
        };
        self.canon_pair(
            &lower(left),
            &lower(right),
            canonicalize_bnodes,
            align_right_to_left,
        )
    }

    /// Diff two N-Quads documents, after [preparing them](Self::canon_pair).
    pub fn diff_nquads(
        &self,
        left: &str,
        right: &str,
        canonicalize_bnodes: bool,
        align_right_to_left: bool,
    ) -> LineDiff {
        let pair = self.canon_pair(left, right, canonicalize_bnodes, align_right_to_left);
        compute_diff(&pair.left, &pair.right)
    }

    /// Diff two Turtle documents; see [`diff_documents`](crate::pipeline::diff_documents).
    pub async fn diff_documents(
        &self,
        left: &str,
        right: &str,
        base: Option<&str>,
    ) -> Result<DiffReport, DiffError> {
        diff_documents(&self.canonicalizer, left, right, base).await
    }

    /// Search a blank node bijection between two N-Quads documents
    /// (see [`find_mapping_with`]), within the budget set in the options.
    ///
    /// Return `None` if none is found, or if either document can not be parsed.
    pub fn match_blank_nodes(&self, left: &str, right: &str) -> Option<Mapping> {
        let parse = |text: &str| {
            GraphData::from_nquads(text)
                .map_err(|err| log::warn!("match_blank_nodes: {err}"))
                .ok()
        };
        let left = parse(left)?;
        let right = parse(right)?;
        find_mapping_with(&left, &right, self.options().match_budget())
    }
}

fn normalized_triples(nquads: &str) -> Result<Vec<Triple>, DiffError> {
    Ok(parse_nquads(nquads)?.iter().map(normalize_triple).collect())
}

/// Best effort when the document can not be processed:
/// literal-normalized and sorted if it can be parsed, merely sorted otherwise.
fn fallback(nquads: &str) -> String {
    match normalized_triples(nquads) {
        Ok(triples) => sorted_form(&triples),
        Err(_) => {
            let text = normalize_line_endings(nquads);
            let mut lines: Vec<&str> = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            lines.sort_unstable();
            lines.dedup();
            crate::_nq::join_lines(lines)
        }
    }
}
