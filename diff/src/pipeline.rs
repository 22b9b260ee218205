//! The diff pipeline for a pair of documents:
//! both sides are normalized and canonicalized concurrently,
//! realigned if they are isomorphic but spelled differently,
//! then compared line by line.

use futures_util::future::try_join;
use tokio::task::spawn_blocking;

use crate::align::align_by_order;
use crate::canon::{sorted_form, CanonDetail, Canonicalizer, Source};
use crate::diff::compute_diff;
use crate::literal::normalize_triple;
use crate::term::Triple;
use crate::DiffError;

/// The outcome of diffing two documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DiffReport {
    /// The left document, as compared
    pub left_aligned: String,
    /// The right document, as compared (blank nodes realigned on the left document if possible)
    pub right_aligned: String,
    /// Lines of `right_aligned` missing from `left_aligned`
    pub adds: Vec<String>,
    /// Lines of `left_aligned` missing from `right_aligned`
    pub dels: Vec<String>,
    /// Whether both documents were proved to describe the same graph
    pub is_isomorphic: bool,
}

/// One side of a diff, after normalization.
struct Prepared {
    /// Normalized, sorted, but not canonicalized
    sorted: String,
    /// `None` if canonicalization failed
    canon: Option<CanonDetail>,
}

fn prepare(canonicalizer: Canonicalizer, source: Source) -> Result<Prepared, DiffError> {
    let triples: Vec<Triple> = source.triples()?.iter().map(normalize_triple).collect();
    let canon = match canonicalizer.canonicalize_triples(&triples) {
        Ok(detail) => Some(detail),
        Err(err) => {
            log::warn!("{err}; falling back to sorted comparison");
            None
        }
    };
    Ok(Prepared {
        sorted: sorted_form(&triples),
        canon,
    })
}

async fn prepare_blocking(
    canonicalizer: Canonicalizer,
    source: Source,
) -> Result<Prepared, DiffError> {
    spawn_blocking(move || prepare(canonicalizer, source)).await?
}

/// Diff two Turtle documents, resolving relative IRIs against `base`.
///
/// See [`diff_sources`].
pub async fn diff_documents(
    canonicalizer: &Canonicalizer,
    left: &str,
    right: &str,
    base: Option<&str>,
) -> Result<DiffReport, DiffError> {
    let source = |text: &str| Source::Turtle {
        text: text.to_string(),
        base: base.map(str::to_string),
    };
    diff_sources(canonicalizer, source(left), source(right)).await
}

/// Diff two documents.
///
/// Both sides are parsed, literal-normalized and canonicalized on the blocking thread pool,
/// concurrently.
/// If their hashes agree but their canonical forms differ,
/// the right side is [aligned by order](align_by_order) on the left side.
///
/// If canonicalization fails on either side,
/// both sides are compared as normalized, sorted but not canonicalized N-Quads,
/// and the result is never reported as isomorphic.
///
/// # Error
/// Syntax errors in either document are reported,
/// as well as a failure of the blocking task.
pub async fn diff_sources(
    canonicalizer: &Canonicalizer,
    left: Source,
    right: Source,
) -> Result<DiffReport, DiffError> {
    let (left, right) = try_join(
        prepare_blocking(*canonicalizer, left),
        prepare_blocking(*canonicalizer, right),
    )
    .await?;

    let (left_aligned, right_aligned, hash_equal) = match (left.canon, right.canon) {
        (Some(l), Some(r)) if l.hash == r.hash => {
            if l.canonical_form == r.canonical_form {
                (l.canonical_form, r.canonical_form, true)
            } else {
                // only reachable with a canonicalizer whose hash is not derived from its text
                log::debug!("hashes are equal but canonical forms differ; aligning by order");
                let aligned = align_by_order(&l, &r).unwrap_or_else(|err| {
                    log::warn!("order-based alignment failed: {err}");
                    r.canonical_form.clone()
                });
                (l.canonical_form, aligned, true)
            }
        }
        (Some(l), Some(r)) => (l.canonical_form, r.canonical_form, false),
        _ => (left.sorted, right.sorted, false),
    };

    let diff = compute_diff(&left_aligned, &right_aligned);
    let is_isomorphic = hash_equal && diff.is_empty();
    log::debug!(
        "{} additions, {} deletions, isomorphic: {is_isomorphic}",
        diff.adds.len(),
        diff.dels.len()
    );
    Ok(DiffReport {
        left_aligned,
        right_aligned,
        adds: diff.adds,
        dels: diff.dels,
        is_isomorphic,
    })
}
