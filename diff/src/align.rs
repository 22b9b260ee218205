//! Heuristic realignment of blank node labels,
//! making the right side of a diff reuse the labels of the left side where possible.
//!
//! Both strategies are best-effort:
//! when they find nothing to pair, the right side is returned unchanged.
//! Relabelling is performed on parsed triples, never by textual substitution,
//! and the result is serialized with its lines sorted.

use std::collections::{BTreeMap, BTreeSet};

use crate::canon::CanonDetail;
use crate::parser::parse_nquads;
use crate::term::Triple;
use crate::DiffError;

/// Align `right` on `left` by first occurrence of their canonical blank node labels.
///
/// This is meant for graphs already known to be isomorphic (their hashes agree)
/// whose canonical forms differ by the numbering of blank nodes only.
/// Both canonical forms are scanned in document order;
/// the i-th canonical label first seen in `right` is renamed to the i-th first seen in `left`.
pub fn align_by_order(left: &CanonDetail, right: &CanonDetail) -> Result<String, DiffError> {
    let left_order = first_occurrences(left)?;
    let right_triples = parse_nquads(&right.canonical_form)?;
    let right_order = first_occurrences_in(&right_triples, right);
    let mapping: BTreeMap<Box<str>, Box<str>> = right_order
        .into_iter()
        .zip(left_order)
        .filter(|(r, l)| r != l)
        .collect();
    if mapping.is_empty() {
        log::debug!("order-based alignment: nothing to rename");
        return Ok(right.canonical_form.clone());
    }
    log::debug!("order-based alignment: renaming {} blank nodes", mapping.len());
    Ok(relabel(&right_triples, &mapping))
}

fn first_occurrences(detail: &CanonDetail) -> Result<Vec<Box<str>>, DiffError> {
    let triples = parse_nquads(&detail.canonical_form)?;
    Ok(first_occurrences_in(&triples, detail))
}

/// The canonical labels issued in `detail`, in order of first occurrence in `triples`.
fn first_occurrences_in(triples: &[Triple], detail: &CanonDetail) -> Vec<Box<str>> {
    let issued: BTreeSet<&str> = detail
        .issued_identifier_map
        .values()
        .map(|l| &l[..])
        .collect();
    let mut seen = BTreeMap::<&str, usize>::new();
    for id in triples.iter().flat_map(Triple::bnodes) {
        if issued.contains(id) && !seen.contains_key(id) {
            let rank = seen.len();
            seen.insert(id, rank);
        }
    }
    let mut order: Vec<(usize, &str)> = seen.into_iter().map(|(id, rank)| (rank, id)).collect();
    order.sort_unstable();
    order.into_iter().map(|(_, id)| Box::from(id)).collect()
}

/// Align `right` on `left`, two N-Quads documents, by one-hop structural signatures.
///
/// The signature of a blank node is the sorted set of the lines mentioning it,
/// where the node itself is renamed `_:a` and every other blank node `_:z`.
/// Blank nodes sharing a signature on both sides are paired in lexicographic order of their labels.
pub fn align_by_signature(left: &str, right: &str) -> Result<String, DiffError> {
    let left_triples = parse_nquads(left)?;
    let right_triples = parse_nquads(right)?;
    let left_groups = group_by_signature(&left_triples);
    let right_groups = group_by_signature(&right_triples);

    let mut mapping = BTreeMap::<Box<str>, Box<str>>::new();
    for (sig, right_ids) in &right_groups {
        if let Some(left_ids) = left_groups.get(sig) {
            for (r, l) in right_ids.iter().zip(left_ids) {
                if r != l {
                    mapping.insert(Box::from(*r), Box::from(*l));
                }
            }
        }
    }
    if mapping.is_empty() {
        log::debug!("signature-based alignment: nothing to rename");
        return Ok(right.to_string());
    }
    log::debug!("signature-based alignment: renaming {} blank nodes", mapping.len());
    Ok(relabel(&right_triples, &mapping))
}

/// Group blank node labels by one-hop signature; labels are sorted within each group.
fn group_by_signature(triples: &[Triple]) -> BTreeMap<String, Vec<&str>> {
    let mut mentions = BTreeMap::<&str, Vec<&Triple>>::new();
    for t in triples {
        let ids: BTreeSet<&str> = t.bnodes().collect();
        for id in ids {
            mentions.entry(id).or_default().push(t);
        }
    }
    let mut groups = BTreeMap::<String, Vec<&str>>::new();
    for (id, ts) in mentions {
        let mut lines: Vec<String> = ts
            .iter()
            .map(|t| {
                t.map_bnodes(|other| Box::from(if other == id { "a" } else { "z" }))
                    .to_nquad()
            })
            .collect();
        lines.sort_unstable();
        lines.dedup();
        groups.entry(lines.join("\n")).or_default().push(id);
    }
    groups
}

/// Rename the blank nodes of `triples` through `mapping`, and serialize them with sorted lines.
///
/// A blank node absent from `mapping`, whose label is the target of some other node,
/// gets a fresh label instead, so that distinct nodes are never merged.
fn relabel(triples: &[Triple], mapping: &BTreeMap<Box<str>, Box<str>>) -> String {
    let targets: BTreeSet<&str> = mapping.values().map(|l| &l[..]).collect();
    let mut taken: BTreeSet<Box<str>> = triples
        .iter()
        .flat_map(Triple::bnodes)
        .map(Box::from)
        .collect();
    taken.extend(mapping.values().cloned());

    let mut full = mapping.clone();
    let unpaired: BTreeSet<&str> = triples
        .iter()
        .flat_map(Triple::bnodes)
        .filter(|id| !mapping.contains_key(*id) && targets.contains(id))
        .collect();
    for id in unpaired {
        let fresh = (1..)
            .map(|n| format!("{id}_{n}").into_boxed_str())
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| id.into());
        taken.insert(fresh.clone());
        full.insert(id.into(), fresh);
    }

    let relabelled: Vec<Triple> = triples
        .iter()
        .map(|t| t.map_bnodes(|id| full.get(id).cloned().unwrap_or_else(|| id.into())))
        .collect();
    crate::_nq::sorted_nquads(&relabelled)
}

#[cfg(test)]
mod test {
    use super::*;

    fn detail(canonical_form: &str, issued: &[(&str, &str)]) -> CanonDetail {
        CanonDetail {
            canonical_form: canonical_form.into(),
            issued_identifier_map: issued
                .iter()
                .map(|(o, c)| (Box::from(*o), Box::from(*c)))
                .collect(),
            hash: crate::canon::hash_hex(canonical_form),
        }
    }

    #[test]
    fn by_order() -> Result<(), DiffError> {
        crate::test_setup();
        let left = detail(
            "_:c14n0 <tag:p> _:c14n1 .\n_:c14n1 <tag:q> <tag:o> .\n",
            &[("x", "c14n0"), ("y", "c14n1")],
        );
        let right = detail(
            "_:c14n1 <tag:p> _:c14n0 .\n_:c14n0 <tag:q> <tag:o> .\n",
            &[("u", "c14n1"), ("v", "c14n0")],
        );
        assert_eq!(align_by_order(&left, &right)?, left.canonical_form);
        Ok(())
    }

    #[test]
    fn by_order_unchanged() -> Result<(), DiffError> {
        let left = detail("_:c14n0 <tag:p> <tag:o> .\n", &[("x", "c14n0")]);
        let right = detail("_:c14n0 <tag:p> <tag:o> .\n", &[("y", "c14n0")]);
        assert_eq!(align_by_order(&left, &right)?, right.canonical_form);
        Ok(())
    }

    #[test]
    fn by_signature() -> Result<(), DiffError> {
        crate::test_setup();
        let left = "_:c14n0 <http://ex/knows> <http://ex/x> .\n";
        let right = "_:b7 <http://ex/knows> <http://ex/x> .\n";
        assert_eq!(align_by_signature(left, right)?, left);
        Ok(())
    }

    #[test]
    fn by_signature_shared_groups() -> Result<(), DiffError> {
        let left = "_:l1 <tag:p> <tag:o> .\n_:l2 <tag:p> <tag:o> .\n_:l3 <tag:q> _:l1 .\n";
        let right = "_:r9 <tag:q> _:r2 .\n_:r2 <tag:p> <tag:o> .\n_:r5 <tag:p> <tag:o> .\n";
        // r2 and l1 are both objects of <tag:q>
        let got = align_by_signature(left, right)?;
        assert_eq!(
            got,
            "_:l1 <tag:p> <tag:o> .\n_:l2 <tag:p> <tag:o> .\n_:l3 <tag:q> _:l1 .\n"
        );
        Ok(())
    }

    #[test]
    fn by_signature_no_pairing() -> Result<(), DiffError> {
        let left = "_:a <tag:p> <tag:o> .\n";
        let right = "<tag:s> <tag:q> _:b .\n";
        assert_eq!(align_by_signature(left, right)?, right);
        Ok(())
    }

    #[test]
    fn by_signature_avoids_merging() -> Result<(), DiffError> {
        let left = "_:a <tag:p> <tag:o1> .\n";
        let right = "_:b <tag:p> <tag:o1> .\n_:a <tag:q> <tag:o2> .\n";
        assert_eq!(
            align_by_signature(left, right)?,
            "_:a <tag:p> <tag:o1> .\n_:a_1 <tag:q> <tag:o2> .\n"
        );
        Ok(())
    }

    #[test]
    fn labels_are_not_substrings() -> Result<(), DiffError> {
        let left = "_:x <tag:p> \"1\" .\n_:x1 <tag:p> \"2\" .\n";
        let right = "_:y1 <tag:p> \"1\" .\n_:y <tag:p> \"2\" .\n";
        assert_eq!(align_by_signature(left, right)?, left);
        Ok(())
    }
}
