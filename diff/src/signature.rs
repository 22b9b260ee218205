//! Structural signatures of blank nodes.
//!
//! A signature summarizes the local connectivity of a blank node:
//! its in/out degree, the predicates of its incoming and outgoing triples,
//! and the kind of objects of its outgoing triples.
//! Distinct blank nodes may share a signature,
//! so signatures are only used to prune the [matcher](crate::matcher).

use std::collections::BTreeMap;

use crate::term::{GraphData, Term};

#[derive(Default)]
struct Stats<'a> {
    in_degree: usize,
    out_degree: usize,
    in_preds: BTreeMap<&'a str, usize>,
    out_preds: BTreeMap<&'a str, usize>,
    lit_out: usize,
    iri_out: usize,
}

impl<'a> Stats<'a> {
    fn outgoing(&mut self, predicate: &'a str, object: &Term) {
        self.out_degree += 1;
        *self.out_preds.entry(predicate).or_default() += 1;
        match object {
            Term::Literal(_) => self.lit_out += 1,
            Term::Iri(_) => self.iri_out += 1,
            Term::Blank(_) => (),
        }
    }

    fn incoming(&mut self, predicate: &'a str) {
        self.in_degree += 1;
        *self.in_preds.entry(predicate).or_default() += 1;
    }

    fn signature(&self) -> String {
        format!(
            "in:{}|out:{}|inP:{}|outP:{}|lit:{}|iri:{}",
            self.in_degree,
            self.out_degree,
            pred_counts(&self.in_preds),
            pred_counts(&self.out_preds),
            self.lit_out,
            self.iri_out,
        )
    }
}

fn pred_counts(counts: &BTreeMap<&str, usize>) -> String {
    counts
        .iter()
        .map(|(p, n)| format!("{p}:{n}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the signature of every blank node of `graph`.
///
/// A triple counts as outgoing for a blank node used as its subject or as its graph name,
/// and as incoming for a blank node used as its object.
pub fn signatures(graph: &GraphData) -> BTreeMap<Box<str>, String> {
    let mut stats: BTreeMap<&str, Stats> = graph
        .bnodes()
        .iter()
        .map(|b| (&b[..], Stats::default()))
        .collect();
    for t in graph.triples() {
        let subject = t.subject.bnode_id();
        // a triple is counted once, even if its subject is also its graph name
        let graph_name = t
            .graph
            .as_ref()
            .and_then(Term::bnode_id)
            .filter(|g| Some(*g) != subject);
        for id in [subject, graph_name].into_iter().flatten() {
            if let Some(s) = stats.get_mut(id) {
                s.outgoing(&t.predicate, &t.object);
            }
        }
        if let Some(s) = t.object.bnode_id().and_then(|id| stats.get_mut(id)) {
            s.incoming(&t.predicate);
        }
    }
    stats
        .into_iter()
        .map(|(id, s)| (Box::from(id), s.signature()))
        .collect()
}
