//! Explicit blank node bijection between two graphs.
//!
//! [`find_mapping`] performs a depth-first backtracking search:
//! candidates for each blank node of the left graph are the blank nodes of the right graph
//! with the same [signature](crate::signature),
//! most constrained nodes are assigned first,
//! and every tentative assignment is checked for partial feasibility,
//! treating not-yet-assigned blank nodes as wildcards.
//! A complete assignment is only accepted if it makes both graphs exactly equal.
//!
//! The worst case is exponential in the number of blank nodes sharing a signature,
//! so the search is bounded by a budget of tentative assignments;
//! exhausting it is reported as "no mapping".

use std::collections::{BTreeMap, BTreeSet};

use crate::options::DEFAULT_MATCH_BUDGET;
use crate::signature::signatures;
use crate::term::{GraphData, Term, Triple};

/// A bijection from the blank nodes of one graph to the blank nodes of another.
pub type Mapping = BTreeMap<Box<str>, Box<str>>;

/// Search a blank node bijection from `left` to `right`,
/// with a budget of [`DEFAULT_MATCH_BUDGET`] tentative assignments.
///
/// See [`find_mapping_with`].
pub fn find_mapping(left: &GraphData, right: &GraphData) -> Option<Mapping> {
    find_mapping_with(left, right, Some(DEFAULT_MATCH_BUDGET))
}

/// Search a blank node bijection from `left` to `right`,
/// such that relabelling `left` through it yields exactly the triples of `right`.
///
/// Return `None` if no such bijection exists,
/// or if `budget` (a maximum number of tentative assignments) is exhausted before one is found.
/// With a `budget` of `None`, the search is unbounded.
pub fn find_mapping_with(
    left: &GraphData,
    right: &GraphData,
    budget: Option<usize>,
) -> Option<Mapping> {
    if left.bnodes().len() != right.bnodes().len() {
        log::debug!(
            "no mapping: {} blank nodes vs {}",
            left.bnodes().len(),
            right.bnodes().len()
        );
        return None;
    }

    // triples without blank nodes must match exactly, whatever the mapping
    let (left_ground, left_patterns) = split_ground(left.triples());
    let (right_ground, right_patterns) = split_ground(right.triples());
    if left_ground != right_ground {
        log::debug!("no mapping: triples without blank nodes differ");
        return None;
    }

    let candidates = candidates(left, right)?;
    let mut order: Vec<&str> = candidates.keys().copied().collect();
    order.sort_by_key(|id| (candidates[id].len(), *id));

    let mut search = Search {
        left,
        right,
        left_patterns,
        right_patterns,
        candidates,
        order,
        mapping: BTreeMap::new(),
        used: BTreeSet::new(),
        budget,
        steps: 0,
    };
    match search.run(0) {
        Ok(true) => {
            log::debug!("mapping found after {} steps", search.steps);
            Some(
                search
                    .mapping
                    .into_iter()
                    .map(|(l, r)| (Box::from(l), Box::from(r)))
                    .collect(),
            )
        }
        Ok(false) => {
            log::debug!("no mapping after {} steps", search.steps);
            None
        }
        Err(Exhausted) => {
            log::warn!(
                "blank node matching gave up after {} steps; graphs reported as different",
                search.steps
            );
            None
        }
    }
}

/// Partition triples into (the set of ground lines, the triples containing blank nodes).
fn split_ground(triples: &[Triple]) -> (BTreeSet<String>, Vec<&Triple>) {
    let mut ground = BTreeSet::new();
    let mut patterns = vec![];
    for t in triples {
        if t.bnodes().next().is_some() {
            patterns.push(t);
        } else {
            ground.insert(t.to_nquad());
        }
    }
    (ground, patterns)
}

/// Map each left blank node to the right blank nodes sharing its signature.
///
/// Return `None` if some left blank node has no candidate.
fn candidates<'a>(
    left: &'a GraphData,
    right: &'a GraphData,
) -> Option<BTreeMap<&'a str, Vec<&'a str>>> {
    let left_sigs = signatures(left);
    let right_sigs = signatures(right);
    let mut by_sig: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for id in right.bnodes() {
        if let Some(sig) = right_sigs.get(id) {
            by_sig.entry(sig).or_default().push(id);
        }
    }
    let mut candidates = BTreeMap::new();
    for id in left.bnodes() {
        let found = left_sigs
            .get(id)
            .and_then(|sig| by_sig.get(sig.as_str()))
            .cloned()
            .unwrap_or_default();
        if found.is_empty() {
            log::debug!("no mapping: no candidate for _:{id}");
            return None;
        }
        candidates.insert(&id[..], found);
    }
    Some(candidates)
}

struct Exhausted;

struct Search<'a> {
    left: &'a GraphData,
    right: &'a GraphData,
    left_patterns: Vec<&'a Triple>,
    right_patterns: Vec<&'a Triple>,
    candidates: BTreeMap<&'a str, Vec<&'a str>>,
    order: Vec<&'a str>,
    /// left → right
    mapping: BTreeMap<&'a str, &'a str>,
    /// right blank nodes already in the image of `mapping`
    used: BTreeSet<&'a str>,
    budget: Option<usize>,
    steps: usize,
}

impl<'a> Search<'a> {
    fn run(&mut self, depth: usize) -> Result<bool, Exhausted> {
        let Some(&l) = self.order.get(depth) else {
            return Ok(self.exact_check());
        };
        let candidates = self.candidates[l].clone();
        for r in candidates {
            if self.used.contains(r) {
                continue;
            }
            self.spend()?;
            self.mapping.insert(l, r);
            self.used.insert(r);
            if self.feasible() && self.run(depth + 1)? {
                return Ok(true);
            }
            self.mapping.remove(l);
            self.used.remove(r);
        }
        Ok(false)
    }

    fn spend(&mut self) -> Result<(), Exhausted> {
        if self.budget.is_some_and(|b| self.steps >= b) {
            return Err(Exhausted);
        }
        self.steps += 1;
        Ok(())
    }

    /// Every left pattern must be compatible with some right pattern, and vice versa.
    fn feasible(&self) -> bool {
        let left: Vec<_> = self
            .left_patterns
            .iter()
            .map(|t| tokens(t, |id| self.mapping.get(id).copied()))
            .collect();
        let right: Vec<_> = self
            .right_patterns
            .iter()
            .map(|t| tokens(t, |id| self.used.get(id).copied()))
            .collect();
        left.iter()
            .all(|lt| right.iter().any(|rt| compatible(lt, rt)))
            && right
                .iter()
                .all(|rt| left.iter().any(|lt| compatible(lt, rt)))
    }

    fn exact_check(&self) -> bool {
        let left: BTreeSet<String> = self
            .left
            .triples()
            .iter()
            .map(|t| {
                t.map_bnodes(|id| Box::from(self.mapping.get(id).copied().unwrap_or(id)))
                    .to_nquad()
            })
            .collect();
        let right: BTreeSet<String> = self.right.triples().iter().map(Triple::to_nquad).collect();
        left == right
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token<'a> {
    Any,
    Blank(&'a str),
    Term(&'a Term),
    Predicate(&'a str),
    DefaultGraph,
}

/// Rewrite a triple as 4 tokens.
/// Blank nodes are resolved through `resolve`, and become [`Token::Any`] if it returns `None`.
fn tokens<'a, F>(t: &'a Triple, resolve: F) -> [Token<'a>; 4]
where
    F: Fn(&str) -> Option<&'a str>,
{
    let token = |term: &'a Term| match term {
        Term::Blank(id) => resolve(&**id).map_or(Token::Any, Token::Blank),
        Term::Iri(_) | Term::Literal(_) => Token::Term(term),
    };
    [
        token(&t.subject),
        Token::Predicate(&t.predicate),
        token(&t.object),
        t.graph.as_ref().map_or(Token::DefaultGraph, token),
    ]
}

fn compatible(left: &[Token; 4], right: &[Token; 4]) -> bool {
    left.iter()
        .zip(right)
        .all(|(l, r)| *l == Token::Any || *r == Token::Any || l == r)
}
