//! I define the data model on which diffs are computed:
//! [`Term`], [`Literal`], [`Triple`] and [`GraphData`].
//!
//! [`Term`] is a closed enum, so every consumer matches it exhaustively.
//! It also implements [`sophia_api::term::Term`],
//! so that it can be fed to Sophia's parsers' consumers and canonicalization algorithm.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::DiffError;

/// The namespace of XML Schema datatypes.
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
/// `xsd:string`, the implicit datatype of plain literals.
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
/// `rdf:langString`, the implicit datatype of language-tagged literals.
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// An RDF term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// An IRI
    Iri(Box<str>),
    /// A literal
    Literal(Literal),
    /// A blank node, identified by its label (without the leading `_:`)
    Blank(Box<str>),
}

impl Term {
    /// Build an IRI term.
    pub fn iri(iri: impl Into<Box<str>>) -> Self {
        Term::Iri(iri.into())
    }

    /// Build a blank node term.
    pub fn blank(id: impl Into<Box<str>>) -> Self {
        Term::Blank(id.into())
    }

    /// The blank node label of this term, if it is a blank node.
    pub fn bnode_id(&self) -> Option<&str> {
        match self {
            Term::Blank(id) => Some(id),
            Term::Iri(_) | Term::Literal(_) => None,
        }
    }

    /// Whether this term is a blank node.
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

/// Displays the term in N-Quads syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = String::new();
        crate::_nq::nq(self, &mut buffer);
        buffer.pop(); // remove trailing space
        f.write_str(&buffer)
    }
}

/// An RDF literal.
///
/// A literal carries at most one of a language tag and a datatype.
/// A literal carrying neither is a plain string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lex: Box<str>,
    annotation: Annotation,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Annotation {
    Plain,
    Language(Box<str>),
    Datatype(Box<str>),
}

impl Literal {
    /// Build a literal,
    /// rejecting the combination of a language tag and a datatype.
    pub fn new(
        lex: impl Into<Box<str>>,
        language: Option<&str>,
        datatype: Option<&str>,
    ) -> Result<Self, DiffError> {
        let lex = lex.into();
        let annotation = match (language, datatype) {
            (None, None) => Annotation::Plain,
            (Some(tag), None) => Annotation::Language(tag.into()),
            (None, Some(dt)) => Annotation::Datatype(dt.into()),
            (Some(_), Some(_)) => return Err(DiffError::LanguageAndDatatype(lex)),
        };
        Ok(Literal { lex, annotation })
    }

    /// Build a plain string literal.
    pub fn plain(lex: impl Into<Box<str>>) -> Self {
        Literal {
            lex: lex.into(),
            annotation: Annotation::Plain,
        }
    }

    /// Build a language-tagged literal.
    pub fn with_language(lex: impl Into<Box<str>>, tag: impl Into<Box<str>>) -> Self {
        Literal {
            lex: lex.into(),
            annotation: Annotation::Language(tag.into()),
        }
    }

    /// Build a literal with an explicit datatype.
    pub fn typed(lex: impl Into<Box<str>>, datatype: impl Into<Box<str>>) -> Self {
        Literal {
            lex: lex.into(),
            annotation: Annotation::Datatype(datatype.into()),
        }
    }

    /// The lexical form of this literal.
    pub fn lexical_form(&self) -> &str {
        &self.lex
    }

    /// The language tag of this literal, if any.
    pub fn language_tag(&self) -> Option<&str> {
        match &self.annotation {
            Annotation::Language(tag) => Some(tag),
            Annotation::Plain | Annotation::Datatype(_) => None,
        }
    }

    /// The explicit datatype of this literal, if any.
    ///
    /// NB: plain literals and language-tagged literals return `None`,
    /// see [`Literal::effective_datatype`].
    pub fn datatype(&self) -> Option<&str> {
        match &self.annotation {
            Annotation::Datatype(dt) => Some(dt),
            Annotation::Plain | Annotation::Language(_) => None,
        }
    }

    /// The datatype of this literal as per RDF 1.1,
    /// i.e. `xsd:string` for plain literals and `rdf:langString` for language-tagged ones.
    pub fn effective_datatype(&self) -> &str {
        match &self.annotation {
            Annotation::Plain => XSD_STRING,
            Annotation::Language(_) => RDF_LANG_STRING,
            Annotation::Datatype(dt) => dt,
        }
    }
}

/// A triple, optionally asserted in a named graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// The subject of the triple
    pub subject: Term,
    /// The predicate of the triple (always an IRI)
    pub predicate: Box<str>,
    /// The object of the triple
    pub object: Term,
    /// The graph name, `None` for the default graph
    pub graph: Option<Term>,
}

impl Triple {
    /// Build a triple in the default graph.
    pub fn new(subject: Term, predicate: impl Into<Box<str>>, object: Term) -> Self {
        Triple {
            subject,
            predicate: predicate.into(),
            object,
            graph: None,
        }
    }

    /// Move this triple into the given named graph.
    #[must_use]
    pub fn in_graph(self, graph: Term) -> Self {
        Triple {
            graph: Some(graph),
            ..self
        }
    }

    /// Iterate over the blank node labels of this triple,
    /// in subject, object, graph order.
    pub fn bnodes(&self) -> impl Iterator<Item = &str> + '_ {
        [Some(&self.subject), Some(&self.object), self.graph.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(Term::bnode_id)
    }

    /// Return a copy of this triple, where every blank node label has been passed through `f`.
    pub fn map_bnodes<F>(&self, mut f: F) -> Triple
    where
        F: FnMut(&str) -> Box<str>,
    {
        let mut map = |t: &Term| match t {
            Term::Blank(id) => Term::Blank(f(id)),
            Term::Iri(_) | Term::Literal(_) => t.clone(),
        };
        Triple {
            subject: map(&self.subject),
            predicate: self.predicate.clone(),
            object: map(&self.object),
            graph: self.graph.as_ref().map(&mut map),
        }
    }

    /// Serialize this triple as an N-Quads line (without the line terminator).
    pub fn to_nquad(&self) -> String {
        crate::_nq::nquad_line(self)
    }
}

/// The parsed content of one side of a diff:
/// its triples, and the set of blank node labels they use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphData {
    triples: Vec<Triple>,
    bnodes: BTreeSet<Box<str>>,
}

impl GraphData {
    /// Build a [`GraphData`], collecting the blank nodes used as subject, object or graph name.
    pub fn new(triples: Vec<Triple>) -> Self {
        let bnodes = triples
            .iter()
            .flat_map(Triple::bnodes)
            .map(Box::from)
            .collect();
        GraphData { triples, bnodes }
    }

    /// Parse an N-Quads document into a [`GraphData`].
    pub fn from_nquads(nquads: &str) -> Result<Self, DiffError> {
        crate::parser::parse_nquads(nquads).map(Self::new)
    }

    /// The triples of this graph.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// The blank node labels of this graph.
    pub fn bnodes(&self) -> &BTreeSet<Box<str>> {
        &self.bnodes
    }

    /// Rename blank nodes according to `mapping`;
    /// blank nodes absent from `mapping` keep their label.
    pub fn relabel(&self, mapping: &BTreeMap<Box<str>, Box<str>>) -> GraphData {
        let triples = self
            .triples
            .iter()
            .map(|t| t.map_bnodes(|id| mapping.get(id).cloned().unwrap_or_else(|| id.into())))
            .collect();
        GraphData::new(triples)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_rejects_language_and_datatype() {
        assert!(Literal::new("chat", Some("fr"), None).is_ok());
        assert!(Literal::new("42", None, Some("http://www.w3.org/2001/XMLSchema#integer")).is_ok());
        assert!(matches!(
            Literal::new("chat", Some("fr"), Some(XSD_STRING)),
            Err(DiffError::LanguageAndDatatype(_))
        ));
    }

    #[test]
    fn effective_datatype() {
        assert_eq!(Literal::plain("a").effective_datatype(), XSD_STRING);
        assert_eq!(Literal::with_language("a", "en").effective_datatype(), RDF_LANG_STRING);
        assert_eq!(Literal::typed("a", "tag:dt").effective_datatype(), "tag:dt");
        assert_eq!(Literal::plain("a").datatype(), None);
    }

    #[test]
    fn graph_data_collects_bnodes() {
        let triples = vec![
            Triple::new(Term::blank("s"), "tag:p", Term::iri("tag:o")),
            Triple::new(Term::iri("tag:s"), "tag:p", Term::blank("o")),
            Triple::new(Term::iri("tag:s"), "tag:p", Literal::plain("x").into())
                .in_graph(Term::blank("g")),
            Triple::new(Term::iri("tag:s"), "tag:p", Term::iri("tag:o")),
        ];
        let graph = GraphData::new(triples);
        let bnodes: Vec<&str> = graph.bnodes().iter().map(|b| &b[..]).collect();
        assert_eq!(bnodes, ["g", "o", "s"]);
    }

    #[test]
    fn relabel() {
        let graph = GraphData::new(vec![
            Triple::new(Term::blank("a"), "tag:p", Term::blank("b")),
        ]);
        let mapping = [(Box::from("a"), Box::from("x"))].into_iter().collect();
        let relabelled = graph.relabel(&mapping);
        assert_eq!(
            relabelled.triples()[0],
            Triple::new(Term::blank("x"), "tag:p", Term::blank("b"))
        );
        assert!(relabelled.bnodes().contains("x"));
        assert!(!relabelled.bnodes().contains("a"));
    }
}
