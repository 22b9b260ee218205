//! Bridges between [`crate::term::Term`] and the [`Term`](RdfTerm) trait of Sophia.
use sophia_api::term::{BnodeId, IriRef, LanguageTag, Term as RdfTerm, TermKind};
use sophia_api::MownStr;

use crate::term::{Literal, Term};
use crate::DiffError;

impl RdfTerm for Term {
    type BorrowTerm<'x> = &'x Self where Self: 'x;

    fn kind(&self) -> TermKind {
        match self {
            Term::Iri(_) => TermKind::Iri,
            Term::Literal(_) => TermKind::Literal,
            Term::Blank(_) => TermKind::BlankNode,
        }
    }

    fn borrow_term(&self) -> Self::BorrowTerm<'_> {
        self
    }

    fn iri(&self) -> Option<IriRef<MownStr<'_>>> {
        if let Term::Iri(iri) = self {
            Some(IriRef::new_unchecked(MownStr::from(&iri[..])))
        } else {
            None
        }
    }

    fn bnode_id(&self) -> Option<BnodeId<MownStr<'_>>> {
        if let Term::Blank(id) = self {
            Some(BnodeId::new_unchecked(MownStr::from(&id[..])))
        } else {
            None
        }
    }

    fn lexical_form(&self) -> Option<MownStr<'_>> {
        if let Term::Literal(lit) = self {
            Some(MownStr::from(lit.lexical_form()))
        } else {
            None
        }
    }

    fn datatype(&self) -> Option<IriRef<MownStr<'_>>> {
        if let Term::Literal(lit) = self {
            Some(IriRef::new_unchecked(MownStr::from(
                lit.effective_datatype(),
            )))
        } else {
            None
        }
    }

    fn language_tag(&self) -> Option<LanguageTag<MownStr<'_>>> {
        if let Term::Literal(lit) = self {
            lit.language_tag()
                .map(|tag| LanguageTag::new_unchecked(MownStr::from(tag)))
        } else {
            None
        }
    }
}

/// Convert any Sophia term into a [`Term`].
///
/// Variables and quoted triples are rejected.
pub(crate) fn from_rdf_term<T: RdfTerm>(t: T) -> Result<Term, DiffError> {
    let kind = t.kind();
    let converted = match kind {
        TermKind::Iri => t.iri().map(|iri| Term::Iri(Box::from(iri.as_str()))),
        TermKind::BlankNode => t.bnode_id().map(|id| Term::Blank(Box::from(id.as_str()))),
        TermKind::Literal => t.lexical_form().map(|lex| {
            let lex = Box::<str>::from(&*lex);
            if let Some(tag) = t.language_tag() {
                Term::Literal(Literal::with_language(lex, tag.as_str()))
            } else if let Some(dt) = t.datatype() {
                Term::Literal(Literal::typed(lex, dt.as_str()))
            } else {
                Term::Literal(Literal::plain(lex))
            }
        }),
        _ => None,
    };
    converted.ok_or_else(|| DiffError::UnsupportedTerm(format!("{kind:?}")))
}

/// Convert any Sophia term used as a predicate into an IRI.
pub(crate) fn predicate_from_rdf_term<T: RdfTerm>(t: T) -> Result<Box<str>, DiffError> {
    match from_rdf_term(t)? {
        Term::Iri(iri) => Ok(iri),
        other => Err(DiffError::UnsupportedTerm(format!(
            "{other} used as predicate"
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::{RDF_LANG_STRING, XSD_STRING};
    use sophia_api::term::assert_consistent_term_impl;

    #[test]
    fn consistent_impl() {
        assert_consistent_term_impl(&Term::iri("tag:1"));
        assert_consistent_term_impl(&Term::blank("b1"));
        assert_consistent_term_impl(&Term::Literal(Literal::plain("hello world")));
        assert_consistent_term_impl(&Term::Literal(Literal::with_language("chat", "fr")));
        assert_consistent_term_impl(&Term::Literal(Literal::typed(
            "42",
            "http://www.w3.org/2001/XMLSchema#integer",
        )));
    }

    #[test]
    fn implicit_datatypes() {
        let plain = Term::Literal(Literal::plain("a"));
        assert_eq!(RdfTerm::datatype(&plain).unwrap().as_str(), XSD_STRING);
        let tagged = Term::Literal(Literal::with_language("a", "en"));
        assert_eq!(RdfTerm::datatype(&tagged).unwrap().as_str(), RDF_LANG_STRING);
        assert_eq!(RdfTerm::language_tag(&tagged).unwrap().as_str(), "en");
    }

    #[test]
    fn round_trip() -> Result<(), DiffError> {
        for t in [
            Term::iri("tag:1"),
            Term::blank("b1"),
            Term::Literal(Literal::with_language("chat", "fr")),
            Term::Literal(Literal::typed("42", "tag:dt")),
        ] {
            assert_eq!(from_rdf_term(&t)?, t);
        }
        // plain literals come back with their implicit datatype
        let plain = Term::Literal(Literal::plain("a"));
        assert_eq!(
            from_rdf_term(&plain)?,
            Term::Literal(Literal::typed("a", XSD_STRING))
        );
        Ok(())
    }

    #[test]
    fn predicate_must_be_iri() {
        assert!(predicate_from_rdf_term(&Term::iri("tag:p")).is_ok());
        assert!(matches!(
            predicate_from_rdf_term(&Term::blank("p")),
            Err(DiffError::UnsupportedTerm(_))
        ));
    }
}
