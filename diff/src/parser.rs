//! Lowering of source text to [`Triple`]s, delegated to [`sophia_turtle`].
//!
//! Line endings are normalized to `\n` before parsing.

use std::borrow::Cow;

use sophia_api::parser::TripleParser;
use sophia_api::quad::Quad;
use sophia_api::source::{QuadSource, StreamError, TripleSource};
use sophia_api::triple::Triple as _;
use sophia_iri::Iri;
use sophia_turtle::parser::{nq, turtle::TurtleParser};

use crate::_term_impl::{from_rdf_term, predicate_from_rdf_term};
use crate::term::Triple;
use crate::DiffError;

/// Replace `\r\n` and lone `\r` by `\n`.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Parse an N-Quads document.
pub fn parse_nquads(text: &str) -> Result<Vec<Triple>, DiffError> {
    let text = normalize_line_endings(text);
    let mut triples = vec![];
    nq::parse_str(&text)
        .try_for_each_quad(|q| -> Result<(), DiffError> {
            let mut triple = Triple::new(
                from_rdf_term(q.s())?,
                predicate_from_rdf_term(q.p())?,
                from_rdf_term(q.o())?,
            );
            if let Some(g) = q.g() {
                triple = triple.in_graph(from_rdf_term(g)?);
            }
            triples.push(triple);
            Ok(())
        })
        .map_err(flatten_stream_error)?;
    Ok(triples)
}

/// Parse a Turtle document,
/// resolving relative IRIs against `base` if it is neither `None` nor empty.
pub fn parse_turtle(text: &str, base: Option<&str>) -> Result<Vec<Triple>, DiffError> {
    let text = normalize_line_endings(text);
    let base = match base.map(str::trim).filter(|b| !b.is_empty()) {
        Some(b) => Some(Iri::new(b.to_string()).map_err(|err| DiffError::InvalidBase {
            iri: b.to_string(),
            message: err.to_string(),
        })?),
        None => None,
    };
    let parser = TurtleParser { base };
    let mut triples = vec![];
    parser
        .parse_str(&text)
        .try_for_each_triple(|t| -> Result<(), DiffError> {
            triples.push(Triple::new(
                from_rdf_term(t.s())?,
                predicate_from_rdf_term(t.p())?,
                from_rdf_term(t.o())?,
            ));
            Ok(())
        })
        .map_err(flatten_stream_error)?;
    Ok(triples)
}

/// Lower a Turtle document to N-Quads.
///
/// Return `None` if the document is empty or only contains whitespace.
pub fn turtle_to_nquads(text: &str, base: Option<&str>) -> Result<Option<String>, DiffError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let triples = parse_turtle(text, base)?;
    Ok(Some(crate::_nq::nquads(&triples)))
}

fn flatten_stream_error<E: std::error::Error>(err: StreamError<E, DiffError>) -> DiffError {
    match err {
        StreamError::SourceError(err) => DiffError::Syntax(err.to_string()),
        StreamError::SinkError(err) => err,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::{Literal, Term, XSD_STRING};

    #[test]
    fn line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn nquads() -> Result<(), DiffError> {
        let triples = parse_nquads(
            "<tag:s> <tag:p> \"x\"@en <tag:g> .\r\n_:b <tag:p> \"1\"^^<tag:dt> .\r\n",
        )?;
        assert_eq!(
            triples,
            vec![
                Triple::new(
                    Term::iri("tag:s"),
                    "tag:p",
                    Literal::with_language("x", "en").into()
                )
                .in_graph(Term::iri("tag:g")),
                Triple::new(Term::blank("b"), "tag:p", Literal::typed("1", "tag:dt").into()),
            ]
        );
        Ok(())
    }

    #[test]
    fn nquads_syntax_error() {
        assert!(matches!(
            parse_nquads("<tag:s> <tag:p> ."),
            Err(DiffError::Syntax(_))
        ));
    }

    #[test]
    fn turtle_with_base() -> Result<(), DiffError> {
        let triples = parse_turtle(
            "@prefix : <http://example.org/ns#> .\n<a> :p [ :q \"v\" ] .",
            Some("http://example.org/doc"),
        )?;
        assert_eq!(triples.len(), 2);
        let first = triples
            .iter()
            .find(|t| t.subject == Term::iri("http://example.org/a"))
            .unwrap();
        assert_eq!(&*first.predicate, "http://example.org/ns#p");
        assert!(first.object.is_blank());
        let second = triples.iter().find(|t| t.subject.is_blank()).unwrap();
        assert_eq!(second.object, Term::from(Literal::typed("v", XSD_STRING)));
        Ok(())
    }

    #[test]
    fn invalid_base() {
        assert!(matches!(
            parse_turtle("<a> <b> <c> .", Some("not an iri")),
            Err(DiffError::InvalidBase { .. })
        ));
    }

    #[test]
    fn turtle_to_nquads_empty() -> Result<(), DiffError> {
        assert_eq!(turtle_to_nquads("  \n\t", None)?, None);
        assert_eq!(
            turtle_to_nquads("<tag:s> <tag:p> <tag:o> .", None)?.as_deref(),
            Some("<tag:s> <tag:p> <tag:o> .\n")
        );
        Ok(())
    }
}
