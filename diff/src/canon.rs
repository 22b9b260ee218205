//! I wrap the [RDFC-1.0] implementation of [`sophia_c14n`]
//! to produce a [`CanonDetail`] from source text or from [`Triple`]s.
//!
//! On top of the canonicalization algorithm, this module
//! * lowers Turtle or N-Quads to triples (line endings normalized to `\n`),
//! * exposes the issued identifier map (original label → canonical label),
//! * computes a content hash of the canonical form.
//!
//! [RDFC-1.0]: https://www.w3.org/TR/rdf-canon/

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use sophia_api::quad::Spog;
use sophia_api::term::Term as _;
use sophia_c14n::hash::{HashFunction, Sha256};
use sophia_c14n::rdfc10;

use crate::term::{Term, Triple};
use crate::{DiffError, DiffOptions};

/// The result of canonicalizing one graph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CanonDetail {
    /// Canonical N-Quads, sorted in codepoint order, one quad per `\n`-terminated line
    pub canonical_form: String,
    /// Maps every original blank node label to its canonical label
    pub issued_identifier_map: BTreeMap<Box<str>, Box<str>>,
    /// Hex-encoded SHA-256 of `canonical_form`
    pub hash: String,
}

/// Some source text, to be lowered to triples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A Turtle document, with an optional base IRI
    Turtle {
        /// The document
        text: String,
        /// The base IRI against which relative IRIs are resolved
        base: Option<String>,
    },
    /// An N-Quads document
    NQuads(String),
}

impl Source {
    /// Parse this source.
    pub fn triples(&self) -> Result<Vec<Triple>, DiffError> {
        match self {
            Source::Turtle { text, base } => crate::parser::parse_turtle(text, base.as_deref()),
            Source::NQuads(text) => crate::parser::parse_nquads(text),
        }
    }
}

/// Canonicalizes graphs with RDFC-1.0.
///
/// Constructing a [`Canonicalizer`] checks, once per process,
/// that the hash function and the canonicalization algorithm behave as expected.
#[derive(Clone, Copy, Debug)]
pub struct Canonicalizer {
    options: DiffOptions,
}

impl Canonicalizer {
    /// Build a [`Canonicalizer`].
    ///
    /// # Error
    /// [`DiffError::BackendUnavailable`] if the self-test of the canonicalization backend failed.
    pub fn new(options: DiffOptions) -> Result<Self, DiffError> {
        check_backend()?;
        Ok(Canonicalizer { options })
    }

    /// The options of this canonicalizer.
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Parse `source`, then canonicalize it.
    pub fn canonicalize_source(&self, source: &Source) -> Result<CanonDetail, DiffError> {
        self.canonicalize_triples(&source.triples()?)
    }

    /// Parse an N-Quads document, then canonicalize it.
    pub fn canonicalize_nquads(&self, nquads: &str) -> Result<CanonDetail, DiffError> {
        self.canonicalize_triples(&crate::parser::parse_nquads(nquads)?)
    }

    /// Canonicalize a set of triples.
    ///
    /// Duplicate triples are only kept once.
    pub fn canonicalize_triples(&self, triples: &[Triple]) -> Result<CanonDetail, DiffError> {
        let dataset: BTreeSet<Spog<Term>> = triples.iter().map(to_spog).collect();
        let (_, issued) = rdfc10::relabel_with::<Sha256, _>(
            &dataset,
            self.options.depth_factor(),
            self.options.permutation_limit(),
        )
        .map_err(|err| DiffError::Canonicalization(err.to_string()))?;
        let issued: BTreeMap<Box<str>, Box<str>> = issued
            .iter()
            .map(|(original, canonical)| (Box::from(&**original), Box::from(canonical.as_str())))
            .collect();

        let relabelled_triples: Vec<Triple> = triples
            .iter()
            .map(|t| t.map_bnodes(|id| issued.get(id).cloned().unwrap_or_else(|| id.into())))
            .collect();
        let canonical_form = crate::_nq::sorted_nquads(&relabelled_triples);
        let hash = hash_hex(&canonical_form);
        log::trace!("canonical form ({hash}):\n{canonical_form}");
        Ok(CanonDetail {
            canonical_form,
            issued_identifier_map: issued,
            hash,
        })
    }
}

/// Serialize triples as sorted, deduplicated N-Quads,
/// without canonicalizing blank nodes.
pub fn sorted_form(triples: &[Triple]) -> String {
    crate::_nq::sorted_nquads(triples)
}

/// Hex-encoded SHA-256 of `text`.
pub fn hash_hex(text: &str) -> String {
    let mut hasher = Sha256::initialize();
    hasher.update(text.as_bytes());
    hex(&hasher.finalize())
}

fn hex(hash: &impl AsRef<[u8]>) -> String {
    let mut digest = String::with_capacity(64);
    for b in hash.as_ref() {
        digest.push_str(&format!("{b:02x}"));
    }
    digest
}

fn to_spog(triple: &Triple) -> Spog<Term> {
    (
        [
            triple.subject.clone(),
            Term::Iri(triple.predicate.clone()),
            triple.object.clone(),
        ],
        triple.graph.clone(),
    )
}

/// Check that the canonicalization backend works.
///
/// The check is performed once per process; its result is then cached.
pub fn check_backend() -> Result<(), DiffError> {
    BACKEND_CHECK.clone().map_err(DiffError::BackendUnavailable)
}

lazy_static! {
    static ref BACKEND_CHECK: Result<(), String> = self_test();
}

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

fn self_test() -> Result<(), String> {
    let digest = hash_hex("abc");
    if digest != ABC_SHA256 {
        return Err(format!("SHA-256 self-test failed (got {digest})"));
    }
    let probe = [Triple::new(Term::blank("x"), "tag:p", Term::iri("tag:o"))];
    let dataset: BTreeSet<Spog<Term>> = probe.iter().map(to_spog).collect();
    let (relabelled, _) = rdfc10::relabel(&dataset).map_err(|err| err.to_string())?;
    let label = relabelled
        .first()
        .and_then(|(spo, _)| spo[0].bnode_id().map(|id| id.as_str().to_string()));
    if label.as_deref() != Some("c14n0") {
        return Err(format!("RDFC-1.0 self-test failed (got {label:?})"));
    }
    log::debug!("canonicalization backend checked");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn canonicalizer() -> Canonicalizer {
        crate::test_setup();
        Canonicalizer::new(DiffOptions::default()).unwrap()
    }

    #[test]
    fn backend_available() {
        assert!(check_backend().is_ok());
    }

    #[test]
    fn example2() -> Result<(), DiffError> {
        let got = canonicalizer().canonicalize_nquads(
            r"<http://example.com/#p> <http://example.com/#q> _:e0 .
<http://example.com/#p> <http://example.com/#r> _:e1 .
_:e0 <http://example.com/#s> <http://example.com/#u> .
_:e1 <http://example.com/#t> <http://example.com/#u> .
",
        )?;
        let exp = r"<http://example.com/#p> <http://example.com/#q> _:c14n0 .
<http://example.com/#p> <http://example.com/#r> _:c14n1 .
_:c14n0 <http://example.com/#s> <http://example.com/#u> .
_:c14n1 <http://example.com/#t> <http://example.com/#u> .
";
        assert_eq!(got.canonical_form, exp);
        assert_eq!(got.issued_identifier_map.len(), 2);
        assert_eq!(got.issued_identifier_map.get("e0").map(|l| &l[..]), Some("c14n0"));
        assert_eq!(got.issued_identifier_map.get("e1").map(|l| &l[..]), Some("c14n1"));
        assert_eq!(got.hash, hash_hex(exp));
        Ok(())
    }

    #[test]
    fn deterministic_under_relabelling() -> Result<(), DiffError> {
        let c = canonicalizer();
        let d1 = c.canonicalize_nquads(
            r#"_:a <tag:knows> _:b .
_:b <tag:name> "Bob" .
_:a <tag:name> "Alice" <tag:g> .
"#,
        )?;
        let d2 = c.canonicalize_nquads(
            r#"_:bob <tag:name> "Bob" .
_:alice <tag:name> "Alice" <tag:g> .
_:alice <tag:knows> _:bob .
"#,
        )?;
        assert_eq!(d1.canonical_form, d2.canonical_form);
        assert_eq!(d1.hash, d2.hash);
        assert_eq!(
            d1.issued_identifier_map.get("a"),
            d2.issued_identifier_map.get("alice")
        );
        Ok(())
    }

    #[test]
    fn duplicates_and_line_endings() -> Result<(), DiffError> {
        let c = canonicalizer();
        let d1 = c.canonicalize_nquads("_:x <tag:p> <tag:o> .\r\n_:x <tag:p> <tag:o> .\r\n")?;
        assert_eq!(d1.canonical_form, "_:c14n0 <tag:p> <tag:o> .\n");
        Ok(())
    }

    #[test]
    fn graph_name_is_issued() -> Result<(), DiffError> {
        let got = canonicalizer().canonicalize_nquads("<tag:s> <tag:p> <tag:o> _:g .\n")?;
        assert_eq!(got.canonical_form, "<tag:s> <tag:p> <tag:o> _:c14n0 .\n");
        assert_eq!(got.issued_identifier_map.len(), 1);
        assert_eq!(got.issued_identifier_map.get("g").map(|l| &l[..]), Some("c14n0"));
        Ok(())
    }

    #[test]
    fn turtle_source() -> Result<(), DiffError> {
        let c = canonicalizer();
        let source = Source::Turtle {
            text: "<a> <p> [ <q> <b> ] .".into(),
            base: Some("http://example.org/".into()),
        };
        let got = c.canonicalize_source(&source)?;
        assert_eq!(
            got.canonical_form,
            "<http://example.org/a> <http://example.org/p> _:c14n0 .\n_:c14n0 <http://example.org/q> <http://example.org/b> .\n"
        );
        Ok(())
    }

    #[test]
    fn toxic_graph() {
        let c = Canonicalizer::new(DiffOptions::default().with_depth_factor(0.5)).unwrap();
        let res = c.canonicalize_nquads(
            "_:e0 <tag:p> _:e1 .\n_:e1 <tag:p> _:e2 .\n_:e2 <tag:p> _:e3 .\n_:e3 <tag:p> _:e4 .\n_:e4 <tag:p> _:e0 .\n",
        );
        assert!(matches!(res, Err(DiffError::Canonicalization(_))));
    }

    #[test]
    fn sorted_without_canonicalization() -> Result<(), DiffError> {
        let triples = crate::parser::parse_nquads("_:z <tag:p> <tag:o> .\n<tag:a> <tag:p> _:z .\n")?;
        assert_eq!(
            sorted_form(&triples),
            "<tag:a> <tag:p> _:z .\n_:z <tag:p> <tag:o> .\n"
        );
        Ok(())
    }
}
