//! I normalize the lexical form of literals,
//! so that spelling variants of the same value (`"01"` and `"1"` as `xsd:integer`)
//! do not show up in diffs.
//!
//! Recognized families:
//! * `xsd:string` is dropped, since plain literals are `xsd:string` anyway;
//! * `xsd:boolean` is spelled `true` or `false`;
//! * `xsd:integer` and all its derived types lose their `+` sign and leading zeros;
//! * `xsd:decimal` loses its `+` sign, leading zeros of the integer part and trailing zeros of the fraction;
//! * language tags are lowercased.
//!
//! Any other literal, and any ill-typed lexical form of a recognized datatype,
//! is left unchanged.

use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::term::{Literal, Term, Triple, XSD, XSD_STRING};
use crate::DiffError;

lazy_static! {
    static ref INTEGER_DATATYPES: HashSet<String> = [
        "integer",
        "long",
        "int",
        "short",
        "byte",
        "nonNegativeInteger",
        "nonPositiveInteger",
        "positiveInteger",
        "negativeInteger",
        "unsignedLong",
        "unsignedInt",
        "unsignedShort",
        "unsignedByte",
    ]
    .into_iter()
    .map(|suffix| format!("{XSD}{suffix}"))
    .collect();
    static ref XSD_BOOLEAN: String = format!("{XSD}boolean");
    static ref XSD_DECIMAL: String = format!("{XSD}decimal");
}

/// Normalize every literal of an N-Quads document.
///
/// Quads are re-serialized in their original order;
/// an empty (or blank) document yields an empty string.
pub fn normalize_literals(nquads: &str) -> Result<String, DiffError> {
    if nquads.trim().is_empty() {
        return Ok(String::new());
    }
    let triples = crate::parser::parse_nquads(nquads)?;
    let normalized: Vec<Triple> = triples.iter().map(normalize_triple).collect();
    Ok(crate::_nq::nquads(&normalized))
}

/// Normalize the subject, object and graph name of a triple.
pub fn normalize_triple(triple: &Triple) -> Triple {
    Triple {
        subject: normalize_term(&triple.subject),
        predicate: triple.predicate.clone(),
        object: normalize_term(&triple.object),
        graph: triple.graph.as_ref().map(normalize_term),
    }
}

/// Normalize a term; only literals are affected.
pub fn normalize_term(term: &Term) -> Term {
    match term {
        Term::Literal(lit) => Term::Literal(normalize_literal(lit)),
        Term::Iri(_) | Term::Blank(_) => term.clone(),
    }
}

/// Normalize a literal.
pub fn normalize_literal(lit: &Literal) -> Literal {
    if let Some(tag) = lit.language_tag() {
        return Literal::with_language(lit.lexical_form(), tag.to_ascii_lowercase());
    }
    let Some(datatype) = lit.datatype() else {
        return lit.clone();
    };
    let lex = lit.lexical_form();
    if datatype == XSD_STRING {
        return Literal::plain(lex);
    }
    let canonical = if datatype == XSD_BOOLEAN.as_str() {
        canonical_boolean(lex)
    } else if datatype == XSD_DECIMAL.as_str() {
        canonical_decimal(lex)
    } else if INTEGER_DATATYPES.contains(datatype) {
        canonical_integer(lex)
    } else {
        None
    };
    match canonical {
        Some(lex) => Literal::typed(lex, datatype),
        None => lit.clone(),
    }
}

fn canonical_boolean(lex: &str) -> Option<String> {
    match lex.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some("true".into()),
        "0" | "false" => Some("false".into()),
        _ => None,
    }
}

fn canonical_integer(lex: &str) -> Option<String> {
    let (negative, digits) = split_sign(lex.trim());
    if !all_digits(digits) || digits.is_empty() {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    Some(if digits.is_empty() {
        "0".into()
    } else if negative {
        format!("-{digits}")
    } else {
        digits.into()
    })
}

fn canonical_decimal(lex: &str) -> Option<String> {
    let (negative, unsigned) = split_sign(lex.trim());
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return None;
    }
    let int = match int.trim_start_matches('0') {
        "" => "0",
        int => int,
    };
    let frac = frac.trim_end_matches('0');
    if int == "0" && frac.is_empty() {
        return Some("0".into());
    }
    let mut canonical = String::with_capacity(lex.len());
    if negative {
        canonical.push('-');
    }
    canonical.push_str(int);
    if !frac.is_empty() {
        canonical.push('.');
        canonical.push_str(frac);
    }
    Some(canonical)
}

/// Split an optional leading sign, returning whether it was negative.
fn split_sign(lex: &str) -> (bool, &str) {
    if let Some(unsigned) = lex.strip_prefix('-') {
        (true, unsigned)
    } else {
        (false, lex.strip_prefix('+').unwrap_or(lex))
    }
}

fn all_digits(txt: &str) -> bool {
    txt.bytes().all(|b| b.is_ascii_digit())
}
