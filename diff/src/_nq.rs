//! Canonical N-Quads

use crate::term::{Term, Triple, XSD_STRING};

/// Serialize a term in canonical n-quads, followed by a space
pub fn nq(term: &Term, buffer: &mut String) {
    match term {
        Term::Iri(iri) => nq_iri(iri, buffer),
        Term::Literal(lit) => {
            buffer.push('"');
            for c in lit.lexical_form().chars() {
                match c {
                    '"' => buffer.push_str("\\\""),
                    '\\' => buffer.push_str("\\\\"),
                    '\n' => buffer.push_str("\\n"),
                    '\r' => buffer.push_str("\\r"),
                    '\t' => buffer.push_str("\\t"),
                    '\x08' => buffer.push_str("\\b"),
                    '\x0c' => buffer.push_str("\\f"),
                    '\x7f' => buffer.push_str("\\u007F"),
                    c if c <= '\x1f' => buffer.push_str(&format!("\\u{:04X}", c as u8)),
                    _ => buffer.push(c),
                }
            }
            buffer.push('"');
            if let Some(tag) = lit.language_tag() {
                buffer.push('@');
                buffer.push_str(tag);
                buffer.push(' ');
            } else {
                match lit.datatype() {
                    Some(dt) if dt != XSD_STRING => {
                        buffer.push_str("^^");
                        nq_iri(dt, buffer);
                    }
                    _ => buffer.push(' '),
                }
            }
        }
        Term::Blank(id) => {
            buffer.push_str("_:");
            buffer.push_str(id);
            buffer.push(' ');
        }
    }
}

fn nq_iri(iri: &str, buffer: &mut String) {
    buffer.push('<');
    buffer.push_str(iri);
    buffer.push_str("> ");
}

/// Serialize a triple as one N-Quads line, without the line terminator
pub fn nquad_line(triple: &Triple) -> String {
    let mut buffer = String::new();
    nq(&triple.subject, &mut buffer);
    nq_iri(&triple.predicate, &mut buffer);
    nq(&triple.object, &mut buffer);
    if let Some(gn) = &triple.graph {
        nq(gn, &mut buffer);
    }
    buffer.push('.');
    buffer
}

/// Join lines into a document, each line followed by `\n`
pub fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buffer = String::new();
    for line in lines {
        buffer.push_str(line.as_ref());
        buffer.push('\n');
    }
    buffer
}

/// Serialize triples as an N-Quads document, in the given order
pub fn nquads<'a, I>(triples: I) -> String
where
    I: IntoIterator<Item = &'a Triple>,
{
    join_lines(triples.into_iter().map(nquad_line))
}

/// Serialize triples as an N-Quads document, with lines sorted in codepoint order and deduplicated
pub fn sorted_nquads<'a, I>(triples: I) -> String
where
    I: IntoIterator<Item = &'a Triple>,
{
    let mut lines: Vec<String> = triples.into_iter().map(nquad_line).collect();
    lines.sort_unstable();
    lines.dedup();
    join_lines(lines)
}
