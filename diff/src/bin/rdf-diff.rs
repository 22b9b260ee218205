//! Compare two [Turtle] files up to blank node relabelling,
//! and print the lines only found in the left file (prefixed with `-`)
//! and those only found in the right file (prefixed with `+`).
//!
//! Usage: `rdf-diff <left.ttl> <right.ttl> [base-iri]`
//!
//! The exit status is 0 if both files describe the same graph, 1 otherwise.
//!
//! Options can be provided via the following environment variables:
//! * SOPHIA_DIFF_DEPTH_FACTOR
//! * SOPHIA_DIFF_PERMUTATION_LIMIT
//! * SOPHIA_DIFF_MATCH_BUDGET
//!
//! [Turtle]: https://www.w3.org/TR/turtle/

use std::env::args;
use std::fs::read_to_string;
use std::io::{stdout, BufWriter, Write};
use std::process::ExitCode;

use sophia_diff::DiffService;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Vec<String> = args().skip(1).collect();
    let (left_path, right_path, base) = match &args[..] {
        [left, right] => (left, right, None),
        [left, right, base] => (left, right, Some(base.as_str())),
        _ => {
            eprintln!("usage: rdf-diff <left> <right> [base-iri]");
            return Ok(ExitCode::from(2));
        }
    };
    let service = DiffService::from_env()?;
    let left = read_to_string(left_path)?;
    let right = read_to_string(right_path)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = rt.block_on(service.diff_documents(&left, &right, base))?;
    log::debug!("isomorphic: {}", report.is_isomorphic);

    let mut output = BufWriter::new(stdout());
    for line in &report.dels {
        writeln!(output, "-{line}")?;
    }
    for line in &report.adds {
        writeln!(output, "+{line}")?;
    }
    output.flush()?;
    Ok(if report.adds.is_empty() && report.dels.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
