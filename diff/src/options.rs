//! Defines [`DiffOptions`], configuring canonicalization and blank node matching.

use std::env::{var, VarError};
use std::str::FromStr;

use sophia_c14n::rdfc10::{DEFAULT_DEPTH_FACTOR, DEFAULT_PERMUTATION_LIMIT};

use crate::DiffError;

/// The default value of [`DiffOptions::match_budget`].
pub const DEFAULT_MATCH_BUDGET: usize = 100_000;

/// Environment variable overriding [`DiffOptions::depth_factor`].
pub const ENV_DEPTH_FACTOR: &str = "SOPHIA_DIFF_DEPTH_FACTOR";
/// Environment variable overriding [`DiffOptions::permutation_limit`].
pub const ENV_PERMUTATION_LIMIT: &str = "SOPHIA_DIFF_PERMUTATION_LIMIT";
/// Environment variable overriding [`DiffOptions::match_budget`].
/// `none` or `0` make the matcher unbounded.
pub const ENV_MATCH_BUDGET: &str = "SOPHIA_DIFF_MATCH_BUDGET";

/// Options of the diff pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffOptions {
    depth_factor: f32,
    permutation_limit: usize,
    match_budget: Option<usize>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            depth_factor: DEFAULT_DEPTH_FACTOR,
            permutation_limit: DEFAULT_PERMUTATION_LIMIT,
            match_budget: Some(DEFAULT_MATCH_BUDGET),
        }
    }
}

impl DiffOptions {
    /// Build options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options with default values,
    /// overridden by the `SOPHIA_DIFF_*` environment variables that are set.
    ///
    /// See [`ENV_DEPTH_FACTOR`], [`ENV_PERMUTATION_LIMIT`] and [`ENV_MATCH_BUDGET`].
    pub fn from_env() -> Result<Self, DiffError> {
        Self::from_lookup(|name| var(name))
    }

    /// Same as [`from_env`](Self::from_env), with variables read through `lookup`.
    fn from_lookup<F>(lookup: F) -> Result<Self, DiffError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let mut options = Self::default();
        if let Some(depth_factor) = read_env(&lookup, ENV_DEPTH_FACTOR)? {
            options.depth_factor = depth_factor;
        }
        if let Some(permutation_limit) = read_env(&lookup, ENV_PERMUTATION_LIMIT)? {
            options.permutation_limit = permutation_limit;
        }
        match lookup(ENV_MATCH_BUDGET) {
            Ok(txt) if txt.trim().eq_ignore_ascii_case("none") => options.match_budget = None,
            Ok(txt) => {
                let budget: usize = parse_value(ENV_MATCH_BUDGET, &txt)?;
                options.match_budget = (budget > 0).then_some(budget);
            }
            Err(VarError::NotPresent) => {}
            Err(err) => return Err(DiffError::Config(format!("{ENV_MATCH_BUDGET}: {err}"))),
        }
        Ok(options)
    }

    /// The recursion safeguard of RDFC-1.0:
    /// canonicalization stops recursing deeper than `depth_factor` times the number of blank nodes.
    pub fn depth_factor(&self) -> f32 {
        self.depth_factor
    }

    /// The permutation safeguard of RDFC-1.0:
    /// the maximum number of indistinguishable blank nodes canonicalization will permute.
    pub fn permutation_limit(&self) -> usize {
        self.permutation_limit
    }

    /// The maximum number of tentative assignments the [matcher](crate::matcher) may try,
    /// or `None` if the search is unbounded.
    pub fn match_budget(&self) -> Option<usize> {
        self.match_budget
    }

    /// Change the [`depth_factor`](Self::depth_factor) option.
    #[must_use]
    pub fn with_depth_factor(self, depth_factor: f32) -> Self {
        Self {
            depth_factor,
            ..self
        }
    }

    /// Change the [`permutation_limit`](Self::permutation_limit) option.
    #[must_use]
    pub fn with_permutation_limit(self, permutation_limit: usize) -> Self {
        Self {
            permutation_limit,
            ..self
        }
    }

    /// Change the [`match_budget`](Self::match_budget) option.
    #[must_use]
    pub fn with_match_budget(self, match_budget: Option<usize>) -> Self {
        Self {
            match_budget,
            ..self
        }
    }
}

fn read_env<T, F>(lookup: F, name: &str) -> Result<Option<T>, DiffError>
where
    T: FromStr,
    F: Fn(&str) -> Result<String, VarError>,
{
    match lookup(name) {
        Ok(txt) => parse_value(name, &txt).map(Some),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(DiffError::Config(format!("{name}: {err}"))),
    }
}

fn parse_value<T: FromStr>(name: &str, txt: &str) -> Result<T, DiffError> {
    txt.trim()
        .parse()
        .map_err(|_| DiffError::Config(format!("{name}: can not parse {txt:?}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn defaults() {
        let options = DiffOptions::new();
        assert_eq!(options.depth_factor(), DEFAULT_DEPTH_FACTOR);
        assert_eq!(options.permutation_limit(), DEFAULT_PERMUTATION_LIMIT);
        assert_eq!(options.match_budget(), Some(DEFAULT_MATCH_BUDGET));
    }

    #[test]
    fn builder() {
        let options = DiffOptions::new()
            .with_depth_factor(2.0)
            .with_permutation_limit(3)
            .with_match_budget(None);
        assert_eq!(options.depth_factor(), 2.0);
        assert_eq!(options.permutation_limit(), 3);
        assert_eq!(options.match_budget(), None);
    }

    #[test]
    fn parse_values() {
        assert_eq!(parse_value::<usize>("X", " 42 ").unwrap(), 42);
        assert_eq!(parse_value::<f32>("X", "1.5").unwrap(), 1.5);
        assert!(matches!(
            parse_value::<usize>("X", "many"),
            Err(DiffError::Config(_))
        ));
    }

    #[test_case(Some("none") => Some(None); "none")]
    #[test_case(Some("NONE") => Some(None); "none uppercase")]
    #[test_case(Some("0") => Some(None); "zero")]
    #[test_case(Some("5") => Some(Some(5)); "five")]
    #[test_case(Some("many") => None; "malformed")]
    #[test_case(None => Some(Some(DEFAULT_MATCH_BUDGET)); "not present")]
    fn match_budget_from_env(value: Option<&str>) -> Option<Option<usize>> {
        let lookup = |name: &str| match value {
            Some(txt) if name == ENV_MATCH_BUDGET => Ok(txt.to_string()),
            _ => Err(VarError::NotPresent),
        };
        match DiffOptions::from_lookup(lookup) {
            Ok(options) => Some(options.match_budget()),
            Err(DiffError::Config(_)) => None,
            Err(err) => panic!("unexpected error {err}"),
        }
    }

    #[test]
    fn canonicalization_from_env() {
        let lookup = |name: &str| match name {
            ENV_DEPTH_FACTOR => Ok("2.5".to_string()),
            ENV_PERMUTATION_LIMIT => Ok("7".to_string()),
            _ => Err(VarError::NotPresent),
        };
        let options = DiffOptions::from_lookup(lookup).unwrap();
        assert_eq!(options.depth_factor(), 2.5);
        assert_eq!(options.permutation_limit(), 7);
        assert_eq!(options.match_budget(), Some(DEFAULT_MATCH_BUDGET));

        let broken = |name: &str| match name {
            ENV_PERMUTATION_LIMIT => Err(VarError::NotUnicode("\u{fffd}".into())),
            _ => Err(VarError::NotPresent),
        };
        assert!(matches!(
            DiffOptions::from_lookup(broken),
            Err(DiffError::Config(_))
        ));
    }
}
