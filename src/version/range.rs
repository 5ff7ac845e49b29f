//! Comparator range expressions for package-manager version formats
//!
//! Formats without a native range syntax (rpm, dpkg) accept a small
//! comparator grammar built on top of their `compare`:
//! - `>= 1.0 < 2.0` / `>= 1.0, < 2.0` - all clauses of a group must hold
//! - `< 1.0 || >= 2.0` - any group may hold
//! - `1.0` / `= 1.0` / `== 1.0` - equality
//! - `!= 1.0` - inequality
//! - `*` - any version

use std::cmp::Ordering;

use crate::version::error::VersionError;

/// Comparison operator of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "=" | "==" => Some(Operator::Equal),
            "!=" => Some(Operator::NotEqual),
            "<" => Some(Operator::Less),
            "<=" => Some(Operator::LessEqual),
            ">" => Some(Operator::Greater),
            ">=" => Some(Operator::GreaterEqual),
            _ => None,
        }
    }

    /// Whether a version comparing as `ordering` against the operand satisfies this operator
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Less => ordering == Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
        }
    }
}

/// A single `operator version` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause<'a> {
    pub operator: Operator,
    pub version: &'a str,
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

fn is_clause_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Split one OR-group into its clauses
fn parse_group(group: &str) -> Result<Vec<Clause<'_>>, VersionError> {
    let unparseable = || VersionError::RangeSpecUnparseable(group.trim().to_string());
    let mut clauses = Vec::new();
    let mut rest = group.trim_start_matches(is_clause_separator);

    while !rest.is_empty() {
        let op_len = rest
            .find(|c: char| !is_operator_char(c))
            .unwrap_or(rest.len());
        let operator = if op_len == 0 {
            Operator::Equal
        } else {
            Operator::parse(&rest[..op_len]).ok_or_else(unparseable)?
        };

        rest = rest[op_len..].trim_start();
        let version_len = rest
            .find(|c: char| is_clause_separator(c) || is_operator_char(c))
            .unwrap_or(rest.len());
        if version_len == 0 {
            return Err(unparseable());
        }

        clauses.push(Clause {
            operator,
            version: &rest[..version_len],
        });
        rest = rest[version_len..].trim_start_matches(is_clause_separator);
    }

    if clauses.is_empty() {
        return Err(unparseable());
    }
    Ok(clauses)
}

/// Parse a full range expression into OR-groups of AND-ed clauses
pub fn parse_range(range: &str) -> Result<Vec<Vec<Clause<'_>>>, VersionError> {
    range.split("||").map(parse_group).collect()
}

/// Evaluate `range` for a version using `compare_to`, which orders the
/// version against a clause operand
///
/// Every group is parsed before evaluation so a malformed expression is
/// reported even when an earlier group already matches.
pub fn evaluate<F>(range: &str, mut compare_to: F) -> Result<bool, VersionError>
where
    F: FnMut(&str) -> Result<Ordering, VersionError>,
{
    if range.trim() == "*" {
        return Ok(true);
    }

    for group in parse_range(range)? {
        let mut satisfied = true;
        for clause in group {
            if !clause.operator.matches(compare_to(clause.version)?) {
                satisfied = false;
                break;
            }
        }
        if satisfied {
            return Ok(true);
        }
    }
    Ok(false)
}
