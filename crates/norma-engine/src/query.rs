//! Required/forbidden path queries and unpartitioned team selection.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use norma_model::{Model, PredicateCatalog, PredicateId, Team};
use serde::Serialize;
use tracing::debug;

use crate::error::AnalysisError;

/// A conjunction of required and forbidden predicate ids.
///
/// Written as `[1,-2,3]`: positive entries are required, negative entries are
/// forbidden. Brackets are optional and whitespace is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathQuery {
    pub required: Vec<PredicateId>,
    pub forbidden: Vec<PredicateId>,
}

impl PathQuery {
    pub fn new(required: Vec<PredicateId>, forbidden: Vec<PredicateId>) -> Self {
        PathQuery {
            required,
            forbidden,
        }
    }

    pub fn requiring(id: PredicateId) -> Self {
        PathQuery::new(vec![id], Vec::new())
    }

    pub fn forbidding(id: PredicateId) -> Self {
        PathQuery::new(Vec::new(), vec![id])
    }

    pub fn is_unconstrained(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }

    /// Empty `required` with a non-empty `forbidden`: "what follows when these
    /// are violated".
    pub fn is_violation_style(&self) -> bool {
        self.required.is_empty() && !self.forbidden.is_empty()
    }

    pub fn matches(&self, model: &Model) -> bool {
        model.contains_all(&self.required) && !model.contains_any(&self.forbidden)
    }

    pub fn parse(input: &str) -> Result<Self, AnalysisError> {
        let invalid = |message: String| AnalysisError::InvalidPath {
            input: input.to_string(),
            message,
        };

        let mut body = input.trim();
        if let Some(rest) = body.strip_prefix('[') {
            body = rest
                .strip_suffix(']')
                .ok_or_else(|| invalid("missing closing ']'".to_string()))?;
        } else if body.ends_with(']') {
            return Err(invalid("missing opening '['".to_string()));
        }

        let mut query = PathQuery::default();
        if body.trim().is_empty() {
            return Ok(query);
        }
        for token in body.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(invalid("empty entry".to_string()));
            }
            let value: i64 = token
                .parse()
                .map_err(|_| invalid(format!("'{token}' is not an integer")))?;
            let id = PredicateId::try_from(value.unsigned_abs())
                .map_err(|_| invalid(format!("'{token}' is out of range")))?;
            if value < 0 {
                query.forbidden.push(id);
            } else if value > 0 || !token.starts_with('-') {
                query.required.push(id);
            } else {
                return Err(invalid("'-0' is ambiguous".to_string()));
            }
        }
        Ok(query)
    }
}

impl FromStr for PathQuery {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathQuery::parse(s)
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let entries = self
            .required
            .iter()
            .map(|id| id.to_string())
            .chain(self.forbidden.iter().map(|id| format!("-{id}")));
        for (i, entry) in entries.enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&entry)?;
        }
        f.write_str("]")
    }
}

/// Result of [`select_team`].
#[derive(Debug, Clone, Serialize)]
pub struct TeamSelection {
    pub query: PathQuery,
    pub matches: Team,
    /// Ids shared by every match. Empty when nothing matched.
    pub necessary_ids: BTreeSet<PredicateId>,
    /// True when the cap stopped the scan early.
    pub truncated: bool,
}

impl TeamSelection {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Select the models of `team` matching `query`.
///
/// When `allowed_ids` is given, a model must also contain at least one of
/// them. Collection stops after `max_matches` models.
pub fn select_team(
    team: &Team,
    query: &PathQuery,
    allowed_ids: Option<&BTreeSet<PredicateId>>,
    max_matches: usize,
) -> TeamSelection {
    let mut matches = Team::new();
    let mut truncated = false;
    for model in team {
        if !query.matches(model) {
            continue;
        }
        if let Some(allowed) = allowed_ids {
            if !model.iter().any(|id| allowed.contains(&id)) {
                continue;
            }
        }
        if matches.len() >= max_matches {
            truncated = true;
            break;
        }
        matches.push(model.clone());
    }
    debug!(
        "query {query}: {} match(es){}",
        matches.len(),
        if truncated { " (truncated)" } else { "" }
    );
    let necessary_ids = matches.intersection();
    TeamSelection {
        query: query.clone(),
        matches,
        necessary_ids,
        truncated,
    }
}

/// Ids of the predicates that take `subject` as an argument.
pub fn subject_filter(catalog: &PredicateCatalog, subject: &str) -> BTreeSet<PredicateId> {
    catalog.ids_involving(subject)
}
