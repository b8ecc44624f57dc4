use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a predicate by the contract compiler.
pub type PredicateId = u32;

/// Normative type tag of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    /// Something a party does.
    #[default]
    Act,
    /// A state of affairs.
    Fact,
    /// A right one party holds against another.
    Claim,
    /// Something a party must do.
    Obligation,
    /// Something a party must not do.
    Prohibition,
}

impl PredicateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PredicateKind::Act => "act",
            PredicateKind::Fact => "fact",
            PredicateKind::Claim => "claim",
            PredicateKind::Obligation => "obligation",
            PredicateKind::Prohibition => "prohibition",
        }
    }

    /// Parse a solver type tag. Unrecognised tags fall back to [`PredicateKind::Act`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "fact" => PredicateKind::Fact,
            "claim" => PredicateKind::Claim,
            "obligation" => PredicateKind::Obligation,
            "prohibition" => PredicateKind::Prohibition,
            _ => PredicateKind::Act,
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a compiled artifact's predicate mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub id: PredicateId,
    /// Predicate symbol, e.g. `pay_rent`.
    pub name: String,
    /// Ordered argument names, e.g. `["tenant", "landlord"]`.
    pub arguments: Vec<String>,
    /// Full expression as printed by the compiler, e.g. `pay_rent(tenant, landlord)`.
    pub full_expression: String,
    pub kind: PredicateKind,
}

impl Predicate {
    pub fn new(id: PredicateId, name: impl Into<String>) -> Self {
        let name = name.into();
        Predicate {
            id,
            full_expression: name.clone(),
            name,
            arguments: Vec::new(),
            kind: PredicateKind::default(),
        }
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self.full_expression = if self.arguments.is_empty() {
            self.name.clone()
        } else {
            format!("{}({})", self.name, self.arguments.join(", "))
        };
        self
    }

    pub fn with_full_expression(mut self, full: impl Into<String>) -> Self {
        self.full_expression = full.into();
        self
    }

    pub fn with_kind(mut self, kind: PredicateKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether `subject` appears among the predicate's arguments.
    pub fn involves(&self, subject: &str) -> bool {
        self.arguments.iter().any(|arg| arg == subject)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.full_expression, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_tag_defaults_to_act() {
        assert_eq!(PredicateKind::from_tag("obligation"), PredicateKind::Obligation);
        assert_eq!(PredicateKind::from_tag(" Prohibition "), PredicateKind::Prohibition);
        assert_eq!(PredicateKind::from_tag("mystery"), PredicateKind::Act);
        assert_eq!(PredicateKind::from_tag(""), PredicateKind::Act);
    }

    #[test]
    fn test_with_arguments_builds_full_expression() {
        let p = Predicate::new(3, "pay_rent").with_arguments(["tenant", "landlord"]);
        assert_eq!(p.full_expression, "pay_rent(tenant, landlord)");
        assert!(p.involves("tenant"));
        assert!(!p.involves("agent"));
    }

    #[test]
    fn test_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&PredicateKind::Claim).unwrap();
        assert_eq!(json, "\"claim\"");
        let back: PredicateKind = serde_json::from_str("\"fact\"").unwrap();
        assert_eq!(back, PredicateKind::Fact);
    }
}
