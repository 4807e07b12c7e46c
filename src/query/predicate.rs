//! Conjunctive equality predicates
//!
//! A predicate is a conjunction of terms `lhs = rhs`, where each side is a
//! field reference or a constant. The empty predicate is always true.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constant::Constant;
use super::schema::Schema;

/// One side of a term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Reference to a (qualified) field name
    Field(String),
    /// Literal value
    Constant(Constant),
}

impl Expression {
    pub fn field(name: impl Into<String>) -> Self {
        Expression::Field(name.into())
    }

    pub fn constant(value: impl Into<Constant>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn as_field(&self) -> Option<&str> {
        match self {
            Expression::Field(name) => Some(name),
            Expression::Constant(_) => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Expression::Field(_) => None,
            Expression::Constant(c) => Some(c),
        }
    }

    /// True if every field this expression mentions is in the schema
    pub fn applies_to(&self, schema: &Schema) -> bool {
        match self {
            Expression::Field(name) => schema.has_field(name),
            Expression::Constant(_) => true,
        }
    }

    fn evaluate<'a>(&'a self, schema: &Schema, row: &'a [Constant]) -> Option<&'a Constant> {
        match self {
            Expression::Field(name) => schema.index_of(name).and_then(|i| row.get(i)),
            Expression::Constant(c) => Some(c),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Field(name) => write!(f, "{}", name),
            Expression::Constant(c) => write!(f, "{}", c),
        }
    }
}

/// An equality between two expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub lhs: Expression,
    pub rhs: Expression,
}

impl Term {
    pub fn new(lhs: Expression, rhs: Expression) -> Self {
        Self { lhs, rhs }
    }

    /// `field = field`
    pub fn fields_equal(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::new(Expression::field(lhs), Expression::field(rhs))
    }

    /// `field = constant`
    pub fn field_equals(field: impl Into<String>, value: impl Into<Constant>) -> Self {
        Self::new(Expression::field(field), Expression::constant(value))
    }

    /// If this term is `field = other_field` (either way round), the other field
    pub fn equates_with_field(&self, field: &str) -> Option<&str> {
        match (self.lhs.as_field(), self.rhs.as_field()) {
            (Some(l), Some(r)) if l == field => Some(r),
            (Some(l), Some(r)) if r == field => Some(l),
            _ => None,
        }
    }

    /// If this term is `field = constant` (either way round), the constant
    pub fn equates_with_constant(&self, field: &str) -> Option<&Constant> {
        match (&self.lhs, &self.rhs) {
            (Expression::Field(f), Expression::Constant(c))
            | (Expression::Constant(c), Expression::Field(f))
                if f == field =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn applies_to(&self, schema: &Schema) -> bool {
        self.lhs.applies_to(schema) && self.rhs.applies_to(schema)
    }

    pub fn is_satisfied(&self, schema: &Schema, row: &[Constant]) -> bool {
        match (self.lhs.evaluate(schema, row), self.rhs.evaluate(schema, row)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        }
    }

    fn fields(&self) -> impl Iterator<Item = &str> {
        self.lhs.as_field().into_iter().chain(self.rhs.as_field())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// Conjunction of terms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate {
    terms: Vec<Term>,
}

impl Predicate {
    /// The always-true predicate
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns a field equated to `field` by some term, first term wins.
    pub fn equates_with_field(&self, field: &str) -> Option<&str> {
        self.terms.iter().find_map(|t| t.equates_with_field(field))
    }

    /// Returns a constant equated to `field` by some term, first term wins.
    pub fn equates_with_constant(&self, field: &str) -> Option<&Constant> {
        self.terms.iter().find_map(|t| t.equates_with_constant(field))
    }

    /// Every field name mentioned, in term order (may repeat)
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().flat_map(|t| t.fields())
    }

    /// Terms evaluable entirely against `schema`
    pub fn select_sub_pred(&self, schema: &Schema) -> Option<Predicate> {
        let terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| t.applies_to(schema))
            .cloned()
            .collect();
        (!terms.is_empty()).then(|| Predicate::from_terms(terms))
    }

    /// Terms that need both schemas: evaluable against their union but
    /// against neither alone.
    pub fn join_sub_pred(&self, left: &Schema, right: &Schema) -> Option<Predicate> {
        let terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| !t.applies_to(left) && !t.applies_to(right))
            .filter(|t| {
                t.fields()
                    .all(|f| left.has_field(f) || right.has_field(f))
            })
            .cloned()
            .collect();
        (!terms.is_empty()).then(|| Predicate::from_terms(terms))
    }

    pub fn is_satisfied(&self, schema: &Schema, row: &[Constant]) -> bool {
        self.terms.iter().all(|t| t.is_satisfied(schema, row))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "true");
        }
        let parts: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(fields: &[&str]) -> Schema {
        let mut s = Schema::new();
        for f in fields {
            s.add_int_field(*f);
        }
        s
    }

    #[test]
    fn test_equates_with_field_both_directions() {
        let pred = Predicate::new().with_term(Term::fields_equal("a.x", "b.x"));

        assert_eq!(pred.equates_with_field("a.x"), Some("b.x"));
        assert_eq!(pred.equates_with_field("b.x"), Some("a.x"));
        assert_eq!(pred.equates_with_field("c.x"), None);
    }

    #[test]
    fn test_equates_with_field_ignores_constants() {
        let pred = Predicate::new().with_term(Term::field_equals("a.x", Constant::int(5)));

        assert_eq!(pred.equates_with_field("a.x"), None);
        assert_eq!(pred.equates_with_constant("a.x"), Some(&Constant::int(5)));
    }

    #[test]
    fn test_first_term_wins() {
        let pred = Predicate::new()
            .with_term(Term::fields_equal("a.x", "b.x"))
            .with_term(Term::fields_equal("a.x", "c.x"));

        assert_eq!(pred.equates_with_field("a.x"), Some("b.x"));
    }

    #[test]
    fn test_select_and_join_sub_predicates() {
        let pred = Predicate::new()
            .with_term(Term::field_equals("a.x", Constant::int(1)))
            .with_term(Term::fields_equal("a.y", "b.y"))
            .with_term(Term::fields_equal("b.z", "c.z"));

        let a = schema(&["a.x", "a.y"]);
        let b = schema(&["b.y", "b.z"]);

        let select = pred.select_sub_pred(&a).unwrap();
        assert_eq!(select.terms().len(), 1);

        let join = pred.join_sub_pred(&a, &b).unwrap();
        assert_eq!(join.terms(), &[Term::fields_equal("a.y", "b.y")]);

        assert!(pred.select_sub_pred(&schema(&["q"])).is_none());
    }

    #[test]
    fn test_is_satisfied() {
        let s = schema(&["a.x", "b.x"]);
        let pred = Predicate::new().with_term(Term::fields_equal("a.x", "b.x"));

        assert!(pred.is_satisfied(&s, &[Constant::int(1), Constant::int(1)]));
        assert!(!pred.is_satisfied(&s, &[Constant::int(1), Constant::int(2)]));
        assert!(Predicate::new().is_satisfied(&s, &[Constant::int(1), Constant::int(2)]));
    }

    #[test]
    fn test_display() {
        let pred = Predicate::new()
            .with_term(Term::fields_equal("a.x", "b.x"))
            .with_term(Term::field_equals("b.name", "joe"));
        assert_eq!(pred.to_string(), "a.x = b.x AND b.name = 'joe'");
        assert_eq!(Predicate::new().to_string(), "true");
    }

    #[test]
    fn test_json_shape() {
        let pred: Predicate = serde_json::from_str(
            r#"[{"lhs":{"field":"a.x"},"rhs":{"field":"b.x"}},{"lhs":{"field":"a.y"},"rhs":{"constant":3}}]"#,
        )
        .unwrap();
        assert_eq!(pred.terms().len(), 2);
        assert_eq!(pred.equates_with_constant("a.y"), Some(&Constant::int(3)));
    }
}
