//! Predicate structures offered by the host engine

use std::fmt;

/// Comparison operators that can be pushed to the remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Ne,
    Is,
    IsNot,
    IsNull,
    IsNotNull,
    Like,
}

impl Comparator {
    /// SQL operator text, as written into remote queries and plan tokens
    pub fn sql(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ge => ">=",
            Comparator::Gt => ">",
            Comparator::Le => "<=",
            Comparator::Lt => "<",
            Comparator::Ne => "<>",
            Comparator::Is => "is",
            Comparator::IsNot => "is not",
            Comparator::IsNull => "is null",
            Comparator::IsNotNull => "is not null",
            Comparator::Like => "like",
        }
    }

    /// Parses operator text produced by `sql()`
    pub fn from_sql(text: &str) -> Option<Self> {
        let op = match text {
            "=" => Comparator::Eq,
            ">=" => Comparator::Ge,
            ">" => Comparator::Gt,
            "<=" => Comparator::Le,
            "<" => Comparator::Lt,
            "<>" => Comparator::Ne,
            "is" => Comparator::Is,
            "is not" => Comparator::IsNot,
            "is null" => Comparator::IsNull,
            "is not null" => Comparator::IsNotNull,
            "like" => Comparator::Like,
            _ => return None,
        };
        Some(op)
    }

    /// False for unary tests that take no bound value
    pub fn takes_argument(&self) -> bool {
        !matches!(self, Comparator::IsNull | Comparator::IsNotNull)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql())
    }
}

/// One candidate filter offered by the host engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    /// Column ordinal, -1 for the row identifier
    pub ordinal: i32,
    /// Operator, `None` when the host operator has no remote equivalent
    pub comparator: Option<Comparator>,
    /// Whether the host can supply a value for this predicate
    pub usable: bool,
}

impl Predicate {
    /// A usable predicate
    pub fn new(ordinal: i32, comparator: Comparator) -> Self {
        Self {
            ordinal,
            comparator: Some(comparator),
            usable: true,
        }
    }

    /// A predicate the host offers but cannot currently bind
    pub fn unusable(ordinal: i32, comparator: Option<Comparator>) -> Self {
        Self {
            ordinal,
            comparator,
            usable: false,
        }
    }
}
