//! Compiled expressions.
//!
//! An expression is its text plus the loosest operator binding it at the top
//! level, so joining clauses only adds parentheses where association would
//! otherwise change.

use std::fmt;

/// Loosest top-level operator, ordered from weakest to strongest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Or,
    And,
    Primary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    text: String,
    precedence: Precedence,
}

impl Expression {
    /// Text that binds at least as tightly as `&&` operands.
    pub fn primary(text: impl Into<String>) -> Self {
        Self { text: text.into(), precedence: Precedence::Primary }
    }

    pub fn truth() -> Self {
        Self::primary("true")
    }

    /// Join clauses with `&&`. Empty is `true`, a single clause is returned as is.
    pub fn and(clauses: Vec<Expression>) -> Self {
        match clauses.len() {
            0 => Self::truth(),
            1 => clauses.into_iter().next().unwrap_or_else(Self::truth),
            _ => {
                let parts: Vec<String> = clauses
                    .into_iter()
                    .map(|c| c.operand(Precedence::And))
                    .collect();
                Self { text: parts.join(" && "), precedence: Precedence::And }
            }
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self {
            text: format!("{} || {}", left.operand(Precedence::Or), right.operand(Precedence::Or)),
            precedence: Precedence::Or,
        }
    }

    /// Wrap in parentheses unconditionally.
    pub fn parenthesized(self) -> Self {
        Self::primary(format!("({})", self.text))
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn operand(self, context: Precedence) -> String {
        if self.precedence < context {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<Expression> for String {
    fn from(e: Expression) -> Self {
        e.text
    }
}

/// Single-quoted string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
