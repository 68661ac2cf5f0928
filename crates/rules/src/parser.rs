//! Rule expression parser and evaluator.
//!
//! Rule expressions are a small, closed DSL over the normalized query and
//! the conversation memory. Nothing in it can execute code:
//!
//! ```text
//! query CONTAINS "vaccine"
//! query CONTAINS_ANY ["hello", "thanks", "你好"]
//! query MATCHES "^(what|who) is"
//! query NOT STARTS_WITH "tell me a joke"
//! query.length < 4
//! memory.messages >= 6 AND memory.last_turn CONTAINS "treatment"
//! ```
//!
//! Grammar (informal):
//! ```text
//! expr     = clause (("AND" | "OR") clause)*
//! clause   = ["NOT"] (atom | "(" expr ")")
//! atom     = field ["NOT"] OP value
//! field    = "query" | "raw_query" | "query.length"
//!          | "memory.messages" | "memory.last_turn"
//! OP       = "CONTAINS" | "CONTAINS_ANY" | "MATCHES" | "STARTS_WITH"
//!          | "ENDS_WITH" | "==" | "!=" | ">" | "<" | ">=" | "<="
//! value    = QUOTED_STRING | NUMBER | "[" value ("," value)* "]"
//! ```
//!
//! `query` and `memory.last_turn` are case-folded, so string literals compared
//! against them are case-folded at parse time too, and `MATCHES` patterns on
//! those fields match case-insensitively. Patterns are compiled once, at parse
//! time.

use ragdecide_core::{ConversationMemory, normalize_query};
use regex_lite::{Regex, RegexBuilder};
use std::borrow::Cow;

/// A parsed expression tree.
#[derive(Debug, Clone)]
pub enum Condition {
    /// A single comparison.
    Atom(Atom),
    /// Logical AND of two sub-conditions.
    And(Box<Condition>, Box<Condition>),
    /// Logical OR of two sub-conditions.
    Or(Box<Condition>, Box<Condition>),
    /// Negation.
    Not(Box<Condition>),
}

#[derive(Debug, Clone)]
pub struct Atom {
    pub field: Field,
    pub op: Op,
    pub value: Value,
}

/// A field reference in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `query`: the normalized (case-folded, whitespace-collapsed) query.
    Query,
    /// `raw_query`: the query exactly as the caller sent it.
    RawQuery,
    /// `query.length`: number of characters in the normalized query.
    QueryLength,
    /// `memory.messages`: number of messages in the conversation.
    MemoryMessages,
    /// `memory.last_turn`: normalized content of the latest turn.
    MemoryLastTurn,
}

impl Field {
    fn is_case_folded(self) -> bool {
        matches!(self, Field::Query | Field::MemoryLastTurn)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Contains,
    NotContains,
    ContainsAny,
    NotContainsAny,
    Matches,
    NotMatches,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
}

/// A literal value in an expression.
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Num(f64),
    List(Vec<String>),
    Pattern(Regex),
}

impl Condition {
    /// Evaluate this condition against a context.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Condition::Atom(atom) => atom.evaluate(ctx),
            Condition::And(a, b) => a.evaluate(ctx) && b.evaluate(ctx),
            Condition::Or(a, b) => a.evaluate(ctx) || b.evaluate(ctx),
            Condition::Not(inner) => !inner.evaluate(ctx),
        }
    }
}

/// Context provided for expression evaluation.
pub struct EvalContext<'a> {
    /// The normalized query.
    pub query: &'a str,
    /// The query as received.
    pub raw_query: &'a str,
    /// Read-only conversation memory, if the caller has one.
    pub memory: Option<&'a dyn ConversationMemory>,
}

impl<'a> EvalContext<'a> {
    pub fn new(query: &'a str, raw_query: &'a str, memory: Option<&'a dyn ConversationMemory>) -> Self {
        Self { query, raw_query, memory }
    }
}

impl Atom {
    fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        let field_value = self.resolve_field(ctx);
        let fv = field_value.as_deref();
        match (self.op, &self.value) {
            (Op::Contains, Value::Str(s)) => fv.is_some_and(|f| f.contains(s.as_str())),
            (Op::NotContains, Value::Str(s)) => fv.is_none_or(|f| !f.contains(s.as_str())),
            (Op::ContainsAny, Value::List(items)) => {
                fv.is_some_and(|f| items.iter().any(|i| f.contains(i.as_str())))
            }
            (Op::NotContainsAny, Value::List(items)) => {
                fv.is_none_or(|f| !items.iter().any(|i| f.contains(i.as_str())))
            }
            (Op::Matches, Value::Pattern(re)) => fv.is_some_and(|f| re.is_match(f)),
            (Op::NotMatches, Value::Pattern(re)) => fv.is_none_or(|f| !re.is_match(f)),
            (Op::StartsWith, Value::Str(s)) => fv.is_some_and(|f| f.starts_with(s.as_str())),
            (Op::NotStartsWith, Value::Str(s)) => fv.is_none_or(|f| !f.starts_with(s.as_str())),
            (Op::EndsWith, Value::Str(s)) => fv.is_some_and(|f| f.ends_with(s.as_str())),
            (Op::NotEndsWith, Value::Str(s)) => fv.is_none_or(|f| !f.ends_with(s.as_str())),
            (Op::Eq, Value::Str(s)) => fv.is_some_and(|f| f == s),
            (Op::Eq, Value::Num(n)) => {
                parse_num(fv).is_some_and(|x| (x - n).abs() < f64::EPSILON)
            }
            (Op::NotEq, Value::Str(s)) => fv.is_none_or(|f| f != s),
            (Op::NotEq, Value::Num(n)) => {
                parse_num(fv).is_none_or(|x| (x - n).abs() >= f64::EPSILON)
            }
            (Op::Gt, Value::Num(n)) => parse_num(fv).is_some_and(|x| x > *n),
            (Op::Lt, Value::Num(n)) => parse_num(fv).is_some_and(|x| x < *n),
            (Op::Gte, Value::Num(n)) => parse_num(fv).is_some_and(|x| x >= *n),
            (Op::Lte, Value::Num(n)) => parse_num(fv).is_some_and(|x| x <= *n),
            // The parser never pairs an operator with an incompatible value.
            _ => false,
        }
    }

    fn resolve_field<'a>(&self, ctx: &EvalContext<'a>) -> Option<Cow<'a, str>> {
        match self.field {
            Field::Query => Some(Cow::Borrowed(ctx.query)),
            Field::RawQuery => Some(Cow::Borrowed(ctx.raw_query)),
            Field::QueryLength => Some(Cow::Owned(ctx.query.chars().count().to_string())),
            Field::MemoryMessages => Some(Cow::Owned(
                ctx.memory.map_or(0, |m| m.message_count()).to_string(),
            )),
            Field::MemoryLastTurn => ctx
                .memory
                .and_then(|m| m.last_turn())
                .map(|turn| Cow::Owned(normalize_query(&turn.content))),
        }
    }
}

fn parse_num(field_value: Option<&str>) -> Option<f64> {
    field_value.and_then(|f| f.parse::<f64>().ok())
}

// ─── Parser ──────────────────────────────────────────────────────────

/// Parse an expression string into a [`Condition`] tree.
///
/// Returns an error for empty input: a rule must say what it matches.
pub fn parse_expression(input: &str) -> Result<Condition, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("expression is empty".into());
    }
    let tokens = tokenize(input)?;
    let (cond, rest) = parse_or(&tokens)?;
    if !rest.is_empty() {
        return Err(format!("unexpected tokens after expression: {rest:?}"));
    }
    Ok(cond)
}

/// Token types for the expression DSL.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    And,
    Or,
    Not,
    // Operators
    Contains,
    ContainsAny,
    Matches,
    StartsWith,
    EndsWith,
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut lexer = Lexer { src: input, pos: 0 };
    std::iter::from_fn(|| lexer.next_token()).collect()
}

/// Byte-offset cursor over an expression. Offsets appear in error messages.
struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn next_token(&mut self) -> Option<Result<Token, String>> {
        self.take_while(char::is_whitespace);
        let c = self.peek()?;
        let token = match c {
            '"' | '\'' => self.string(c),
            '-' if self.rest()[1..].starts_with(|d: char| d.is_ascii_digit()) => self.number(),
            _ if c.is_ascii_digit() => self.number(),
            _ if is_word_char(c) => Ok(word_token(self.take_while(is_word_char))),
            _ => match symbol(self.rest()) {
                Some((token, len)) => {
                    self.pos += len;
                    Ok(token)
                }
                None => Err(format!("unexpected character {c:?} at offset {}", self.pos)),
            },
        };
        Some(token)
    }

    /// A quoted literal; `\` escapes the next character.
    fn string(&mut self, quote: char) -> Result<Token, String> {
        let start = self.pos;
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('\\') => {
                    if let Some(escaped) = self.bump() {
                        s.push(escaped);
                    }
                }
                Some(ch) if ch == quote => return Ok(Token::Str(s)),
                Some(ch) => s.push(ch),
                None => return Err(format!("unterminated string literal at offset {start}")),
            }
        }
    }

    fn number(&mut self) -> Result<Token, String> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        self.take_while(|d| d.is_ascii_digit() || d == '.');
        let text = &self.src[start..self.pos];
        text.parse()
            .map(Token::Num)
            .map_err(|_| format!("invalid number {text:?} at offset {start}"))
    }
}

/// Field paths (`query.length`) and bare words, CJK included.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Keywords are case-insensitive; anything else is an identifier.
fn word_token(word: &str) -> Token {
    match word.to_ascii_uppercase().as_str() {
        "AND" => Token::And,
        "OR" => Token::Or,
        "NOT" => Token::Not,
        "CONTAINS" => Token::Contains,
        "CONTAINS_ANY" => Token::ContainsAny,
        "MATCHES" => Token::Matches,
        "STARTS_WITH" => Token::StartsWith,
        "ENDS_WITH" => Token::EndsWith,
        _ => Token::Ident(word.to_string()),
    }
}

/// Punctuation and comparison symbols with their byte length. Two-character
/// symbols are tried first so `>=` never lexes as `>` then `=`.
fn symbol(rest: &str) -> Option<(Token, usize)> {
    let pair = match rest.get(..2) {
        Some(">=") => Some(Token::Gte),
        Some("<=") => Some(Token::Lte),
        Some("!=") => Some(Token::NotEq),
        Some("==") => Some(Token::Eq),
        _ => None,
    };
    if let Some(token) = pair {
        return Some((token, 2));
    }
    let token = match rest.chars().next()? {
        '>' => Token::Gt,
        '<' => Token::Lt,
        '=' => Token::Eq,
        '!' => Token::Not,
        '(' => Token::LParen,
        ')' => Token::RParen,
        '[' => Token::LBracket,
        ']' => Token::RBracket,
        ',' => Token::Comma,
        _ => return None,
    };
    Some((token, 1))
}

fn parse_or(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    let (mut left, mut rest) = parse_and(tokens)?;
    while rest.first() == Some(&Token::Or) {
        let (right, remaining) = parse_and(&rest[1..])?;
        left = Condition::Or(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_and(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    let (mut left, mut rest) = parse_unary(tokens)?;
    while rest.first() == Some(&Token::And) {
        let (right, remaining) = parse_unary(&rest[1..])?;
        left = Condition::And(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_unary(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    if tokens.first() == Some(&Token::Not) {
        // Logical NOT in front of a clause. `field NOT OP value` is handled
        // by parse_op as a negated operator instead.
        let (inner, rest) = parse_unary(&tokens[1..])?;
        return Ok((Condition::Not(Box::new(inner)), rest));
    }
    parse_primary(tokens)
}

fn parse_primary(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    if tokens.first() == Some(&Token::LParen) {
        let (inner, rest) = parse_or(&tokens[1..])?;
        if rest.first() != Some(&Token::RParen) {
            return Err("expected closing parenthesis".into());
        }
        return Ok((inner, &rest[1..]));
    }
    parse_atom(tokens)
}

fn parse_atom(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    let (field, rest) = parse_field(tokens)?;
    let (op, rest) = parse_op(rest)?;
    let (value, rest) = parse_value(rest)?;
    let value = bind_value(field, op, value)?;
    Ok((Condition::Atom(Atom { field, op, value }), rest))
}

fn parse_field(tokens: &[Token]) -> Result<(Field, &[Token]), String> {
    match tokens.first() {
        Some(Token::Ident(name)) => {
            let field = match name.as_str() {
                "query" => Field::Query,
                "raw_query" => Field::RawQuery,
                "query.length" => Field::QueryLength,
                "memory.messages" | "memory.message_count" => Field::MemoryMessages,
                "memory.last_turn" => Field::MemoryLastTurn,
                other => return Err(format!("unknown field: {other}")),
            };
            Ok((field, &tokens[1..]))
        }
        _ => Err(format!("expected field name, got {:?}", tokens.first())),
    }
}

fn parse_op(tokens: &[Token]) -> Result<(Op, &[Token]), String> {
    // Check for NOT <op> pattern.
    if tokens.first() == Some(&Token::Not) && tokens.len() > 1 {
        let (base_op, rest) = parse_base_op(&tokens[1..])?;
        let negated = match base_op {
            Op::Contains => Op::NotContains,
            Op::ContainsAny => Op::NotContainsAny,
            Op::Matches => Op::NotMatches,
            Op::StartsWith => Op::NotStartsWith,
            Op::EndsWith => Op::NotEndsWith,
            other => {
                return Err(format!("cannot negate operator: {other:?}"));
            }
        };
        return Ok((negated, rest));
    }
    parse_base_op(tokens)
}

fn parse_base_op(tokens: &[Token]) -> Result<(Op, &[Token]), String> {
    let op = match tokens.first() {
        Some(Token::Contains) => Op::Contains,
        Some(Token::ContainsAny) => Op::ContainsAny,
        Some(Token::Matches) => Op::Matches,
        Some(Token::StartsWith) => Op::StartsWith,
        Some(Token::EndsWith) => Op::EndsWith,
        Some(Token::Eq) => Op::Eq,
        Some(Token::NotEq) => Op::NotEq,
        Some(Token::Gt) => Op::Gt,
        Some(Token::Lt) => Op::Lt,
        Some(Token::Gte) => Op::Gte,
        Some(Token::Lte) => Op::Lte,
        _ => return Err(format!("expected operator, got {:?}", tokens.first())),
    };
    Ok((op, &tokens[1..]))
}

fn parse_value(tokens: &[Token]) -> Result<(Value, &[Token]), String> {
    match tokens.first() {
        Some(Token::LBracket) => {
            let mut items = Vec::new();
            let mut rest = &tokens[1..];
            loop {
                match rest.first() {
                    Some(Token::RBracket) => return Ok((Value::List(items), &rest[1..])),
                    Some(Token::Str(s)) | Some(Token::Ident(s)) => items.push(s.clone()),
                    Some(Token::Num(n)) => items.push(n.to_string()),
                    other => return Err(format!("expected list item, got {other:?}")),
                }
                rest = &rest[1..];
                match rest.first() {
                    Some(Token::Comma) => rest = &rest[1..],
                    Some(Token::RBracket) => {}
                    other => return Err(format!("expected ',' or ']', got {other:?}")),
                }
            }
        }
        Some(Token::Str(s)) => Ok((Value::Str(s.clone()), &tokens[1..])),
        Some(Token::Num(n)) => Ok((Value::Num(*n), &tokens[1..])),
        Some(Token::Ident(s)) => {
            // Bare identifier as a string value.
            Ok((Value::Str(s.clone()), &tokens[1..]))
        }
        _ => Err(format!(
            "expected value (string, number or list), got {:?}",
            tokens.first()
        )),
    }
}

/// Check that the value suits the operator, compile patterns and case-fold
/// literals compared against case-folded fields.
fn bind_value(field: Field, op: Op, value: Value) -> Result<Value, String> {
    let fold = |s: String| if field.is_case_folded() { s.to_lowercase() } else { s };
    match op {
        Op::Contains | Op::NotContains | Op::StartsWith | Op::NotStartsWith | Op::EndsWith
        | Op::NotEndsWith => match value {
            Value::Str(s) => Ok(Value::Str(fold(s))),
            Value::Num(n) => Ok(Value::Str(n.to_string())),
            other => Err(format!("operator {op:?} needs a string, got {other:?}")),
        },
        Op::ContainsAny | Op::NotContainsAny => match value {
            Value::List(items) if !items.is_empty() => {
                Ok(Value::List(items.into_iter().map(fold).collect()))
            }
            Value::Str(s) => Ok(Value::List(vec![fold(s)])),
            other => Err(format!("operator {op:?} needs a non-empty list, got {other:?}")),
        },
        Op::Matches | Op::NotMatches => match value {
            Value::Str(pattern) => RegexBuilder::new(&pattern)
                .case_insensitive(field.is_case_folded())
                .build()
                .map(Value::Pattern)
                .map_err(|e| format!("invalid pattern {pattern:?}: {e}")),
            other => Err(format!("operator {op:?} needs a pattern string, got {other:?}")),
        },
        Op::Eq | Op::NotEq => match value {
            Value::Str(s) => Ok(Value::Str(fold(s))),
            Value::Num(n) => Ok(Value::Num(n)),
            other => Err(format!("operator {op:?} cannot compare against {other:?}")),
        },
        Op::Gt | Op::Lt | Op::Gte | Op::Lte => match value {
            Value::Num(n) => Ok(Value::Num(n)),
            other => Err(format!("operator {op:?} needs a number, got {other:?}")),
        },
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ragdecide_core::{ConversationSnapshot, Turn};

    fn eval(expr: &str, raw_query: &str) -> bool {
        let cond = parse_expression(expr).unwrap();
        let query = normalize_query(raw_query);
        cond.evaluate(&EvalContext::new(&query, raw_query, None))
    }

    fn eval_with_memory(expr: &str, raw_query: &str, memory: &ConversationSnapshot) -> bool {
        let cond = parse_expression(expr).unwrap();
        let query = normalize_query(raw_query);
        cond.evaluate(&EvalContext::new(&query, raw_query, Some(memory)))
    }

    #[test]
    fn parse_simple_contains() {
        assert!(eval(r#"query CONTAINS "vaccine""#, "When is the next vaccine due?"));
        assert!(!eval(r#"query CONTAINS "vaccine""#, "my dog is happy"));
    }

    #[test]
    fn literals_are_case_folded_for_query() {
        assert!(eval(r#"query CONTAINS "Vaccine""#, "VACCINE schedule"));
        assert!(!eval(r#"raw_query CONTAINS "Vaccine""#, "VACCINE schedule"));
    }

    #[test]
    fn parse_contains_any() {
        let expr = r#"query CONTAINS_ANY ["你好", "hello", "thanks",]"#;
        assert!(eval(expr, "你好呀"));
        assert!(eval(expr, "Thanks a lot"));
        assert!(!eval(expr, "how do I treat mange"));
    }

    #[test]
    fn parse_not_contains_any() {
        let expr = r#"query NOT CONTAINS_ANY ["cat", "dog"]"#;
        assert!(eval(expr, "hamster food"));
        assert!(!eval(expr, "dog food"));
    }

    #[test]
    fn parse_and_or_precedence() {
        let expr = r#"query CONTAINS "dog" AND query CONTAINS "fever" OR query CONTAINS "emergency""#;
        assert!(eval(expr, "dog has a fever"));
        assert!(eval(expr, "emergency!"));
        assert!(!eval(expr, "dog is fine"));
    }

    #[test]
    fn parse_grouping_and_logical_not() {
        let expr = r#"NOT (query CONTAINS "cat" OR query CONTAINS "dog")"#;
        assert!(eval(expr, "parrot diet"));
        assert!(!eval(expr, "cat diet"));
    }

    #[test]
    fn parse_regex_matches() {
        let expr = r#"query MATCHES "^(what|who) is""#;
        assert!(eval(expr, "What is  parvovirus"));
        assert!(!eval(expr, "tell me what is parvovirus"));
    }

    #[test]
    fn patterns_ignore_case_on_folded_fields() {
        assert!(eval(r#"query MATCHES "^What""#, "What is a hairball"));
        assert!(eval(r#"query MATCHES "VACCINE$""#, "rabies vaccine"));
        assert!(!eval(r#"raw_query MATCHES "^What""#, "what is a hairball"));
        assert!(eval(r#"raw_query MATCHES "^What""#, "What is a hairball"));
    }

    #[test]
    fn keywords_ignore_case_and_symbols_lex_greedily() {
        assert!(eval(r#"query Contains "cat" And query.length >= 3"#, "cat"));
        assert!(eval("query.length<=3", "cat"));
        assert!(eval("query.length != -1", "cat"));
        assert!(eval(r#"query != "dog""#, "cat"));
    }

    #[test]
    fn lexer_errors_carry_offsets() {
        let err = parse_expression(r#"query CONTAINS "cat"#).unwrap_err();
        assert!(err.contains("unterminated string literal at offset 15"), "{err}");
        let err = parse_expression(r#"query.length < 3 ; drop"#).unwrap_err();
        assert!(err.contains("at offset 17"), "{err}");
    }

    #[test]
    fn parse_starts_and_ends_with() {
        assert!(eval(r#"query STARTS_WITH "how""#, "How often should I feed my kitten"));
        assert!(eval(r#"query ENDS_WITH "?""#, "is this normal?"));
        assert!(eval(r#"query NOT ENDS_WITH "?""#, "is this normal"));
    }

    #[test]
    fn query_length_comparison() {
        assert!(eval("query.length < 4", "hi"));
        assert!(!eval("query.length < 4", "hello there"));
        assert!(eval("query.length == 2", "  HI "));
    }

    #[test]
    fn memory_fields() {
        let memory = ConversationSnapshot::new(vec![
            Turn::user("my cat is vomiting"),
            Turn::assistant("Which TREATMENT have you tried?"),
        ]);
        assert!(eval_with_memory("memory.messages >= 2", "ok", &memory));
        assert!(eval_with_memory(
            r#"memory.last_turn CONTAINS "treatment""#,
            "none yet",
            &memory
        ));
        assert!(!eval("memory.messages > 0", "no memory here"));
        assert!(!eval(r#"memory.last_turn CONTAINS "x""#, "no memory here"));
    }

    #[test]
    fn invalid_expressions_reject() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("CONTAINS").is_err());
        assert!(parse_expression(r#"query BADOP "y""#).is_err());
        assert!(parse_expression(r#"args.command CONTAINS "rm""#).is_err());
        assert!(parse_expression(r#"query > "abc""#).is_err());
        assert!(parse_expression(r#"query MATCHES "(unclosed""#).is_err());
        assert!(parse_expression(r#"query CONTAINS_ANY []"#).is_err());
        assert!(parse_expression(r#"query CONTAINS "a" AND"#).is_err());
        assert!(parse_expression(r#"query NOT > 3"#).is_err());
    }
}
