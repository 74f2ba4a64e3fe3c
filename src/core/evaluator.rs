//! Inline expression evaluation.
//!
//! Expressions run against a set of named inputs and an optional base
//! instance. Bare names resolve against the inputs first, then against the
//! base instance's members.
//!
//! # Grammar
//!
//! ```text
//! expr     := or
//! or       := and (("or" | "||") and)*
//! and      := cmp (("and" | "&&") cmp)*
//! cmp      := sum (("==" | "!=" | "<" | "<=" | ">" | ">=") sum)*
//! sum      := product (("+" | "-") product)*
//! product  := unary (("*" | "/" | "%") unary)*
//! unary    := ("-" | "!" | "not") unary | postfix
//! postfix  := primary ("." name ["(" args ")"] | "[" expr "]")*
//! primary  := number | string | "true" | "false" | "null"
//!           | name ["(" args ")"] | "(" expr ")" | "[" args "]"
//! ```

use std::collections::BTreeMap;

use super::{ConsoleError, EvalTarget, Value};

/// Evaluate `expression` against `base` and `inputs`.
///
/// Evaluation never touches console state. Side effects, if any, come from
/// methods the expression calls on live objects.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use bevy_console_engine::core::{evaluate, Value};
///
/// let mut inputs = BTreeMap::new();
/// inputs.insert("speed".to_string(), Value::Int(4));
///
/// let value = evaluate("speed * 2 + 1", None, &inputs).unwrap();
/// assert_eq!(value, Value::Int(9));
/// ```
pub fn evaluate(
    expression: &str,
    base: Option<&dyn EvalTarget>,
    inputs: &BTreeMap<String, Value>,
) -> Result<Value, ConsoleError> {
    let tokens = lex(expression)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let (expr, _) = parser.expression()?;
    parser.expect_end()?;

    Scope { base, inputs }.eval(&expr)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
    End,
}

const PUNCTUATION: [&str; 20] = [
    "&&", "||", "==", "!=", "<=", ">=", "+", "-", "*", "/", "%", "<", ">", "!", "(", ")", "[", "]",
    ",", ".",
];

fn syntax_error(position: usize, message: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::evaluation(format!("syntax error at column {}: {}", position + 1, message))
}

fn lex(source: &str) -> Result<Vec<(Tok, usize)>, ConsoleError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() {
            let mut end = pos;
            let mut is_float = false;
            while let Some(&(i, d)) = chars.peek() {
                let continues = d.is_ascii_digit()
                    || d == '_'
                    || (d == '.'
                        && !is_float
                        && source[i + 1..].starts_with(|n: char| n.is_ascii_digit()))
                    || ((d == 'e' || d == 'E') && !source[pos..i].contains(['e', 'E']));
                if !continues {
                    break;
                }
                is_float |= d == '.' || d == 'e' || d == 'E';
                end = i + d.len_utf8();
                chars.next();
                if d == 'e' || d == 'E' {
                    if let Some((i, sign)) = chars.next_if(|&(_, s)| s == '+' || s == '-') {
                        end = i + sign.len_utf8();
                    }
                }
            }
            let text = source[pos..end].replace('_', "");
            let tok = if is_float {
                text.parse()
                    .map(Tok::Float)
                    .map_err(|_| syntax_error(pos, format!("invalid number '{text}'")))?
            } else {
                text.parse()
                    .map(Tok::Int)
                    .map_err(|_| syntax_error(pos, format!("integer '{text}' out of range")))?
            };
            tokens.push((tok, pos));
        } else if c.is_alphabetic() || c == '_' {
            let mut end = pos;
            while let Some((i, d)) = chars.next_if(|&(_, d)| d.is_alphanumeric() || d == '_') {
                end = i + d.len_utf8();
            }
            tokens.push((Tok::Ident(source[pos..end].to_string()), pos));
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, d)) = chars.next() {
                match d {
                    d if d == c => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, other)) => text.push(other),
                        None => break,
                    },
                    _ => text.push(d),
                }
            }
            if !closed {
                return Err(syntax_error(pos, "unterminated string"));
            }
            tokens.push((Tok::Str(text), pos));
        } else {
            let rest = &source[pos..];
            let punct = PUNCTUATION
                .iter()
                .find(|p| rest.starts_with(**p))
                .ok_or_else(|| syntax_error(pos, format!("unexpected character '{c}'")))?;
            for _ in 0..punct.len() {
                chars.next();
            }
            tokens.push((Tok::Punct(punct), pos));
        }
    }

    tokens.push((Tok::End, source.len()));
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Deepest expression tree the parser builds. Evaluation recurses once per
/// level, so this also bounds the interpreter's stack use.
const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 5,
        }
    }
}

#[derive(Debug, Clone)]
enum Expr {
    Literal(Value),
    Name(String),
    Array(Vec<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    MethodCall(Box<Expr>, String, Vec<Expr>),
}

/// A parsed subtree and its depth.
type Parsed = (Expr, usize);

struct Parser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
    /// Current recursion depth of the parser itself.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        self.tokens.get(self.pos).map_or(&Tok::End, |(tok, _)| tok)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |(_, pos)| *pos)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.peek().clone();
        self.pos += 1;
        tok
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Tok::Punct(p) if *p == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Tok::Ident(word) if word == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), ConsoleError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{punct}'")))
        }
    }

    fn expect_end(&self) -> Result<(), ConsoleError> {
        match self.peek() {
            Tok::End => Ok(()),
            _ => Err(self.unexpected("expected end of expression")),
        }
    }

    fn unexpected(&self, expected: &str) -> ConsoleError {
        let found = match self.peek() {
            Tok::Int(i) => i.to_string(),
            Tok::Float(f) => f.to_string(),
            Tok::Str(s) => format!("{s:?}"),
            Tok::Ident(name) => name.clone(),
            Tok::Punct(p) => p.to_string(),
            Tok::End => "end of expression".to_string(),
        };
        syntax_error(self.position(), format!("{expected}, found {found}"))
    }

    fn too_deep(&self) -> ConsoleError {
        syntax_error(self.position(), "expression nested too deeply")
    }

    /// Depth of a node whose deepest child has depth `child`.
    fn nest(&self, child: usize) -> Result<usize, ConsoleError> {
        if child >= MAX_NESTING {
            Err(self.too_deep())
        } else {
            Ok(child + 1)
        }
    }

    /// Run `parse` one recursion level deeper.
    fn descend<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ConsoleError>,
    ) -> Result<T, ConsoleError> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn peek_binary(&self) -> Option<BinaryOp> {
        let op = match self.peek() {
            Tok::Punct("+") => BinaryOp::Add,
            Tok::Punct("-") => BinaryOp::Sub,
            Tok::Punct("*") => BinaryOp::Mul,
            Tok::Punct("/") => BinaryOp::Div,
            Tok::Punct("%") => BinaryOp::Rem,
            Tok::Punct("==") => BinaryOp::Eq,
            Tok::Punct("!=") => BinaryOp::Ne,
            Tok::Punct("<") => BinaryOp::Lt,
            Tok::Punct("<=") => BinaryOp::Le,
            Tok::Punct(">") => BinaryOp::Gt,
            Tok::Punct(">=") => BinaryOp::Ge,
            Tok::Punct("&&") => BinaryOp::And,
            Tok::Punct("||") => BinaryOp::Or,
            Tok::Ident(word) if word == "and" => BinaryOp::And,
            Tok::Ident(word) if word == "or" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    fn expression(&mut self) -> Result<Parsed, ConsoleError> {
        self.descend(|parser| parser.binary(1))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Parsed, ConsoleError> {
        let (mut lhs, mut depth) = self.unary()?;
        while let Some(op) = self.peek_binary() {
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += 1;
            let (rhs, rhs_depth) = self.binary(op.precedence() + 1)?;
            depth = self.nest(depth.max(rhs_depth))?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok((lhs, depth))
    }

    fn unary(&mut self) -> Result<Parsed, ConsoleError> {
        let negate = self.eat("-");
        if negate || self.eat("!") || self.eat_keyword("not") {
            let (inner, depth) = self.descend(Self::unary)?;
            let depth = self.nest(depth)?;
            let inner = Box::new(inner);
            let expr = if negate {
                Expr::Neg(inner)
            } else {
                Expr::Not(inner)
            };
            return Ok((expr, depth));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Parsed, ConsoleError> {
        let (mut expr, mut depth) = self.primary()?;
        loop {
            if self.eat(".") {
                let Tok::Ident(name) = self.advance() else {
                    self.pos -= 1;
                    return Err(self.unexpected("expected member name"));
                };
                if self.eat("(") {
                    let (args, args_depth) = self.arguments(")")?;
                    depth = self.nest(depth.max(args_depth))?;
                    expr = Expr::MethodCall(Box::new(expr), name, args);
                } else {
                    depth = self.nest(depth)?;
                    expr = Expr::Member(Box::new(expr), name);
                }
            } else if self.eat("[") {
                let (index, index_depth) = self.expression()?;
                self.expect("]")?;
                depth = self.nest(depth.max(index_depth))?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                return Ok((expr, depth));
            }
        }
    }

    fn primary(&mut self) -> Result<Parsed, ConsoleError> {
        let literal = |value| -> Result<Parsed, ConsoleError> { Ok((Expr::Literal(value), 1)) };
        match self.advance() {
            Tok::Int(i) => literal(Value::Int(i)),
            Tok::Float(f) => literal(Value::Float(f)),
            Tok::Str(s) => literal(Value::Str(s)),
            Tok::Ident(word) => match word.as_str() {
                "true" => literal(Value::Bool(true)),
                "false" => literal(Value::Bool(false)),
                "null" => literal(Value::Nil),
                _ if self.eat("(") => {
                    let (args, depth) = self.arguments(")")?;
                    Ok((Expr::Call(word, args), self.nest(depth)?))
                }
                _ => Ok((Expr::Name(word), 1)),
            },
            Tok::Punct("(") => {
                let parsed = self.expression()?;
                self.expect(")")?;
                Ok(parsed)
            }
            Tok::Punct("[") => {
                let (items, depth) = self.arguments("]")?;
                Ok((Expr::Array(items), self.nest(depth)?))
            }
            _ => {
                self.pos -= 1;
                Err(self.unexpected("expected a value"))
            }
        }
    }

    /// Comma separated expressions up to `close`, which is consumed, with
    /// the depth of the deepest one.
    fn arguments(&mut self, close: &str) -> Result<(Vec<Expr>, usize), ConsoleError> {
        let mut args = Vec::new();
        let mut depth = 0;
        if self.eat(close) {
            return Ok((args, depth));
        }
        loop {
            let (arg, arg_depth) = self.expression()?;
            args.push(arg);
            depth = depth.max(arg_depth);
            if self.eat(close) {
                return Ok((args, depth));
            }
            self.expect(",")?;
        }
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

struct Scope<'a> {
    base: Option<&'a dyn EvalTarget>,
    inputs: &'a BTreeMap<String, Value>,
}

impl Scope<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, ConsoleError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.resolve(name),
            Expr::Array(items) => Ok(Value::Array(self.eval_all(items)?)),
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Int(i) => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| ConsoleError::evaluation("integer overflow")),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(ConsoleError::evaluation(format!(
                    "invalid operand '{}' for unary '-'",
                    other.type_name()
                ))),
            },
            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner)?.is_truthy())),
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                Ok(Value::Bool(self.eval(lhs)?.is_truthy() && self.eval(rhs)?.is_truthy()))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                Ok(Value::Bool(self.eval(lhs)?.is_truthy() || self.eval(rhs)?.is_truthy()))
            }
            Expr::Binary(op, lhs, rhs) => binary(*op, self.eval(lhs)?, self.eval(rhs)?),
            Expr::Member(target, name) => match self.eval(target)? {
                Value::Object(obj) => obj.get(name).ok_or_else(|| {
                    ConsoleError::evaluation(format!(
                        "invalid access to property '{}' on {}",
                        name,
                        obj.type_name()
                    ))
                }),
                other => Err(ConsoleError::evaluation(format!(
                    "invalid access to property '{}' on {}",
                    name,
                    other.type_name()
                ))),
            },
            Expr::Index(target, index) => index_value(self.eval(target)?, self.eval(index)?),
            Expr::Call(name, args) => {
                let args = self.eval_all(args)?;
                match self.base {
                    Some(base) if base.has_method(name) => {
                        base.call(name, &args).map_err(ConsoleError::Evaluation)
                    }
                    _ => call_builtin(name, &args)
                        .unwrap_or_else(|| Err(ConsoleError::UnresolvedName(name.clone()))),
                }
            }
            Expr::MethodCall(target, method, args) => {
                let target = self.eval(target)?;
                let args = self.eval_all(args)?;
                match target {
                    Value::Object(obj) => obj.call(method, &args).map_err(ConsoleError::Evaluation),
                    other => Err(ConsoleError::evaluation(format!(
                        "cannot call method '{}' on {}",
                        method,
                        other.type_name()
                    ))),
                }
            }
        }
    }

    fn eval_all(&self, exprs: &[Expr]) -> Result<Vec<Value>, ConsoleError> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn resolve(&self, name: &str) -> Result<Value, ConsoleError> {
        if let Some(value) = self.inputs.get(name) {
            return Ok(value.clone());
        }
        self.base
            .and_then(|base| base.get(name))
            .ok_or_else(|| ConsoleError::UnresolvedName(name.to_string()))
    }
}

fn invalid_operands(op: BinaryOp, lhs: &Value, rhs: &Value) -> ConsoleError {
    ConsoleError::evaluation(format!(
        "invalid operands '{}' and '{}' in operator '{}'",
        lhs.type_name(),
        rhs.type_name(),
        op.symbol()
    ))
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ConsoleError> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => return Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&lhs, &rhs) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => match (lhs.as_f64(), rhs.as_f64()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => return Err(invalid_operands(op, &lhs, &rhs)),
                },
            };
            let result = ordering.is_some_and(|ord| match op {
                BinaryOp::Lt => ord.is_lt(),
                BinaryOp::Le => ord.is_le(),
                BinaryOp::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            });
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b == 0 {
                return Err(ConsoleError::evaluation("division by zero"));
            }
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div => a.checked_div(b),
                BinaryOp::Rem => a.checked_rem(b),
                _ => return Err(invalid_operands(op, &lhs, &rhs)),
            };
            result
                .map(Value::Int)
                .ok_or_else(|| ConsoleError::evaluation("integer overflow"))
        }
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => Ok(Value::Str(format!("{a}{b}"))),
        (Value::Array(a), Value::Array(b)) if op == BinaryOp::Add => {
            Ok(Value::Array(a.iter().chain(b).cloned().collect()))
        }
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Rem => a % b,
                _ => return Err(invalid_operands(op, &lhs, &rhs)),
            })),
            _ => Err(invalid_operands(op, &lhs, &rhs)),
        },
    }
}

fn index_value(target: Value, index: Value) -> Result<Value, ConsoleError> {
    let Value::Int(i) = index else {
        return Err(ConsoleError::evaluation(format!(
            "index must be int, got {}",
            index.type_name()
        )));
    };

    let out_of_bounds = |len: usize| {
        ConsoleError::evaluation(format!("index {i} out of bounds (size {len})"))
    };
    let resolve = |len: usize| -> Result<usize, ConsoleError> {
        let idx = if i < 0 { i + len as i64 } else { i };
        usize::try_from(idx)
            .ok()
            .filter(|&idx| idx < len)
            .ok_or_else(|| out_of_bounds(len))
    };

    match target {
        Value::Array(items) => {
            let idx = resolve(items.len())?;
            Ok(items[idx].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let idx = resolve(chars.len())?;
            Ok(Value::Str(chars[idx].to_string()))
        }
        other => Err(ConsoleError::evaluation(format!(
            "cannot index into {}",
            other.type_name()
        ))),
    }
}

/// Built-in functions. `None` if `name` is not a builtin.
fn call_builtin(name: &str, args: &[Value]) -> Option<Result<Value, ConsoleError>> {
    let arity = |expected: usize| -> Result<(), ConsoleError> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(ConsoleError::evaluation(format!(
                "{name}() expects {expected} argument(s), got {}",
                args.len()
            )))
        }
    };

    let result = match name {
        "abs" => arity(1).and_then(|_| match &args[0] {
            Value::Int(i) => i
                .checked_abs()
                .map(Value::Int)
                .ok_or_else(|| ConsoleError::evaluation("integer overflow")),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            other => Err(ConsoleError::evaluation(format!(
                "abs() expects a number, got {}",
                other.type_name()
            ))),
        }),
        "min" | "max" => extremum(name, args),
        "str" => arity(1).map(|_| Value::Str(args[0].to_string())),
        "int" => arity(1).and_then(|_| match &args[0] {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Float(f) => Ok(Value::Int(*f as i64)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| {
                ConsoleError::evaluation(format!("cannot convert {s:?} to int"))
            }),
            other => Err(ConsoleError::evaluation(format!(
                "cannot convert {} to int",
                other.type_name()
            ))),
        }),
        "float" => arity(1).and_then(|_| match &args[0] {
            Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| {
                ConsoleError::evaluation(format!("cannot convert {s:?} to float"))
            }),
            Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            other => other.as_f64().map(Value::Float).ok_or_else(|| {
                ConsoleError::evaluation(format!("cannot convert {} to float", other.type_name()))
            }),
        }),
        "len" => arity(1).and_then(|_| match &args[0] {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::Array(items) => Ok(Value::Int(items.len() as i64)),
            other => Err(ConsoleError::evaluation(format!(
                "len() not supported for {}",
                other.type_name()
            ))),
        }),
        _ => return None,
    };
    Some(result)
}

fn extremum(name: &str, args: &[Value]) -> Result<Value, ConsoleError> {
    if args.is_empty() {
        return Err(ConsoleError::evaluation(format!(
            "{name}() expects at least 1 argument"
        )));
    }

    let mut best = &args[0];
    for candidate in &args[1..] {
        let (Some(a), Some(b)) = (best.as_f64(), candidate.as_f64()) else {
            return Err(ConsoleError::evaluation(format!("{name}() expects numbers")));
        };
        if (name == "min" && b < a) || (name == "max" && b > a) {
            best = candidate;
        }
    }

    match best {
        Value::Int(_) | Value::Float(_) => Ok(best.clone()),
        other => Err(ConsoleError::evaluation(format!(
            "{name}() expects numbers, got {}",
            other.type_name()
        ))),
    }
}
