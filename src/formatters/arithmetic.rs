// WHY: Arithmetic evaluator behind the arithmetic detector
// candidate gate -> cleaning (currency, localized numbers, percentages) -> tokens -> postfix -> value -> display

use tracing::debug;

use super::numbers::{format_currency, format_number, normalize_localized};
use super::{render_template, Formatter, FormatterOptions};
use crate::patterns::PatternRegistry;

/// Binary operators understood by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl Op {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            '/' => Some(Op::Div),
            '%' => Some(Op::Mod),
            '^' => Some(Op::Pow),
            _ => None,
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Op::Pow => 4,
            Op::Mul | Op::Div | Op::Mod => 3,
            Op::Add | Op::Sub => 2,
        }
    }

    fn is_right_associative(self) -> bool {
        self == Op::Pow
    }

    /// `None` for division or modulo by exactly zero
    fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            Op::Add => Some(lhs + rhs),
            Op::Sub => Some(lhs - rhs),
            Op::Mul => Some(lhs * rhs),
            Op::Div if rhs == 0.0 => None,
            Op::Div => Some(lhs / rhs),
            Op::Mod if rhs == 0.0 => None,
            Op::Mod => Some(lhs % rhs),
            Op::Pow => Some(lhs.powf(rhs)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Operator(Op),
    /// Unary minus in front of a parenthesised group; binds tighter than `^`
    Negate,
    LeftParen,
    RightParen,
}

/// True when the next token must be an operand (start, after an operator, `-(` or `(`)
fn expects_operand(last: Option<&Token>) -> bool {
    matches!(
        last,
        None | Some(Token::Operator(_)) | Some(Token::Negate) | Some(Token::LeftParen)
    )
}

/// Push the pending number, folding a pending unary minus into its sign
fn flush_number(buffer: &mut String, negative: &mut bool, tokens: &mut Vec<Token>) -> Option<()> {
    if buffer.is_empty() {
        return Some(());
    }
    let value: f64 = buffer.parse().ok()?;
    tokens.push(Token::Number(if *negative { -value } else { value }));
    buffer.clear();
    *negative = false;
    Some(())
}

/// Single left-to-right scan into numbers, operators and parentheses
fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut negative = false;

    for c in expr.chars() {
        match c {
            '0'..='9' | '.' => {
                // "(2+3)4" multiplies
                if buffer.is_empty() && matches!(tokens.last(), Some(Token::RightParen)) {
                    tokens.push(Token::Operator(Op::Mul));
                }
                buffer.push(c);
            }
            '-' if buffer.is_empty() && expects_operand(tokens.last()) => {
                negative = !negative;
            }
            '+' if buffer.is_empty() && expects_operand(tokens.last()) => {}
            '(' => {
                flush_number(&mut buffer, &mut negative, &mut tokens)?;
                if negative {
                    tokens.push(Token::Negate);
                    negative = false;
                } else if matches!(tokens.last(), Some(Token::Number(_)) | Some(Token::RightParen)) {
                    tokens.push(Token::Operator(Op::Mul));
                }
                tokens.push(Token::LeftParen);
            }
            ')' => {
                flush_number(&mut buffer, &mut negative, &mut tokens)?;
                tokens.push(Token::RightParen);
            }
            _ => {
                if let Some(op) = Op::from_char(c) {
                    flush_number(&mut buffer, &mut negative, &mut tokens)?;
                    tokens.push(Token::Operator(op));
                }
            }
        }
    }

    flush_number(&mut buffer, &mut negative, &mut tokens)?;
    if negative {
        // A dangling unary minus has nothing to attach to
        return None;
    }
    Some(tokens)
}

/// Shunting-yard conversion to postfix; `None` on mismatched parentheses
fn to_postfix(tokens: Vec<Token>) -> Option<Vec<Token>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::Operator(op) => {
                while let Some(top) = stack.last().copied() {
                    let pops = match top {
                        Token::Negate => true,
                        Token::Operator(top) => {
                            top.precedence() > op.precedence()
                                || (top.precedence() == op.precedence() && !op.is_right_associative())
                        }
                        _ => false,
                    };
                    if !pops {
                        break;
                    }
                    output.push(top);
                    stack.pop();
                }
                stack.push(token);
            }
            // Prefix operator: nothing to its left can be popped yet
            Token::Negate | Token::LeftParen => stack.push(token),
            Token::RightParen => loop {
                match stack.pop()? {
                    Token::LeftParen => break,
                    other => output.push(other),
                }
            },
        }
    }

    while let Some(token) = stack.pop() {
        if token == Token::LeftParen {
            return None;
        }
        output.push(token);
    }
    Some(output)
}

fn eval_postfix(postfix: &[Token]) -> Option<f64> {
    let mut values: Vec<f64> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match *token {
            Token::Number(n) => values.push(n),
            Token::Operator(op) => {
                let rhs = values.pop()?;
                let lhs = values.pop()?;
                values.push(op.apply(lhs, rhs)?);
            }
            Token::Negate => {
                let value = values.pop()?;
                values.push(-value);
            }
            Token::LeftParen | Token::RightParen => return None,
        }
    }

    match values.as_slice() {
        [value] if value.is_finite() => Some(*value),
        _ => None,
    }
}

/// Evaluate a cleaned expression (digits, `.`, parentheses, `+ - * / % ^`)
///
/// Division or modulo by zero and malformed input yield `None`.
pub fn evaluate(expr: &str) -> Option<f64> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return None;
    }
    let postfix = to_postfix(tokens)?;
    eval_postfix(&postfix)
}

/// Rewrite the three whole-expression percentage shapes into plain arithmetic
pub fn rewrite_percentages(expr: &str, patterns: &PatternRegistry) -> String {
    if let Some(caps) = patterns.captures("percentage_of", expr) {
        if let (Some(x), Some(y)) = (caps.get(1), caps.get(2)) {
            return format!("({x}/100*{y})");
        }
    }
    if let Some(caps) = patterns.captures("percentage_add", expr) {
        if let (Some(y), Some(x)) = (caps.get(1), caps.get(2)) {
            return format!("{y}*(1+{x}/100)");
        }
    }
    if let Some(caps) = patterns.captures("percentage_sub", expr) {
        if let (Some(y), Some(x)) = (caps.get(1), caps.get(2)) {
            return format!("{y}*(1-{x}/100)");
        }
    }
    expr.to_string()
}

/// Strip currency and whitespace, normalize numbers, rewrite percentages.
/// `None` when anything but digits, `.`, parentheses and operators remains.
pub fn clean_expression(text: &str, patterns: &PatternRegistry) -> Option<String> {
    let stripped: String = text
        .chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect();
    let normalized = normalize_localized(&stripped, patterns);
    let rewritten = rewrite_percentages(&normalized, patterns);

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '.' | '(' | ')' | '+' | '-' | '*' | '/' | '%' | '^');
    if rewritten.is_empty() || !rewritten.chars().all(allowed) {
        return None;
    }
    Some(rewritten)
}

/// An expression does something beyond stating a (signed) number
fn has_operation(expr: &str) -> bool {
    let body = expr.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(expr);
    body.chars().any(|c| matches!(c, '+' | '-' | '*' | '/' | '%' | '^' | '(' | ')'))
}

/// Evaluates arithmetic with parentheses, implicit multiplication, unary minus,
/// localized numbers, currency and percentage shorthands
#[derive(Debug, Default, Clone, Copy)]
pub struct ArithmeticFormatter;

impl Formatter for ArithmeticFormatter {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn is_candidate(&self, text: &str, opts: &FormatterOptions<'_>) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        let patterns = opts.patterns;
        // "3/4/2024" is a date, not two divisions
        if patterns.matches("date_full", trimmed) || patterns.matches("phone_formatted", trimmed) {
            return false;
        }
        if !patterns.matches("arithmetic_candidate", trimmed) {
            return false;
        }
        clean_expression(trimmed, patterns).is_some_and(|expr| has_operation(&expr))
    }

    fn process(&self, text: &str, opts: &FormatterOptions<'_>) -> Option<String> {
        if !self.is_candidate(text, opts) {
            return None;
        }
        let input = text.trim();
        let expr = clean_expression(input, opts.patterns)?;

        let Some(value) = evaluate(&expr) else {
            debug!(expression = %expr, "Expression did not evaluate");
            return None;
        };

        let numeric = format_number(value)?;
        let result = if input.contains('$') {
            format_currency(value)?
        } else {
            numeric.clone()
        };

        match opts.config.arithmetic.template.as_deref() {
            Some(template) => Some(render_template(
                template,
                &[("input", input), ("result", &result), ("numeric", &numeric)],
            )),
            None => Some(result),
        }
    }
}
