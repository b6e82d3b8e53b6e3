//! Infix formula parser.
//!
//! Operator-precedence parsing over explicit stacks, so deeply nested inputs
//! do not grow the call stack. Binding strength, loosest first:
//! `<->`, `->`, `xor`, `|`, `&`, the binary temporal operators `U W R M`, and
//! the prefix operators `! X F G`. `->` and the temporal operators associate
//! to the right.

use std::str::FromStr;

use thiserror::Error;

use super::{Formula, Kind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse formula at column {column}: {message}")]
pub struct ParseError {
    pub column: usize,
    pub message: String,
}

impl ParseError {
    fn new(column: usize, message: impl Into<String>) -> Self {
        ParseError {
            column,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Atom(String),
    Const(bool),
    Unary(Kind),
    Binary(Kind),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let starts_with = |i: usize, pat: &str| {
        pat.chars()
            .enumerate()
            .all(|(k, c)| chars.get(i + k) == Some(&c))
    };

    while i < chars.len() {
        let c = chars[i];
        let column = i + 1;
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Multi-character symbols, longest first
        const SYMBOLS: &[(&str, Token)] = &[
            ("<-->", Token::Binary(Kind::Equiv)),
            ("<->", Token::Binary(Kind::Equiv)),
            ("<=>", Token::Binary(Kind::Equiv)),
            ("-->", Token::Binary(Kind::Implies)),
            ("->", Token::Binary(Kind::Implies)),
            ("=>", Token::Binary(Kind::Implies)),
            ("&&", Token::Binary(Kind::And)),
            ("||", Token::Binary(Kind::Or)),
            ("/\\", Token::Binary(Kind::And)),
            ("\\/", Token::Binary(Kind::Or)),
            ("<>", Token::Unary(Kind::F)),
            ("[]", Token::Unary(Kind::G)),
            ("&", Token::Binary(Kind::And)),
            ("|", Token::Binary(Kind::Or)),
            ("^", Token::Binary(Kind::Xor)),
            ("!", Token::Unary(Kind::Not)),
            ("~", Token::Unary(Kind::Not)),
            ("(", Token::Open),
            (")", Token::Close),
            ("0", Token::Const(false)),
            ("1", Token::Const(true)),
        ];
        if let Some((sym, tok)) = SYMBOLS.iter().find(|(sym, _)| starts_with(i, sym)) {
            tokens.push((column, tok.clone()));
            i += sym.chars().count();
            continue;
        }

        if c == '"' {
            let end = chars[i + 1..]
                .iter()
                .position(|&ch| ch == '"')
                .ok_or_else(|| ParseError::new(column, "unterminated quoted proposition"))?;
            let name: String = chars[i + 1..i + 1 + end].iter().collect();
            tokens.push((column, Token::Atom(name)));
            i += end + 2;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let len = chars[i..]
                .iter()
                .take_while(|ch| ch.is_ascii_alphanumeric() || **ch == '_' || **ch == '.')
                .count();
            let word: String = chars[i..i + len].iter().collect();
            let token = match word.as_str() {
                "true" => Some(Token::Const(true)),
                "false" => Some(Token::Const(false)),
                "xor" => Some(Token::Binary(Kind::Xor)),
                "U" => Some(Token::Binary(Kind::U)),
                "W" => Some(Token::Binary(Kind::W)),
                "R" | "V" => Some(Token::Binary(Kind::R)),
                "M" => Some(Token::Binary(Kind::M)),
                _ => None,
            };
            if let Some(token) = token {
                tokens.push((column, token));
                i += len;
                continue;
            }
            // A leading F, G or X is a prefix operator glued to its operand
            // (`GFa` is `G(F(a))`).
            let prefix = match c {
                'F' => Some(Kind::F),
                'G' => Some(Kind::G),
                'X' => Some(Kind::X),
                _ => None,
            };
            if let Some(kind) = prefix {
                tokens.push((column, Token::Unary(kind)));
                i += 1;
                continue;
            }
            tokens.push((column, Token::Atom(word)));
            i += len;
            continue;
        }

        return Err(ParseError::new(column, format!("unexpected character '{c}'")));
    }
    Ok(tokens)
}

fn binding(kind: Kind) -> u8 {
    match kind {
        Kind::Equiv => 1,
        Kind::Implies => 2,
        Kind::Xor => 3,
        Kind::Or => 4,
        Kind::And => 5,
        Kind::U | Kind::W | Kind::R | Kind::M => 6,
        _ => 7,
    }
}

fn right_associative(kind: Kind) -> bool {
    matches!(kind, Kind::Implies | Kind::U | Kind::W | Kind::R | Kind::M)
}

enum Pending {
    Unary(Kind),
    Binary(Kind, usize),
    Open(usize),
}

fn reduce(pending: Pending, operands: &mut Vec<Formula>) -> Result<(), ParseError> {
    match pending {
        Pending::Unary(kind) => {
            let arg = operands
                .pop()
                .ok_or_else(|| ParseError::new(0, "missing operand"))?;
            operands.push(Formula::with_children(kind, vec![arg]));
        }
        Pending::Binary(kind, column) => {
            let right = operands.pop();
            let left = operands.pop();
            let (Some(left), Some(right)) = (left, right) else {
                return Err(ParseError::new(column, "missing operand"));
            };
            operands.push(Formula::with_children(kind, vec![left, right]));
        }
        Pending::Open(column) => return Err(ParseError::new(column, "unbalanced '('")),
    }
    Ok(())
}

/// Parses a formula from its infix text.
pub fn parse(input: &str) -> Result<Formula, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new(1, "empty formula"));
    }

    let mut operands: Vec<Formula> = Vec::new();
    let mut pending: Vec<Pending> = Vec::new();
    let mut expect_operand = true;

    for (column, token) in tokens {
        if expect_operand {
            match token {
                Token::Atom(name) => {
                    operands.push(Formula::ap(&name));
                    expect_operand = false;
                }
                Token::Const(value) => {
                    operands.push(Formula::constant(value));
                    expect_operand = false;
                }
                Token::Unary(kind) => pending.push(Pending::Unary(kind)),
                Token::Open => pending.push(Pending::Open(column)),
                Token::Binary(_) | Token::Close => {
                    return Err(ParseError::new(column, "expected an operand"));
                }
            }
            continue;
        }

        match token {
            Token::Binary(kind) => {
                while let Some(top) = pending.last() {
                    let reduce_top = match top {
                        Pending::Unary(_) => true,
                        Pending::Binary(other, _) => {
                            binding(*other) > binding(kind)
                                || (binding(*other) == binding(kind) && !right_associative(kind))
                        }
                        Pending::Open(_) => false,
                    };
                    if !reduce_top {
                        break;
                    }
                    if let Some(top) = pending.pop() {
                        reduce(top, &mut operands)?;
                    }
                }
                pending.push(Pending::Binary(kind, column));
                expect_operand = true;
            }
            Token::Close => loop {
                match pending.pop() {
                    Some(Pending::Open(_)) => break,
                    Some(other) => reduce(other, &mut operands)?,
                    None => return Err(ParseError::new(column, "unbalanced ')'")),
                }
            },
            _ => return Err(ParseError::new(column, "expected an operator")),
        }
    }

    if expect_operand {
        return Err(ParseError::new(input.chars().count() + 1, "unexpected end of formula"));
    }
    while let Some(top) = pending.pop() {
        reduce(top, &mut operands)?;
    }
    match (operands.pop(), operands.is_empty()) {
        (Some(formula), true) => Ok(formula),
        _ => Err(ParseError::new(1, "dangling operands")),
    }
}

impl FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ap(name: &str) -> Formula {
        Formula::ap(name)
    }

    #[test]
    fn test_parse_atoms_and_constants() {
        assert_eq!(parse("a").unwrap(), ap("a"));
        assert!(parse("true").unwrap().is_tt());
        assert!(parse("0").unwrap().is_ff());
        assert_eq!(parse("\"Req\"").unwrap(), ap("Req"));
    }

    #[test]
    fn test_prefix_operators_glue() {
        let f = parse("GFa").unwrap();
        assert_eq!(f, Formula::globally(Formula::eventually(ap("a"))));
        let g = parse("X!b").unwrap();
        assert_eq!(g, Formula::next(Formula::not(ap("b"))));
    }

    #[test]
    fn test_precedence() {
        // temporal binary operators bind tighter than the boolean ones
        let f = parse("a & b U c | d").unwrap();
        let expected = Formula::or(vec![
            Formula::and(vec![ap("a"), Formula::until(ap("b"), ap("c"))]),
            ap("d"),
        ]);
        assert_eq!(f, expected);

        // prefix operators bind tighter than U
        let g = parse("G a U b").unwrap();
        assert_eq!(g, Formula::until(Formula::globally(ap("a")), ap("b")));
    }

    #[test]
    fn test_right_associative_until() {
        let f = parse("a U b W c").unwrap();
        assert_eq!(
            f,
            Formula::until(ap("a"), Formula::weak_until(ap("b"), ap("c")))
        );
        let g = parse("(a U b) W c").unwrap();
        assert_eq!(
            g,
            Formula::weak_until(Formula::until(ap("a"), ap("b")), ap("c"))
        );
    }

    #[test]
    fn test_alternative_spellings() {
        let f = parse("[](req -> <>ack) && !err").unwrap();
        let expected = Formula::and(vec![
            Formula::globally(Formula::implies(ap("req"), Formula::eventually(ap("ack")))),
            Formula::not(ap("err")),
        ]);
        assert_eq!(f, expected);
        assert_eq!(parse("a V b").unwrap(), Formula::release(ap("a"), ap("b")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("a U").is_err());
        assert!(parse("(a").is_err());
        assert!(parse("a)").is_err());
        assert!(parse("a b").is_err());
        assert!(parse("a # b").is_err());
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 20_000;
        let text = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&text).unwrap(), ap("a"));
    }
}
