//! Canonical infix printing, the inverse of the parser.

use std::fmt;

use super::{Formula, Kind};

const ATOMIC: u8 = 8;
const PREFIX: u8 = 7;

fn binding(kind: Kind) -> u8 {
    match kind {
        Kind::Tt | Kind::Ff | Kind::Ap => ATOMIC,
        Kind::Not | Kind::X | Kind::F | Kind::G => PREFIX,
        Kind::U | Kind::W | Kind::R | Kind::M => 6,
        Kind::And => 5,
        Kind::Or => 4,
        Kind::Xor => 3,
        Kind::Implies => 2,
        Kind::Equiv => 1,
    }
}

fn symbol(kind: Kind) -> &'static str {
    match kind {
        Kind::Tt => "1",
        Kind::Ff => "0",
        Kind::Ap => "",
        Kind::Not => "!",
        Kind::X => "X",
        Kind::F => "F",
        Kind::G => "G",
        Kind::And => " & ",
        Kind::Or => " | ",
        Kind::Implies => " -> ",
        Kind::Equiv => " <-> ",
        Kind::Xor => " xor ",
        Kind::U => " U ",
        Kind::W => " W ",
        Kind::R => " R ",
        Kind::M => " M ",
    }
}

fn needs_quotes(name: &str) -> bool {
    let mut chars = name.chars();
    let head_ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    !(head_ok && tail_ok) || matches!(name, "true" | "false" | "xor")
}

enum Step<'a> {
    Node(&'a Formula),
    Text(&'static str),
}

// Children are pushed in reverse so they pop in reading order.
fn push_operand<'a>(stack: &mut Vec<Step<'a>>, child: &'a Formula, parens: bool) {
    if parens {
        stack.push(Step::Text(")"));
    }
    stack.push(Step::Node(child));
    if parens {
        stack.push(Step::Text("("));
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Step::Node(self)];

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Text(text) => {
                    out.write_str(text)?;
                    continue;
                }
                Step::Node(node) => node,
            };
            let kind = node.kind();
            let own = binding(kind);
            let children = node.children();
            match kind {
                Kind::Tt | Kind::Ff => out.write_str(symbol(kind))?,
                Kind::Ap => {
                    let name = node.name().unwrap_or_default();
                    if needs_quotes(name) {
                        write!(out, "\"{name}\"")?;
                    } else {
                        out.write_str(name)?;
                    }
                }
                Kind::Not | Kind::X | Kind::F | Kind::G => {
                    out.write_str(symbol(kind))?;
                    let arg = &children[0];
                    push_operand(&mut stack, arg, binding(arg.kind()) < PREFIX);
                }
                Kind::And | Kind::Or => {
                    for (i, child) in children.iter().enumerate().rev() {
                        push_operand(&mut stack, child, binding(child.kind()) <= own);
                        if i > 0 {
                            stack.push(Step::Text(symbol(kind)));
                        }
                    }
                }
                _ => {
                    let (left, right) = (&children[0], &children[1]);
                    let (lb, rb) = (binding(left.kind()), binding(right.kind()));
                    let right_assoc = matches!(
                        kind,
                        Kind::Implies | Kind::U | Kind::W | Kind::R | Kind::M
                    );
                    push_operand(&mut stack, right, rb < own || (rb == own && !right_assoc));
                    stack.push(Step::Text(symbol(kind)));
                    push_operand(&mut stack, left, lb < own || (lb == own && right_assoc));
                }
            }
        }
        Ok(())
    }
}
