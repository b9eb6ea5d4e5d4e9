/*
Copyright 2021 Robin Marchart

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntactic category of a [`Token`].
///
/// Opening and closing parentheses share the [`TokenKind::Paren`] kind, the
/// token text tells them apart.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum TokenKind {
    Number,
    Dice,
    AdditiveOp,
    MultiplicativeOp,
    Paren,
}

impl TokenKind {
    /// Kind of a character that ends the pending lexer buffer and forms a token on its own.
    pub fn of_transition(c: char) -> Option<TokenKind> {
        match c {
            '(' | ')' => Some(TokenKind::Paren),
            '*' | '/' => Some(TokenKind::MultiplicativeOp),
            '+' | '-' => Some(TokenKind::AdditiveOp),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Token {
        Token {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    pub fn from_symbol(symbol: &str) -> Option<Operation> {
        match symbol {
            "+" => Some(Operation::Add),
            "-" => Some(Operation::Sub),
            "*" => Some(Operation::Mul),
            "/" => Some(Operation::Div),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
            Operation::Mul => '*',
            Operation::Div => '/',
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Operation::Add | Operation::Sub => 1,
            Operation::Mul | Operation::Div => 2,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Parsed dice expression.
///
/// Parenthesized groups do not get a node of their own, the grouping is
/// expressed by the shape of the tree.
///
/// `Display` prints the parentheses the tree needs. Only trees the parser can
/// produce print back to text that parses again: a negative `Constant` is
/// shown as `(-7)`, which is readable but not valid input.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum Node {
    Constant(i64),
    /// `count` dice with faces `1..=sides`. The parser never produces `sides == 0`.
    DiceRoll { count: u32, sides: u32 },
    BinaryOp(Box<Node>, Operation, Box<Node>),
}

impl Node {
    fn precedence(&self) -> u8 {
        match self {
            Node::BinaryOp(_, op, _) => op.precedence(),
            _ => u8::MAX,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, grouped: bool) -> fmt::Result {
        if grouped {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(c) if *c < 0 => write!(f, "({})", c),
            Node::Constant(c) => write!(f, "{}", c),
            Node::DiceRoll { count, sides } => write!(f, "{}d{}", count, sides),
            Node::BinaryOp(left, op, right) => {
                left.fmt_operand(f, left.precedence() < op.precedence())?;
                write!(f, " {} ", op)?;
                // operators are left associative, so an equal precedence on the right needs parentheses
                right.fmt_operand(f, right.precedence() <= op.precedence())
            }
        }
    }
}

/// Result of evaluating a [`Node`]: the value and a readable trace of every die rolled.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Evaluation {
    pub value: i64,
    pub trace: String,
}
