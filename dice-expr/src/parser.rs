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

use crate::dice_types::{Node, Operation, Token, TokenKind};
use std::fmt;

#[cfg(feature = "logging")]
use log::{debug, error};

pub const DEFAULT_MAX_DEPTH: usize = 64;
/// Most dice a single expression may roll, summed over all dice terms.
pub const DEFAULT_MAX_DICE: u64 = 10_000;

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("\"{0}\" was not recognized as a valid number or dice expression.")]
    MalformedDice(String),
    #[error("\"{0}\" has no sides to roll")]
    NoSides(String),
    #[error("\"{0}\" exceeds the maximum of 4294967295 dice or sides")]
    DiceOutOfRange(String),
    #[error("\"{0}\" rolls more than {1} dice in one expression")]
    TooManyDice(String, u64),
    #[error("\"{0}\" is too large")]
    NumberOutOfRange(String),
    #[error("Unmatched parenthesis.")]
    UnmatchedParenthesis,
    #[error("unexpected \"{0}\", expected a number, dice or \"(\"")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected \"{0}\" after the end of the expression")]
    TrailingToken(String),
    #[error("empty expression")]
    Empty,
    #[error("parentheses nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Every problem found while parsing one expression.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseErrors(pub Vec<ParseError>);

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.0.iter();
        if let Some(first) = errors.next() {
            write!(f, "{}", first)?;
        }
        for e in errors {
            write!(f, "; {}", e)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn combine(left: Option<Node>, op: Option<Operation>, right: Option<Node>) -> Option<Node> {
    match (left, op, right) {
        (Some(left), Some(op), Some(right)) => {
            Some(Node::BinaryOp(Box::new(left), op, Box::new(right)))
        }
        _ => None,
    }
}

/// Recursive descent parser for
///
/// ```text
/// Expr    := Term
/// Term    := Factor ( ('+' | '-') Factor )*
/// Factor  := Primary ( ('*' | '/') Primary )*
/// Primary := '(' Expr ')' | Dice | Number
/// ```
///
/// Errors do not stop the parse. A position that failed yields no node and
/// the parser keeps going, so one run reports every problem in the input.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    max_depth: usize,
    dice: u64,
    max_dice: u64,
    /// Cursor position of the last token reported as unexpected.
    reported: Option<usize>,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser::with_max_depth(tokens, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(tokens: Vec<Token>, max_depth: usize) -> Parser {
        Parser::with_limits(tokens, max_depth, DEFAULT_MAX_DICE)
    }

    pub fn with_limits(tokens: Vec<Token>, max_depth: usize, max_dice: u64) -> Parser {
        Parser {
            tokens,
            current: 0,
            depth: 0,
            max_depth,
            dice: 0,
            max_dice,
            reported: None,
            errors: Vec::new(),
        }
    }

    pub fn parse(self) -> Result<Node, ParseErrors> {
        match self.parse_collect() {
            (Some(node), errors) if errors.is_empty() => Ok(node),
            (_, errors) => Err(ParseErrors(errors)),
        }
    }

    /// Parses the whole token sequence, returning the tree if one could be built
    /// together with all collected errors.
    pub fn parse_collect(mut self) -> (Option<Node>, Vec<ParseError>) {
        if self.tokens.is_empty() {
            return (None, vec![ParseError::Empty]);
        }
        let expr = self.expr();
        if let Some(token) = self.peek() {
            let text = token.text().to_owned();
            if self.reported != Some(self.current) {
                self.errors.push(ParseError::TrailingToken(text));
            }
        }

        #[cfg(feature = "logging")]
        {
            debug!("parsed {:?} with errors {:?}", &expr, &self.errors)
        }
        (expr, self.errors)
    }

    fn expr(&mut self) -> Option<Node> {
        self.term()
    }

    fn term(&mut self) -> Option<Node> {
        let mut expr = self.factor();
        while self.check(TokenKind::AdditiveOp) {
            let op = self.operation();
            let right = self.factor();
            expr = combine(expr, op, right);
        }
        expr
    }

    fn factor(&mut self) -> Option<Node> {
        let mut expr = self.primary();
        while self.check(TokenKind::MultiplicativeOp) {
            let op = self.operation();
            let right = self.primary();
            expr = combine(expr, op, right);
        }
        expr
    }

    fn primary(&mut self) -> Option<Node> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => {
                self.errors.push(ParseError::UnexpectedEnd);
                return None;
            }
        };
        match token.kind() {
            TokenKind::Number => {
                self.consume();
                self.constant(token.text())
            }
            TokenKind::Dice => {
                self.consume();
                self.dice(token.text())
            }
            TokenKind::Paren if token.text() == "(" => {
                self.consume();
                self.group()
            }
            // left in place, the enclosing loop or the trailing check moves past it
            TokenKind::Paren | TokenKind::AdditiveOp | TokenKind::MultiplicativeOp => {
                self.errors
                    .push(ParseError::UnexpectedToken(token.text().to_owned()));
                self.reported = Some(self.current);
                None
            }
        }
    }

    fn group(&mut self) -> Option<Node> {
        if self.depth >= self.max_depth {
            self.errors.push(ParseError::NestingTooDeep(self.max_depth));
            self.skip_group();
            return None;
        }
        self.depth += 1;
        let expr = self.expr();
        self.depth -= 1;
        if self.check_paren(")") {
            self.consume();
            expr
        } else {
            self.errors.push(ParseError::UnmatchedParenthesis);
            None
        }
    }

    /// Moves past the rest of a group without descending into it.
    fn skip_group(&mut self) {
        let mut open: usize = 1;
        while let Some(token) = self.peek() {
            let closing = token.kind() == TokenKind::Paren && token.text() == ")";
            let opening = token.kind() == TokenKind::Paren && token.text() == "(";
            self.consume();
            if opening {
                open += 1;
            } else if closing {
                open -= 1;
                if open == 0 {
                    return;
                }
            }
        }
        self.errors.push(ParseError::UnmatchedParenthesis);
    }

    fn operation(&mut self) -> Option<Operation> {
        let symbol = self.consume()?.text().to_owned();
        let op = Operation::from_symbol(&symbol);
        if op.is_none() {
            self.internal(format!("operator token \"{}\" is not an operator", symbol));
        }
        op
    }

    fn constant(&mut self, text: &str) -> Option<Node> {
        if !is_digits(text) {
            self.internal(format!("NUMBER token \"{}\" was not purely numeric", text));
            return None;
        }
        match text.parse::<i64>() {
            Ok(value) => Some(Node::Constant(value)),
            Err(_) => {
                self.errors
                    .push(ParseError::NumberOutOfRange(text.to_owned()));
                None
            }
        }
    }

    fn dice(&mut self, text: &str) -> Option<Node> {
        let parts: Vec<&str> = text.split('d').collect();
        let (count, sides) = match parts.as_slice() {
            [count, sides] if !count.is_empty() && is_digits(sides) => (*count, *sides),
            _ => {
                self.errors
                    .push(ParseError::MalformedDice(text.to_owned()));
                return None;
            }
        };
        if !is_digits(count) {
            self.internal(format!(
                "NUMBER in dice expression \"{}\" was not purely numeric",
                text
            ));
            return None;
        }
        match (count.parse::<u32>(), sides.parse::<u32>()) {
            (Ok(_), Ok(0)) => {
                self.errors.push(ParseError::NoSides(text.to_owned()));
                None
            }
            (Ok(count), Ok(sides)) => {
                self.dice = self.dice.saturating_add(u64::from(count));
                if self.dice > self.max_dice {
                    self.errors
                        .push(ParseError::TooManyDice(text.to_owned(), self.max_dice));
                    return None;
                }
                Some(Node::DiceRoll { count, sides })
            }
            _ => {
                self.errors
                    .push(ParseError::DiceOutOfRange(text.to_owned()));
                None
            }
        }
    }

    fn internal(&mut self, message: String) {
        #[cfg(feature = "logging")]
        {
            error!("{}, the lexer should have rejected this", &message)
        }
        self.errors.push(ParseError::Internal(message));
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().map_or(false, |t| t.kind() == kind)
    }

    fn check_paren(&self, text: &str) -> bool {
        self.peek()
            .map_or(false, |t| t.kind() == TokenKind::Paren && t.text() == text)
    }

    /// Returns the current token and advances. Once the last token has been
    /// consumed the cursor stays put and the last token is returned again.
    fn consume(&mut self) -> Option<&Token> {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
        match self.current.checked_sub(1) {
            Some(i) => self.tokens.get(i),
            None => None,
        }
    }
}
