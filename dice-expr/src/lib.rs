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

//! Integer arithmetic with dice.
//!
//! ```text
//! text --lexer--> tokens --parser--> Node --dice_roll--> Evaluation { value, trace }
//! ```
//!
//! `3d6 + (1d4 / 2)` might evaluate to `12` with the trace `[4, 1, 6] + [3] / 2`.

pub mod dice_types;
pub mod limits;

#[cfg(feature = "roll")]
pub mod dice_roll;
#[cfg(feature = "parser")]
pub mod lexer;
#[cfg(feature = "parser")]
pub mod parser;

pub use dice_types::{Evaluation, Node, Operation, Token, TokenKind};

#[cfg(all(feature = "parser", feature = "roll"))]
pub use composed::*;

#[cfg(all(feature = "parser", feature = "roll"))]
mod composed {
    use crate::{
        dice_roll::EvaluationErrors,
        dice_types::{Evaluation, Node},
        lexer::{tokenize, LexError},
        parser::{ParseErrors, Parser, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DICE},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Any failure between raw text and a finished evaluation.
    #[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
    pub enum RollError {
        #[error(transparent)]
        Lex(#[from] LexError),
        #[error(transparent)]
        Parse(#[from] ParseErrors),
        #[error(transparent)]
        Evaluation(#[from] EvaluationErrors),
    }

    pub fn parse(raw: &str) -> Result<Node, RollError> {
        parse_with_max_depth(raw, DEFAULT_MAX_DEPTH)
    }

    pub fn parse_with_max_depth(raw: &str, max_depth: usize) -> Result<Node, RollError> {
        parse_with_limits(raw, max_depth, DEFAULT_MAX_DICE)
    }

    /// Parses `raw`, rejecting groups nested deeper than `max_depth` and
    /// expressions rolling more than `max_dice` dice in total.
    pub fn parse_with_limits(
        raw: &str,
        max_depth: usize,
        max_dice: u64,
    ) -> Result<Node, RollError> {
        let tokens = tokenize(raw)?;
        Ok(Parser::with_limits(tokens, max_depth, max_dice).parse()?)
    }

    pub fn roll_with<R: Rng>(raw: &str, rng: &mut R) -> Result<Evaluation, RollError> {
        Ok(parse(raw)?.roll(rng)?)
    }

    /// Parses and evaluates `raw` with a generator seeded for this call only.
    pub fn roll(raw: &str) -> Result<Evaluation, RollError> {
        roll_with(raw, &mut StdRng::from_entropy())
    }
}
