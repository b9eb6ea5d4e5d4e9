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

use crate::dice_types::{Token, TokenKind};

use nom::{
    bytes::complete::tag,
    character::complete::{digit0, digit1},
    combinator::all_consuming,
    sequence::separated_pair,
    IResult,
};

#[cfg(feature = "logging")]
use log::debug;

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum LexError {
    #[error("\"{0}\" was not recognized as a valid number or dice expression.")]
    Unrecognized(String),
}

pub fn lex_number(input: &str) -> IResult<&str, &str> {
    all_consuming(digit1)(input)
}

/// Matches `NdM` where the count `N` may be empty.
pub fn lex_dice(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(separated_pair(digit0, tag("d"), digit1))(input)
}

/// Classifies the text accumulated between two transition characters.
///
/// Dice without a count are normalized here, `d20` becomes `1d20`.
pub fn classify(text: &str) -> Result<Token, LexError> {
    if let Ok((_, digits)) = lex_number(text) {
        return Ok(Token::new(TokenKind::Number, digits));
    }
    if let Ok((_, (count, sides))) = lex_dice(text) {
        let count = if count.is_empty() { "1" } else { count };
        return Ok(Token::new(
            TokenKind::Dice,
            format!("{}d{}", count, sides),
        ));
    }
    Err(LexError::Unrecognized(text.to_owned()))
}

fn flush(pending: &mut String, tokens: &mut Vec<Token>) -> Result<(), LexError> {
    if !pending.is_empty() {
        tokens.push(classify(pending)?);
        pending.clear();
    }
    Ok(())
}

pub fn tokenize(raw: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut pending = String::new();
    for c in raw.chars() {
        if c.is_whitespace() {
            flush(&mut pending, &mut tokens)?;
            continue;
        }
        match TokenKind::of_transition(c) {
            Some(kind) => {
                flush(&mut pending, &mut tokens)?;
                tokens.push(Token::new(kind, c.to_string()));
            }
            None => pending.push(c),
        }
    }
    flush(&mut pending, &mut tokens)?;

    #[cfg(feature = "logging")]
    {
        debug!("tokenized {:?} into {:?}", raw, &tokens)
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {

    use super::*;
    use proptest::prelude::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text)
    }

    #[test]
    fn test_lex_number() {
        assert_eq!(lex_number("0"), Ok(("", "0")));
        assert_eq!(lex_number("6969"), Ok(("", "6969")));
        assert!(lex_number("12a").is_err());
        assert!(lex_number("-1").is_err());
        assert!(lex_number("").is_err());
    }

    #[test]
    fn test_lex_dice() {
        assert_eq!(lex_dice("3d6"), Ok(("", ("3", "6"))));
        assert_eq!(lex_dice("d20"), Ok(("", ("", "20"))));
        assert!(lex_dice("3d").is_err());
        assert!(lex_dice("d").is_err());
        assert!(lex_dice("3D6").is_err());
        assert!(lex_dice("3d6d6").is_err());
        assert!(lex_dice("3dx").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("42"), Ok(token(TokenKind::Number, "42")));
        assert_eq!(classify("2d8"), Ok(token(TokenKind::Dice, "2d8")));
        assert_eq!(classify("d6"), Ok(token(TokenKind::Dice, "1d6")));
        assert_eq!(classify("0d6"), Ok(token(TokenKind::Dice, "0d6")));
        assert_eq!(
            classify("abc"),
            Err(LexError::Unrecognized("abc".to_string()))
        );
    }

    #[test]
    fn test_tokenize_expression() {
        assert_eq!(
            tokenize("3d6+(1d4/2)"),
            Ok(vec![
                token(TokenKind::Dice, "3d6"),
                token(TokenKind::AdditiveOp, "+"),
                token(TokenKind::Paren, "("),
                token(TokenKind::Dice, "1d4"),
                token(TokenKind::MultiplicativeOp, "/"),
                token(TokenKind::Number, "2"),
                token(TokenKind::Paren, ")"),
            ])
        );
    }

    #[test]
    fn test_tokenize_whitespace_flushes() {
        assert_eq!(
            tokenize(" 1 \t2\u{a0}d4\u{85}- 3 "),
            Ok(vec![
                token(TokenKind::Number, "1"),
                token(TokenKind::Number, "2"),
                token(TokenKind::Dice, "1d4"),
                token(TokenKind::AdditiveOp, "-"),
                token(TokenKind::Number, "3"),
            ])
        );
        assert_eq!(tokenize("   "), Ok(vec![]));
        assert_eq!(tokenize(""), Ok(vec![]));
    }

    #[test]
    fn test_tokenize_consecutive_transitions() {
        assert_eq!(
            tokenize("((1))"),
            Ok(vec![
                token(TokenKind::Paren, "("),
                token(TokenKind::Paren, "("),
                token(TokenKind::Number, "1"),
                token(TokenKind::Paren, ")"),
                token(TokenKind::Paren, ")"),
            ])
        );
        assert_eq!(
            tokenize("*-"),
            Ok(vec![
                token(TokenKind::MultiplicativeOp, "*"),
                token(TokenKind::AdditiveOp, "-"),
            ])
        );
    }

    #[test]
    fn test_tokenize_aborts_on_unknown() {
        assert_eq!(
            tokenize("1+foo*2"),
            Err(LexError::Unrecognized("foo".to_string()))
        );
        assert_eq!(
            tokenize("1+2x"),
            Err(LexError::Unrecognized("2x".to_string()))
        );
        assert_eq!(
            tokenize("1.5"),
            Err(LexError::Unrecognized("1.5".to_string()))
        );
        assert_eq!(
            LexError::Unrecognized("foo".to_string()).to_string(),
            "\"foo\" was not recognized as a valid number or dice expression."
        );
    }

    proptest! {
        #[test]
        fn test_digit_strings_are_numbers(s in "[0-9]{1,30}") {
            prop_assert_eq!(tokenize(&s), Ok(vec![token(TokenKind::Number, &s)]));
        }

        #[test]
        fn test_dice_strings_are_dice(count in "[0-9]{0,5}", sides in "[0-9]{1,5}") {
            let expected = if count.is_empty() {
                format!("1d{}", sides)
            } else {
                format!("{}d{}", count, sides)
            };
            let raw = format!("{}d{}", count, sides);
            prop_assert_eq!(tokenize(&raw), Ok(vec![token(TokenKind::Dice, &expected)]));
        }
    }
}
