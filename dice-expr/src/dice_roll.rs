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

use crate::dice_types::*;
use rand::{distributions::Uniform, Rng};

#[cfg(feature = "logging")]
use log::debug;

/// Trace replacing a division whose divisor evaluated to zero.
pub const DIVIDE_BY_ZERO: &str = "ERROR: DIVIDE BY ZERO";

#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum EvaluationErrors {
    #[error("Overflow detected")]
    Overflow,
    #[error("Timeout")]
    Timeout,
    #[error("Dice without sides can not be rolled")]
    NoSides,
}

pub trait Evaluate {
    /// Evaluates bottom up, left before right. `timeout_f` is polled regularly
    /// and aborts the evaluation once it returns `true`.
    fn evaluate<T: FnMut() -> bool, R: Rng>(
        &self,
        timeout_f: &mut T,
        rng: &mut R,
    ) -> Result<Evaluation, EvaluationErrors>;
}

fn roll_dice<T: FnMut() -> bool, R: Rng>(
    count: u32,
    sides: u32,
    timeout_f: &mut T,
    rng: &mut R,
) -> Result<Vec<i64>, EvaluationErrors> {
    if sides == 0 {
        return Err(EvaluationErrors::NoSides);
    }
    let dist = Uniform::new_inclusive(1, i64::from(sides));
    let mut rolls: Vec<i64> = Vec::new();
    let mut roll_counter: u8 = 0;
    for _ in 0..count {
        roll_counter = roll_counter.wrapping_add(1);
        if roll_counter == 0 && timeout_f() {
            return Err(EvaluationErrors::Timeout);
        }
        rolls.push(rng.sample(dist));
    }
    Ok(rolls)
}

fn bracketed(rolls: &[i64]) -> String {
    format!(
        "[{}]",
        rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<String>>()
            .join(", ")
    )
}

impl Evaluate for Node {
    fn evaluate<T: FnMut() -> bool, R: Rng>(
        &self,
        timeout_f: &mut T,
        rng: &mut R,
    ) -> Result<Evaluation, EvaluationErrors> {
        if timeout_f() {
            return Err(EvaluationErrors::Timeout);
        }
        let result = match self {
            Node::Constant(c) => Ok(Evaluation {
                value: *c,
                trace: c.to_string(),
            }),
            Node::DiceRoll { count, sides } => {
                let rolls = roll_dice(*count, *sides, timeout_f, rng)?;
                let value = rolls
                    .iter()
                    .try_fold(0i64, |sum, r| sum.checked_add(*r))
                    .ok_or(EvaluationErrors::Overflow)?;
                Ok(Evaluation {
                    value,
                    trace: bracketed(&rolls),
                })
            }
            Node::BinaryOp(left, op, right) => {
                let left_r = left.evaluate(timeout_f, rng)?;
                let right_r = right.evaluate(timeout_f, rng)?;
                let value = match op {
                    Operation::Add => left_r.value.checked_add(right_r.value),
                    Operation::Sub => left_r.value.checked_sub(right_r.value),
                    Operation::Mul => left_r.value.checked_mul(right_r.value),
                    Operation::Div if right_r.value == 0 => {
                        return Ok(Evaluation {
                            value: 0,
                            trace: DIVIDE_BY_ZERO.to_string(),
                        });
                    }
                    Operation::Div => left_r.value.checked_div(right_r.value),
                }
                .ok_or(EvaluationErrors::Overflow)?;
                Ok(Evaluation {
                    value,
                    trace: format!("{} {} {}", left_r.trace, op, right_r.trace),
                })
            }
        };
        #[cfg(feature = "logging")]
        {
            debug!("got {:?} for {}", &result, &self)
        }
        result
    }
}

impl Node {
    /// Evaluates without a timeout.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> Result<Evaluation, EvaluationErrors> {
        self.evaluate(&mut || false, rng)
    }
}
