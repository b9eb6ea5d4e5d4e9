pub trait DiceLimits {
    fn min(&self) -> i64;
    fn max(&self) -> i64;
}

use crate::dice_types::*;

fn extremes(candidates: &[i64]) -> (i64, i64) {
    let min = candidates.iter().copied().min().unwrap_or(0);
    let max = candidates.iter().copied().max().unwrap_or(0);
    (min, max)
}

/// Closed range every successful evaluation of `node` falls into.
fn bounds(node: &Node) -> (i64, i64) {
    match node {
        Node::Constant(c) => (*c, *c),
        Node::DiceRoll { count, sides } => {
            let count = i64::from(*count);
            (count, count.saturating_mul(i64::from(*sides)))
        }
        Node::BinaryOp(left, op, right) => {
            let (l_min, l_max) = bounds(left);
            let (r_min, r_max) = bounds(right);
            match op {
                Operation::Add => (l_min.saturating_add(r_min), l_max.saturating_add(r_max)),
                Operation::Sub => (l_min.saturating_sub(r_max), l_max.saturating_sub(r_min)),
                Operation::Mul => extremes(&[
                    l_min.saturating_mul(r_min),
                    l_min.saturating_mul(r_max),
                    l_max.saturating_mul(r_min),
                    l_max.saturating_mul(r_max),
                ]),
                Operation::Div => {
                    // quotients are monotonic within each sign of the divisor,
                    // so only the ends of both sign ranges matter
                    let mut divisors = vec![r_min, r_max];
                    if r_max >= 1 {
                        divisors.push(r_min.max(1));
                    }
                    if r_min <= -1 {
                        divisors.push(r_max.min(-1));
                    }
                    let mut candidates = Vec::with_capacity(9);
                    for d in divisors.into_iter().filter(|d| *d != 0) {
                        candidates.push(l_min.saturating_div(d));
                        candidates.push(l_max.saturating_div(d));
                    }
                    // division by zero evaluates to 0
                    if r_min <= 0 && r_max >= 0 {
                        candidates.push(0);
                    }
                    extremes(&candidates)
                }
            }
        }
    }
}

impl DiceLimits for Node {
    fn min(&self) -> i64 {
        bounds(self).0
    }

    fn max(&self) -> i64 {
        bounds(self).1
    }
}
