use dice_expr::{dice_roll::DIVIDE_BY_ZERO, limits::DiceLimits};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;

/// Rolls an expression many times and prints how often each result came up.
///
/// `roll-cmd <expression> [samples]`
fn main() {
    pretty_env_logger::init();
    let (raw, num) = {
        let mut args = std::env::args().skip(1);
        let raw = match args.next() {
            Some(raw) => raw,
            None => {
                eprintln!("usage: roll-cmd <expression> [samples]");
                std::process::exit(2);
            }
        };
        (
            raw,
            args.next()
                .and_then(|a| a.parse::<u32>().ok())
                .unwrap_or(1),
        )
    };
    let node = match dice_expr::parse(&raw) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let mut master_rng = ChaCha20Rng::from_entropy();

    let (result_min, result_max) = (node.min(), node.max());
    let mut results: BTreeMap<i64, u64> = BTreeMap::new();
    let mut divisions_by_zero: u64 = 0;

    for result in (0..num)
        .map(|_| {
            let mut seed: <Xoshiro256PlusPlus as SeedableRng>::Seed = Default::default();
            master_rng.fill(&mut seed);
            Xoshiro256PlusPlus::from_seed(seed)
        })
        .map(|mut r| node.roll(&mut r))
    {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        if result.value < result_min || result.value > result_max {
            log::error!(
                "{} is outside of [{}, {}] for {}",
                result.value,
                result_min,
                result_max,
                &node
            );
        }
        if result.trace.contains(DIVIDE_BY_ZERO) {
            divisions_by_zero += 1;
        }
        *results.entry(result.value).or_insert(0) += 1;
    }

    println!("{} in [{}, {}]", &node, result_min, result_max);
    if divisions_by_zero > 0 {
        println!("divided by zero in {} of {} rolls", divisions_by_zero, num);
    }
    for (value, count) in results {
        println!("{}\t{}", value, count);
    }
}
