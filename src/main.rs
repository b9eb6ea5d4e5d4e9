use roll_utils::{RollConfig, RollExecutor};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

/// Reads one expression per line from stdin and prints the rolls and the result.
///
/// The config file is taken from the first argument or `ROLL_CONFIG`;
/// without either the defaults are used.
#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    pretty_env_logger::init();
    log::info!("logger created");
    let config = match std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("ROLL_CONFIG"))
    {
        Some(path) => RollConfig::load(path),
        None => {
            log::info!("no config file given, using defaults");
            RollConfig::default()
        }
    };

    let (stop_sender, stop_receiver) = tokio::sync::watch::channel(false);
    let (handle, roller) = RollExecutor::new(&config, stop_receiver);

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("unable to read input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match roller.roll_text(&line).await {
            Ok(result) => println!("Rolls: {}\nResult: {}", result.trace, result.value),
            Err(e) => println!("Error: {}", e),
        }
    }

    if stop_sender.send(true).is_err() {
        log::warn!("roll executor already stopped");
    }
    drop(roller);
    if let Err(e) = handle.await {
        log::error!("roll executor failed: {}", e)
    }
    log::info!("stopped")
}
