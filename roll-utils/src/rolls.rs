use dice_expr::{
    dice_roll::{EvaluationErrors, Evaluate},
    Evaluation, Node, RollError,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::{
    borrow::Borrow,
    result::Result,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::{spawn, JoinHandle},
    time::{interval, sleep, sleep_until, Instant},
};

use crate::config::RollConfig;
use rusty_pool::{Builder, ThreadPool};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RollFailure {
    #[error(transparent)]
    Roll(#[from] RollError),
    #[error("roll worker stopped before returning a result")]
    WorkerGone,
}

impl From<EvaluationErrors> for RollFailure {
    fn from(e: EvaluationErrors) -> Self {
        RollFailure::Roll(RollError::Evaluation(e))
    }
}

#[derive(Debug)]
enum RngProviderOps {
    GetRng(oneshot::Sender<Xoshiro256PlusPlus>),
    SetCryptoRng(ChaCha20Rng),
}

/// Owns the only master generator. Every request gets its own generator
/// seeded from the master, so evaluations never share state.
struct RngProvider {
    rng: ChaCha20Rng,
    receiver: mpsc::Receiver<RngProviderOps>,
}

impl RngProvider {
    pub async fn run(&mut self) {
        while let Some(op) = self.receiver.recv().await {
            match op {
                RngProviderOps::GetRng(channel) => {
                    let mut seed: <Xoshiro256PlusPlus as SeedableRng>::Seed = Default::default();
                    self.rng.fill(&mut seed);
                    if channel.send(Xoshiro256PlusPlus::from_seed(seed)).is_err() {
                        log::debug!("roll request went away before receiving its rng")
                    }
                }
                RngProviderOps::SetCryptoRng(rng) => {
                    log::debug!("reseeded rng provider");
                    self.rng = rng
                }
            }
        }
        log::info!("rng provider stopped")
    }
}

/// Resolves once `true` has been sent or the sender is gone.
pub async fn wait_stop(stop: &mut watch::Receiver<bool>) {
    loop {
        if *watch::Receiver::borrow(stop) {
            break;
        }
        if stop.changed().await.is_err() {
            break;
        }
    }
}

fn start_rng_provider(
    rng_reseed: Duration,
    mut stop: watch::Receiver<bool>,
) -> (JoinHandle<()>, mpsc::Sender<RngProviderOps>) {
    let (sender, receiver) = mpsc::channel(32);
    let rng_handle = spawn(async move {
        RngProvider {
            rng: ChaCha20Rng::from_entropy(),
            receiver,
        }
        .run()
        .await
    });
    let sender_clone = sender.clone();
    (
        spawn(async move {
            let stopped = tokio::select! {
                _ = sleep(rng_reseed) => false,
                _ = wait_stop(&mut stop) => true,
            };
            if !stopped {
                let mut interval = interval(rng_reseed);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            if sender_clone
                                .send(RngProviderOps::SetCryptoRng(ChaCha20Rng::from_entropy()))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                        _ = wait_stop(&mut stop) => { break; }
                    }
                }
            }
            drop(sender_clone);
            log::info!("stopped reseeding task");
            if let Err(e) = rng_handle.await {
                log::error!("rng provider failed: {}", e)
            }
        }),
        sender,
    )
}

/// Evaluates expressions on a worker pool, each with a fresh generator and a timeout.
pub struct RollExecutor {
    pool: ThreadPool,
    timeout: Duration,
    max_depth: usize,
    max_dice: u64,
    rng_gen: mpsc::Sender<RngProviderOps>,
}

impl RollExecutor {
    /// The returned handle finishes after `stop` fired and every executor is dropped.
    pub fn new(config: &RollConfig, stop: watch::Receiver<bool>) -> (JoinHandle<()>, RollExecutor) {
        let (handle, rng) = start_rng_provider(config.rng_reseed, stop);
        (
            handle,
            RollExecutor {
                pool: Builder::new()
                    .core_size(1)
                    .max_size(config.rng_workers)
                    .name("Roll Worker".to_string())
                    .build(),
                timeout: config.roll_timeout,
                max_depth: config.max_depth,
                max_dice: config.max_dice,
                rng_gen: rng,
            },
        )
    }

    async fn fresh_rng(&self) -> Result<Xoshiro256PlusPlus, RollFailure> {
        let (rng_send, rng_receive) = oneshot::channel();
        self.rng_gen
            .send(RngProviderOps::GetRng(rng_send))
            .await
            .map_err(|_| RollFailure::WorkerGone)?;
        rng_receive.await.map_err(|_| RollFailure::WorkerGone)
    }

    pub async fn roll<Expr>(&self, expr: Expr) -> Result<Evaluation, RollFailure>
    where
        Expr: Borrow<Node> + Sized + Send + 'static,
    {
        let (result_sender, result_receiver) = oneshot::channel();
        let (time_sender, time_receiver) = oneshot::channel();
        let timeout_signal = Arc::new(AtomicBool::new(false));
        let timeout_signal_clone = timeout_signal.clone();
        let mut rng = self.fresh_rng().await?;
        self.pool.execute(move || {
            if time_sender.send(Instant::now()).is_err() {
                return;
            }
            let result = expr.borrow().evaluate(
                &mut move || timeout_signal.load(Ordering::Relaxed),
                &mut rng,
            );
            if result_sender.send(result).is_err() {
                log::debug!("roll result was not awaited")
            }
        });
        let timeout = self.timeout;
        spawn(async move {
            if let Ok(start) = time_receiver.await {
                sleep_until(start + timeout).await;
                timeout_signal_clone.store(true, Ordering::Relaxed);
            }
        });
        match result_receiver.await {
            Ok(result) => Ok(result?),
            Err(_) => {
                log::error!("roll worker dropped its result channel");
                Err(RollFailure::WorkerGone)
            }
        }
    }

    /// Parses on the calling task, so malformed input never occupies a worker.
    pub async fn roll_text(&self, raw: &str) -> Result<Evaluation, RollFailure> {
        let node = dice_expr::parse_with_limits(raw, self.max_depth, self.max_dice)?;
        log::info!("rolling {}", &node);
        self.roll(node).await
    }
}
