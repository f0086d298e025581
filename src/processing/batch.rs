//! # Batch Optimization
//!
//! Runs independent optimizations concurrently on Tokio's blocking pool.
//! Calls share nothing: each task builds its own optimizer, so results are
//! identical to running [`ThumbnailOptimizer::run`] sequentially. Output order
//! matches input order.
//!
//! Must be awaited from within a Tokio runtime.

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::config::OptimizerConfig;
use crate::core::ImagePayload;
use crate::error::{ThumbnailError, ThumbnailResult};
use crate::processing::optimizer::{Outcome, ThumbnailOptimizer};

/// Optimize every payload with the default configuration.
///
/// Same best-effort contract as [`crate::optimize`], element-wise.
pub async fn optimize_batch(payloads: Vec<ImagePayload>) -> Vec<ImagePayload> {
    run_batch(OptimizerConfig::default(), payloads)
        .await
        .into_iter()
        .map(Outcome::into_payload)
        .collect()
}

/// Optimize every payload with `config`, reporting each outcome.
pub async fn optimize_batch_with(
    config: OptimizerConfig,
    payloads: Vec<ImagePayload>,
) -> ThumbnailResult<Vec<Outcome>> {
    config.validate()?;
    Ok(run_batch(config, payloads).await)
}

async fn run_batch(config: OptimizerConfig, payloads: Vec<ImagePayload>) -> Vec<Outcome> {
    debug!(count = payloads.len(), "starting thumbnail batch");

    // A copy of each input survives the task so a panicked worker still
    // yields its original payload.
    let (originals, handles): (Vec<_>, Vec<_>) = payloads
        .into_iter()
        .map(|payload| {
            let config = config.clone();
            let original = payload.clone();
            let handle = tokio::task::spawn_blocking(move || {
                match ThumbnailOptimizer::new(config) {
                    Ok(mut optimizer) => optimizer.run(payload),
                    Err(reason) => Outcome::Fallback {
                        original: payload,
                        reason,
                    },
                }
            });
            (original, handle)
        })
        .unzip();

    let results = join_all(handles).await;

    originals
        .into_iter()
        .zip(results)
        .enumerate()
        .map(|(index, (original, result))| match result {
            Ok(outcome) => outcome,
            Err(join_error) => {
                warn!(index, error = %join_error, "thumbnail worker did not finish");
                Outcome::Fallback {
                    original,
                    reason: ThumbnailError::encoder_unavailable("worker", join_error.to_string())
                        .with_metadata("index", index.to_string()),
                }
            }
        })
        .collect()
}
