use crate::envelope::{self, Envelope};
use crate::error::EnvelopeError;
use crate::format::ExecutionFormat;
use crate::request::RequestDescriptor;

/// Clamp a requested run count to at least one.
pub fn normalize_runs(runs: i64) -> usize {
    usize::try_from(runs).ok().filter(|&r| r > 0).unwrap_or(1)
}

/// Encode `runs` back-to-back calls for one warm container.
///
/// Hot formats get one freshly encoded frame per call, concatenated on a
/// single stdin stream; all calls share the descriptor's call id and
/// deadline. The default format carries its metadata in environment
/// variables, so it is encoded once whatever `runs` says. The first
/// encoding error aborts the whole batch.
pub fn repeat(
    request: &RequestDescriptor,
    format: ExecutionFormat,
    runs: i64,
) -> Result<Envelope, EnvelopeError> {
    let runs = normalize_runs(runs);

    if !format.is_hot() {
        if runs > 1 {
            tracing::debug!(runs, "Default format is single-shot; encoding one call");
        }
        return envelope::encode(request, format);
    }

    let mut batch = envelope::encode(request, format)?;
    let extra = batch
        .stdin
        .len()
        .checked_mul(runs - 1)
        .ok_or(EnvelopeError::BatchTooLarge { runs })?;
    batch
        .stdin
        .try_reserve(extra)
        .map_err(|_| EnvelopeError::BatchTooLarge { runs })?;
    for _ in 1..runs {
        let next = envelope::encode(request, format)?;
        batch.stdin.extend_from_slice(&next.stdin);
    }
    tracing::debug!(runs, format = %format, bytes = batch.stdin.len(), "Encoded hot batch");
    Ok(batch)
}
