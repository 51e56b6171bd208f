//! Digest chunking and ordered delivery.

use tracing::info;

use super::TextSink;
use crate::core::models::Digest;
use crate::errors::DigestError;
use crate::utils::chunk::split_for_limit;

/// Character budget per published message. Kept below Telegram's hard
/// 4096-character limit to leave headroom for markdown cleanup.
pub const CHUNK_BUDGET: usize = 3900;

/// Header line prepended to the overall section.
const OVERALL_HEADER: &str = "*Weekly digest*";

/// Assemble the ordered chunk sequence for a digest: the overall section
/// first, then one block per channel section, each block split under
/// `max_chars`.
#[must_use]
pub fn digest_chunks(digest: &Digest, max_chars: usize) -> Vec<String> {
    let mut chunks = split_for_limit(
        &format!("{OVERALL_HEADER}\n\n{}", digest.overall),
        max_chars,
    );
    for section in &digest.sections {
        let block = format!("*{}*\n{}", section.label, section.text);
        chunks.extend(split_for_limit(&block, max_chars));
    }
    chunks
}

/// Send every chunk in order to the report channel.
///
/// # Errors
///
/// Stops at the first failed send; delivery failures are fatal for the run.
pub async fn publish_digest<P>(sink: &P, chat_id: &str, digest: &Digest) -> Result<(), DigestError>
where
    P: TextSink + Sync,
{
    let chunks = digest_chunks(digest, CHUNK_BUDGET);
    info!(chunks = chunks.len(), "publishing digest");
    for chunk in &chunks {
        sink.send(chat_id, chunk).await?;
    }
    Ok(())
}
