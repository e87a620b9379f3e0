//! Error type for the decompressor pipeline.
//!
//! Mirrors the stage-local failure taxonomy: each stage surfaces the first
//! failure synchronously and downstream stages are abandoned (no recovery
//! within a chunk). Modeled with `thiserror` rather than a bare
//! hand-rolled enum, following the convention used by the other raw-codec
//! crate in this workspace's lineage for its core decompression error type.

use thiserror::Error;

/// Failure modes of the five-stage pipeline.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    /// Tag type 3 (5-byte copy) or a literal length code above 61 was seen.
    #[error("malformed element in compressed stream")]
    MalformedElement,

    /// A copy referenced an offset at or beyond the number of bytes emitted
    /// so far in the current chunk.
    #[error("copy offset underflows the decompression window")]
    UnderflowInWindow,

    /// An output would exceed the chunk's declared uncompressed length.
    /// Not enforced by the pipeline itself; raised only by callers that
    /// track the declared length (see [`crate::pipeline::ChunkDecoder`]).
    #[error("decompressed output exceeds the declared chunk length")]
    BoundsViolation,

    /// Stream-count bookkeeping between stages disagreed with the invariant
    /// that every stage eventually reaches `last` in lockstep. Also raised
    /// if an internal invariant the stages rely on (e.g. the `cmd_gen_1`
    /// offset-doubling bound) is ever violated, as a safety net in place of
    /// a panic.
    #[error("pipeline stages desynchronized")]
    PipelineDesync,
}
