//! Cycle-accurate reference model of a five-stage streaming raw-Snappy
//! decompressor pipeline.
//!
//! The pipeline is built as a chain of `Iterator` adapters, one per
//! hardware stage: [`pipeline::DataSource`], [`pipeline::PreDecoder`],
//! [`pipeline::ElementDecoder`], [`pipeline::CmdGen1`], [`pipeline::
//! CmdGen2`], and [`pipeline::Datapath`]. [`pipeline::ChunkDecoder`] wires
//! all six together over a sequence of raw compressed chunks.

pub mod cli;
pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{decompress_chunk, decompress_chunks, ChunkDecoder};
