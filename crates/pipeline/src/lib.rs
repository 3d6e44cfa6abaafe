//! The four-stage article pipeline.
//!
//! ```text
//! topic ──Stage 1──▶ title proposals ──(human picks title + angle)
//!                                          │
//!        title, angle ──Stage 2──▶ outline ──Stage 3──▶ draft ──Stage 4──▶ markdown
//! ```
//!
//! Stages run strictly one after another; each backend call completes before
//! the next prompt is rendered. Any failure ends the run and discards the
//! outputs gathered so far.

pub mod run;

pub use run::{ArticleRun, StagePipeline, TitleProposals};
