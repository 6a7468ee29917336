//! # System Interaction Layer
//!
//! Boundaries between the engine and the outside world.
//!
//! ## Modules
//!
//! - **`executor`**: spawns external processes, either a script handed to a shell or a
//!   command fed through standard input, and captures their output.
//! - **`instructions`**: the [`InstructionProcessor`](instructions::InstructionProcessor)
//!   seam and the implementation that runs the external instruction engine.
//! - **`web`**: the [`WebProvider`](web::WebProvider) seam for web search and page
//!   retrieval.

pub mod executor;
pub mod instructions;
pub mod web;
