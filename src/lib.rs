//! Coursemate - question answering over course material
//!
//! A language model answers questions with help from course lookup tools.
//! The orchestrator bounds the number of model/tool rounds, the coordinator
//! wires in session history and returns the sources each answer drew on.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod id;
pub mod llm;
pub mod orchestrator;
pub mod search;
pub mod session;
pub mod tools;

pub use coordinator::{QueryAnswer, QueryCoordinator};
pub use error::{CoursemateError, Result};
