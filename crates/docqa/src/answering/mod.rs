//! Concurrency-bounded question answering

pub mod orchestrator;

pub use orchestrator::AnsweringOrchestrator;
