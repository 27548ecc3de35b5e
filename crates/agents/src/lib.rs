//! Model client construction and agent run coordination.
//!
//! The reasoning/tool-call loop itself lives in an external engine service;
//! this crate composes the task, hands it the browser session and a routed
//! model client, and collects the resulting [`Trajectory`].

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod factory;
pub mod provider;
pub mod trajectory;

pub use {
    coordinator::{AgentCoordinator, RunSpec},
    engine::{AutomationEngine, EngineReport, EngineTask, HttpEngine},
    error::AgentRunError,
    factory::{ModelClient, ModelClientFactory},
    provider::Provider,
    trajectory::Trajectory,
};
