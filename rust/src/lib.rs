//! Critical Path Method scheduling engine.
//!
//! Given tasks with durations and typed, lagged dependencies, the engine
//! computes early and late dates, total and free float, the critical path,
//! summary roll-ups and heuristic compression strategies.
//!
//! The pipeline runs in a fixed order and every stage is a pure function of
//! its inputs:
//!
//! 1. [`build_graph`] validates the snapshot and builds the dependency digraph
//! 2. [`topological_order`] orders the non-summary tasks
//! 3. [`forward_pass`] and [`backward_pass`] compute early and late dates
//! 4. [`classify`] derives float and the critical path
//! 5. [`rollup`] derives summary task timing
//!
//! [`schedule`] runs all of them; [`advise`] proposes edits on top.

pub mod advisor;
pub mod backward_pass;
pub mod calendar;
mod config;
pub mod engine;
mod errors;
pub mod float;
pub mod forward_pass;
pub mod graph;
mod interner;
pub mod logging;
mod models;
pub mod outline;
pub mod rollup;
pub mod topo;

#[cfg(feature = "python")]
mod python;

pub use advisor::{
    advise, apply_strategy, AdvisorReport, ProposedEdit, RiskTier, Strategy, StrategyPolicy,
};
pub use backward_pass::{backward_pass, BackwardPassResult, LateTimes};
pub use config::{AdvisorConfig, EngineConfig, DEFAULT_EPSILON};
pub use engine::{schedule, schedule_graph, schedule_with_end};
pub use errors::{
    CpmError, CycleError, InfeasibleScheduleError, ScheduleWarning, SummaryConstraintWarning,
    ValidationError,
};
pub use float::{classify, Classification, FloatInfo};
pub use forward_pass::{forward_pass, EarlyTimes, ForwardPassResult};
pub use graph::{build_graph, Edge, ProjectGraph};
pub use interner::{NodeId, OutlineInterner};
pub use models::{Dependency, DependencyType, ScheduleResult, Task, TaskSchedule};
pub use outline::OutlineHierarchy;
pub use rollup::{rollup, SummaryRollup, SummaryTiming};
pub use topo::{dependency_levels, order, topological_order};
