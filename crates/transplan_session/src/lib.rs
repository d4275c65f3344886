//! Editing-session state machine for a transportation instance plus the
//! asynchronous boundary to the solver.
//!
//! The [`state::Session`] is driven entirely by [`state::Event`]s and
//! answers with [`state::Effect`]s; nothing in here owns a clock or a
//! socket. [`gateway::worker_loop`] runs a [`gateway::SolverGateway`] on
//! its own thread and reports back over channels.

pub mod gateway;
pub mod state;

pub use gateway::{GatewayCmd, GatewayError, GatewayMsg, SolverGateway, worker_loop};
pub use state::{
    Effect, Event, NOTICE_DWELL, Notice, NoticeKind, Phase, PlanKind, RequestToken, Session,
    SolvedPlan,
};
