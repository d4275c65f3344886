use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use transplan_model::{SolutionResponse, SolveRequest};

use crate::state::{Event, PlanKind, RequestToken};

/// Failure surfaced by a gateway. The display text feeds the session's
/// failure notices, so it reads as a sentence fragment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The solver was reached and said no; `reason` is its own text.
    #[error("failed to solve: {reason}")]
    Rejected { reason: String },

    /// The solver was never reached.
    #[error("transport failure: {message}")]
    Transport { message: String },
}

/// Boundary to whatever actually produces plans. Implementations block;
/// the worker loop keeps them off the driving thread.
pub trait SolverGateway {
    fn solve(
        &self,
        kind: PlanKind,
        request: &SolveRequest,
    ) -> Result<SolutionResponse, GatewayError>;

    /// Looks up an already stored plan of `kind` for a persisted
    /// instance. `Ok(None)` means the instance was never solved that
    /// way.
    fn fetch_stored(
        &self,
        kind: PlanKind,
        instance_id: i64,
    ) -> Result<Option<SolutionResponse>, GatewayError>;
}

/// Commands handed to the gateway worker.
#[derive(Debug, Clone)]
pub enum GatewayCmd {
    Solve {
        token: RequestToken,
        kind: PlanKind,
        request: SolveRequest,
    },
    FetchStored { kind: PlanKind, instance_id: i64 },
}

/// What the worker sends back when a command completes.
#[derive(Debug)]
pub enum GatewayMsg {
    Solved {
        token: RequestToken,
        kind: PlanKind,
        result: Result<SolutionResponse, GatewayError>,
    },
    Stored {
        kind: PlanKind,
        result: Result<Option<SolutionResponse>, GatewayError>,
    },
}

impl From<GatewayMsg> for Event {
    fn from(msg: GatewayMsg) -> Self {
        match msg {
            GatewayMsg::Solved { token, result, .. } => Event::SolveFinished { token, result },
            GatewayMsg::Stored { kind, result } => Event::StoredPlanFetched { kind, result },
        }
    }
}

/// Drains commands until the command channel closes.
pub fn worker_loop<G: SolverGateway>(
    gateway: G,
    rx: Receiver<GatewayCmd>,
    tx: Sender<GatewayMsg>,
) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            GatewayCmd::Solve {
                token,
                kind,
                request,
            } => {
                let result = gateway.solve(kind, &request);
                let _ = tx.send(GatewayMsg::Solved {
                    token,
                    kind,
                    result,
                });
            }
            GatewayCmd::FetchStored { kind, instance_id } => {
                let result = gateway.fetch_stored(kind, instance_id);
                let _ = tx.send(GatewayMsg::Stored { kind, result });
            }
        }
    }
}
