use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use transplan_model::{
    Instance, PlanGrid, Restriction, Route, SolutionResponse, SolveMethod, SolveRequest,
    build_request, validate,
};

use crate::gateway::GatewayError;

/// How long a notice stays up before its timer clears it.
pub const NOTICE_DWELL: Duration = Duration::from_millis(2700);

/// Whether the session is replaying a stored snapshot or accepting
/// user edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Editing,
}

/// Which of the two plan flavors a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Basic,
    Optimal,
}

impl PlanKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanKind::Basic => "basic",
            PlanKind::Optimal => "optimal",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(PlanKind::Basic),
            "optimal" => Ok(PlanKind::Optimal),
            other => Err(format!("unknown plan kind '{other}', expected basic or optimal")),
        }
    }
}

/// Identifies one solve submission. A response is only applied while
/// its token is still the pending one; anything else is stale and gets
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Status the user did not ask for, like a finished load.
    Info,
    /// A submission rule failed; the message is the rule text verbatim.
    Validation,
    /// The solver or the path to it failed.
    Failure,
}

/// Transient on-screen message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// A plan the session currently holds for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedPlan {
    pub kind: PlanKind,
    pub response: SolutionResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    token: RequestToken,
    kind: PlanKind,
}

/// Everything that can happen to a session.
///
/// Drivers feed these in; the session answers with [`Effect`]s and never
/// touches a clock, a channel or the network itself.
#[derive(Debug)]
pub enum Event {
    /// A stored table is about to be replayed into the session.
    LoadStarted,
    /// The decoded snapshot content, with the stored name for the
    /// confirmation notice.
    SnapshotApplied {
        instance: Instance,
        name: Option<String>,
    },
    /// Loading is over, edits flow again.
    LoadFinished,
    /// The dimension controls changed.
    Resized { rows: usize, cols: usize },
    CostEdited { route: Route, value: Option<f64> },
    SupplierEdited { index: usize, value: f64 },
    ConsumerEdited { index: usize, value: f64 },
    RestrictionSet {
        route: Route,
        restriction: Restriction,
    },
    RestrictionCleared { route: Route },
    CapacitySet { route: Route, bound: f64 },
    CapacityCleared { route: Route },
    MethodChosen(SolveMethod),
    /// The user hit solve.
    SubmitRequested {
        kind: PlanKind,
        user_id: Option<String>,
    },
    /// The gateway worker came back for a submission. The pending
    /// record, not the message, says which kind was asked for.
    SolveFinished {
        token: RequestToken,
        result: Result<SolutionResponse, GatewayError>,
    },
    /// A lookup of an already stored plan finished. `Ok(None)` means the
    /// instance was never solved that way, which is not a failure.
    StoredPlanFetched {
        kind: PlanKind,
        result: Result<Option<SolutionResponse>, GatewayError>,
    },
    /// The dwell timer armed for notice `serial` fired.
    NoticeExpired { serial: u64 },
    /// The surface driving this session went away.
    Closed,
}

/// Work the driver must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Hand the request to the gateway worker.
    Dispatch {
        token: RequestToken,
        kind: PlanKind,
        request: SolveRequest,
    },
    /// Schedule [`Event::NoticeExpired`] with this serial after
    /// [`NOTICE_DWELL`].
    ArmNoticeTimer { serial: u64 },
}

/// State of one editing session over a single instance.
///
/// `rows` and `cols` mirror the dimension controls on screen. While
/// editing they always match the instance; while a snapshot loads they
/// may run ahead of it, and the gap is reconciled when editing resumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    instance: Instance,
    rows: usize,
    cols: usize,
    phase: Phase,
    method: SolveMethod,
    pending: Option<Pending>,
    next_token: u64,
    notice: Option<Notice>,
    notice_serial: u64,
    solution: Option<SolvedPlan>,
    closed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_instance(Instance::default())
    }

    pub fn with_instance(instance: Instance) -> Self {
        let rows = instance.rows();
        let cols = instance.cols();
        Self {
            instance,
            rows,
            cols,
            phase: Phase::Editing,
            method: SolveMethod::Northwest,
            pending: None,
            next_token: 0,
            notice: None,
            notice_serial: 0,
            solution: None,
            closed: false,
        }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn method(&self) -> SolveMethod {
        self.method
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn plan(&self) -> Option<&SolvedPlan> {
        self.solution.as_ref()
    }

    pub fn is_solving(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Decodes the held plan against the current dimensions.
    pub fn solution_grid(&self) -> Option<PlanGrid> {
        self.solution
            .as_ref()
            .map(|plan| PlanGrid::decode(&plan.response.roots, self.rows, self.cols))
    }

    /// Applies one event. Closed sessions swallow everything.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        if self.closed {
            debug!("session closed, dropping event: {event:?}");
            return Vec::new();
        }
        match event {
            Event::LoadStarted => {
                self.phase = Phase::Loading;
                self.solution = None;
                self.pending = None;
                Vec::new()
            }
            Event::SnapshotApplied { instance, name } => {
                if self.phase != Phase::Loading {
                    debug!("snapshot applied outside loading, dropping");
                    return Vec::new();
                }
                self.rows = instance.rows();
                self.cols = instance.cols();
                self.instance = instance;
                let message = match name {
                    Some(name) => format!("Loaded table: {name}"),
                    None => "Loaded table".to_string(),
                };
                vec![self.raise(NoticeKind::Info, message)]
            }
            Event::LoadFinished => {
                if self.phase != Phase::Loading {
                    debug!("load finished while editing, dropping");
                    return Vec::new();
                }
                self.phase = Phase::Editing;
                // dimension changes that raced the load land now
                if self.rows != self.instance.rows() || self.cols != self.instance.cols() {
                    self.instance.resize(self.rows, self.cols);
                }
                Vec::new()
            }
            Event::Resized { rows, cols } => {
                self.rows = rows;
                self.cols = cols;
                if self.phase == Phase::Editing {
                    self.instance.resize(rows, cols);
                }
                Vec::new()
            }
            Event::CostEdited { route, value } => {
                if self.edit_in_bounds(route) {
                    self.instance.set_cost(route, value);
                }
                Vec::new()
            }
            Event::SupplierEdited { index, value } => {
                if self.phase == Phase::Editing && index < self.rows {
                    self.instance.set_supplier(index, value);
                } else {
                    debug!("supplier edit at {index} dropped");
                }
                Vec::new()
            }
            Event::ConsumerEdited { index, value } => {
                if self.phase == Phase::Editing && index < self.cols {
                    self.instance.set_consumer(index, value);
                } else {
                    debug!("consumer edit at {index} dropped");
                }
                Vec::new()
            }
            Event::RestrictionSet { route, restriction } => {
                if self.edit_in_bounds(route) {
                    self.instance.set_restriction(route, restriction);
                }
                Vec::new()
            }
            Event::RestrictionCleared { route } => {
                if self.phase == Phase::Editing {
                    self.instance.clear_restriction(route);
                }
                Vec::new()
            }
            Event::CapacitySet { route, bound } => {
                if self.edit_in_bounds(route) {
                    self.instance.set_capacity(route, bound);
                }
                Vec::new()
            }
            Event::CapacityCleared { route } => {
                if self.phase == Phase::Editing {
                    self.instance.clear_capacity(route);
                }
                Vec::new()
            }
            Event::MethodChosen(method) => {
                self.method = method;
                Vec::new()
            }
            Event::SubmitRequested { kind, user_id } => self.submit(kind, user_id),
            Event::SolveFinished { token, result } => self.finish_solve(token, result),
            Event::StoredPlanFetched { kind, result } => match result {
                Ok(Some(response)) => {
                    self.solution = Some(SolvedPlan { kind, response });
                    Vec::new()
                }
                Ok(None) => vec![self.raise(NoticeKind::Info, format!("No {kind} plan found"))],
                Err(error) => vec![self.raise(
                    NoticeKind::Failure,
                    format!("Error loading {kind} plan: {error}"),
                )],
            },
            Event::NoticeExpired { serial } => {
                if serial == self.notice_serial {
                    self.notice = None;
                } else {
                    debug!("stale notice timer {serial}, current {}", self.notice_serial);
                }
                Vec::new()
            }
            Event::Closed => {
                self.closed = true;
                self.notice = None;
                self.pending = None;
                Vec::new()
            }
        }
    }

    fn edit_in_bounds(&self, route: Route) -> bool {
        if self.phase != Phase::Editing {
            debug!("edit at {route} during load dropped");
            return false;
        }
        if route.row >= self.rows || route.column >= self.cols {
            debug!(
                "edit at {route} outside {}x{} table dropped",
                self.rows, self.cols
            );
            return false;
        }
        true
    }

    fn submit(&mut self, kind: PlanKind, user_id: Option<String>) -> Vec<Effect> {
        if self.phase != Phase::Editing {
            debug!("submit during load, dropping");
            return Vec::new();
        }
        if self.pending.is_some() {
            debug!("a solve is already in flight, dropping submit");
            return Vec::new();
        }
        let report = validate(&self.instance);
        if let Some(first) = report.first() {
            return vec![self.raise(NoticeKind::Validation, first.to_string())];
        }
        // the seeding method only matters for basic plans
        let method = match kind {
            PlanKind::Basic => Some(self.method),
            PlanKind::Optimal => None,
        };
        let request = build_request(&self.instance, method, user_id);
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(Pending { token, kind });
        vec![Effect::Dispatch {
            token,
            kind,
            request,
        }]
    }

    fn finish_solve(
        &mut self,
        token: RequestToken,
        result: Result<SolutionResponse, GatewayError>,
    ) -> Vec<Effect> {
        let Some(pending) = self.pending else {
            debug!("no solve in flight, dropping response");
            return Vec::new();
        };
        if pending.token != token {
            debug!("stale solve response {token:?}, pending {:?}", pending.token);
            return Vec::new();
        }
        self.pending = None;
        match result {
            Ok(response) => {
                self.solution = Some(SolvedPlan {
                    kind: pending.kind,
                    response,
                });
                Vec::new()
            }
            Err(error) => vec![self.raise(
                NoticeKind::Failure,
                format!("Error solving {} plan: {error}", pending.kind),
            )],
        }
    }

    /// Replaces the visible notice and bumps the serial, so timers armed
    /// for earlier notices no longer clear anything.
    fn raise(&mut self, kind: NoticeKind, message: String) -> Effect {
        self.notice_serial += 1;
        self.notice = Some(Notice { kind, message });
        Effect::ArmNoticeTimer {
            serial: self.notice_serial,
        }
    }
}
