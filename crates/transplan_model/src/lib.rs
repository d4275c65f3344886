//! Typed model of a transportation problem: the instance being edited,
//! the submission rules, and the wire forms spoken with the solver.

pub mod error;
pub mod grid;
pub mod instance;
pub mod route;
pub mod validate;
pub mod wire;

pub use error::WireError;
pub use grid::{PlanCell, PlanGrid};
pub use instance::{Instance, Restriction, RestrictionOp};
pub use route::Route;
pub use validate::{Violation, validate};
pub use wire::{
    CapacityEntry, Snapshot, SolutionResponse, SolutionRoot, SolveMethod, SolveRequest,
    build_request, decode_capacities, decode_restrictions, encode_capacities, encode_restrictions,
};
