//! zoneplan — availability-zone placement for job instances.
//!
//! Given a job's desired instance count, the ordered zones it may run in,
//! and the instances already running, decides which instances to keep,
//! which to retire, and how many new instances to create (and where).
//! Pure computation: no I/O, no shared state, deterministic for fixed input.
//!
//! # Components
//!
//! - **`balancer`** — per-zone target counts (remainder and pinning pressure)
//! - **`matcher`** — keep/retire split of one zone's existing instances
//! - **`indexer`** — stable indices for new instances, legacy renumbering
//! - **`picker`** — the [`place`] entry point wiring the three stages
//! - **`config`** / **`convert`** — request files for dry-run planning
//!
//! ```text
//! place(zones, desired, existing)
//!   ├── balancer::balance      → target per zone
//!   ├── matcher::match_zone    → (kept, retired, shortfall) per zone
//!   └── indexer                → indices for new instances
//! ```

pub mod balancer;
pub mod config;
pub mod convert;
pub mod error;
pub mod indexer;
pub mod matcher;
pub mod picker;
pub mod types;

pub use config::PlacementRequest;
pub use convert::{PlacementInputs, request_to_inputs};
pub use error::{PlanError, PlanResult};
pub use picker::place;
pub use types::{
    AvailabilityZone, DesiredInstance, ExistingInstance, InstanceState, NewInstance,
    PersistentDisk, PlacementResult, PlacementWarning, ReusedInstance, ZoneRef,
};
