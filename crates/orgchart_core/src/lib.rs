//! Core domain logic for the organization chart manager.
//! This crate owns hierarchy invariants; UI hosts only render and forward input.

pub mod backend;
pub mod chart;
pub mod config;
pub mod db;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod session;

pub use backend::{BackendError, BackendResult, HttpOrgBackend, OrgBackend, SqliteOrgBackend};
pub use chart::{ChartAdapter, ChartRenderer, NodeSelected, OutlineRenderer};
pub use config::{load_config, ApiConfig, ConfigError, LogConfig, OrgChartConfig, Profile};
pub use hierarchy::integrity::{check_integrity, IntegrityError};
pub use hierarchy::query::{ancestors_of, children_of, count_roots, descendants_of, is_root};
pub use hierarchy::transform::{
    build_nodes, ImageResolver, ParentPolicy, TransformError, TransformOptions,
};
pub use hierarchy::validate::{candidate_parents, validate_reparent, ValidationError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::node::{NodeId, OrgNode};
pub use model::record::{MemberRecord, RootRecord, SecretaryRecord, UpdateOutcome};
pub use model::snapshot::Hierarchy;
pub use session::{
    EditDraft, EditState, FetchError, FetchOutcome, FetchPayload, FetchTicket, LoadState,
    OrgChartSession, PersistError, PersistTicket, SessionError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
