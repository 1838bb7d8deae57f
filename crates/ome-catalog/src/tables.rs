//! redb table definitions for the candidate catalog.
//!
//! Values are JSON-serialized resources. Namespace runtimes use the
//! composite key `{namespace}/{name}`; cluster-scoped objects use `{name}`.

use redb::TableDefinition;

/// Namespace-scoped serving runtimes keyed by `{namespace}/{name}`.
pub const NAMESPACE_RUNTIMES: TableDefinition<&str, &[u8]> =
    TableDefinition::new("namespace_runtimes");

/// Cluster-scoped serving runtimes keyed by `{name}`.
pub const CLUSTER_RUNTIMES: TableDefinition<&str, &[u8]> = TableDefinition::new("cluster_runtimes");

/// Accelerator classes keyed by `{name}`.
pub const ACCELERATOR_CLASSES: TableDefinition<&str, &[u8]> =
    TableDefinition::new("accelerator_classes");
