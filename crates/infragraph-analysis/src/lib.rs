//! Infrastructure dependency graph analysis.
//!
//! - **Graph**: sealed, arena-backed `ResourceGraph` of scanned resources
//! - **Classifier**: registry mapping resource-type pairs to relation and boundary class
//! - **Builder**: reference resolution, out-of-scope placeholders, optional live enrichment
//! - **Impact**: reverse bounded BFS producing blast radius reports
//! - **Policy**: forward boundary-gated traversal producing least-privilege IAM policies
//!
//! Every analysis is a pure read over a sealed graph and can run from many
//! threads at once without locking.

pub mod builder;
pub mod classifier;
pub mod enrich;
pub mod graph;
pub mod impact;
pub mod model;
pub mod policy;

pub use builder::{BuildWarning, BuiltGraph, GraphBuilder};
pub use classifier::{Classification, RelationClassifier};
pub use enrich::{ResourceEnricher, ResourceLookup};
pub use graph::{GraphStats, ResourceGraph};
pub use impact::{AffectedResource, BlastRadiusAnalyzer, ImpactReport, Severity};
pub use model::{BoundaryClass, DependencyEdge, EdgeSource, RawResource, RelationType, ResourceNode};
pub use policy::{IamPolicyDocument, LeastPrivilegePolicyGenerator, PolicyRequest, PolicyScope};
