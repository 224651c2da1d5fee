//! Least-privilege IAM policy generation.

pub mod catalog;
pub mod document;
pub mod generator;
pub mod merge;
pub mod scope;

pub use catalog::{ActionCatalog, ActionEntry};
pub use document::{Conditions, Effect, IamPolicyDocument, PolicyRequest, PolicyStatement};
pub use generator::LeastPrivilegePolicyGenerator;
pub use scope::PolicyScope;
