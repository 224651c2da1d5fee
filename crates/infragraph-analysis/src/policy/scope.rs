//! Permission scope requested for a generated policy.

use std::str::FromStr;

use infragraph_core::errors::AnalysisError;
use serde::{Deserialize, Serialize};

/// Which action sets a policy grants on each discovered resource.
///
/// `RUNTIME_*` scopes cover what a running workload does with data.
/// `INFRA_*` scopes cover the management plane (describe, create, update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyScope {
    RuntimeRead,
    RuntimeWrite,
    RuntimeFull,
    InfraRead,
    InfraWrite,
    InfraFull,
}

impl PolicyScope {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RuntimeRead => "RUNTIME_READ",
            Self::RuntimeWrite => "RUNTIME_WRITE",
            Self::RuntimeFull => "RUNTIME_FULL",
            Self::InfraRead => "INFRA_READ",
            Self::InfraWrite => "INFRA_WRITE",
            Self::InfraFull => "INFRA_FULL",
        }
    }

    pub fn all() -> &'static [PolicyScope] {
        &[
            Self::RuntimeRead,
            Self::RuntimeWrite,
            Self::RuntimeFull,
            Self::InfraRead,
            Self::InfraWrite,
            Self::InfraFull,
        ]
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::RuntimeRead | Self::RuntimeWrite | Self::RuntimeFull)
    }

    /// Whether the scope grants read actions of its plane.
    pub fn includes_read(&self) -> bool {
        !matches!(self, Self::RuntimeWrite | Self::InfraWrite)
    }

    /// Whether the scope grants write actions of its plane.
    pub fn includes_write(&self) -> bool {
        !matches!(self, Self::RuntimeRead | Self::InfraRead)
    }
}

impl std::fmt::Display for PolicyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyScope {
    type Err = AnalysisError;

    /// Accepts `RUNTIME_READ`, `runtime_read`, and `runtime-read`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|scope| scope.name() == normalized)
            .ok_or_else(|| AnalysisError::validation("scope", format!("unknown scope {s:?}")))
    }
}
