use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// How far a role's visibility reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLevel {
    Site,
    Region,
    Unrestricted,
}

/// # Documentation
/// - Capability level of a registry user
/// - `Technician` is bound to one site, `RegionalCoordinator` to one region (FIR)
/// - `National` and `Admin` see the whole registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Technician,
    RegionalCoordinator,
    National,
    Admin,
}

impl Role {
    pub fn scope_level(&self) -> ScopeLevel {
        match self {
            Role::Technician => ScopeLevel::Site,
            Role::RegionalCoordinator => ScopeLevel::Region,
            Role::National | Role::Admin => ScopeLevel::Unrestricted,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.scope_level() == ScopeLevel::Unrestricted
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Technician => "TECHNICIAN",
            Role::RegionalCoordinator => "REGIONAL_COORDINATOR",
            Role::National => "NATIONAL",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TECHNICIAN" => Ok(Role::Technician),
            "REGIONAL_COORDINATOR" => Ok(Role::RegionalCoordinator),
            "NATIONAL" => Ok(Role::National),
            "ADMIN" => Ok(Role::Admin),
            other => Err(RegistryError::ValidationError(format!("Unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a site resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Code,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentCategory {
    Radio,
    Navigation,
    Surveillance,
    Power,
}

impl EquipmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Radio => "RADIO",
            EquipmentCategory::Navigation => "NAVIGATION",
            EquipmentCategory::Surveillance => "SURVEILLANCE",
            EquipmentCategory::Power => "POWER",
        }
    }
}

impl FromStr for EquipmentCategory {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RADIO" => Ok(EquipmentCategory::Radio),
            "NAVIGATION" => Ok(EquipmentCategory::Navigation),
            "SURVEILLANCE" => Ok(EquipmentCategory::Surveillance),
            "POWER" => Ok(EquipmentCategory::Power),
            other => Err(RegistryError::ValidationError(format!(
                "Unknown equipment category '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    #[default]
    Ok,
    Degraded,
    OutOfService,
    Unknown,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Ok => "OK",
            EquipmentStatus::Degraded => "DEGRADED",
            EquipmentStatus::OutOfService => "OUT_OF_SERVICE",
            EquipmentStatus::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for EquipmentStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OK" => Ok(EquipmentStatus::Ok),
            "DEGRADED" => Ok(EquipmentStatus::Degraded),
            "OUT_OF_SERVICE" => Ok(EquipmentStatus::OutOfService),
            "UNKNOWN" => Ok(EquipmentStatus::Unknown),
            other => Err(RegistryError::ValidationError(format!(
                "Unknown equipment status '{other}'"
            ))),
        }
    }
}
