//! Research office registry: research projects, MoU/MoA collaborations, academic centres
//! and researchers, with dashboard rollups, report tables and a role-gated HTTP API.

pub mod config;
pub mod error;
pub mod registry;
pub mod telemetry;
