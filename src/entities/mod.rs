//! Entity type definitions for the risk register
//!
//! Four-level register tree: Goal -> PotentialRisk -> RiskCause ->
//! ControlMeasure, plus the parallel monitoring subtree: MonitoringSession ->
//! RiskExposure. Every entity carries its owning `(userId, period)` pair and
//! denormalized ancestor IDs so cascade queries stay single-filter.

pub mod control_measure;
pub mod goal;
pub mod monitoring_session;
pub mod potential_risk;
pub mod risk_cause;
pub mod risk_exposure;

pub use control_measure::{ControlMeasure, ControlType};
pub use goal::Goal;
pub use monitoring_session::{MonitoringSession, SessionStatus};
pub use potential_risk::{PotentialRisk, RiskCategory};
pub use risk_cause::{RiskCause, RiskSource};
pub use risk_exposure::{MonitoredControl, RiskExposure};
