//! Risk scoring engine
//!
//! Pure functions mapping a (likelihood, impact) pair to a numeric score and
//! a risk-level category, the control-type guidance lookup, and the
//! target/realization performance-percentage derivation used by monitoring.
//! No I/O, no dependencies on the rest of the crate.

use serde::{Deserialize, Serialize};

/// Likelihood that a risk cause materializes, on a five-level scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Likelihood {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Impact if a risk cause materializes, on a five-level scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Derived risk level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Likelihood {
    /// Ordinal 1-5 (VeryLow=1 .. VeryHigh=5)
    pub fn ordinal(&self) -> u8 {
        match self {
            Likelihood::VeryLow => 1,
            Likelihood::Low => 2,
            Likelihood::Medium => 3,
            Likelihood::High => 4,
            Likelihood::VeryHigh => 5,
        }
    }

    pub fn all() -> &'static [Likelihood] {
        &[
            Likelihood::VeryLow,
            Likelihood::Low,
            Likelihood::Medium,
            Likelihood::High,
            Likelihood::VeryHigh,
        ]
    }
}

impl Impact {
    /// Ordinal 1-5 (VeryLow=1 .. VeryHigh=5)
    pub fn ordinal(&self) -> u8 {
        match self {
            Impact::VeryLow => 1,
            Impact::Low => 2,
            Impact::Medium => 3,
            Impact::High => 4,
            Impact::VeryHigh => 5,
        }
    }

    pub fn all() -> &'static [Impact] {
        &[
            Impact::VeryLow,
            Impact::Low,
            Impact::Medium,
            Impact::High,
            Impact::VeryHigh,
        ]
    }
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", five_level_str(self.ordinal()))
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", five_level_str(self.ordinal()))
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::VeryLow => "very_low",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        };
        write!(f, "{}", s)
    }
}

fn five_level_str(ordinal: u8) -> &'static str {
    match ordinal {
        1 => "very_low",
        2 => "low",
        3 => "medium",
        4 => "high",
        _ => "very_high",
    }
}

impl std::str::FromStr for Likelihood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "very_low" | "verylow" | "1" => Ok(Likelihood::VeryLow),
            "low" | "2" => Ok(Likelihood::Low),
            "medium" | "3" => Ok(Likelihood::Medium),
            "high" | "4" => Ok(Likelihood::High),
            "very_high" | "veryhigh" | "5" => Ok(Likelihood::VeryHigh),
            _ => Err(format!("Unknown likelihood: {}", s)),
        }
    }
}

impl std::str::FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "very_low" | "verylow" | "1" => Ok(Impact::VeryLow),
            "low" | "2" => Ok(Impact::Low),
            "medium" | "3" => Ok(Impact::Medium),
            "high" | "4" => Ok(Impact::High),
            "very_high" | "veryhigh" | "5" => Ok(Impact::VeryHigh),
            _ => Err(format!("Unknown impact: {}", s)),
        }
    }
}

/// Risk score = likelihood ordinal x impact ordinal (1-25).
pub fn score(likelihood: Likelihood, impact: Impact) -> u8 {
    likelihood.ordinal() * impact.ordinal()
}

/// Bucket a 1-25 score into a risk level.
///
/// Canonical threshold table: >=20 very_high, >=16 high, >=12 medium,
/// >=6 low, >=1 very_low. This is the single table used everywhere a
/// score-to-level conversion happens.
pub fn level_from_score(score: u8) -> RiskLevel {
    match score {
        20.. => RiskLevel::VeryHigh,
        16..=19 => RiskLevel::High,
        12..=15 => RiskLevel::Medium,
        6..=11 => RiskLevel::Low,
        _ => RiskLevel::VeryLow,
    }
}

/// Recommended control types for a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGuidance {
    /// Control type tags in recommended order (subset of Prv/Mit/Cor)
    pub recommended: &'static [GuidedControlType],
    /// Human-readable advice accompanying the recommendation
    pub advice: &'static str,
}

/// Control types as referenced by guidance (mirrors the entity-level enum
/// without depending on it; the scoring engine stays dependency-free).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidedControlType {
    Preventive,
    Mitigating,
    Corrective,
}

/// Control guidance lookup. `None` means the risk level is not yet
/// determinable (likelihood or impact missing).
pub fn control_guidance(level: Option<RiskLevel>) -> ControlGuidance {
    use GuidedControlType::*;
    match level {
        Some(RiskLevel::VeryLow) | Some(RiskLevel::Low) => ControlGuidance {
            recommended: &[Preventive],
            advice: "Preventive control is sufficient at this level.",
        },
        Some(RiskLevel::Medium) => ControlGuidance {
            recommended: &[Preventive, Mitigating],
            advice: "Add a mitigating control alongside prevention.",
        },
        Some(RiskLevel::High) | Some(RiskLevel::VeryHigh) => ControlGuidance {
            recommended: &[Preventive, Mitigating, Corrective],
            advice: "Full control coverage: preventive, mitigating and corrective.",
        },
        None => ControlGuidance {
            recommended: &[],
            advice: "Determine the risk level first (set likelihood and impact).",
        },
    }
}

/// Keywords in a key-control-indicator text that mark the target as an upper
/// bound ("stay at or below") rather than a goal to reach.
const NEGATIVE_TARGET_KEYWORDS: &[&str] = &[
    "maksimal",
    "maksimum",
    "maximum",
    "no more than",
    "at most",
    "tidak melebihi",
    "decrease",
    "penurunan",
    "turun",
];

/// Derive the performance percentage for a monitored control.
///
/// `target` and `realization` are parsed as numbers (non-numeric characters
/// stripped, comma accepted as decimal separator). Returns `None` when either
/// fails to parse or the target is zero.
///
/// If `indicator_text` contains a negative-target keyword, performance is
/// `((2*target - realization) / target) * 100` (exceeding an upper bound
/// lowers the result); otherwise `(realization / target) * 100`. The result
/// is clamped to >= 0 and rounded to the nearest integer.
pub fn performance_percentage(
    target: &str,
    realization: &str,
    indicator_text: &str,
) -> Option<i64> {
    let t = parse_numeric(target)?;
    let r = parse_numeric(realization)?;
    if t == 0.0 {
        return None;
    }

    let lowered = indicator_text.to_lowercase();
    let negative_target = NEGATIVE_TARGET_KEYWORDS
        .iter()
        .any(|kw| lowered.contains(kw));

    let pct = if negative_target {
        ((2.0 * t - r) / t) * 100.0
    } else {
        (r / t) * 100.0
    };

    Some(pct.max(0.0).round() as i64)
}

/// Parse a free-text numeric value: strip everything that is not a digit,
/// sign, comma or dot, then treat a comma as the decimal separator.
fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.replace(',', ".").parse().ok()
}
