//! Derived display codes for register entities
//!
//! Codes are display labels composed from parent codes and per-scope sequence
//! numbers: `S1` -> `S1.PR2` -> `S1.PR2.PC1` -> `S1.PR2.PC1.Prv.1`. They are
//! never used as storage keys; every composition rule lives here so call
//! sites cannot drift.

use std::cmp::Ordering;

use crate::entities::control_measure::ControlType;

/// Code for a goal: `S{sequence}`
pub fn goal(sequence_number: u32) -> String {
    format!("S{}", sequence_number)
}

/// Code for a potential risk: `{goal_code}.PR{sequence}`
pub fn potential_risk(goal_code: &str, sequence_number: u32) -> String {
    format!("{}.PR{}", goal_code, sequence_number)
}

/// Code for a risk cause: `{potential_risk_code}.PC{sequence}`
pub fn risk_cause(potential_risk_code: &str, sequence_number: u32) -> String {
    format!("{}.PC{}", potential_risk_code, sequence_number)
}

/// Code for a control measure: `{cause_code}.{type_tag}.{sequence}`
pub fn control_measure(
    risk_cause_code: &str,
    control_type: ControlType,
    sequence_number: u32,
) -> String {
    format!(
        "{}.{}.{}",
        risk_cause_code,
        control_type.code_tag(),
        sequence_number
    )
}

/// Natural (numeric-aware) comparison for codes, so `S2` sorts before `S10`
/// and `S1.PR9` before `S1.PR10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let na = take_number(&mut ca);
                    let nb = take_number(&mut cb);
                    match na.cmp(&nb) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                match x.cmp(&y) {
                    Ordering::Equal => {
                        ca.next();
                        cb.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut n: u64 = 0;
    while let Some(c) = chars.peek() {
        if let Some(d) = c.to_digit(10) {
            n = n.saturating_mul(10).saturating_add(d as u64);
            chars.next();
        } else {
            break;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_code() {
        assert_eq!(goal(1), "S1");
        assert_eq!(goal(12), "S12");
    }

    #[test]
    fn test_composite_codes() {
        let g = goal(1);
        let pr = potential_risk(&g, 2);
        assert_eq!(pr, "S1.PR2");
        let pc = risk_cause(&pr, 1);
        assert_eq!(pc, "S1.PR2.PC1");
        assert_eq!(
            control_measure(&pc, ControlType::Preventive, 1),
            "S1.PR2.PC1.Prv.1"
        );
        assert_eq!(
            control_measure(&pc, ControlType::Mitigating, 3),
            "S1.PR2.PC1.Mit.3"
        );
        assert_eq!(
            control_measure(&pc, ControlType::Corrective, 2),
            "S1.PR2.PC1.Cor.2"
        );
    }

    #[test]
    fn test_natural_cmp_numeric_runs() {
        assert_eq!(natural_cmp("S2", "S10"), Ordering::Less);
        assert_eq!(natural_cmp("S10", "S2"), Ordering::Greater);
        assert_eq!(natural_cmp("S1.PR9", "S1.PR10"), Ordering::Less);
        assert_eq!(natural_cmp("S1", "S1"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_prefix() {
        assert_eq!(natural_cmp("S1", "S1.PR1"), Ordering::Less);
    }

    #[test]
    fn test_natural_cmp_sorts_goal_list() {
        let mut codes = vec!["S10", "S2", "S1", "S21"];
        codes.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(codes, vec!["S1", "S2", "S10", "S21"]);
    }
}
