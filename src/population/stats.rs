use std::fmt;

/// Population summary. `None` means no organism carries the field yet,
/// which is distinct from a zero value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationStats {
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub max_wins: Option<u32>,
}

fn or_dash<T: fmt::Display>(value: Option<T>, render: impl Fn(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for PopulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fitness - ({}, {})",
            or_dash(self.min_score, |score| format!("{:.4}", score)),
            or_dash(self.max_score, |score| format!("{:.4}", score)),
        )?;
        write!(f, "Max wins - {}", or_dash(self.max_wins, |wins| wins.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marks_missing_values() {
        let empty = PopulationStats::default();
        assert_eq!(empty.to_string(), "Fitness - (-, -)\nMax wins - -");

        let stats = PopulationStats {
            min_score: Some(0.8),
            max_score: Some(1.2),
            max_wins: Some(0),
        };
        assert_eq!(stats.to_string(), "Fitness - (0.8000, 1.2000)\nMax wins - 0");
    }
}
