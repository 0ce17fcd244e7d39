use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Repetition policy of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Repetition {
    /// Run the children exactly `n` times.
    Count(u32),
    /// Run the children until the data source signals exhaustion.
    ///
    /// Only valid for serial sequences.
    UntilExhausted,
    /// Run full passes over the children until at least this much wall time elapsed.
    ///
    /// The duration is a floor: the pass in progress when it expires is always completed.
    For(Duration),
}

impl Repetition {
    /// `true` for the implicit `Count(1)`, which the grammar does not spell out.
    #[inline]
    pub fn is_once(&self) -> bool {
        matches!(self, Repetition::Count(1))
    }

    #[inline]
    pub fn is_until_exhausted(&self) -> bool {
        matches!(self, Repetition::UntilExhausted)
    }

    /// Suffix appended to a sequence name for statistics grouping (`_5`, `_Exhaust`, `_2.5s`).
    pub fn name_suffix(&self) -> String {
        match self {
            Repetition::Count(n) if *n > 1 => format!("_{n}"),
            Repetition::Count(_) => String::new(),
            Repetition::UntilExhausted => "_Exhaust".to_string(),
            Repetition::For(d) => format!("_{}s", fmt_secs(*d)),
        }
    }

    /// Grammar form of the modifier (`:5`, `:*`, `:2.5s`), empty for `Count(1)`.
    pub fn grammar(&self) -> String {
        match self {
            Repetition::Count(1) => String::new(),
            Repetition::Count(n) => format!(":{n}"),
            Repetition::UntilExhausted => ":*".to_string(),
            Repetition::For(d) => format!(":{}s", fmt_secs(*d)),
        }
    }
}

impl Default for Repetition {
    fn default() -> Self {
        Repetition::Count(1)
    }
}

fn fmt_secs(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        return d.as_secs().to_string();
    }
    let s = format!("{}.{:09}", d.as_secs(), d.subsec_nanos());
    s.trim_end_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_is_implicit() {
        assert!(Repetition::default().is_once());
        assert_eq!(Repetition::Count(1).grammar(), "");
        assert_eq!(Repetition::Count(1).name_suffix(), "");
    }

    #[test]
    fn grammar_forms() {
        assert_eq!(Repetition::Count(5).grammar(), ":5");
        assert_eq!(Repetition::UntilExhausted.grammar(), ":*");
        assert_eq!(Repetition::For(Duration::from_secs(3)).grammar(), ":3s");
        assert_eq!(Repetition::For(Duration::from_millis(2500)).grammar(), ":2.5s");
        assert_eq!(Repetition::For(Duration::from_micros(100)).grammar(), ":0.0001s");
        assert_eq!(Repetition::For(Duration::from_nanos(1_000_500_001)).grammar(), ":1.000500001s");
    }

    #[test]
    fn name_suffixes() {
        assert_eq!(Repetition::Count(7).name_suffix(), "_7");
        assert_eq!(Repetition::UntilExhausted.name_suffix(), "_Exhaust");
        assert_eq!(Repetition::For(Duration::from_millis(250)).name_suffix(), "_0.25s");
    }
}
