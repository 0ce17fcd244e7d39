//! Named properties with by-round values.
//!
//! A property whose text contains `:` holds one value per round (`merge.factor=10:20:30`,
//! or with a column label `mf:10:20:30`). The value list is parsed on first access and
//! pinned: later reads reuse it and `set` refuses to overwrite it.

mod props;
pub use props::split_alg_text;

use std::{
    collections::BTreeMap,
    fmt::Display,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use perfalg_model::Round;
use tracing::info;

use crate::error::ConfigError;

/// Separator between by-round values.
pub const SEPARATOR: char = ':';

/// Shared property store.
///
/// Cloning is cheap and every clone sees the same properties and round.
#[derive(Clone, Default)]
pub struct Config {
    inner: Arc<RwLock<ConfigInner>>,
}

#[derive(Default)]
struct ConfigInner {
    props: BTreeMap<String, String>,
    by_round: BTreeMap<String, ByRound>,
    round: Round,
    algorithm: String,
}

struct ByRound {
    column: String,
    values: Vec<String>,
}

impl ByRound {
    fn at(&self, round: Round) -> &str {
        &self.values[round as usize % self.values.len()]
    }
}

/// A type a property can be read as.
trait PropValue: Sized + Display {
    const EXPECTED: &'static str;
    fn parse_prop(raw: &str) -> Option<Self>;
}

impl PropValue for String {
    const EXPECTED: &'static str = "string";
    fn parse_prop(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl PropValue for i64 {
    const EXPECTED: &'static str = "integer";
    fn parse_prop(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl PropValue for f64 {
    const EXPECTED: &'static str = "number";
    fn parse_prop(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl PropValue for bool {
    const EXPECTED: &'static str = "boolean";
    fn parse_prop(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `key=value` pairs.
    pub fn from_props<I, K, V>(props: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cfg = Self::new();
        {
            let mut inner = cfg.write();
            for (k, v) in props {
                inner.props.insert(k.into(), v.into());
            }
        }
        cfg
    }

    /// Build a store from an `.alg` file: leading property lines, then the algorithm.
    ///
    /// Logs every property when `print.props` is true (the default).
    pub fn from_alg_text(text: &str) -> Result<Self, ConfigError> {
        let (props, algorithm) = split_alg_text(text);
        let cfg = Self::from_props(props);
        cfg.write().algorithm = algorithm;

        if cfg.get_bool("print.props", true)? {
            cfg.log_props();
        }
        Ok(cfg)
    }

    /// Algorithm text that followed the property lines.
    pub fn algorithm_text(&self) -> String {
        self.read().algorithm.clone()
    }

    /// Raw stored text of a property.
    pub fn raw(&self, name: &str) -> Option<String> {
        self.read().props.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().props.contains_key(name)
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        // A string accepts every segment, so resolution cannot fail.
        self.resolve::<String>(name, default.to_string())
            .unwrap_or_else(|_| default.to_string())
    }

    pub fn get_int(&self, name: &str, default: i64) -> Result<i64, ConfigError> {
        self.resolve(name, default)
    }

    pub fn get_double(&self, name: &str, default: f64) -> Result<f64, ConfigError> {
        self.resolve(name, default)
    }

    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        self.resolve(name, default)
    }

    /// Overwrite a single-valued property.
    pub fn set(&self, name: &str, value: &str) -> Result<(), ConfigError> {
        let mut inner = self.write();
        if inner.by_round.contains_key(name) {
            return Err(ConfigError::MultiValueProperty {
                name: name.to_string(),
            });
        }
        if value.contains(SEPARATOR) {
            return Err(ConfigError::MultiValueAssignment {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        inner.props.insert(name.to_string(), value.to_string());
        Ok(())
    }

    #[inline]
    pub fn round(&self) -> Round {
        self.read().round
    }

    /// Move to the next round and return its number.
    pub fn advance_round(&self) -> Round {
        let mut inner = self.write();
        inner.round += 1;
        let round = inner.round;

        let changes: Vec<String> = inner
            .by_round
            .iter()
            .map(|(name, v)| format!("{name}:{}-->{}", v.at(round - 1), v.at(round)))
            .collect();
        info!(
            from = round - 1,
            to = round,
            changes = %changes.join("  "),
            "round advanced"
        );
        round
    }

    /// `(label, current value)` of every by-round property resolved so far.
    pub fn by_round_columns(&self) -> Vec<(String, String)> {
        let inner = self.read();
        inner
            .by_round
            .values()
            .map(|v| (v.column.clone(), v.at(inner.round).to_string()))
            .collect()
    }

    /// Labels of the by-round properties, in `by_round_columns` order.
    pub fn by_round_labels(&self) -> Vec<String> {
        self.read()
            .by_round
            .values()
            .map(|v| v.column.clone())
            .collect()
    }

    /// Values of the by-round properties for `round`, in `by_round_columns` order.
    pub fn by_round_values(&self, round: Round) -> Vec<String> {
        self.read()
            .by_round
            .values()
            .map(|v| v.at(round).to_string())
            .collect()
    }

    fn resolve<T: PropValue>(&self, name: &str, default: T) -> Result<T, ConfigError> {
        let raw = {
            let inner = self.read();
            if let Some(v) = inner.by_round.get(name) {
                return parse_one(name, v.at(inner.round));
            }
            match inner.props.get(name) {
                Some(raw) => raw.clone(),
                None => return Ok(default),
            }
        };

        if !raw.contains(SEPARATOR) {
            return parse_one(name, &raw);
        }

        let parsed = split_by_round::<T>(name, &raw)?;
        let mut inner = self.write();
        let round = inner.round;
        let entry = inner.by_round.entry(name.to_string()).or_insert(parsed);
        parse_one(name, entry.at(round))
    }

    fn log_props(&self) {
        let inner = self.read();
        info!("------------> config properties:");
        for (k, v) in &inner.props {
            info!("{k} = {v}");
        }
        info!("-------------------------------");
    }

    fn read(&self) -> RwLockReadGuard<'_, ConfigInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConfigInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_one<T: PropValue>(name: &str, raw: &str) -> Result<T, ConfigError> {
    T::parse_prop(raw).ok_or_else(|| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        expected: T::EXPECTED,
    })
}

/// Split `a:b:c` into by-round values; a leading segment that is not a `T` is the column label.
fn split_by_round<T: PropValue>(name: &str, raw: &str) -> Result<ByRound, ConfigError> {
    let segments: Vec<&str> = raw.split(SEPARATOR).collect();
    let (column, values) = match segments.split_first() {
        Some((first, rest)) if !rest.is_empty() && T::parse_prop(first).is_none() => {
            (first.trim().to_string(), rest)
        }
        _ => (name.to_string(), segments.as_slice()),
    };
    for v in values {
        parse_one::<T>(name, v)?;
    }
    Ok(ByRound {
        column,
        values: values.iter().map(|v| v.trim().to_string()).collect(),
    })
}
