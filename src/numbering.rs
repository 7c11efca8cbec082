//! Stateful list counters with Word's restart rules.
//!
//! Counters are stored per (list, level, position). Positions are document
//! offsets and only serve as an ordering key: the counter for a new list item
//! is derived from the nearest stored counter before it at the same level.
//! Every write is mirrored into a store keyed by abstract numbering id so
//! lists that share an abstract definition also share restart behaviour.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::Excluded;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Restart group used when neither the call nor an earlier write names an
/// abstract numbering id.
pub const DEFAULT_ABSTRACT_ID: &str = "__default__";

/// Keys that script hosts treat specially when a snapshot is loaded as a
/// plain JSON object.
const RESERVED_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// A `w:numId` value. Converters hand these over as text or as numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum ListId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl ListId {
    fn key(&self) -> Result<String> {
        match self {
            ListId::Text(s) => validate_key("num_id", s),
            ListId::Integer(n) => Ok(n.to_string()),
            ListId::Float(v) if !v.is_finite() => {
                Err(Error::invalid("num_id", format!("must be finite, got {v}")))
            }
            ListId::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => Ok((*v as i64).to_string()),
            ListId::Float(v) => Ok(v.to_string()),
        }
    }
}

impl From<&str> for ListId {
    fn from(s: &str) -> Self {
        ListId::Text(s.to_string())
    }
}

impl From<String> for ListId {
    fn from(s: String) -> Self {
        ListId::Text(s)
    }
}

impl From<&String> for ListId {
    fn from(s: &String) -> Self {
        ListId::Text(s.clone())
    }
}

impl From<i32> for ListId {
    fn from(n: i32) -> Self {
        ListId::Integer(n.into())
    }
}

impl From<i64> for ListId {
    fn from(n: i64) -> Self {
        ListId::Integer(n)
    }
}

impl From<u32> for ListId {
    fn from(n: u32) -> Self {
        ListId::Integer(n.into())
    }
}

impl From<f64> for ListId {
    fn from(v: f64) -> Self {
        ListId::Float(v)
    }
}

fn validate_key(argument: &'static str, raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(Error::invalid(argument, "must not be empty"));
    }
    if RESERVED_KEYS.contains(&raw) {
        return Err(Error::invalid(argument, format!("`{raw}` is a reserved key")));
    }
    Ok(raw.to_string())
}

/// When a level goes back to its start value (`w:lvlRestart`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Restart {
    /// Restart whenever any shallower level was used in between.
    #[default]
    AnyShallower,
    /// Keep counting across shallower levels.
    Never,
    /// Restart only when a level at or above `N` was used in between.
    UpToLevel(u32),
}

impl From<Option<u32>> for Restart {
    fn from(raw: Option<u32>) -> Self {
        match raw {
            None => Restart::AnyShallower,
            Some(0) => Restart::Never,
            Some(n) => Restart::UpToLevel(n),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSettings {
    pub start: i64,
    pub restart: Restart,
}

impl Default for StartSettings {
    fn default() -> Self {
        Self {
            start: 1,
            restart: Restart::AnyShallower,
        }
    }
}

/// list id → level → position → counter value.
pub type CountersSnapshot = BTreeMap<String, BTreeMap<u32, BTreeMap<u64, i64>>>;

type LevelStore = HashMap<u32, BTreeMap<u64, i64>>;

/// Counter engine for one document session. Drive it from a single caller in
/// increasing document order; it is not meant to be shared.
#[derive(Debug, Default)]
pub struct NumberingManager {
    starts: HashMap<(String, u32), StartSettings>,
    counters: HashMap<String, LevelStore>,
    abstract_counters: HashMap<String, LevelStore>,
    num_to_abstract: HashMap<String, String>,
    cache_enabled: bool,
    last_seen: HashMap<(String, u32), (u64, i64)>,
    path_cache: HashMap<(String, u32, u64), Vec<i64>>,
}

impl NumberingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(enabled: bool) -> Self {
        Self {
            cache_enabled: enabled,
            ..Self::default()
        }
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn set_start_settings(
        &mut self,
        num_id: impl Into<ListId>,
        level: u32,
        start: i64,
        restart: Restart,
    ) -> Result<()> {
        let key = num_id.into().key()?;
        // Memoized paths of deeper levels may have used the old start.
        self.path_cache
            .retain(|(id, l, _), _| id != &key || *l <= level);
        self.starts.insert((key, level), StartSettings { start, restart });
        Ok(())
    }

    pub fn start_settings(&self, num_id: impl Into<ListId>, level: u32) -> Result<StartSettings> {
        let key = num_id.into().key()?;
        Ok(self.settings(&key, level))
    }

    pub fn set_counter(
        &mut self,
        num_id: impl Into<ListId>,
        level: u32,
        pos: u64,
        value: i64,
        abstract_id: Option<&str>,
    ) -> Result<()> {
        let key = num_id.into().key()?;
        let abs = self.abstract_key(&key, abstract_id)?;

        // A list that moves to another abstract group takes this position
        // with it.
        if let Some(old_abs) = self.num_to_abstract.get(&key)
            && *old_abs != abs
            && let Some(at) = self
                .abstract_counters
                .get_mut(old_abs)
                .and_then(|levels| levels.get_mut(&level))
        {
            at.remove(&pos);
        }

        self.counters
            .entry(key.clone())
            .or_default()
            .entry(level)
            .or_default()
            .insert(pos, value);
        self.abstract_counters
            .entry(abs.clone())
            .or_default()
            .entry(level)
            .or_default()
            .insert(pos, value);
        self.num_to_abstract.insert(key.clone(), abs);

        if self.cache_enabled {
            let seen = self.last_seen.entry((key.clone(), level)).or_insert((pos, value));
            if pos >= seen.0 {
                *seen = (pos, value);
            }
            // Paths memoized after this position may now resolve differently.
            self.path_cache
                .retain(|(id, _, at), _| id != &key || *at <= pos);
        }
        Ok(())
    }

    pub fn get_counter(&self, num_id: impl Into<ListId>, level: u32, pos: u64) -> Result<Option<i64>> {
        let key = num_id.into().key()?;
        Ok(self
            .counters
            .get(&key)
            .and_then(|levels| levels.get(&level))
            .and_then(|at| at.get(&pos))
            .copied())
    }

    /// The value a new counter at `pos` should take. Nothing is stored.
    pub fn calculate_counter(
        &self,
        num_id: impl Into<ListId>,
        level: u32,
        pos: u64,
        abstract_id: Option<&str>,
    ) -> Result<i64> {
        let key = num_id.into().key()?;
        let abs = self.abstract_key(&key, abstract_id)?;
        let settings = self.settings(&key, level);

        let Some((prev_pos, prev_value)) = self.previous(&key, level, pos) else {
            log::trace!("list {key} level {level} @{pos}: first item, start={}", settings.start);
            return Ok(settings.start);
        };

        let restart = match settings.restart {
            Restart::Never => false,
            Restart::AnyShallower => self.shallower_used(&abs, level, prev_pos, pos, None),
            Restart::UpToLevel(n) => self.shallower_used(&abs, level, prev_pos, pos, Some(n)),
        };
        if restart {
            log::trace!(
                "list {key} level {level} @{pos}: restart to {} (shallower level used since @{prev_pos})",
                settings.start
            );
            return Ok(settings.start);
        }

        prev_value.checked_add(1).ok_or_else(|| Error::Overflow {
            num_id: key,
            level,
            pos,
        })
    }

    /// Counters of levels `0..level` in effect at `pos`: the nearest stored
    /// value before `pos`, or the level's start when there is none.
    pub fn ancestors_path(&mut self, num_id: impl Into<ListId>, level: u32, pos: u64) -> Result<Vec<i64>> {
        let key = num_id.into().key()?;
        let cache_key = (key, level, pos);
        if self.cache_enabled
            && let Some(path) = self.path_cache.get(&cache_key)
        {
            return Ok(path.clone());
        }

        let key = &cache_key.0;
        let path: Vec<i64> = (0..level)
            .map(|l| {
                self.previous(key, l, pos)
                    .map(|(_, v)| v)
                    .unwrap_or_else(|| self.settings(key, l).start)
            })
            .collect();

        if self.cache_enabled {
            self.path_cache.insert(cache_key, path.clone());
        }
        Ok(path)
    }

    /// Ancestors followed by the counter stored at exactly `pos`, if any.
    pub fn calculate_path(&mut self, num_id: impl Into<ListId>, level: u32, pos: u64) -> Result<Vec<i64>> {
        let id = num_id.into();
        let mut path = self.ancestors_path(id.clone(), level, pos)?;
        if let Some(own) = self.get_counter(id, level, pos)? {
            path.push(own);
        }
        Ok(path)
    }

    /// Calculate, store and return the full path for one list paragraph.
    /// Call in document order.
    pub fn record(
        &mut self,
        num_id: impl Into<ListId>,
        level: u32,
        pos: u64,
        abstract_id: Option<&str>,
    ) -> Result<Vec<i64>> {
        let id = num_id.into();
        let value = self.calculate_counter(id.clone(), level, pos, abstract_id)?;
        self.set_counter(id.clone(), level, pos, value, abstract_id)?;
        self.calculate_path(id, level, pos)
    }

    /// Turns the shortcut caches on. Discards every stored counter.
    pub fn enable_cache(&mut self) {
        self.clear_all_state();
        self.cache_enabled = true;
        log::debug!("numbering cache enabled, state reset");
    }

    /// Turns the shortcut caches off. Discards every stored counter.
    pub fn disable_cache(&mut self) {
        self.clear_all_state();
        self.cache_enabled = false;
        log::debug!("numbering cache disabled, state reset");
    }

    /// Drops counters, abstract mappings and caches. Start settings are
    /// configuration and survive.
    pub fn clear_all_state(&mut self) {
        self.counters.clear();
        self.abstract_counters.clear();
        self.num_to_abstract.clear();
        self.last_seen.clear();
        self.path_cache.clear();
    }

    pub fn counters_map(&self) -> CountersSnapshot {
        self.counters
            .iter()
            .map(|(id, levels)| {
                let levels: BTreeMap<u32, BTreeMap<u64, i64>> = levels
                    .iter()
                    .map(|(level, at)| (*level, at.clone()))
                    .collect();
                (id.clone(), levels)
            })
            .collect()
    }

    fn settings(&self, key: &str, level: u32) -> StartSettings {
        self.starts
            .get(&(key.to_string(), level))
            .copied()
            .unwrap_or_default()
    }

    fn abstract_key(&self, key: &str, abstract_id: Option<&str>) -> Result<String> {
        match abstract_id {
            Some(abs) => validate_key("abstract_id", abs),
            None => Ok(self
                .num_to_abstract
                .get(key)
                .cloned()
                .unwrap_or_else(|| DEFAULT_ABSTRACT_ID.to_string())),
        }
    }

    /// Nearest stored (position, value) strictly before `pos`.
    fn previous(&self, key: &str, level: u32, pos: u64) -> Option<(u64, i64)> {
        if self.cache_enabled
            && let Some(&(seen_pos, seen_value)) = self.last_seen.get(&(key.to_string(), level))
            && seen_pos < pos
        {
            return Some((seen_pos, seen_value));
        }
        self.counters
            .get(key)
            .and_then(|levels| levels.get(&level))
            .and_then(|at| at.range(..pos).next_back())
            .map(|(p, v)| (*p, *v))
    }

    /// Whether a level shallower than `level` (and at most `max_level`) was
    /// written strictly between `after` and `before` in the abstract store.
    fn shallower_used(
        &self,
        abs: &str,
        level: u32,
        after: u64,
        before: u64,
        max_level: Option<u32>,
    ) -> bool {
        if before <= after.saturating_add(1) {
            return false;
        }
        let Some(levels) = self.abstract_counters.get(abs) else {
            return false;
        };
        (0..level)
            .filter(|l| max_level.is_none_or(|max| *l <= max))
            .any(|l| {
                levels
                    .get(&l)
                    .is_some_and(|at| at.range((Excluded(after), Excluded(before))).next().is_some())
            })
    }
}
