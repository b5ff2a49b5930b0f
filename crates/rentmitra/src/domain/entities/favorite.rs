use std::{
    collections::HashSet,
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid favorite id: {0:?}")]
pub struct InvalidFavoriteId(pub String);

/// Identifier of a rentable item, used as the favorites membership key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(i64);

impl FavoriteId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Coerces a loosely typed JSON value into an id.
    ///
    /// Integers, finite integral floats and strings holding either are
    /// accepted. Everything else, including `null`, yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(id) = n.as_i64() {
                    Some(Self(id))
                } else {
                    n.as_f64().and_then(Self::from_f64)
                }
            }
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn from_f64(n: f64) -> Option<Self> {
        // i64::MAX as f64 rounds up to 2^63, which is out of range
        if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            Some(Self(n as i64))
        } else {
            None
        }
    }
}

impl From<i64> for FavoriteId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for FavoriteId {
    type Err = InvalidFavoriteId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(Self(id));
        }

        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_f64)
            .ok_or_else(|| InvalidFavoriteId(s.to_string()))
    }
}

impl Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unordered set of favorited item ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: HashSet<FavoriteId>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the persisted form. Never fails: anything that is not a JSON
    /// array reads as the empty set and unusable elements are dropped.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(values)) => values.iter().filter_map(FavoriteId::from_value).collect(),
            _ => Self::default(),
        }
    }

    pub fn to_json(&self) -> String {
        let ids: Vec<i64> = self.ids().into_iter().map(FavoriteId::get).collect();
        serde_json::Value::from(ids).to_string()
    }

    pub fn contains(&self, id: FavoriteId) -> bool {
        self.ids.contains(&id)
    }

    pub fn insert(&mut self, id: FavoriteId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: FavoriteId) -> bool {
        self.ids.remove(&id)
    }

    /// Forces membership of `id` to `favorited`.
    pub fn set(&mut self, id: FavoriteId, favorited: bool) {
        if favorited {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Members in ascending order.
    pub fn ids(&self) -> Vec<FavoriteId> {
        let mut ids: Vec<FavoriteId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<FavoriteId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = FavoriteId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_favorite_id() {
        assert_eq!(FavoriteId::from_value(&json!(7)), Some(FavoriteId::new(7)));
        assert_eq!(FavoriteId::from_value(&json!(42.0)), Some(FavoriteId::new(42)));
        assert_eq!(FavoriteId::from_value(&json!("13")), Some(FavoriteId::new(13)));
        assert_eq!(FavoriteId::from_value(&json!(" 8 ")), Some(FavoriteId::new(8)));

        assert_eq!(FavoriteId::from_value(&json!(null)), None);
        assert_eq!(FavoriteId::from_value(&json!(true)), None);
        assert_eq!(FavoriteId::from_value(&json!("abc")), None);
        assert_eq!(FavoriteId::from_value(&json!(7.5)), None);
        assert_eq!(FavoriteId::from_value(&json!({"productId": 7})), None);
        assert_eq!(FavoriteId::from_value(&json!([7])), None);
    }

    #[test]
    fn test_parse_favorite_id() {
        assert_eq!("12".parse::<FavoriteId>(), Ok(FavoriteId::new(12)));
        assert!("NaN".parse::<FavoriteId>().is_err());
        assert!("inf".parse::<FavoriteId>().is_err());
        assert!("".parse::<FavoriteId>().is_err());
        assert!("9223372036854775808".parse::<FavoriteId>().is_err());
        assert_eq!(
            "9223372036854775807".parse::<FavoriteId>(),
            Ok(FavoriteId::new(i64::MAX))
        );
        assert_eq!(
            "-9223372036854775808".parse::<FavoriteId>(),
            Ok(FavoriteId::new(i64::MIN))
        );
    }

    #[test]
    fn test_set_from_json() {
        let set = FavoriteSet::from_json(r#"[7, "42", 7, null, "x", 1.5]"#);
        assert_eq!(set.ids(), vec![FavoriteId::new(7), FavoriteId::new(42)]);

        assert!(FavoriteSet::from_json("not json").is_empty());
        assert!(FavoriteSet::from_json("").is_empty());
        assert!(FavoriteSet::from_json(r#"{"ids": [1]}"#).is_empty());
        assert!(FavoriteSet::from_json("null").is_empty());
    }

    #[test]
    fn test_set_to_json() {
        let set: FavoriteSet = [3, 1, 2].into_iter().map(FavoriteId::new).collect();
        assert_eq!(set.to_json(), "[1,2,3]");
        assert_eq!(FavoriteSet::new().to_json(), "[]");
    }

    #[test]
    fn test_set_membership() {
        let mut set = FavoriteSet::new();
        set.set(FavoriteId::new(5), true);
        assert!(set.contains(FavoriteId::new(5)));
        set.set(FavoriteId::new(5), true);
        assert_eq!(set.len(), 1);
        set.set(FavoriteId::new(5), false);
        assert!(!set.contains(FavoriteId::new(5)));
    }
}
