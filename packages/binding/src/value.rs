//! Data values held by a binding root.
//!
//! Lists carry an [`ItemId`] per element. The id is allocated when a value
//! enters a list and travels with it through clones, so it plays the role of
//! object identity: a cloned [`Value`] is "the same item", a freshly built
//! one is not, even when both are structurally equal.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a list element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(u64);

impl ItemId {
    /// Allocate an id no other item has
    pub fn fresh() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element of a [`Value::List`]
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    value: Value,
}

impl Item {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            id: ItemId::fresh(),
            value: value.into(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Item>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn object() -> Self {
        Value::Object(BTreeMap::new())
    }

    /// List of fresh items
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(values.into_iter().map(Item::new).collect())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Equality as rendering sees it: `==`, except that NaN matches NaN
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x.id == y.id && x.value.same(&y.value))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same(vb))
            }
            _ => self == other,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Item]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Item>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The list inside this value, replacing anything else with an empty list
    pub fn list_mut(&mut self) -> &mut Vec<Item> {
        if !matches!(self, Value::List(_)) {
            *self = Value::List(Vec::new());
        }
        match self {
            Value::List(items) => items,
            _ => unreachable!("value was just replaced with a list"),
        }
    }

    /// Single step of property access: object field or list index
    pub fn get(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(segment),
            Value::List(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .map(Item::value),
            _ => None,
        }
    }

    /// Walk `path`; any missing step yields `None`
    pub fn resolve(&self, path: &[String]) -> Option<&Value> {
        path.iter()
            .try_fold(self, |value, segment| value.get(segment))
    }

    pub fn resolve_mut(&mut self, path: &[String]) -> Option<&mut Value> {
        let mut current = self;
        for segment in path {
            current = match current {
                Value::Object(map) => map.get_mut(segment)?,
                Value::List(items) => {
                    let index = segment.parse::<usize>().ok()?;
                    items.get_mut(index)?.value_mut()
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Slot at `path`, turning undefined or null steps into objects on the
    /// way. `None` when a primitive or an out-of-range index blocks the path.
    pub fn entry(&mut self, path: &[String]) -> Option<&mut Value> {
        let mut current = self;
        for segment in path {
            if matches!(current, Value::Undefined | Value::Null) {
                *current = Value::object();
            }
            current = match current {
                Value::Object(map) => map.entry(segment.clone()).or_default(),
                Value::List(items) => {
                    let index = segment.parse::<usize>().ok()?;
                    items.get_mut(index)?.value_mut()
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Assign `value` at `path`. Assigning a list index stores a new item
    /// (fresh identity); an index equal to the length appends. Returns
    /// whether anything was written.
    pub fn set_path(&mut self, path: &[String], value: Value) -> bool {
        let Some((last, parents)) = path.split_last() else {
            *self = value;
            return true;
        };
        let Some(container) = self.entry(parents) else {
            return false;
        };
        if matches!(container, Value::Undefined | Value::Null) {
            *container = Value::object();
        }
        match container {
            Value::Object(map) => {
                map.insert(last.clone(), value);
                true
            }
            Value::List(items) => match last.parse::<usize>() {
                Ok(index) if index < items.len() => {
                    items[index] = Item::new(value);
                    true
                }
                Ok(index) if index == items.len() => {
                    items.push(Item::new(value));
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// JSON form; `None` for undefined, and undefined fields are dropped
    pub fn to_json(&self) -> Option<serde_json::Value> {
        self.to_json_with(JsonForm::Data)
    }

    pub(crate) fn to_json_with(&self, form: JsonForm) -> Option<serde_json::Value> {
        use serde_json::Value as Json;

        Some(match self {
            Value::Undefined => return None,
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => match serde_json::Number::from_f64(*n) {
                Some(number) => Json::Number(number),
                None if form == JsonForm::Data => Json::Null,
                None => Json::String(format_number(*n)),
            },
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(
                items
                    .iter()
                    .map(|item| {
                        let value = item.value.to_json_with(form).unwrap_or(Json::Null);
                        if form == JsonForm::Identity {
                            serde_json::json!({ "id": item.id.0, "value": value })
                        } else {
                            value
                        }
                    })
                    .collect(),
            ),
            Value::Object(map) => Json::Object(
                map.iter()
                    .filter_map(|(key, value)| {
                        value.to_json_with(form).map(|json| (key.clone(), json))
                    })
                    .collect(),
            ),
        })
    }
}

/// Encoding used by [`Value::to_json_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JsonForm {
    /// Plain data, non-finite numbers as `null`
    Data,
    /// Non-finite numbers keep their rendered text
    Fingerprint,
    /// Like `Fingerprint`, with list items wrapped as `{"id": .., "value": ..}`
    Identity,
}

/// Text a placeholder renders for a resolved value; `None` is undefined
pub fn display(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_else(|| "undefined".to_string())
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form with an explicit sign, `1e+21` and `1.5e-7`
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        }
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// String coercion as the templates see it: `undefined`, `null`, integral
/// numbers without a fraction, lists joined with `,`, objects as
/// `[object Object]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    match &item.value {
                        Value::Undefined | Value::Null => {}
                        other => write!(f, "{}", other)?,
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .unwrap_or(serde_json::Value::Null)
            .serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(values) => Value::list(values),
            Json::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::list(values)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        item.value
    }
}
