//! Loosely-typed data model rendered by templates.
//!
//! [`Value`] covers the shapes a model usually has (null, booleans, numbers,
//! strings, dates, sequences and maps) plus two extension points:
//!
//! - [`Object`]: host types exposing named members, and optionally acting as a
//!   sequence or a lambda.
//! - [`Lambda`]: callables producing template source at render time.
//!
//! Containers are reference counted, so cloning a value is cheap.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::context::Context;
use crate::error::Result;

/// A host type exposed to templates.
///
/// Every method has a default, so implementors only override the
/// capabilities they have.
///
/// # Example
///
/// ```rust
/// use whisker::{Object, Value};
///
/// #[derive(Debug)]
/// struct User {
///     first: String,
///     last: String,
/// }
///
/// impl Object for User {
///     fn get(&self, name: &str) -> Option<Value> {
///         match name {
///             "first" => Some(Value::from(self.first.as_str())),
///             "last" => Some(Value::from(self.last.as_str())),
///             "full" => Some(Value::from(format!("{} {}", self.first, self.last))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Object: fmt::Debug + Send + Sync {
    /// Returns the member called `name`, or `None` if there is no such member.
    fn get(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Returns the elements, for objects that behave like a sequence.
    fn elements(&self) -> Option<Vec<Value>> {
        None
    }

    /// Returns the callable form, for objects that can also act as a lambda.
    fn as_lambda(&self) -> Option<&dyn Lambda> {
        None
    }

    /// Text written when the object itself is printed.
    fn render(&self) -> String {
        String::new()
    }
}

/// A callable model value producing template source.
///
/// A lambda receives the current scope and the text of the section body it
/// replaces (empty for variables). A string result is compiled and rendered
/// in place; any other value is written as-is.
pub trait Lambda: Send + Sync {
    fn apply(&self, scope: &Context<'_>, body: &str) -> Result<Value>;
}

struct FnLambda<F>(F);

impl<F> Lambda for FnLambda<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn apply(&self, _scope: &Context<'_>, body: &str) -> Result<Value> {
        Ok(Value::String((self.0)(body)))
    }
}

struct ConstLambda<F>(F);

impl<F> Lambda for ConstLambda<F>
where
    F: Fn() -> String + Send + Sync,
{
    fn apply(&self, _scope: &Context<'_>, _body: &str) -> Result<Value> {
        Ok(Value::String((self.0)()))
    }
}

/// A model value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDateTime),
    Array(Arc<[Value]>),
    Map(Arc<BTreeMap<String, Value>>),
    Object(Arc<dyn Object>),
    Lambda(Arc<dyn Lambda>),
}

impl Value {
    /// Converts any serializable type through its JSON representation.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
        Ok(Value::from(serde_json::to_value(value)?))
    }

    /// Builds a map from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Wraps a host object.
    pub fn object<O: Object + 'static>(object: O) -> Value {
        Value::Object(Arc::new(object))
    }

    /// Wraps a lambda receiving the raw section body.
    pub fn lambda<F>(f: F) -> Value
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Value::Lambda(Arc::new(FnLambda(f)))
    }

    /// Wraps a lambda that ignores the section body.
    pub fn lambda0<F>(f: F) -> Value
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Value::Lambda(Arc::new(ConstLambda(f)))
    }

    /// Wraps a custom [`Lambda`] implementation.
    pub fn from_lambda<L: Lambda + 'static>(lambda: L) -> Value {
        Value::Lambda(Arc::new(lambda))
    }

    /// A short name for the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "sequence",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Lambda(_) => "lambda",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns true for sequences and sequence-like objects.
    pub fn is_iterable(&self) -> bool {
        match self {
            Value::Array(_) => true,
            Value::Object(o) => o.elements().is_some(),
            _ => false,
        }
    }

    /// The elements of a sequence or sequence-like object.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Array(items) => Some(items.to_vec()),
            Value::Object(o) => o.elements(),
            _ => None,
        }
    }

    /// The callable form of lambdas and lambda-capable objects.
    pub fn as_lambda(&self) -> Option<&dyn Lambda> {
        match self {
            Value::Lambda(l) => Some(l.as_ref()),
            Value::Object(o) => o.as_lambda(),
            _ => None,
        }
    }

    /// Returns true for null, `false`, zero, the empty string and empty
    /// containers.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Float(n) => *n == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Object(o) => o.elements().is_some_and(|items| items.is_empty()),
            Value::Date(_) | Value::Lambda(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Lambda(_) => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => {
                if d.time() == NaiveTime::MIN {
                    write!(f, "{}", d.date())
                } else {
                    write!(f, "{}", d)
                }
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Object(o) => f.write_str(&o.render()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Date(d) => f.debug_tuple("Date").field(d).finish(),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Object(o) => f.debug_tuple("Object").field(o).finish(),
            Value::Lambda(_) => f.write_str("Lambda"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Lambda(a), Value::Lambda(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(n as f64),
        }
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::from(n as u64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
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

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date.and_time(NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(datetime: NaiveDateTime) -> Self {
        Value::Date(datetime)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Value::map(map)
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(map: HashMap<String, V>) -> Self {
        Value::map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::from(items),
            serde_json::Value::Object(map) => Value::map(map),
        }
    }
}
