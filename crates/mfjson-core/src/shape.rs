//! How native values present themselves to the writer.
//!
//! Every serializable type reports a [`Shape`]: one of the scalar kinds, a
//! date/time, a sequence, a key/value map, or a record. The writer only ever
//! matches on shapes, so supporting a new native type means implementing
//! [`Serializable`] for it and nothing else.
//!
//! Records are the one case that needs outside help: their members come from
//! a [`crate::resolver::TypeResolver`], keyed by the record's concrete type.
//! A struct becomes a record with [`Shape::record`] (or the
//! [`impl_record!`](crate::impl_record) macro).

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;

use crate::resolver::MemberKind;
use crate::value::Value;

/// A native value that can be written as JSON.
pub trait Serializable {
    /// Describe this value to the writer.
    fn shape(&self) -> Shape<'_>;
}

/// Iterator over the elements of a sequence.
pub type SeqIter<'a> = Box<dyn Iterator<Item = &'a dyn Serializable> + 'a>;

/// Iterator over the entries of a map, in the map's own order.
pub type MapIter<'a> = Box<dyn Iterator<Item = (&'a str, &'a dyn Serializable)> + 'a>;

/// The runtime category of a native value.
pub enum Shape<'a> {
    Null,
    Bool(bool),
    /// Wide enough for every `i64` and `u64`.
    Integer(i128),
    Float(f64),
    Str(Cow<'a, str>),
    DateTime(DateTime<Utc>),
    Seq(SeqIter<'a>),
    Map(MapIter<'a>),
    Record(RecordRef<'a>),
}

impl<'a> Shape<'a> {
    /// Shape of a struct whose members are listed by the type resolver.
    pub fn record<T: Any>(value: &'a T) -> Self {
        Shape::Record(RecordRef::new(value))
    }

    /// Member kind this shape satisfies. `None` for null, which fits any kind.
    pub fn kind(&self) -> Option<MemberKind> {
        match self {
            Shape::Null => None,
            Shape::Bool(_)
            | Shape::Integer(_)
            | Shape::Float(_)
            | Shape::Str(_)
            | Shape::DateTime(_) => Some(MemberKind::Primitive),
            Shape::Seq(_) => Some(MemberKind::Collection),
            Shape::Map(_) => Some(MemberKind::Map),
            Shape::Record(_) => Some(MemberKind::Record),
        }
    }
}

/// A type-erased reference to a record.
///
/// Identity is the data address plus the concrete `TypeId`; a struct and its
/// first field can share an address but never a type.
#[derive(Clone, Copy)]
pub struct RecordRef<'a> {
    value: &'a dyn Any,
    type_id: TypeId,
    type_name: &'static str,
}

impl<'a> RecordRef<'a> {
    pub fn new<T: Any>(value: &'a T) -> Self {
        Self {
            value,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The record as `Any`, for member getters to downcast.
    pub fn value(&self) -> &'a dyn Any {
        self.value
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn identity(&self) -> (usize, TypeId) {
        let addr = self.value as *const dyn Any as *const () as usize;
        (addr, self.type_id)
    }
}

/// Implement [`Serializable`] for structs that are described by a resolver.
///
/// ```
/// struct Point { x: i32, y: i32 }
/// mfjson_core::impl_record!(Point);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Serializable for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::record(self)
                }
            }
        )+
    };
}

impl Serializable for () {
    fn shape(&self) -> Shape<'_> {
        Shape::Null
    }
}

impl Serializable for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Bool(*self)
    }
}

macro_rules! integer_shape {
    ($($ty:ty),*) => {
        $(
            impl Serializable for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Integer(*self as i128)
                }
            }
        )*
    };
}

integer_shape!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Serializable for f64 {
    fn shape(&self) -> Shape<'_> {
        Shape::Float(*self)
    }
}

/// Widen via the shortest decimal form so 0.1f32 becomes 0.1, not the
/// exact binary expansion of the f32.
pub(crate) fn widen_f32(f: f32) -> f64 {
    if f.is_finite() {
        f.to_string().parse().unwrap_or(f64::from(f))
    } else {
        f64::from(f)
    }
}

impl Serializable for f32 {
    fn shape(&self) -> Shape<'_> {
        Shape::Float(widen_f32(*self))
    }
}

impl Serializable for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Borrowed(self))
    }
}

impl Serializable for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Borrowed(self))
    }
}

impl Serializable for Cow<'_, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Borrowed(self))
    }
}

impl Serializable for char {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Owned(self.to_string()))
    }
}

impl Serializable for DateTime<Utc> {
    fn shape(&self) -> Shape<'_> {
        Shape::DateTime(*self)
    }
}

/// Naive timestamps are taken to be UTC.
impl Serializable for NaiveDateTime {
    fn shape(&self) -> Shape<'_> {
        Shape::DateTime(self.and_utc())
    }
}

impl<T: Serializable> Serializable for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }
}

impl<T: Serializable + ?Sized> Serializable for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Serializable + ?Sized> Serializable for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Serializable + ?Sized> Serializable for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Serializable + ?Sized> Serializable for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

fn seq<'a, T: Serializable + 'a>(items: impl Iterator<Item = &'a T> + 'a) -> Shape<'a> {
    Shape::Seq(Box::new(items.map(|item| item as &dyn Serializable)))
}

impl<T: Serializable> Serializable for [T] {
    fn shape(&self) -> Shape<'_> {
        seq(self.iter())
    }
}

impl<T: Serializable, const N: usize> Serializable for [T; N] {
    fn shape(&self) -> Shape<'_> {
        seq(self.iter())
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        seq(self.iter())
    }
}

impl<T: Serializable> Serializable for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        seq(self.iter())
    }
}

impl<K: AsRef<str>, V: Serializable> Serializable for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(Box::new(
            self.iter()
                .map(|(k, v)| (k.as_ref(), v as &dyn Serializable)),
        ))
    }
}

/// Entries are written in insertion order.
impl<K: AsRef<str>, V: Serializable, S> Serializable for IndexMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(Box::new(
            self.iter()
                .map(|(k, v)| (k.as_ref(), v as &dyn Serializable)),
        ))
    }
}

impl Serializable for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Bool(*b),
            Value::Integer(n) => Shape::Integer(i128::from(*n)),
            Value::Float(f) => Shape::Float(*f),
            Value::String(s) => Shape::Str(Cow::Borrowed(s)),
            Value::Array(items) => seq(items.iter()),
            Value::Object(pairs) => Shape::Map(Box::new(
                pairs
                    .iter()
                    .map(|(k, v)| (k.as_str(), v as &dyn Serializable)),
            )),
        }
    }
}
