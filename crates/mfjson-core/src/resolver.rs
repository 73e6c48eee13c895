//! Type descriptors: which members a record exposes, in what order.
//!
//! The writer never inspects a struct directly. It asks a [`TypeResolver`]
//! for the record's [`ResolvedType`], an ordered list of named members each
//! with a getter. [`Registry`] is the stock resolver, filled from
//! [`TypeDescriptor`]s at startup.
//!
//! Descriptors can extend a base descriptor. Flattening follows two rules:
//!
//! * base members come first, then the type's own members, each group in
//!   declaration order;
//! * an override replaces the getter of the base slot it overrides and keeps
//!   that slot's position.
//!
//! A type with an abstract member left unimplemented cannot be registered.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{AccessError, ResolveError};
use crate::shape::Serializable;

/// Source of member lists for record types.
///
/// Implementations are shared across threads and must not change what they
/// return for a type once the first serialization has started.
pub trait TypeResolver: Send + Sync {
    /// Members of the concrete type `type_id`, or `None` if unknown.
    fn resolve(&self, type_id: TypeId) -> Option<Arc<ResolvedType>>;
}

impl<R: TypeResolver + ?Sized> TypeResolver for &R {
    fn resolve(&self, type_id: TypeId) -> Option<Arc<ResolvedType>> {
        (**self).resolve(type_id)
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Arc<R> {
    fn resolve(&self, type_id: TypeId) -> Option<Arc<ResolvedType>> {
        (**self).resolve(type_id)
    }
}

/// Declared category of a member's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Boolean, number, string or date/time.
    Primitive,
    /// Ordered sequence.
    Collection,
    /// String-keyed map.
    Map,
    /// Nested record.
    Record,
    /// Anything; the value's own shape decides.
    Unknown,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Primitive => "primitive",
            MemberKind::Collection => "collection",
            MemberKind::Map => "map",
            MemberKind::Record => "record",
            MemberKind::Unknown => "unknown",
        }
    }

    /// Whether a value of kind `found` may fill a member declared as `self`.
    pub fn accepts(self, found: MemberKind) -> bool {
        self == MemberKind::Unknown || self == found
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member value read from a record.
pub enum Field<'a> {
    Borrowed(&'a dyn Serializable),
    Owned(Box<dyn Serializable + 'a>),
}

impl<'a> Field<'a> {
    pub fn as_dyn(&self) -> &dyn Serializable {
        match self {
            Field::Borrowed(value) => *value,
            Field::Owned(value) => value.as_ref(),
        }
    }
}

/// Any serializable value, including references, becomes an owned field.
impl<'a, T: Serializable + 'a> From<T> for Field<'a> {
    fn from(value: T) -> Self {
        Field::Owned(Box::new(value))
    }
}

/// Reads one member from a type-erased record.
pub type Getter = for<'a> fn(&'a dyn Any) -> Result<Field<'a>, AccessError>;

/// Downcast a record to its concrete type inside a getter.
pub fn downcast<T: Any>(record: &dyn Any) -> Result<&T, AccessError> {
    record.downcast_ref::<T>().ok_or_else(|| {
        AccessError::new(format!(
            "record is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Build a [`Getter`] from a typed accessor expression.
///
/// ```
/// use mfjson_core::{getter, Getter};
///
/// struct Person { name: String }
/// let read_name: Getter = getter!(Person, |p| &p.name);
/// ```
#[macro_export]
macro_rules! getter {
    ($ty:ty, |$this:ident| $body:expr) => {
        |record| {
            let $this = $crate::resolver::downcast::<$ty>(record)?;
            ::std::result::Result::Ok($crate::resolver::Field::from($body))
        }
    };
}

/// One member of a resolved type.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: Cow<'static, str>,
    kind: MemberKind,
    getter: Getter,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: MemberKind, getter: Getter) -> Self {
        Self {
            name: name.into(),
            kind,
            getter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Read this member from `record`.
    pub fn read<'a>(&self, record: &'a dyn Any) -> Result<Field<'a>, AccessError> {
        (self.getter)(record)
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The flattened, ordered member list of a concrete type.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    name: Cow<'static, str>,
    members: Vec<MemberDescriptor>,
}

impl ResolvedType {
    pub fn new(name: impl Into<Cow<'static, str>>, members: Vec<MemberDescriptor>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(MemberDescriptor::name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Plain,
    Abstract,
    Virtual,
    Override,
}

#[derive(Clone)]
struct Declaration {
    name: Cow<'static, str>,
    kind: MemberKind,
    modifier: Modifier,
    getter: Option<Getter>,
}

struct Slot {
    name: Cow<'static, str>,
    kind: MemberKind,
    getter: Option<Getter>,
    overridable: bool,
}

/// Declarative description of a record type and its base chain.
///
/// ```
/// use mfjson_core::{getter, MemberKind, TypeDescriptor};
///
/// struct Point { x: i32, y: i32 }
///
/// let point = TypeDescriptor::new("Point")
///     .member("x", MemberKind::Primitive, getter!(Point, |p| p.x))
///     .member("y", MemberKind::Primitive, getter!(Point, |p| p.y));
/// let resolved = point.resolve().unwrap();
/// assert_eq!(resolved.member_names().collect::<Vec<_>>(), ["x", "y"]);
/// ```
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    base: Option<Box<TypeDescriptor>>,
    declarations: Vec<Declaration>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            base: None,
            declarations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inherit the members of `base`.
    pub fn extends(mut self, base: TypeDescriptor) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    /// An ordinary member.
    pub fn member(
        self,
        name: impl Into<Cow<'static, str>>,
        kind: MemberKind,
        getter: Getter,
    ) -> Self {
        self.declare(name.into(), kind, Modifier::Plain, Some(getter))
    }

    /// A member that derived types must override.
    pub fn abstract_member(self, name: impl Into<Cow<'static, str>>, kind: MemberKind) -> Self {
        self.declare(name.into(), kind, Modifier::Abstract, None)
    }

    /// A member with a default getter that derived types may override.
    pub fn virtual_member(
        self,
        name: impl Into<Cow<'static, str>>,
        kind: MemberKind,
        getter: Getter,
    ) -> Self {
        self.declare(name.into(), kind, Modifier::Virtual, Some(getter))
    }

    /// Replace the getter of an abstract or virtual base member. The member
    /// keeps its kind and its position in the base order.
    pub fn override_member(self, name: impl Into<Cow<'static, str>>, getter: Getter) -> Self {
        self.declare(
            name.into(),
            MemberKind::Unknown,
            Modifier::Override,
            Some(getter),
        )
    }

    fn declare(
        mut self,
        name: Cow<'static, str>,
        kind: MemberKind,
        modifier: Modifier,
        getter: Option<Getter>,
    ) -> Self {
        self.declarations.push(Declaration {
            name,
            kind,
            modifier,
            getter,
        });
        self
    }

    fn flatten(&self) -> Result<Vec<Slot>, ResolveError> {
        let mut slots = match &self.base {
            Some(base) => base.flatten()?,
            None => Vec::new(),
        };

        for decl in &self.declarations {
            let existing = slots.iter().position(|slot| slot.name == decl.name);
            match (decl.modifier, existing) {
                (Modifier::Override, Some(index)) if slots[index].overridable => {
                    slots[index].getter = decl.getter;
                }
                (Modifier::Override, _) => {
                    return Err(ResolveError::InvalidOverride {
                        type_name: self.name.to_string(),
                        member: decl.name.to_string(),
                    });
                }
                (_, Some(_)) => {
                    return Err(ResolveError::DuplicateMember {
                        type_name: self.name.to_string(),
                        member: decl.name.to_string(),
                    });
                }
                (modifier, None) => slots.push(Slot {
                    name: decl.name.clone(),
                    kind: decl.kind,
                    getter: decl.getter,
                    overridable: matches!(modifier, Modifier::Abstract | Modifier::Virtual),
                }),
            }
        }

        Ok(slots)
    }

    /// Flatten the base chain into the concrete member list.
    pub fn resolve(&self) -> Result<ResolvedType, ResolveError> {
        let members = self
            .flatten()?
            .into_iter()
            .map(|slot| match slot.getter {
                Some(getter) => Ok(MemberDescriptor {
                    name: slot.name,
                    kind: slot.kind,
                    getter,
                }),
                None => Err(ResolveError::AbstractMember {
                    type_name: self.name.to_string(),
                    member: slot.name.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedType {
            name: self.name.clone(),
            members,
        })
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("base", &self.base.as_ref().map(|b| b.name()))
            .field(
                "members",
                &self
                    .declarations
                    .iter()
                    .map(|d| d.name.as_ref())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Resolver backed by a map from `TypeId` to flattened member lists.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: HashMap<TypeId, Arc<ResolvedType>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `descriptor` and register it for `T`, replacing any earlier
    /// registration.
    pub fn register<T: Any>(
        &mut self,
        descriptor: TypeDescriptor,
    ) -> Result<&mut Self, ResolveError> {
        let resolved = descriptor.resolve()?;
        debug!(
            type_name = resolved.name(),
            rust_type = std::any::type_name::<T>(),
            members = resolved.members.len(),
            "registered type descriptor"
        );
        self.types.insert(TypeId::of::<T>(), Arc::new(resolved));
        Ok(self)
    }

    /// Builder-style [`Registry::register`].
    pub fn with<T: Any>(mut self, descriptor: TypeDescriptor) -> Result<Self, ResolveError> {
        self.register::<T>(descriptor)?;
        Ok(self)
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for Registry {
    fn resolve(&self, type_id: TypeId) -> Option<Arc<ResolvedType>> {
        self.types.get(&type_id).cloned()
    }
}
