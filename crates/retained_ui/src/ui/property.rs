//! Named, type-checked property observers.
//!
//! Every node carries a [`PropertyObserver`] table mapping a property name to
//! the setters interested in it. All setters under one name share a single
//! [`PropertyKind`]; a second kind under the same name is rejected. Values
//! travel as the closed [`PropertyValue`] union and are converted to the
//! registered kind before any setter runs, so the builder can style widgets
//! generically ("color", "text", "value", ...) without per-widget setters.

use crate::error::UiError;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::ui::tree::UiTree;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// 32-bit float
    Float(f32),
    /// Signed integer
    Int(i64),
    /// Boolean flag
    Bool(bool),
    /// Text
    String(String),
    /// 2D vector
    Vec2(Vec2),
    /// 3D vector
    Vec3(Vec3),
    /// 4D vector (edges, colors)
    Vec4(Vec4),
    /// Enumeration discriminant
    Enum(u32),
    /// Reference to another node
    Ref(NodeId),
}

/// The type tag of a [`PropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// [`PropertyValue::Float`]
    Float,
    /// [`PropertyValue::Int`]
    Int,
    /// [`PropertyValue::Bool`]
    Bool,
    /// [`PropertyValue::String`]
    String,
    /// [`PropertyValue::Vec2`]
    Vec2,
    /// [`PropertyValue::Vec3`]
    Vec3,
    /// [`PropertyValue::Vec4`]
    Vec4,
    /// [`PropertyValue::Enum`]
    Enum,
    /// [`PropertyValue::Ref`]
    Ref,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl PropertyValue {
    /// The kind of this value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Float(_) => PropertyKind::Float,
            Self::Int(_) => PropertyKind::Int,
            Self::Bool(_) => PropertyKind::Bool,
            Self::String(_) => PropertyKind::String,
            Self::Vec2(_) => PropertyKind::Vec2,
            Self::Vec3(_) => PropertyKind::Vec3,
            Self::Vec4(_) => PropertyKind::Vec4,
            Self::Enum(_) => PropertyKind::Enum,
            Self::Ref(_) => PropertyKind::Ref,
        }
    }

    /// Convert to `kind` if the conversion is lossless in intent.
    ///
    /// Allowed: identity, integer widening to float, and integer/enum
    /// exchange (same representation). Everything else fails.
    pub fn convert_to(self, kind: PropertyKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self);
        }
        match (self, kind) {
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(v), PropertyKind::Float) => Some(Self::Float(v as f32)),
            (Self::Int(v), PropertyKind::Enum) => u32::try_from(v).ok().map(Self::Enum),
            (Self::Enum(v), PropertyKind::Int) => Some(Self::Int(i64::from(v))),
            _ => None,
        }
    }
}

/// Rust types that map onto one [`PropertyKind`].
pub trait PropertyType: Sized + 'static {
    /// Kind registered for observers of this type
    const KIND: PropertyKind;

    /// Extract from an already converted value
    fn from_value(value: PropertyValue) -> Option<Self>;

    /// Wrap into a property value
    fn into_value(self) -> PropertyValue;
}

macro_rules! impl_property_type {
    ($ty:ty, $variant:ident) => {
        impl PropertyType for $ty {
            const KIND: PropertyKind = PropertyKind::$variant;

            fn from_value(value: PropertyValue) -> Option<Self> {
                match value {
                    PropertyValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_value(self) -> PropertyValue {
                PropertyValue::$variant(self)
            }
        }

        impl From<$ty> for PropertyValue {
            fn from(value: $ty) -> Self {
                PropertyValue::$variant(value)
            }
        }
    };
}

impl_property_type!(f32, Float);
impl_property_type!(i64, Int);
impl_property_type!(bool, Bool);
impl_property_type!(String, String);
impl_property_type!(Vec2, Vec2);
impl_property_type!(Vec3, Vec3);
impl_property_type!(Vec4, Vec4);
impl_property_type!(NodeId, Ref);

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Property registration and conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A setter of a different kind is already registered under the name
    #[error("property '{name}' already observed as {registered}, cannot observe as {requested}")]
    Conflict {
        /// Property name
        name: String,
        /// Kind already registered
        registered: PropertyKind,
        /// Kind of the rejected registration
        requested: PropertyKind,
    },

    /// The value cannot be converted to the registered kind
    #[error("property '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Property name
        name: String,
        /// Registered kind
        expected: PropertyKind,
        /// Kind of the supplied value
        found: PropertyKind,
    },
}

/// A setter closure invoked with the tree, the owning node and the converted value.
pub type Setter = Box<dyn FnMut(&mut UiTree, NodeId, PropertyValue) -> Result<(), UiError>>;

struct ObservedProperty {
    kind: PropertyKind,
    setters: Vec<Setter>,
}

/// Per-node registry of named property setters.
#[derive(Default)]
pub struct PropertyObserver {
    entries: HashMap<String, ObservedProperty>,
}

impl fmt::Debug for PropertyObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.iter().map(|(n, e)| (n.as_str(), e.kind)).collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        f.debug_struct("PropertyObserver").field("entries", &names).finish()
    }
}

impl PropertyObserver {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an untyped setter under `name`.
    pub fn observe_raw(&mut self, name: &str, kind: PropertyKind, setter: Setter) -> Result<(), PropertyError> {
        match self.entries.get_mut(name) {
            Some(entry) if entry.kind != kind => Err(PropertyError::Conflict {
                name: name.to_string(),
                registered: entry.kind,
                requested: kind,
            }),
            Some(entry) => {
                entry.setters.push(setter);
                Ok(())
            }
            None => {
                self.entries.insert(name.to_string(), ObservedProperty { kind, setters: vec![setter] });
                Ok(())
            }
        }
    }

    /// Register a typed setter under `name`.
    pub fn observe<T, F>(&mut self, name: &str, mut setter: F) -> Result<(), PropertyError>
    where
        T: PropertyType,
        F: FnMut(&mut UiTree, NodeId, T) -> Result<(), UiError> + 'static,
    {
        let property = name.to_string();
        self.observe_raw(
            name,
            T::KIND,
            Box::new(move |tree, node, value| {
                let found = value.kind();
                let typed = T::from_value(value).ok_or_else(|| PropertyError::TypeMismatch {
                    name: property.clone(),
                    expected: T::KIND,
                    found,
                })?;
                setter(tree, node, typed)
            }),
        )
    }

    /// Kind registered under `name`, if any.
    pub fn kind_of(&self, name: &str) -> Option<PropertyKind> {
        self.entries.get(name).map(|entry| entry.kind)
    }

    /// Whether anything observes `name`.
    pub fn is_observed(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names currently observed, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Convert `value` for `name` and detach its setters so they can run
    /// against the tree. Returns `Ok(None)` when nothing observes `name`.
    pub(crate) fn prepare(
        &mut self,
        name: &str,
        value: PropertyValue,
    ) -> Result<Option<(PropertyValue, Vec<Setter>)>, PropertyError> {
        let Some(entry) = self.entries.get_mut(name) else {
            return Ok(None);
        };
        let found = value.kind();
        let converted = value.convert_to(entry.kind).ok_or_else(|| PropertyError::TypeMismatch {
            name: name.to_string(),
            expected: entry.kind,
            found,
        })?;
        Ok(Some((converted, std::mem::take(&mut entry.setters))))
    }

    /// Reattach setters detached by [`Self::prepare`], ahead of any that were
    /// registered while they ran.
    pub(crate) fn restore(&mut self, name: &str, mut setters: Vec<Setter>) {
        if let Some(entry) = self.entries.get_mut(name) {
            setters.append(&mut entry.setters);
            entry.setters = setters;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Setter {
        Box::new(|_, _, _| Ok(()))
    }

    #[test]
    fn test_conflicting_kind_is_rejected() {
        let mut observer = PropertyObserver::new();
        observer.observe_raw("value", PropertyKind::Float, noop()).unwrap();
        observer.observe_raw("value", PropertyKind::Float, noop()).unwrap();

        let err = observer.observe_raw("value", PropertyKind::String, noop()).unwrap_err();
        assert_eq!(
            err,
            PropertyError::Conflict {
                name: "value".to_string(),
                registered: PropertyKind::Float,
                requested: PropertyKind::String,
            }
        );
    }

    #[test]
    fn test_typed_observe_registers_kind() {
        let mut observer = PropertyObserver::new();
        observer.observe::<Vec4, _>("color", |_, _, _| Ok(())).unwrap();
        assert_eq!(observer.kind_of("color"), Some(PropertyKind::Vec4));
        assert!(observer.observe::<f32, _>("color", |_, _, _| Ok(())).is_err());
        assert_eq!(observer.names(), vec!["color"]);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(PropertyValue::Int(3).convert_to(PropertyKind::Float), Some(PropertyValue::Float(3.0)));
        assert_eq!(PropertyValue::Int(2).convert_to(PropertyKind::Enum), Some(PropertyValue::Enum(2)));
        assert_eq!(PropertyValue::Int(-1).convert_to(PropertyKind::Enum), None);
        assert_eq!(PropertyValue::Enum(7).convert_to(PropertyKind::Int), Some(PropertyValue::Int(7)));
        assert_eq!(PropertyValue::from("oops").convert_to(PropertyKind::Float), None);
        assert_eq!(PropertyValue::Float(1.5).convert_to(PropertyKind::Int), None);
    }

    #[test]
    fn test_prepare_rejects_unconvertible_value() {
        let mut observer = PropertyObserver::new();
        observer.observe::<f32, _>("value", |_, _, _| Ok(())).unwrap();

        let err = observer.prepare("value", PropertyValue::from("oops")).err().unwrap();
        assert!(matches!(err, PropertyError::TypeMismatch { expected: PropertyKind::Float, found: PropertyKind::String, .. }));

        let ok = observer.prepare("value", PropertyValue::Int(4)).unwrap().unwrap();
        assert_eq!(ok.0, PropertyValue::Float(4.0));
        assert_eq!(ok.1.len(), 1);
        observer.restore("value", ok.1);

        assert!(observer.prepare("missing", PropertyValue::Bool(true)).unwrap().is_none());
    }
}
