//! Typed inputs, yields, and bindings.
//!
//! Action cards consume *inputs* (slot name -> value) and produce *yields*
//! (indexed values available to later hands). Both sides of that flow share
//! one closed value vocabulary:
//!
//! - `Int`: whole numbers (counts, indices)
//! - `Real`: measurements (distance, altitude)
//! - `Bool`: flags
//! - `Text`: free-form strings
//! - `Coordinate2D`: latitude/longitude pairs
//! - `Duration`: time spans
//!
//! A slot is *bound* by an `InputBinding`: a literal value, an input card
//! carrying a value, or a reference to another card's yield resolved at
//! execution time.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::core::{CardIdentifier, CardInstanceId, YieldId};

/// The type of an input or yield value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    /// Whole number.
    Int,
    /// Floating-point measurement.
    Real,
    /// Flag.
    Bool,
    /// Free-form string.
    Text,
    /// Latitude/longitude pair.
    Coordinate2D,
    /// Time span.
    Duration,
}

/// A latitude/longitude pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate2D {
    /// Degrees latitude, north positive.
    pub latitude: f64,
    /// Degrees longitude, east positive.
    pub longitude: f64,
}

impl Coordinate2D {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A value flowing through an input slot or yield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    /// Whole number.
    Int(i64),
    /// Floating-point measurement.
    Real(f64),
    /// Flag.
    Bool(bool),
    /// Free-form string.
    Text(String),
    /// Latitude/longitude pair.
    Coordinate2D(Coordinate2D),
    /// Time span.
    Duration(Duration),
}

impl InputValue {
    /// The type this value inhabits.
    #[must_use]
    pub fn kind(&self) -> InputType {
        match self {
            InputValue::Int(_) => InputType::Int,
            InputValue::Real(_) => InputType::Real,
            InputValue::Bool(_) => InputType::Bool,
            InputValue::Text(_) => InputType::Text,
            InputValue::Coordinate2D(_) => InputType::Coordinate2D,
            InputValue::Duration(_) => InputType::Duration,
        }
    }

    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            InputValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as float if this is a Real value.
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            InputValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InputValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as coordinate if this is a Coordinate2D value.
    #[must_use]
    pub fn as_coordinate(&self) -> Option<Coordinate2D> {
        match self {
            InputValue::Coordinate2D(c) => Some(*c),
            _ => None,
        }
    }

    /// Get as duration if this is a Duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            InputValue::Duration(d) => Some(*d),
            _ => None,
        }
    }
}

// Convenient From implementations
impl From<i64> for InputValue {
    fn from(v: i64) -> Self {
        InputValue::Int(v)
    }
}

impl From<i32> for InputValue {
    fn from(v: i32) -> Self {
        InputValue::Int(v as i64)
    }
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Real(v)
    }
}

impl From<bool> for InputValue {
    fn from(v: bool) -> Self {
        InputValue::Bool(v)
    }
}

impl From<String> for InputValue {
    fn from(v: String) -> Self {
        InputValue::Text(v)
    }
}

impl From<&str> for InputValue {
    fn from(v: &str) -> Self {
        InputValue::Text(v.to_string())
    }
}

impl From<Coordinate2D> for InputValue {
    fn from(v: Coordinate2D) -> Self {
        InputValue::Coordinate2D(v)
    }
}

impl From<Duration> for InputValue {
    fn from(v: Duration) -> Self {
        InputValue::Duration(v)
    }
}

/// An input slot declared by an action descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSlot {
    /// Slot name, unique within the descriptor.
    pub name: String,
    /// Type a binding must carry.
    pub expects: InputType,
    /// Whether execution requires this slot bound.
    pub mandatory: bool,
}

impl InputSlot {
    /// Declare a slot.
    #[must_use]
    pub fn new(name: impl Into<String>, expects: InputType, mandatory: bool) -> Self {
        Self {
            name: name.into(),
            expects,
            mandatory,
        }
    }
}

/// A token slot declared by an action descriptor.
///
/// Tokens stand for physical resources owned by the deck; the slot only
/// names which resource the action wants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSlot {
    /// Slot name, unique within the descriptor.
    pub name: String,
}

impl TokenSlot {
    /// Declare a token slot.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A yield slot declared by an action descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldSlot {
    /// Position in the descriptor's yield declaration.
    pub id: YieldId,
    /// Type the action will produce here.
    pub expects: InputType,
}

impl YieldSlot {
    /// Declare a yield slot.
    #[must_use]
    pub const fn new(id: YieldId, expects: InputType) -> Self {
        Self { id, expects }
    }
}

/// An input card: a value wrapped in card form so it can be authored,
/// cataloged, and bound like everything else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputCard {
    /// Instance identity.
    pub id: CardInstanceId,
    /// Descriptor identity.
    pub identifier: CardIdentifier,
    /// Type this card carries.
    pub expects: InputType,
    /// Bound value, if any.
    pub value: Option<InputValue>,
}

impl InputCard {
    /// Bind a value, enforcing the card's declared type.
    ///
    /// The card is unchanged on error.
    pub fn bind(&mut self, value: impl Into<InputValue>) -> Result<(), BindError> {
        let value = value.into();
        if value.kind() != self.expects {
            return Err(BindError::TypeMismatch {
                slot: self.identifier.name.clone(),
                expected: self.expects,
                actual: value.kind(),
            });
        }
        self.value = Some(value);
        Ok(())
    }

    /// The bound value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&InputValue> {
        self.value.as_ref()
    }
}

/// How an input slot gets its value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputBinding {
    /// A literal value.
    Value(InputValue),
    /// An input card carrying a value.
    Card(InputCard),
    /// Another card's yield, resolved when the consuming hand runs.
    YieldOf {
        /// The producing action card instance.
        producer: CardInstanceId,
        /// Which of its yields.
        yield_id: YieldId,
    },
}

impl InputBinding {
    /// The binding's type, when it is knowable without running anything.
    ///
    /// Yield references return `None`; their type is checked against the
    /// producer's declaration during validation.
    #[must_use]
    pub fn static_kind(&self) -> Option<InputType> {
        match self {
            InputBinding::Value(v) => Some(v.kind()),
            InputBinding::Card(card) => Some(card.expects),
            InputBinding::YieldOf { .. } => None,
        }
    }
}

/// Errors from binding values to slots.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BindError {
    /// The binding's type does not match what the slot expects.
    #[error("slot '{slot}' expects {expected:?}, got {actual:?}")]
    TypeMismatch {
        /// Slot being bound.
        slot: String,
        /// Declared type.
        expected: InputType,
        /// Offered type.
        actual: InputType,
    },

    /// No input slot with this name.
    #[error("no input slot named '{0}'")]
    UnknownInputSlot(String),

    /// No token slot with this name.
    #[error("no token slot named '{0}'")]
    UnknownTokenSlot(String),

    /// The input card offered for a slot has no value bound yet.
    #[error("input card for slot '{0}' carries no value")]
    EmptyInputCard(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(InputValue::Int(3).kind(), InputType::Int);
        assert_eq!(InputValue::Real(1.5).kind(), InputType::Real);
        assert_eq!(InputValue::Bool(true).kind(), InputType::Bool);
        assert_eq!(InputValue::Text("hi".into()).kind(), InputType::Text);
        assert_eq!(
            InputValue::Coordinate2D(Coordinate2D::new(47.6, -122.3)).kind(),
            InputType::Coordinate2D
        );
        assert_eq!(
            InputValue::Duration(Duration::from_secs(5)).kind(),
            InputType::Duration
        );
    }

    #[test]
    fn test_value_accessors() {
        let val = InputValue::Int(5);
        assert_eq!(val.as_int(), Some(5));
        assert_eq!(val.as_bool(), None);

        let text = InputValue::Text("waypoint".into());
        assert_eq!(text.as_text(), Some("waypoint"));
        assert_eq!(text.as_real(), None);

        let dur = InputValue::Duration(Duration::from_millis(250));
        assert_eq!(dur.as_duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_value_from() {
        let int: InputValue = 42i32.into();
        assert_eq!(int.as_int(), Some(42));

        let real: InputValue = 2.5f64.into();
        assert_eq!(real.as_real(), Some(2.5));

        let text: InputValue = "hover".into();
        assert_eq!(text.as_text(), Some("hover"));

        let coord: InputValue = Coordinate2D::new(1.0, 2.0).into();
        assert_eq!(coord.as_coordinate(), Some(Coordinate2D::new(1.0, 2.0)));
    }

    #[test]
    fn test_input_card_bind_enforces_type() {
        let mut card = InputCard {
            id: CardInstanceId::new(),
            identifier: CardIdentifier::new("Input/Time", "Duration"),
            expects: InputType::Duration,
            value: None,
        };

        let err = card.bind(7i64).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
        assert!(card.value().is_none());

        card.bind(Duration::from_secs(3)).unwrap();
        assert_eq!(
            card.value().and_then(|v| v.as_duration()),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_binding_static_kind() {
        let value = InputBinding::Value(InputValue::Bool(true));
        assert_eq!(value.static_kind(), Some(InputType::Bool));

        let yielded = InputBinding::YieldOf {
            producer: CardInstanceId::new(),
            yield_id: YieldId::new(0),
        };
        assert_eq!(yielded.static_kind(), None);
    }

    #[test]
    fn test_serialization() {
        let slot = InputSlot::new("duration", InputType::Duration, true);
        let json = serde_json::to_string(&slot).unwrap();
        let back: InputSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(slot, back);

        let binding = InputBinding::Value(InputValue::Coordinate2D(Coordinate2D::new(0.5, 9.9)));
        let json = serde_json::to_string(&binding).unwrap();
        let back: InputBinding = serde_json::from_str(&json).unwrap();
        assert_eq!(binding, back);
    }
}
