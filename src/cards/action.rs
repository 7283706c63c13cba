//! Action card instances.
//!
//! An `ActionCard` is one materialized executable card: descriptor metadata
//! plus the bindings wired up during authoring. Bindings are slot-checked as
//! they are made; a failed bind leaves the card untouched.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{CardIdentifier, CardInstanceId, YieldId};

use super::deck_card::TokenCard;
use super::descriptor::ActionCardDescriptor;
use super::input::{BindError, InputBinding, InputSlot, InputValue, YieldSlot};

/// One materialized action card.
///
/// Carries its full descriptor: input, token, and yield declarations are
/// needed every time the card is bound or executed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionCard {
    id: CardInstanceId,
    descriptor: ActionCardDescriptor,
    input_bindings: FxHashMap<String, InputBinding>,
    token_bindings: FxHashMap<String, CardInstanceId>,
}

impl ActionCard {
    /// Mint an unbound card with a fresh instance identity.
    #[must_use]
    pub fn new(descriptor: ActionCardDescriptor) -> Self {
        Self {
            id: CardInstanceId::new(),
            descriptor,
            input_bindings: FxHashMap::default(),
            token_bindings: FxHashMap::default(),
        }
    }

    /// Instance identity.
    #[must_use]
    pub fn id(&self) -> CardInstanceId {
        self.id
    }

    /// Descriptor identity.
    #[must_use]
    pub fn identifier(&self) -> &CardIdentifier {
        &self.descriptor.identifier
    }

    /// The descriptor this card was minted from.
    #[must_use]
    pub fn descriptor(&self) -> &ActionCardDescriptor {
        &self.descriptor
    }

    /// Whether the action finishes on its own.
    #[must_use]
    pub fn ends(&self) -> bool {
        self.descriptor.ends
    }

    /// Yields the action declares.
    #[must_use]
    pub fn yields(&self) -> &[YieldSlot] {
        &self.descriptor.yields
    }

    /// Bind an input slot. The card is unchanged on error.
    ///
    /// Value and card bindings are type-checked here; yield references are
    /// deferred to validation, which knows the producer's declaration.
    pub fn bind_input(&mut self, slot: &str, binding: InputBinding) -> Result<(), BindError> {
        let declared = self
            .descriptor
            .input_slot(slot)
            .ok_or_else(|| BindError::UnknownInputSlot(slot.to_string()))?;

        if let InputBinding::Card(card) = &binding {
            if card.value.is_none() {
                return Err(BindError::EmptyInputCard(slot.to_string()));
            }
        }
        if let Some(kind) = binding.static_kind() {
            if kind != declared.expects {
                return Err(BindError::TypeMismatch {
                    slot: slot.to_string(),
                    expected: declared.expects,
                    actual: kind,
                });
            }
        }

        self.input_bindings.insert(slot.to_string(), binding);
        Ok(())
    }

    /// Bind a literal value to an input slot.
    pub fn bind_value(
        &mut self,
        slot: &str,
        value: impl Into<InputValue>,
    ) -> Result<(), BindError> {
        self.bind_input(slot, InputBinding::Value(value.into()))
    }

    /// Bind another card's yield to an input slot.
    pub fn bind_yield_of(
        &mut self,
        slot: &str,
        producer: CardInstanceId,
        yield_id: YieldId,
    ) -> Result<(), BindError> {
        self.bind_input(slot, InputBinding::YieldOf { producer, yield_id })
    }

    /// Bind a token card to a token slot.
    pub fn bind_token(&mut self, slot: &str, token: &TokenCard) -> Result<(), BindError> {
        if self.descriptor.token_slot(slot).is_none() {
            return Err(BindError::UnknownTokenSlot(slot.to_string()));
        }
        self.token_bindings.insert(slot.to_string(), token.id);
        Ok(())
    }

    /// The binding on an input slot, if any.
    #[must_use]
    pub fn input_binding(&self, slot: &str) -> Option<&InputBinding> {
        self.input_bindings.get(slot)
    }

    /// Whether an input slot has a binding.
    #[must_use]
    pub fn is_bound(&self, slot: &str) -> bool {
        self.input_bindings.contains_key(slot)
    }

    /// The token card bound to a token slot, if any.
    #[must_use]
    pub fn token_binding(&self, slot: &str) -> Option<CardInstanceId> {
        self.token_bindings.get(slot).copied()
    }

    /// All input bindings.
    pub fn input_bindings(&self) -> impl Iterator<Item = (&str, &InputBinding)> {
        self.input_bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All token bindings.
    pub fn token_bindings(&self) -> impl Iterator<Item = (&str, CardInstanceId)> {
        self.token_bindings.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Mandatory input slots that have no binding yet.
    #[must_use]
    pub fn unbound_mandatory_slots(&self) -> Vec<&InputSlot> {
        self.descriptor
            .input_slots
            .iter()
            .filter(|slot| slot.mandatory && !self.input_bindings.contains_key(&slot.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::descriptor::InputCardDescriptor;
    use crate::cards::descriptor::TokenCardDescriptor;
    use crate::cards::input::InputType;
    use std::time::Duration;

    fn timer_descriptor() -> ActionCardDescriptor {
        ActionCardDescriptor::new(
            CardIdentifier::new("Action/Trigger/Time", "Timer"),
            "Fires after a duration elapses",
        )
        .with_input_slot("duration", InputType::Duration, true)
        .with_input_slot("label", InputType::Text, false)
        .with_token_slot("clock")
        .with_yield(InputType::Duration)
    }

    #[test]
    fn test_bind_value() {
        let mut card = timer_descriptor().instantiate();
        assert!(!card.is_bound("duration"));

        card.bind_value("duration", Duration::from_secs(5)).unwrap();
        assert!(card.is_bound("duration"));
        assert_eq!(
            card.input_binding("duration"),
            Some(&InputBinding::Value(InputValue::Duration(Duration::from_secs(5))))
        );
    }

    #[test]
    fn test_bind_type_mismatch_leaves_card_unchanged() {
        let mut card = timer_descriptor().instantiate();

        let err = card.bind_value("duration", 5i64).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
        assert!(!card.is_bound("duration"));
    }

    #[test]
    fn test_bind_unknown_slot() {
        let mut card = timer_descriptor().instantiate();
        let err = card.bind_value("altitude", 10.0).unwrap_err();
        assert_eq!(err, BindError::UnknownInputSlot("altitude".to_string()));
    }

    #[test]
    fn test_bind_input_card() {
        let desc = InputCardDescriptor::new(
            CardIdentifier::new("Input/Time", "Duration"),
            "A time span",
            InputType::Duration,
        );

        let mut card = timer_descriptor().instantiate();

        // Unbound input cards are refused outright.
        let empty = desc.instantiate();
        let err = card.bind_input("duration", InputBinding::Card(empty)).unwrap_err();
        assert!(matches!(err, BindError::EmptyInputCard(_)));

        let mut filled = desc.instantiate();
        filled.bind(Duration::from_secs(2)).unwrap();
        card.bind_input("duration", InputBinding::Card(filled)).unwrap();
        assert!(card.is_bound("duration"));
    }

    #[test]
    fn test_bind_yield_reference_defers_type_check() {
        let mut card = timer_descriptor().instantiate();
        let producer = CardInstanceId::new();

        card.bind_yield_of("duration", producer, YieldId::new(0)).unwrap();
        assert!(card.is_bound("duration"));
    }

    #[test]
    fn test_bind_token() {
        let token = TokenCardDescriptor::new(
            CardIdentifier::new("Token", "Clock"),
            "A clock resource",
            false,
        )
        .instantiate();

        let mut card = timer_descriptor().instantiate();
        card.bind_token("clock", &token).unwrap();
        assert_eq!(card.token_binding("clock"), Some(token.id));

        let err = card.bind_token("camera", &token).unwrap_err();
        assert_eq!(err, BindError::UnknownTokenSlot("camera".to_string()));
    }

    #[test]
    fn test_unbound_mandatory_slots() {
        let mut card = timer_descriptor().instantiate();
        let unbound: Vec<_> = card
            .unbound_mandatory_slots()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(unbound, vec!["duration".to_string()]);

        card.bind_value("duration", Duration::from_secs(1)).unwrap();
        assert!(card.unbound_mandatory_slots().is_empty());
    }

    #[test]
    fn test_serialization() {
        let mut card = timer_descriptor().instantiate();
        card.bind_value("duration", Duration::from_secs(5)).unwrap();
        card.bind_value("label", "takeoff").unwrap();

        let json = serde_json::to_string(&card).unwrap();
        let back: ActionCard = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
        assert_eq!(back.id(), card.id());
    }
}
