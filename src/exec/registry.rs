//! Maps card types to the behavior that runs them.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::cards::ActionCard;
use crate::core::CardIdentifier;
use crate::exec::executable::Executable;

/// Builds a fresh executable for one action card instance.
pub type ExecutableFactory = Arc<dyn Fn(&ActionCard) -> Arc<dyn Executable> + Send + Sync>;

/// Factory table from descriptor identifier to executable.
///
/// The executor instantiates through this table once per card per round,
/// so every repeat gets a fresh executable. The factory receives the
/// card and may inspect its bindings, but input resolution happens in
/// the engine; most factories ignore the card entirely.
///
/// ```
/// use std::sync::Arc;
/// use deckflow::cards::ActionCardDescriptor;
/// use deckflow::core::CardIdentifier;
/// use deckflow::exec::{ActionContext, ActionError, Executable, ExecutableRegistry, YieldBatch};
///
/// struct NoOp;
///
/// #[async_trait::async_trait]
/// impl Executable for NoOp {
///     fn setup(&self, _context: ActionContext) {}
///     async fn execute(&self) -> Result<YieldBatch, ActionError> {
///         Ok(Vec::new())
///     }
///     fn interrupt(&self) {}
///     fn teardown(&self) {}
///     fn is_finished(&self) -> bool {
///         true
///     }
/// }
///
/// let identifier = CardIdentifier::new("Action/Test", "NoOp");
/// let mut registry = ExecutableRegistry::new();
/// registry.register(identifier.clone(), |_card| Arc::new(NoOp));
///
/// let card = ActionCardDescriptor::new(identifier, "does nothing").instantiate();
/// assert!(registry.instantiate(&card).is_some());
/// ```
#[derive(Clone, Default)]
pub struct ExecutableRegistry {
    factories: FxHashMap<CardIdentifier, ExecutableFactory>,
}

impl ExecutableRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a card type.
    ///
    /// Panics if a factory with the same identifier already exists.
    pub fn register<F>(&mut self, identifier: CardIdentifier, factory: F)
    where
        F: Fn(&ActionCard) -> Arc<dyn Executable> + Send + Sync + 'static,
    {
        if self.factories.contains_key(&identifier) {
            panic!("Executable {identifier} already registered");
        }
        self.factories.insert(identifier, Arc::new(factory));
    }

    /// Whether a card type has a factory.
    #[must_use]
    pub fn contains(&self, identifier: &CardIdentifier) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Build a fresh executable for a card, if its type is registered.
    #[must_use]
    pub fn instantiate(&self, card: &ActionCard) -> Option<Arc<dyn Executable>> {
        self.factories
            .get(card.identifier())
            .map(|factory| factory(card))
    }

    /// How many card types are registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no card types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ExecutableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableRegistry")
            .field("registered", &self.factories.len())
            .finish()
    }
}
