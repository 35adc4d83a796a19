use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::message::ScreenId;
use crate::screen::Screen;
use crate::screens;

/// Constructor for a screen handler, called at most once per id.
pub type ScreenFactory = Box<dyn Fn(ScreenId) -> Box<dyn Screen>>;

struct Slot {
    name: &'static str,
    factory: ScreenFactory,
    instance: Option<Box<dyn Screen>>,
}

/// Collects screen registrations before the registry is frozen.
#[derive(Default)]
pub struct ScreenRegistryBuilder {
    slots: BTreeMap<ScreenId, Slot>,
}

impl ScreenRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `id` under a display name.
    pub fn register<F>(&mut self, id: u8, name: &'static str, factory: F) -> Result<&mut Self>
    where
        F: Fn(ScreenId) -> Box<dyn Screen> + 'static,
    {
        let id = ScreenId::try_from(id)?;
        if self.slots.contains_key(&id) {
            return Err(EngineError::DuplicateScreen(id));
        }
        self.slots.insert(
            id,
            Slot {
                name,
                factory: Box::new(factory),
                instance: None,
            },
        );
        Ok(self)
    }

    /// Register the three compiled-in screens at ids 0, 1 and 2.
    pub fn with_builtin_screens(mut self) -> Result<Self> {
        screens::register_builtin(&mut self)?;
        Ok(self)
    }

    /// Freeze the registration table. Screen 0 is required.
    pub fn build(self) -> Result<ScreenRegistry> {
        if !self.slots.contains_key(&ScreenId::DEFAULT) {
            return Err(EngineError::MissingDefaultScreen);
        }
        Ok(ScreenRegistry { slots: self.slots })
    }
}

/// Fixed mapping from screen ids to handlers.
///
/// The set of ids never changes after [`ScreenRegistryBuilder::build`]; a
/// handler is constructed the first time it is needed and kept afterwards.
pub struct ScreenRegistry {
    slots: BTreeMap<ScreenId, Slot>,
}

impl ScreenRegistry {
    pub fn builder() -> ScreenRegistryBuilder {
        ScreenRegistryBuilder::new()
    }

    /// Registry holding only the compiled-in screens.
    pub fn with_builtin_screens() -> Result<Self> {
        ScreenRegistryBuilder::new().with_builtin_screens()?.build()
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ScreenId> + '_ {
        self.slots.keys().copied()
    }

    pub fn contains(&self, id: ScreenId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the handler for `id` has been constructed.
    pub fn is_instantiated(&self, id: ScreenId) -> bool {
        self.slots
            .get(&id)
            .is_some_and(|slot| slot.instance.is_some())
    }

    /// Constructed handler for `id`.
    ///
    /// Fails for unregistered ids; returns `Ok(None)` while the handler has
    /// not been constructed yet.
    pub fn lookup(&self, id: ScreenId) -> Result<Option<&dyn Screen>> {
        let slot = self.slots.get(&id).ok_or(EngineError::UnknownScreen(id))?;
        Ok(slot.instance.as_deref())
    }

    /// Handler for `id`, constructing it on first use.
    pub fn instantiate(&mut self, id: ScreenId) -> Result<&mut dyn Screen> {
        let Slot { factory, instance, .. } = self
            .slots
            .get_mut(&id)
            .ok_or(EngineError::UnknownScreen(id))?;
        let screen = instance.get_or_insert_with(|| {
            debug!(screen = %id, "constructing screen handler");
            factory(id)
        });
        Ok(screen.as_mut())
    }

    /// Downcast a constructed handler to its concrete type.
    pub fn get_as<T: 'static>(&self, id: ScreenId) -> Option<&T> {
        self.slots
            .get(&id)?
            .instance
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    /// `(id, name)` of every registered screen in ascending order.
    pub fn describe(&self) -> Vec<(ScreenId, &'static str)> {
        self.slots.iter().map(|(id, slot)| (*id, slot.name)).collect()
    }
}

impl std::fmt::Debug for ScreenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}
