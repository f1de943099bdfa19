use bevy::ecs::entity::Entity;
use bevy::utils::HashMap;

use crate::events::{ActivateEventArgs, DeactivateEventArgs};
use crate::interactable::Interactable;
use crate::registration::RegistrationList;

/// The update passes the [`InteractionManager`](crate::manager::InteractionManager) runs each
/// frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdatePhase {
    /// Runs with the fixed timestep, alongside physics.
    Fixed,
    /// Runs once per frame. Targets are only resolved in this phase.
    Dynamic,
    /// Runs once per frame after `Dynamic`.
    Late,
    /// Runs last in the frame, before rendering.
    OnBeforeRender,
}

/// Passed to the processing hooks of interactors and interactables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseContext {
    pub phase: UpdatePhase,
    /// Seconds since startup, as reported by the host clock.
    pub elapsed_seconds: f32,
}

/// Maps colliders to the interactable that owns them.
pub trait ColliderLookup {
    fn interactable_for_collider(&self, collider: Entity) -> Option<Entity>;
}

impl ColliderLookup for HashMap<Entity, Entity> {
    fn interactable_for_collider(&self, collider: Entity) -> Option<Entity> {
        self.get(&collider).copied()
    }
}

/// Read-only view of the registered interactables, handed to interactors so they can resolve
/// colliders and rank candidates.
#[derive(Clone, Copy)]
pub struct InteractionContext<'a> {
    colliders: &'a HashMap<Entity, Entity>,
    interactables: &'a RegistrationList<Entity>,
    components: &'a HashMap<Entity, Box<dyn Interactable>>,
}

impl<'a> InteractionContext<'a> {
    pub fn new(
        colliders: &'a HashMap<Entity, Entity>,
        interactables: &'a RegistrationList<Entity>,
        components: &'a HashMap<Entity, Box<dyn Interactable>>,
    ) -> Self {
        Self {
            colliders,
            interactables,
            components,
        }
    }

    pub fn is_interactable_registered(&self, interactable: Entity) -> bool {
        self.interactables.is_registered(&interactable)
    }

    /// The interactable component stored for `interactable`, registered or not.
    pub fn interactable(&self, interactable: Entity) -> Option<&'a dyn Interactable> {
        self.components.get(&interactable).map(|component| &**component)
    }
}

impl ColliderLookup for InteractionContext<'_> {
    fn interactable_for_collider(&self, collider: Entity) -> Option<Entity> {
        self.colliders.get(&collider).copied()
    }
}

/// A change requested from inside a hook, applied by the manager once the hook returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionCommand {
    RegisterInteractor(Entity),
    UnregisterInteractor(Entity),
    RegisterInteractable(Entity),
    UnregisterInteractable(Entity),
    ForceSelect {
        interactor: Entity,
        interactable: Entity,
    },
    SelectExit {
        interactor: Entity,
        interactable: Entity,
    },
    Activate(ActivateEventArgs),
    Deactivate(DeactivateEventArgs),
}

/// Queue of [`InteractionCommand`]s filled by interactor and interactable hooks.
#[derive(Clone, Debug, Default)]
pub struct InteractionCommands {
    queue: Vec<InteractionCommand>,
}

impl InteractionCommands {
    pub fn push(&mut self, command: InteractionCommand) {
        self.queue.push(command);
    }

    pub fn register_interactor(&mut self, interactor: Entity) {
        self.push(InteractionCommand::RegisterInteractor(interactor));
    }

    pub fn unregister_interactor(&mut self, interactor: Entity) {
        self.push(InteractionCommand::UnregisterInteractor(interactor));
    }

    pub fn register_interactable(&mut self, interactable: Entity) {
        self.push(InteractionCommand::RegisterInteractable(interactable));
    }

    pub fn unregister_interactable(&mut self, interactable: Entity) {
        self.push(InteractionCommand::UnregisterInteractable(interactable));
    }

    pub fn force_select(&mut self, interactor: Entity, interactable: Entity) {
        self.push(InteractionCommand::ForceSelect {
            interactor,
            interactable,
        });
    }

    pub fn select_exit(&mut self, interactor: Entity, interactable: Entity) {
        self.push(InteractionCommand::SelectExit {
            interactor,
            interactable,
        });
    }

    pub fn activate(&mut self, interactor: Entity, interactable: Entity) {
        self.push(InteractionCommand::Activate(ActivateEventArgs {
            interactor,
            interactable,
        }));
    }

    pub fn deactivate(&mut self, interactor: Entity, interactable: Entity) {
        self.push(InteractionCommand::Deactivate(DeactivateEventArgs {
            interactor,
            interactable,
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionCommand> {
        self.queue.iter()
    }
}

impl IntoIterator for InteractionCommands {
    type Item = InteractionCommand;
    type IntoIter = std::vec::IntoIter<InteractionCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.queue.into_iter()
    }
}
