use bevy::ecs::entity::Entity;
use bevy::ecs::event::Event;

/// Sent when an interactor starts hovering an interactable.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoverEnterEventArgs {
    pub interactor: Entity,
    pub interactable: Entity,
}

/// Sent when an interactor stops hovering an interactable.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoverExitEventArgs {
    pub interactor: Entity,
    pub interactable: Entity,
    /// The hover ended because one side was unregistered rather than through normal
    /// interaction.
    pub is_canceled: bool,
}

/// Sent when an interactor starts selecting an interactable.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectEnterEventArgs {
    pub interactor: Entity,
    pub interactable: Entity,
}

/// Sent when an interactor stops selecting an interactable.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectExitEventArgs {
    pub interactor: Entity,
    pub interactable: Entity,
    /// The selection ended because one side was unregistered rather than through normal
    /// interaction.
    pub is_canceled: bool,
}

/// Sent when an interactor activates the interactable it is selecting.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivateEventArgs {
    pub interactor: Entity,
    pub interactable: Entity,
}

/// Sent when an interactor deactivates the interactable it is selecting.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeactivateEventArgs {
    pub interactor: Entity,
    pub interactable: Entity,
}

/// Sent when an interactable goes from no hovering interactors to one.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FirstHoverEntered(pub HoverEnterEventArgs);

/// Sent when the last interactor hovering an interactable stops hovering it.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastHoverExited(pub HoverExitEventArgs);

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractorRegisteredEventArgs {
    pub interactor: Entity,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractorUnregisteredEventArgs {
    pub interactor: Entity,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractableRegisteredEventArgs {
    pub interactable: Entity,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractableUnregisteredEventArgs {
    pub interactable: Entity,
}

/// Every event produced by the [`InteractionManager`](crate::manager::InteractionManager), in the
/// order it was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
    HoverEntered(HoverEnterEventArgs),
    HoverExited(HoverExitEventArgs),
    FirstHoverEntered(HoverEnterEventArgs),
    LastHoverExited(HoverExitEventArgs),
    SelectEntered(SelectEnterEventArgs),
    SelectExited(SelectExitEventArgs),
    Activated(ActivateEventArgs),
    Deactivated(DeactivateEventArgs),
    InteractorRegistered(InteractorRegisteredEventArgs),
    InteractorUnregistered(InteractorUnregisteredEventArgs),
    InteractableRegistered(InteractableRegisteredEventArgs),
    InteractableUnregistered(InteractableUnregisteredEventArgs),
}
