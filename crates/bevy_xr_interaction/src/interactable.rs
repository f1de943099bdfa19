use bevy::ecs::entity::Entity;
use bevy::log::error;
use bevy::math::Vec3;

use crate::context::{InteractionCommands, PhaseContext};
use crate::events::{
    ActivateEventArgs, DeactivateEventArgs, HoverEnterEventArgs, HoverExitEventArgs,
    InteractableRegisteredEventArgs, InteractableUnregisteredEventArgs, SelectEnterEventArgs,
    SelectExitEventArgs,
};
use crate::interactor::{AsAny, Interactor};
use crate::layers::InteractionLayerMask;

/// A collider belonging to an interactable, with its last known world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractableCollider {
    pub entity: Entity,
    pub position: Vec3,
}

impl InteractableCollider {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            position: Vec3::ZERO,
        }
    }

    pub fn at(entity: Entity, position: Vec3) -> Self {
        Self { entity, position }
    }
}

/// Settings and hover/select bookkeeping shared by every [`Interactable`].
#[derive(Clone, Debug, Default)]
pub struct InteractableState {
    pub interaction_layers: InteractionLayerMask,
    /// Colliders mapped to this interactable while it is registered.
    pub colliders: Vec<InteractableCollider>,
    hovering_interactors: Vec<Entity>,
    selecting_interactor: Option<Entity>,
}

impl InteractableState {
    pub fn with_colliders(colliders: impl IntoIterator<Item = InteractableCollider>) -> Self {
        Self {
            colliders: colliders.into_iter().collect(),
            ..Self::default()
        }
    }

    /// The interactors hovering this interactable, in the order hovering started.
    pub fn hovering_interactors(&self) -> &[Entity] {
        &self.hovering_interactors
    }

    pub fn selecting_interactor(&self) -> Option<Entity> {
        self.selecting_interactor
    }

    pub fn is_hovered(&self) -> bool {
        !self.hovering_interactors.is_empty()
    }

    pub fn is_selected(&self) -> bool {
        self.selecting_interactor.is_some()
    }

    /// Squared distance from `point` to the nearest collider, or [`f32::MAX`] without colliders.
    pub fn distance_sqr(&self, point: Vec3) -> f32 {
        self.colliders
            .iter()
            .map(|collider| collider.position.distance_squared(point))
            .fold(f32::MAX, f32::min)
    }

    pub(crate) fn hover_entering(&mut self, interactor: Entity) {
        self.hovering_interactors.push(interactor);
    }

    pub(crate) fn hover_exiting(&mut self, interactor: Entity) {
        let index = self.hovering_interactors.iter().position(|e| *e == interactor);
        debug_assert!(index.is_some(), "interactable was not hovered by {interactor:?}");
        match index {
            Some(index) => {
                self.hovering_interactors.remove(index);
            }
            None => error!("Interactable hover exit from {interactor:?} which was not hovering it"),
        }
    }

    pub(crate) fn select_entering(&mut self, interactor: Entity) {
        self.selecting_interactor = Some(interactor);
    }

    pub(crate) fn select_exiting(&mut self, interactor: Entity) {
        debug_assert_eq!(
            self.selecting_interactor,
            Some(interactor),
            "selecting interactor does not match"
        );
        if self.selecting_interactor == Some(interactor) {
            self.selecting_interactor = None;
        } else {
            error!(
                "Interactable select exit from {interactor:?} but it is selected by {:?}",
                self.selecting_interactor
            );
        }
    }
}

/// Something that can be hovered and selected by [`Interactor`]s.
#[allow(unused_variables)]
pub trait Interactable: AsAny + Send + Sync {
    fn state(&self) -> &InteractableState;
    fn state_mut(&mut self) -> &mut InteractableState;

    fn is_hoverable_by(&self, interactor: Entity, component: &dyn Interactor) -> bool {
        self.state()
            .interaction_layers
            .overlaps(component.state().interaction_layers)
    }

    fn is_selectable_by(&self, interactor: Entity, component: &dyn Interactor) -> bool {
        self.state()
            .interaction_layers
            .overlaps(component.state().interaction_layers)
    }

    /// Used to rank this interactable among an interactor's valid targets.
    fn distance_sqr(&self, point: Vec3) -> f32 {
        self.state().distance_sqr(point)
    }

    fn process_interactable(
        &mut self,
        interactable: Entity,
        phase: &PhaseContext,
        commands: &mut InteractionCommands,
    ) {
    }

    fn on_registered(&mut self, args: &InteractableRegisteredEventArgs) {}
    fn on_unregistered(&mut self, args: &InteractableUnregisteredEventArgs) {}

    fn on_hover_entering(&mut self, args: &HoverEnterEventArgs) {}
    fn on_hover_entered(&mut self, args: &HoverEnterEventArgs, commands: &mut InteractionCommands) {}
    fn on_hover_exiting(&mut self, args: &HoverExitEventArgs) {}
    fn on_hover_exited(&mut self, args: &HoverExitEventArgs, commands: &mut InteractionCommands) {}
    fn on_select_entering(&mut self, args: &SelectEnterEventArgs) {}
    fn on_select_entered(&mut self, args: &SelectEnterEventArgs, commands: &mut InteractionCommands) {
    }
    fn on_select_exiting(&mut self, args: &SelectExitEventArgs) {}
    fn on_select_exited(&mut self, args: &SelectExitEventArgs, commands: &mut InteractionCommands) {}

    fn on_activated(&mut self, args: &ActivateEventArgs, commands: &mut InteractionCommands) {}
    fn on_deactivated(&mut self, args: &DeactivateEventArgs, commands: &mut InteractionCommands) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_to_nearest_collider() {
        let state = InteractableState::with_colliders([
            InteractableCollider::at(Entity::from_raw(1), Vec3::new(3.0, 0.0, 0.0)),
            InteractableCollider::at(Entity::from_raw(2), Vec3::new(0.0, 1.0, 0.0)),
        ]);
        assert_eq!(state.distance_sqr(Vec3::ZERO), 1.0);
        assert_eq!(InteractableState::default().distance_sqr(Vec3::ZERO), f32::MAX);
    }
}
