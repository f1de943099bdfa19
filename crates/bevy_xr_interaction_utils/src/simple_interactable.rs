use bevy::ecs::entity::Entity;
use bevy_mod_xr_interaction::interactable::{
    Interactable, InteractableCollider, InteractableState,
};
use bevy_mod_xr_interaction::layers::InteractionLayerMask;

/// An interactable with no behaviour beyond hover and select bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct SimpleInteractable {
    pub state: InteractableState,
}

impl SimpleInteractable {
    pub fn new(colliders: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            state: InteractableState::with_colliders(
                colliders.into_iter().map(InteractableCollider::new),
            ),
        }
    }

    pub fn with_layers(mut self, interaction_layers: InteractionLayerMask) -> Self {
        self.state.interaction_layers = interaction_layers;
        self
    }
}

impl Interactable for SimpleInteractable {
    fn state(&self) -> &InteractableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut InteractableState {
        &mut self.state
    }
}
