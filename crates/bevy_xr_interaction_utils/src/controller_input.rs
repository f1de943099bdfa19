use bevy::app::{App, Plugin, PreUpdate};
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::schedule::IntoSystemConfigs;
use bevy::ecs::system::{Query, ResMut};
use bevy_mod_xr_interaction::manager::InteractionManager;
use bevy_mod_xr_interaction::plugin::XrInteractionSet;

use crate::direct_interactor::DirectInteractor;

/// Copies [`XrControllerInput`] into the [`DirectInteractor`] stored for the same entity every
/// frame.
pub struct XrControllerInputPlugin;

impl Plugin for XrControllerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            sync_controller_input.in_set(XrInteractionSet::SyncInputs),
        );
    }
}

/// Button state for the controller driving an interactor, written by whatever reads the
/// device's actions.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XrControllerInput {
    pub select: bool,
    pub activate: bool,
}

pub fn sync_controller_input(
    inputs: Query<(Entity, &XrControllerInput)>,
    mut manager: ResMut<InteractionManager>,
) {
    for (entity, input) in &inputs {
        if let Some(interactor) = manager.interactor_as_mut::<DirectInteractor>(entity) {
            interactor.set_controller_input(input.select, input.activate);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy_mod_xr_interaction::events::SelectEnterEventArgs;
    use bevy_mod_xr_interaction::plugin::XrInteractionPlugin;

    use super::*;
    use crate::simple_interactable::SimpleInteractable;

    #[test]
    fn input_component_drives_selection() {
        let mut app = App::new();
        app.add_plugins((XrInteractionPlugin, XrControllerInputPlugin));
        let hand = app.world.spawn(XrControllerInput::default()).id();
        let cube = app.world.spawn_empty().id();
        let collider = app.world.spawn_empty().id();

        let mut manager = app.world.resource_mut::<InteractionManager>();
        manager
            .add_interactor(hand, DirectInteractor::default())
            .unwrap();
        manager
            .add_interactable(cube, SimpleInteractable::new([collider]))
            .unwrap();
        manager.trigger_enter(hand, collider);

        app.update();
        let manager = app.world.resource::<InteractionManager>();
        assert_eq!(manager.interactor(hand).unwrap().state().select_target(), None);

        app.world
            .entity_mut(hand)
            .insert(XrControllerInput {
                select: true,
                activate: false,
            });
        app.update();

        let manager = app.world.resource::<InteractionManager>();
        assert_eq!(manager.interactor(hand).unwrap().state().select_target(), Some(cube));
        let events = app.world.resource::<bevy::ecs::event::Events<SelectEnterEventArgs>>();
        assert_eq!(events.iter_current_update_events().count(), 1);
    }
}
