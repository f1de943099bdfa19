use bevy::ecs::entity::Entity;
use bevy_mod_xr_interaction::context::{
    InteractionCommands, InteractionContext, PhaseContext, UpdatePhase,
};
use bevy_mod_xr_interaction::events::{
    InteractorRegisteredEventArgs, SelectEnterEventArgs, SelectExitEventArgs,
};
use bevy_mod_xr_interaction::interactable::Interactable;
use bevy_mod_xr_interaction::interactor::{Interactor, InteractorState};

use crate::contact_targets::ContactTargets;
use crate::controller::{ControllerInteraction, InputTriggerType};

/// Hovers and selects the interactables touching its trigger volume, nearest first, while the
/// controller's select button says so.
#[derive(Clone, Debug, Default)]
pub struct DirectInteractor {
    pub state: InteractorState,
    pub controller: ControllerInteraction,
    contacts: ContactTargets,
}

impl DirectInteractor {
    pub fn new(select_action_trigger: InputTriggerType) -> Self {
        Self {
            controller: ControllerInteraction::new(select_action_trigger),
            ..Self::default()
        }
    }

    /// Selects `interactable` once registered, holding it if selection toggles.
    pub fn with_starting_selection(mut self, interactable: Entity) -> Self {
        self.state.starting_selected_interactable = Some(interactable);
        self.controller.hold_starting_selection();
        self
    }

    /// Feeds this frame's controller buttons.
    pub fn set_controller_input(&mut self, select: bool, activate: bool) {
        self.controller.set_input(select, activate);
    }

    /// Interactables touching the trigger volume, unsorted.
    pub fn touching(&self) -> &[Entity] {
        self.contacts.targets()
    }
}

impl Interactor for DirectInteractor {
    fn state(&self) -> &InteractorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut InteractorState {
        &mut self.state
    }

    fn get_valid_targets(&self, context: &InteractionContext, targets: &mut Vec<Entity>) {
        self.contacts
            .sorted_targets(self.state.attach_point, context, targets);
    }

    fn is_select_active(&self) -> bool {
        if !self.state.allow_select {
            return false;
        }
        if self.state.is_performing_manual_interaction() {
            return true;
        }
        self.controller
            .is_select_active(self.state.select_target().is_some())
    }

    fn can_hover(&self, interactable: Entity, component: &dyn Interactable) -> bool {
        self.state.can_hover(component)
            && self
                .state
                .select_target()
                .map_or(true, |target| target == interactable)
    }

    fn process_interactor(
        &mut self,
        interactor: Entity,
        phase: &PhaseContext,
        commands: &mut InteractionCommands,
    ) {
        if phase.phase != UpdatePhase::Dynamic {
            return;
        }
        self.controller.process(
            interactor,
            self.state.select_target(),
            !self.contacts.is_empty(),
            commands,
        );
    }

    fn on_registered(&mut self, _args: &InteractorRegisteredEventArgs, context: &InteractionContext) {
        self.contacts.on_registered(context);
    }

    fn on_interactable_registered(&mut self, interactable: Entity, context: &InteractionContext) {
        self.contacts
            .on_interactable_registered(interactable, context);
    }

    fn on_interactable_unregistered(&mut self, interactable: Entity) {
        self.contacts.on_interactable_unregistered(interactable);
    }

    fn on_trigger_enter(&mut self, collider: Entity, context: &InteractionContext) {
        self.contacts.on_trigger_enter(collider, context);
    }

    fn on_trigger_exit(&mut self, collider: Entity) {
        self.contacts.on_trigger_exit(collider);
    }

    fn on_select_entering(&mut self, _args: &SelectEnterEventArgs) {
        self.controller.on_select_entering();
    }

    fn on_select_exiting(&mut self, _args: &SelectExitEventArgs) {
        self.controller.on_select_exiting();
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;
    use bevy_mod_xr_interaction::events::{ActivateEventArgs, InteractionEvent};
    use bevy_mod_xr_interaction::interactable::InteractableCollider;
    use bevy_mod_xr_interaction::manager::InteractionManager;

    use super::*;
    use crate::simple_interactable::SimpleInteractable;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    fn interactable_at(collider: Entity, x: f32) -> SimpleInteractable {
        let mut interactable = SimpleInteractable::default();
        interactable.state.colliders = vec![InteractableCollider::at(collider, Vec3::X * x)];
        interactable
    }

    fn tick(manager: &mut InteractionManager, interactor: Entity, select: bool, activate: bool) {
        manager
            .interactor_as_mut::<DirectInteractor>(interactor)
            .unwrap()
            .set_controller_input(select, activate);
        manager.update(UpdatePhase::Dynamic, 0.0);
    }

    #[test]
    fn selects_nearest_touching_interactable() {
        let (hand, near, far) = (entity(1), entity(100), entity(101));
        let mut manager = InteractionManager::new();
        manager
            .add_interactor(hand, DirectInteractor::default())
            .unwrap();
        manager
            .add_interactable(far, interactable_at(entity(201), 2.0))
            .unwrap();
        manager
            .add_interactable(near, interactable_at(entity(200), 1.0))
            .unwrap();
        manager.trigger_enter(hand, entity(201));
        manager.trigger_enter(hand, entity(200));

        tick(&mut manager, hand, false, false);
        let state = manager.interactor(hand).unwrap().state();
        assert_eq!(state.select_target(), None);
        assert_eq!(state.hover_targets(), &[near, far]);

        tick(&mut manager, hand, true, false);
        assert_eq!(manager.interactor(hand).unwrap().state().select_target(), Some(near));

        // Hover narrows to the selection on the next frame.
        tick(&mut manager, hand, true, false);
        let state = manager.interactor(hand).unwrap().state();
        assert_eq!(state.select_target(), Some(near));
        assert_eq!(state.hover_targets(), &[near]);

        tick(&mut manager, hand, false, false);
        assert_eq!(manager.interactor(hand).unwrap().state().select_target(), None);
    }

    #[test]
    fn contact_resolves_when_interactable_registers_later() {
        let (hand, cube, collider) = (entity(1), entity(100), entity(200));
        let mut manager = InteractionManager::new();
        manager
            .add_interactor(hand, DirectInteractor::default())
            .unwrap();
        manager
            .insert_interactable(cube, interactable_at(collider, 0.5))
            .unwrap();

        manager.trigger_enter(hand, collider);
        assert!(manager
            .interactor_as::<DirectInteractor>(hand)
            .unwrap()
            .touching()
            .is_empty());

        manager.register_interactable(cube);
        assert_eq!(
            manager
                .interactor_as::<DirectInteractor>(hand)
                .unwrap()
                .touching(),
            &[cube]
        );

        manager.unregister_interactable(cube);
        manager.register_interactable(cube);
        tick(&mut manager, hand, true, false);
        assert_eq!(manager.interactor(hand).unwrap().state().select_target(), Some(cube));

        manager.trigger_exit(hand, collider);
        tick(&mut manager, hand, true, false);
        let state = manager.interactor(hand).unwrap().state();
        assert_eq!(state.select_target(), Some(cube));
        assert!(state.hover_targets().is_empty());
    }

    #[test]
    fn activate_button_activates_selection() {
        let (hand, cube, collider) = (entity(1), entity(100), entity(200));
        let mut manager = InteractionManager::new();
        manager
            .add_interactor(hand, DirectInteractor::default())
            .unwrap();
        manager
            .add_interactable(cube, interactable_at(collider, 0.0))
            .unwrap();
        manager.trigger_enter(hand, collider);

        tick(&mut manager, hand, true, false);
        manager.drain_events();
        tick(&mut manager, hand, true, true);

        assert_eq!(
            manager.events(),
            &[InteractionEvent::Activated(ActivateEventArgs {
                interactor: hand,
                interactable: cube,
            })]
        );
    }

    #[test]
    fn toggle_keeps_starting_selection() {
        let (hand, cube) = (entity(1), entity(100));
        let mut manager = InteractionManager::new();
        manager
            .add_interactable(cube, SimpleInteractable::default())
            .unwrap();
        manager
            .add_interactor(
                hand,
                DirectInteractor::new(InputTriggerType::Toggle).with_starting_selection(cube),
            )
            .unwrap();

        tick(&mut manager, hand, false, false);
        tick(&mut manager, hand, false, false);
        assert_eq!(manager.interactor(hand).unwrap().state().select_target(), Some(cube));

        tick(&mut manager, hand, true, false);
        assert_eq!(manager.interactor(hand).unwrap().state().select_target(), None);
    }
}
