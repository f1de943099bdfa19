use bevy::ecs::entity::Entity;
use bevy_mod_xr_interaction::context::{InteractionCommands, InteractionContext, PhaseContext};
use bevy_mod_xr_interaction::events::{InteractorRegisteredEventArgs, SelectExitEventArgs};
use bevy_mod_xr_interaction::interactable::Interactable;
use bevy_mod_xr_interaction::interactor::{Interactor, InteractorState};

use crate::contact_targets::ContactTargets;

/// Holds one interactable placed inside its trigger volume.
///
/// Sockets never take an interactable away from another interactor, and after releasing one they
/// wait [`recycle_delay`](Self::recycle_delay) seconds before hovering again.
#[derive(Clone, Debug)]
pub struct SocketInteractor {
    pub state: InteractorState,
    /// Hover and select only while this is set. Defaults to `true`.
    pub socket_active: bool,
    /// Seconds after a release before the socket hovers again. Defaults to `1.0`.
    pub recycle_delay: f32,
    contacts: ContactTargets,
    last_remove_time: f32,
    now: f32,
}

impl Default for SocketInteractor {
    fn default() -> Self {
        Self {
            state: InteractorState::default(),
            socket_active: true,
            recycle_delay: 1.0,
            contacts: ContactTargets::default(),
            last_remove_time: -100.0,
            now: 0.0,
        }
    }
}

impl SocketInteractor {
    pub fn with_starting_selection(mut self, interactable: Entity) -> Self {
        self.state.starting_selected_interactable = Some(interactable);
        self
    }

    /// Interactables touching the trigger volume, unsorted.
    pub fn touching(&self) -> &[Entity] {
        self.contacts.targets()
    }
}

impl Interactor for SocketInteractor {
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

    fn is_hover_active(&self) -> bool {
        self.state.allow_hover && self.socket_active
    }

    fn is_select_active(&self) -> bool {
        self.state.allow_select && self.socket_active
    }

    fn can_hover(&self, _interactable: Entity, component: &dyn Interactable) -> bool {
        self.state.can_hover(component) && self.now > self.last_remove_time + self.recycle_delay
    }

    fn require_select_exclusive(&self) -> bool {
        true
    }

    fn process_interactor(
        &mut self,
        _interactor: Entity,
        phase: &PhaseContext,
        _commands: &mut InteractionCommands,
    ) {
        self.now = phase.elapsed_seconds;
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

    fn on_select_exiting(&mut self, _args: &SelectExitEventArgs) {
        self.last_remove_time = self.now;
    }
}
