use bevy::ecs::entity::Entity;
use bevy_mod_xr_interaction::context::InteractionCommands;

/// Per frame state of a controller button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub active: bool,
    pub activated_this_frame: bool,
    pub deactivated_this_frame: bool,
}

impl InteractionState {
    /// Advances to a new frame where the button is `is_active`.
    pub fn set_frame_state(&mut self, is_active: bool) {
        self.activated_this_frame = is_active && !self.active;
        self.deactivated_this_frame = !is_active && self.active;
        self.active = is_active;
    }
}

/// How the select button drives an interactor's selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputTriggerType {
    /// Select while the button is held.
    #[default]
    State,
    /// Select only starts on the frame the button is pressed, and ends when it is released.
    StateChange,
    /// A press starts a selection and the next press ends it.
    Toggle,
    /// Like [`Toggle`](Self::Toggle), but the selection ends on the release after the second
    /// press.
    Sticky,
}

/// Select and activate button handling for controller driven interactors.
#[derive(Clone, Debug, Default)]
pub struct ControllerInteraction {
    pub select_action_trigger: InputTriggerType,
    select: InteractionState,
    activate: InteractionState,
    toggle_select_active: bool,
    waiting_for_select_deactivate: bool,
}

impl ControllerInteraction {
    pub fn new(select_action_trigger: InputTriggerType) -> Self {
        Self {
            select_action_trigger,
            ..Self::default()
        }
    }

    pub fn select_state(&self) -> InteractionState {
        self.select
    }

    pub fn activate_state(&self) -> InteractionState {
        self.activate
    }

    /// Feeds the button states for this frame. Must be called every frame for the
    /// `*_this_frame` edges to clear.
    pub fn set_input(&mut self, select: bool, activate: bool) {
        self.select.set_frame_state(select);
        self.activate.set_frame_state(activate);
    }

    /// Starts out holding a selection, as if the select button had toggled it on.
    pub fn hold_starting_selection(&mut self) {
        if self.select_action_trigger == InputTriggerType::Toggle {
            self.toggle_select_active = true;
        }
    }

    /// Whether the buttons keep select active. `is_selecting` is whether the interactor holds a
    /// selection right now.
    pub fn is_select_active(&self, is_selecting: bool) -> bool {
        match self.select_action_trigger {
            InputTriggerType::State => self.select.active,
            InputTriggerType::StateChange => {
                self.select.activated_this_frame
                    || (is_selecting && !self.select.deactivated_this_frame)
            }
            InputTriggerType::Toggle => self.toggle_select_active,
            InputTriggerType::Sticky => {
                self.toggle_select_active || self.waiting_for_select_deactivate
            }
        }
    }

    /// Updates the toggle state for this frame and queues activation of the selected
    /// interactable.
    pub fn process(
        &mut self,
        interactor: Entity,
        select_target: Option<Entity>,
        has_valid_targets: bool,
        commands: &mut InteractionCommands,
    ) {
        if matches!(
            self.select_action_trigger,
            InputTriggerType::Toggle | InputTriggerType::Sticky
        ) {
            if self.select.activated_this_frame {
                if self.toggle_select_active {
                    self.waiting_for_select_deactivate = true;
                }
                if self.toggle_select_active || has_valid_targets {
                    self.toggle_select_active = !self.toggle_select_active;
                }
            }
            if self.select.deactivated_this_frame {
                self.waiting_for_select_deactivate = false;
            }
        }

        if let Some(target) = select_target {
            if self.activate.activated_this_frame {
                commands.activate(interactor, target);
            }
            if self.activate.deactivated_this_frame {
                commands.deactivate(interactor, target);
            }
        }
    }

    pub fn on_select_entering(&mut self) {
        self.toggle_select_active = true;
        self.waiting_for_select_deactivate = false;
    }

    /// Selection can also end through another interactor taking the interactable, so the toggle
    /// resets here rather than on button input.
    pub fn on_select_exiting(&mut self) {
        self.toggle_select_active = false;
        self.waiting_for_select_deactivate = false;
    }
}

#[cfg(test)]
mod tests {
    use bevy_mod_xr_interaction::context::InteractionCommand;

    use super::*;

    fn press(controller: &mut ControllerInteraction, select: bool, has_targets: bool) {
        controller.set_input(select, false);
        controller.process(
            Entity::PLACEHOLDER,
            None,
            has_targets,
            &mut InteractionCommands::default(),
        );
    }

    #[test]
    fn frame_edges() {
        let mut state = InteractionState::default();
        state.set_frame_state(true);
        assert!(state.active && state.activated_this_frame);
        state.set_frame_state(true);
        assert!(state.active && !state.activated_this_frame);
        state.set_frame_state(false);
        assert!(!state.active && state.deactivated_this_frame);
        state.set_frame_state(false);
        assert_eq!(state, InteractionState::default());
    }

    #[test]
    fn state_change_only_starts_on_press() {
        let mut controller = ControllerInteraction::new(InputTriggerType::StateChange);
        press(&mut controller, true, true);
        assert!(controller.is_select_active(false));
        press(&mut controller, true, true);
        assert!(!controller.is_select_active(false));
        assert!(controller.is_select_active(true));
        press(&mut controller, false, true);
        assert!(!controller.is_select_active(true));
    }

    #[test]
    fn toggle_needs_targets_to_turn_on() {
        let mut controller = ControllerInteraction::new(InputTriggerType::Toggle);
        press(&mut controller, true, false);
        assert!(!controller.is_select_active(false));
        press(&mut controller, false, false);

        press(&mut controller, true, true);
        assert!(controller.is_select_active(false));
        press(&mut controller, false, true);
        assert!(controller.is_select_active(false));

        press(&mut controller, true, true);
        assert!(!controller.is_select_active(true));
    }

    #[test]
    fn sticky_releases_after_second_release() {
        let mut controller = ControllerInteraction::new(InputTriggerType::Sticky);
        press(&mut controller, true, true);
        press(&mut controller, false, true);
        assert!(controller.is_select_active(true));

        press(&mut controller, true, true);
        assert!(controller.is_select_active(true));
        press(&mut controller, false, true);
        assert!(!controller.is_select_active(true));
    }

    #[test]
    fn activate_edges_queue_commands_while_selecting() {
        let (interactor, target) = (Entity::from_raw(1), Entity::from_raw(2));
        let mut controller = ControllerInteraction::default();

        let mut commands = InteractionCommands::default();
        controller.set_input(true, true);
        controller.process(interactor, None, true, &mut commands);
        assert!(commands.is_empty());

        controller.set_input(true, false);
        controller.process(interactor, Some(target), true, &mut commands);
        let queued: Vec<_> = commands.into_iter().collect();
        assert!(matches!(
            queued.as_slice(),
            [InteractionCommand::Deactivate(args)] if args.interactable == target
        ));
    }
}
