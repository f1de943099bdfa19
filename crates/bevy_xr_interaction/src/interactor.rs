use std::any::Any;

use bevy::ecs::entity::Entity;
use bevy::log::error;
use bevy::math::Vec3;

use crate::context::{InteractionCommands, InteractionContext, PhaseContext};
use crate::events::{
    HoverEnterEventArgs, HoverExitEventArgs, InteractorRegisteredEventArgs,
    InteractorUnregisteredEventArgs, SelectEnterEventArgs, SelectExitEventArgs,
};
use crate::interactable::Interactable;
use crate::layers::InteractionLayerMask;

/// Gives access to a trait object as [`Any`] so it can be downcast to its concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Settings and hover/select bookkeeping shared by every [`Interactor`].
///
/// The selection and hover lists are only changed by the
/// [`InteractionManager`](crate::manager::InteractionManager) during the entering and exiting
/// steps of a transition.
#[derive(Clone, Debug)]
pub struct InteractorState {
    /// Whether this interactor is allowed to hover. Defaults to `true`.
    pub allow_hover: bool,
    /// Whether this interactor is allowed to select. Defaults to `true`.
    pub allow_select: bool,
    pub interaction_layers: InteractionLayerMask,
    /// World space position used to rank targets by distance.
    pub attach_point: Vec3,
    /// Entity whose transform drives [`attach_point`](Self::attach_point). The interactor's own
    /// entity is used when `None`.
    pub attach_entity: Option<Entity>,
    /// Interactable selected right after this interactor first registers.
    pub starting_selected_interactable: Option<Entity>,
    select_target: Option<Entity>,
    hover_targets: Vec<Entity>,
    manual_interaction: bool,
}

impl Default for InteractorState {
    fn default() -> Self {
        Self {
            allow_hover: true,
            allow_select: true,
            interaction_layers: InteractionLayerMask::EVERYTHING,
            attach_point: Vec3::ZERO,
            attach_entity: None,
            starting_selected_interactable: None,
            select_target: None,
            hover_targets: Vec::new(),
            manual_interaction: false,
        }
    }
}

impl InteractorState {
    pub fn with_layers(interaction_layers: InteractionLayerMask) -> Self {
        Self {
            interaction_layers,
            ..Self::default()
        }
    }

    /// The interactable this interactor is selecting.
    pub fn select_target(&self) -> Option<Entity> {
        self.select_target
    }

    /// The interactables this interactor is hovering, in the order hovering started.
    pub fn hover_targets(&self) -> &[Entity] {
        &self.hover_targets
    }

    pub fn is_hovering(&self, interactable: Entity) -> bool {
        self.hover_targets.contains(&interactable)
    }

    /// Hover is allowed and the layer masks overlap.
    pub fn can_hover(&self, component: &dyn Interactable) -> bool {
        self.allow_hover
            && self
                .interaction_layers
                .overlaps(component.state().interaction_layers)
    }

    /// Select is allowed, the layer masks overlap, and nothing else is selected since an
    /// interactor holds at most one selection.
    pub fn can_select(&self, interactable: Entity, component: &dyn Interactable) -> bool {
        self.allow_select
            && self.select_target.map_or(true, |target| target == interactable)
            && self
                .interaction_layers
                .overlaps(component.state().interaction_layers)
    }

    pub fn is_performing_manual_interaction(&self) -> bool {
        self.manual_interaction
    }

    pub(crate) fn set_manual_interaction(&mut self, manual: bool) {
        self.manual_interaction = manual;
    }

    pub(crate) fn hover_entering(&mut self, interactable: Entity) {
        self.hover_targets.push(interactable);
    }

    pub(crate) fn hover_exiting(&mut self, interactable: Entity) {
        let index = self.hover_targets.iter().position(|e| *e == interactable);
        debug_assert!(
            index.is_some(),
            "interactor was not hovering {interactable:?}"
        );
        match index {
            Some(index) => {
                self.hover_targets.remove(index);
            }
            None => error!("Interactor hover exit from {interactable:?} which it was not hovering"),
        }
    }

    pub(crate) fn select_entering(&mut self, interactable: Entity) {
        self.select_target = Some(interactable);
    }

    pub(crate) fn select_exiting(&mut self, interactable: Entity) {
        debug_assert_eq!(
            self.select_target,
            Some(interactable),
            "interactor was not selecting {interactable:?}"
        );
        if self.select_target == Some(interactable) {
            self.select_target = None;
        } else {
            error!("Interactor select exit from {interactable:?} which it was not selecting");
        }
    }
}

/// Something that can hover and select [`Interactable`]s.
///
/// Implementors own an [`InteractorState`] and are stored in the
/// [`InteractionManager`](crate::manager::InteractionManager). Every hook has an empty default.
/// `entering`/`exiting` hooks run right after this side's bookkeeping is updated.
/// `entered`/`exited` hooks run once both sides are consistent and may queue further changes.
#[allow(unused_variables)]
pub trait Interactor: AsAny + Send + Sync {
    fn state(&self) -> &InteractorState;
    fn state_mut(&mut self) -> &mut InteractorState;

    /// Fills `targets` with the interactables this interactor could interact with this frame,
    /// highest priority first. `targets` is cleared by the caller.
    fn get_valid_targets(&self, context: &InteractionContext, targets: &mut Vec<Entity>);

    fn is_hover_active(&self) -> bool {
        self.state().allow_hover
    }

    fn is_select_active(&self) -> bool {
        self.state().allow_select
    }

    fn can_hover(&self, interactable: Entity, component: &dyn Interactable) -> bool {
        self.state().can_hover(component)
    }

    fn can_select(&self, interactable: Entity, component: &dyn Interactable) -> bool {
        self.state().can_select(interactable, component)
    }

    /// Whether a select request should be dropped when the interactable is already selected by
    /// another interactor, instead of taking it over.
    fn require_select_exclusive(&self) -> bool {
        false
    }

    fn process_interactor(
        &mut self,
        interactor: Entity,
        phase: &PhaseContext,
        commands: &mut InteractionCommands,
    ) {
    }

    fn on_registered(&mut self, args: &InteractorRegisteredEventArgs, context: &InteractionContext) {
    }
    fn on_unregistered(&mut self, args: &InteractorUnregisteredEventArgs) {}

    /// Called for every registered interactor when an interactable registers.
    fn on_interactable_registered(&mut self, interactable: Entity, context: &InteractionContext) {}
    /// Called for every registered interactor when an interactable unregisters.
    fn on_interactable_unregistered(&mut self, interactable: Entity) {}

    /// A collider started touching this interactor's trigger volume.
    fn on_trigger_enter(&mut self, collider: Entity, context: &InteractionContext) {}
    /// A collider stopped touching this interactor's trigger volume.
    fn on_trigger_exit(&mut self, collider: Entity) {}

    fn on_hover_entering(&mut self, args: &HoverEnterEventArgs) {}
    fn on_hover_entered(&mut self, args: &HoverEnterEventArgs, commands: &mut InteractionCommands) {}
    fn on_hover_exiting(&mut self, args: &HoverExitEventArgs) {}
    fn on_hover_exited(&mut self, args: &HoverExitEventArgs, commands: &mut InteractionCommands) {}
    fn on_select_entering(&mut self, args: &SelectEnterEventArgs) {}
    fn on_select_entered(&mut self, args: &SelectEnterEventArgs, commands: &mut InteractionCommands) {
    }
    fn on_select_exiting(&mut self, args: &SelectExitEventArgs) {}
    fn on_select_exited(&mut self, args: &SelectExitEventArgs, commands: &mut InteractionCommands) {}
}
