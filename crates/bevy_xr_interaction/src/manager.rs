use std::mem;

use bevy::ecs::entity::Entity;
use bevy::ecs::system::Resource;
use bevy::log::{debug, warn};
use bevy::math::Vec3;
use bevy::utils::HashMap;

use crate::context::{
    InteractionCommand, InteractionCommands, InteractionContext, PhaseContext, UpdatePhase,
};
use crate::error::{InteractionError, Result};
use crate::events::{
    ActivateEventArgs, DeactivateEventArgs, HoverEnterEventArgs, HoverExitEventArgs,
    InteractableRegisteredEventArgs, InteractableUnregisteredEventArgs, InteractionEvent,
    InteractorRegisteredEventArgs, InteractorUnregisteredEventArgs, SelectEnterEventArgs,
    SelectExitEventArgs,
};
use crate::interactable::Interactable;
use crate::interactor::Interactor;
use crate::registration::RegistrationList;

/// Borrows the interactable side of the manager as an [`InteractionContext`], leaving the
/// interactor side free to be borrowed mutably.
macro_rules! context {
    ($manager:expr) => {
        InteractionContext::new(
            &$manager.colliders,
            &$manager.interactables,
            &$manager.interactable_components,
        )
    };
}

/// Owns every interactor and interactable and drives their hover and select state.
///
/// Components are stored with [`insert_interactor`](Self::insert_interactor) or
/// [`add_interactor`](Self::add_interactor), enabled and disabled with `register_*` and
/// `unregister_*`, and destroyed with `remove_*`. Registration changes are visible immediately
/// but only join the per-frame passes after the next flush, so hooks can register and unregister
/// components while the manager is iterating.
///
/// Produced interactions queue up in [`events`](Self::events). [`XrInteractionPlugin`]
/// drains them every pass; without the plugin, call [`drain_events`](Self::drain_events) once
/// per tick or the queue keeps growing.
///
/// [`XrInteractionPlugin`]: crate::plugin::XrInteractionPlugin
#[derive(Resource, Default)]
pub struct InteractionManager {
    interactors: RegistrationList<Entity>,
    interactables: RegistrationList<Entity>,
    interactor_components: HashMap<Entity, Box<dyn Interactor>>,
    interactable_components: HashMap<Entity, Box<dyn Interactable>>,
    colliders: HashMap<Entity, Entity>,
    pending_starts: Vec<Entity>,
    events: Vec<InteractionEvent>,
    valid_targets: Vec<Entity>,
}

impl InteractionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interactors(&self) -> &RegistrationList<Entity> {
        &self.interactors
    }

    pub fn interactables(&self) -> &RegistrationList<Entity> {
        &self.interactables
    }

    pub fn context(&self) -> InteractionContext<'_> {
        context!(self)
    }

    /// Stores `component` for `entity` without registering it.
    pub fn insert_interactor(&mut self, entity: Entity, component: impl Interactor) -> Result<()> {
        if self.interactor_components.contains_key(&entity) {
            return Err(InteractionError::DuplicateInteractor(entity));
        }
        if component.state().starting_selected_interactable.is_some() {
            self.pending_starts.push(entity);
        }
        self.interactor_components
            .insert(entity, Box::new(component));
        Ok(())
    }

    /// Stores `component` for `entity` and registers it.
    pub fn add_interactor(&mut self, entity: Entity, component: impl Interactor) -> Result<()> {
        self.insert_interactor(entity, component)?;
        self.register_interactor(entity);
        Ok(())
    }

    /// Unregisters the interactor, cancelling its interactions, and drops its component.
    pub fn remove_interactor(&mut self, entity: Entity) -> Option<Box<dyn Interactor>> {
        self.unregister_interactor(entity);
        // Stored but unregistered interactors can still hold relationships from `force_select`.
        self.cancel_interactor_selection(entity);
        self.cancel_interactor_hover(entity);
        self.pending_starts.retain(|e| *e != entity);
        self.interactor_components.remove(&entity)
    }

    /// Stores `component` for `entity` without registering it.
    pub fn insert_interactable(
        &mut self,
        entity: Entity,
        component: impl Interactable,
    ) -> Result<()> {
        if self.interactable_components.contains_key(&entity) {
            return Err(InteractionError::DuplicateInteractable(entity));
        }
        self.interactable_components
            .insert(entity, Box::new(component));
        Ok(())
    }

    /// Stores `component` for `entity` and registers it.
    pub fn add_interactable(&mut self, entity: Entity, component: impl Interactable) -> Result<()> {
        self.insert_interactable(entity, component)?;
        self.register_interactable(entity);
        Ok(())
    }

    /// Unregisters the interactable, cancelling its interactions, and drops its component.
    pub fn remove_interactable(&mut self, entity: Entity) -> Option<Box<dyn Interactable>> {
        self.unregister_interactable(entity);
        self.cancel_interactable_selection(entity);
        self.cancel_interactable_hover(entity);
        self.interactable_components.remove(&entity)
    }

    pub fn interactor(&self, entity: Entity) -> Option<&dyn Interactor> {
        self.interactor_components
            .get(&entity)
            .map(|component| &**component)
    }

    pub fn interactable(&self, entity: Entity) -> Option<&dyn Interactable> {
        self.interactable_components
            .get(&entity)
            .map(|component| &**component)
    }

    pub fn interactor_as<T: Interactor>(&self, entity: Entity) -> Option<&T> {
        self.interactor_components
            .get(&entity)
            .and_then(|component| (**component).as_any().downcast_ref())
    }

    pub fn interactor_as_mut<T: Interactor>(&mut self, entity: Entity) -> Option<&mut T> {
        self.interactor_components
            .get_mut(&entity)
            .and_then(|component| (**component).as_any_mut().downcast_mut())
    }

    pub fn interactable_as<T: Interactable>(&self, entity: Entity) -> Option<&T> {
        self.interactable_components
            .get(&entity)
            .and_then(|component| (**component).as_any().downcast_ref())
    }

    pub fn interactable_as_mut<T: Interactable>(&mut self, entity: Entity) -> Option<&mut T> {
        self.interactable_components
            .get_mut(&entity)
            .and_then(|component| (**component).as_any_mut().downcast_mut())
    }

    pub fn is_interactor_registered(&self, interactor: Entity) -> bool {
        self.interactors.is_registered(&interactor)
    }

    pub fn is_interactable_registered(&self, interactable: Entity) -> bool {
        self.interactables.is_registered(&interactable)
    }

    /// Registers a stored interactor. Returns `true` if it was not registered before.
    pub fn register_interactor(&mut self, interactor: Entity) -> bool {
        if !self.interactor_components.contains_key(&interactor) {
            warn!("Tried to register {interactor:?} which has no interactor component");
            return false;
        }
        if !self.interactors.register(interactor) {
            return false;
        }

        debug!("Registered interactor {interactor:?}");
        let args = InteractorRegisteredEventArgs { interactor };
        let context = context!(self);
        if let Some(component) = self.interactor_components.get_mut(&interactor) {
            component.on_registered(&args, &context);
        }
        self.events
            .push(InteractionEvent::InteractorRegistered(args));
        true
    }

    /// Cancels the interactor's selection and hovers, then unregisters it. Returns `true` if it
    /// was registered before.
    pub fn unregister_interactor(&mut self, interactor: Entity) -> bool {
        if !self.interactors.is_registered(&interactor) {
            return false;
        }

        self.cancel_interactor_selection(interactor);
        self.cancel_interactor_hover(interactor);

        if !self.interactors.unregister(interactor) {
            return false;
        }

        debug!("Unregistered interactor {interactor:?}");
        let args = InteractorUnregisteredEventArgs { interactor };
        if let Some(component) = self.interactor_components.get_mut(&interactor) {
            component.on_unregistered(&args);
        }
        self.events
            .push(InteractionEvent::InteractorUnregistered(args));
        true
    }

    /// Registers a stored interactable and maps its colliders. Returns `true` if it was not
    /// registered before.
    pub fn register_interactable(&mut self, interactable: Entity) -> bool {
        let Some(component) = self.interactable_components.get_mut(&interactable) else {
            warn!("Tried to register {interactable:?} which has no interactable component");
            return false;
        };
        if !self.interactables.register(interactable) {
            return false;
        }

        for collider in &component.state().colliders {
            self.colliders
                .entry(collider.entity)
                .or_insert(interactable);
        }

        debug!("Registered interactable {interactable:?}");
        let args = InteractableRegisteredEventArgs { interactable };
        component.on_registered(&args);

        let context = context!(self);
        for interactor in self.interactors.registered_items() {
            if let Some(component) = self.interactor_components.get_mut(&interactor) {
                component.on_interactable_registered(interactable, &context);
            }
        }
        self.events
            .push(InteractionEvent::InteractableRegistered(args));
        true
    }

    /// Cancels the interactable's selection and hovers, then unregisters it and unmaps its
    /// colliders. Returns `true` if it was registered before.
    pub fn unregister_interactable(&mut self, interactable: Entity) -> bool {
        if !self.interactables.is_registered(&interactable) {
            return false;
        }

        self.cancel_interactable_selection(interactable);
        self.cancel_interactable_hover(interactable);

        if !self.interactables.unregister(interactable) {
            return false;
        }

        self.colliders.retain(|_, owner| *owner != interactable);

        debug!("Unregistered interactable {interactable:?}");
        let args = InteractableUnregisteredEventArgs { interactable };
        if let Some(component) = self.interactable_components.get_mut(&interactable) {
            component.on_unregistered(&args);
        }
        for interactor in self.interactors.registered_items() {
            if let Some(component) = self.interactor_components.get_mut(&interactor) {
                component.on_interactable_unregistered(interactable);
            }
        }
        self.events
            .push(InteractionEvent::InteractableUnregistered(args));
        true
    }

    pub fn registered_interactors(&self) -> impl Iterator<Item = Entity> + '_ {
        self.interactors.registered_items()
    }

    pub fn get_registered_interactors(&self, results: &mut Vec<Entity>) {
        self.interactors.get_registered_items(results);
    }

    pub fn registered_interactables(&self) -> impl Iterator<Item = Entity> + '_ {
        self.interactables.registered_items()
    }

    pub fn get_registered_interactables(&self, results: &mut Vec<Entity>) {
        self.interactables.get_registered_items(results);
    }

    /// The registered interactable owning `collider`.
    pub fn interactable_for_collider(&self, collider: Entity) -> Option<Entity> {
        self.colliders.get(&collider).copied()
    }

    pub fn flush_registration(&mut self) {
        self.interactors.flush();
        self.interactables.flush();
    }

    /// Runs one update pass.
    ///
    /// Every phase flushes registration, processes interactors, then processes interactables.
    /// The dynamic phase also resolves hover and select targets between those two steps.
    pub fn update(&mut self, phase: UpdatePhase, elapsed_seconds: f32) {
        let context = PhaseContext {
            phase,
            elapsed_seconds,
        };

        self.flush_registration();
        if phase == UpdatePhase::Dynamic {
            self.select_starting_interactables();
        }
        self.process_interactors(&context);
        if phase == UpdatePhase::Dynamic {
            self.resolve_interactions();
        }
        self.process_interactables(&context);
    }

    fn select_starting_interactables(&mut self) {
        if self.pending_starts.is_empty() {
            return;
        }

        for interactor in mem::take(&mut self.pending_starts) {
            let Some(target) = self
                .interactor_components
                .get(&interactor)
                .and_then(|component| component.state().starting_selected_interactable)
            else {
                continue;
            };
            if self.interactors.is_registered(&interactor)
                && self.interactables.is_registered(&target)
            {
                self.force_select(interactor, target);
            } else {
                self.pending_starts.push(interactor);
            }
        }
    }

    fn process_interactors(&mut self, context: &PhaseContext) {
        let mut index = 0;
        while let Some(entry) = self.interactors.snapshot_entry(index) {
            index += 1;
            if !self.interactors.is_still_registered(&entry) {
                continue;
            }

            let mut commands = InteractionCommands::default();
            if let Some(component) = self.interactor_components.get_mut(&entry.item()) {
                component.process_interactor(entry.item(), context, &mut commands);
            }
            self.apply_commands(commands);
        }
    }

    fn process_interactables(&mut self, context: &PhaseContext) {
        let mut index = 0;
        while let Some(entry) = self.interactables.snapshot_entry(index) {
            index += 1;
            if !self.interactables.is_still_registered(&entry) {
                continue;
            }

            let mut commands = InteractionCommands::default();
            if let Some(component) = self.interactable_components.get_mut(&entry.item()) {
                component.process_interactable(entry.item(), context, &mut commands);
            }
            self.apply_commands(commands);
        }
    }

    fn resolve_interactions(&mut self) {
        let mut valid_targets = mem::take(&mut self.valid_targets);

        let mut index = 0;
        while let Some(entry) = self.interactors.snapshot_entry(index) {
            index += 1;
            if !self.interactors.is_still_registered(&entry) {
                continue;
            }

            let interactor = entry.item();
            self.get_valid_targets(interactor, &mut valid_targets);
            self.clear_interactor_selection(interactor);
            self.clear_interactor_hover(interactor, &valid_targets);
            self.interactor_select_valid_targets(interactor, &valid_targets);
            self.interactor_hover_valid_targets(interactor, &valid_targets);
        }

        valid_targets.clear();
        self.valid_targets = valid_targets;
    }

    /// Fills `targets` with the interactor's valid targets that are registered with this
    /// manager, in the interactor's priority order.
    pub fn get_valid_targets(&self, interactor: Entity, targets: &mut Vec<Entity>) {
        targets.clear();
        let Some(component) = self.interactor_components.get(&interactor) else {
            return;
        };
        component.get_valid_targets(&context!(self), targets);
        self.remove_all_unregistered(targets);
    }

    /// Drops every interactable not registered with this manager from `targets`, returning how
    /// many were dropped.
    pub fn remove_all_unregistered(&self, targets: &mut Vec<Entity>) -> usize {
        let before = targets.len();
        targets.retain(|target| self.interactables.is_registered(target));
        before - targets.len()
    }

    fn is_hover_active(&self, interactor: Entity) -> bool {
        self.interactors.is_registered(&interactor)
            && self
                .interactor_components
                .get(&interactor)
                .is_some_and(|component| component.is_hover_active())
    }

    fn is_select_active(&self, interactor: Entity) -> bool {
        self.interactors.is_registered(&interactor)
            && self
                .interactor_components
                .get(&interactor)
                .is_some_and(|component| component.is_select_active())
    }

    fn mutually_hoverable(&self, interactor: Entity, interactable: Entity) -> bool {
        if !self.interactables.is_registered(&interactable) {
            return false;
        }
        match (
            self.interactor_components.get(&interactor),
            self.interactable_components.get(&interactable),
        ) {
            (Some(a), Some(b)) => {
                a.can_hover(interactable, &**b) && b.is_hoverable_by(interactor, &**a)
            }
            _ => false,
        }
    }

    fn mutually_selectable(&self, interactor: Entity, interactable: Entity) -> bool {
        if !self.interactables.is_registered(&interactable) {
            return false;
        }
        match (
            self.interactor_components.get(&interactor),
            self.interactable_components.get(&interactable),
        ) {
            (Some(a), Some(b)) => {
                a.can_select(interactable, &**b) && b.is_selectable_by(interactor, &**a)
            }
            _ => false,
        }
    }

    fn select_target(&self, interactor: Entity) -> Option<Entity> {
        self.interactor_components
            .get(&interactor)
            .and_then(|component| component.state().select_target())
    }

    fn is_hovering(&self, interactor: Entity, interactable: Entity) -> bool {
        self.interactor_components
            .get(&interactor)
            .is_some_and(|component| component.state().is_hovering(interactable))
    }

    /// Exits the interactor's selection if it can no longer be kept.
    pub fn clear_interactor_selection(&mut self, interactor: Entity) {
        let Some(target) = self.select_target(interactor) else {
            return;
        };
        if !self.is_select_active(interactor) || !self.mutually_selectable(interactor, target) {
            self.select_exit(interactor, target);
        }
    }

    /// Cancels the interactor's selection.
    pub fn cancel_interactor_selection(&mut self, interactor: Entity) {
        if let Some(target) = self.select_target(interactor) {
            self.select_cancel(interactor, target);
        }
    }

    /// Cancels the selection held on the interactable.
    pub fn cancel_interactable_selection(&mut self, interactable: Entity) {
        let selecting = self
            .interactable_components
            .get(&interactable)
            .and_then(|component| component.state().selecting_interactor());
        if let Some(interactor) = selecting {
            self.select_cancel(interactor, interactable);
        }
    }

    /// Exits every hover of the interactor that is no longer among `valid_targets` or can no
    /// longer be kept.
    pub fn clear_interactor_hover(&mut self, interactor: Entity, valid_targets: &[Entity]) {
        let Some(component) = self.interactor_components.get(&interactor) else {
            return;
        };
        let hovered = component.state().hover_targets().to_vec();
        for &target in hovered.iter().rev() {
            if !self.is_hover_active(interactor)
                || !self.mutually_hoverable(interactor, target)
                || !valid_targets.contains(&target)
            {
                self.hover_exit(interactor, target);
            }
        }
    }

    /// Cancels every hover of the interactor.
    pub fn cancel_interactor_hover(&mut self, interactor: Entity) {
        let Some(component) = self.interactor_components.get(&interactor) else {
            return;
        };
        let hovered = component.state().hover_targets().to_vec();
        for &target in hovered.iter().rev() {
            self.hover_cancel(interactor, target);
        }
    }

    /// Cancels every hover on the interactable.
    pub fn cancel_interactable_hover(&mut self, interactable: Entity) {
        let Some(component) = self.interactable_components.get(&interactable) else {
            return;
        };
        let hovering = component.state().hovering_interactors().to_vec();
        for &interactor in hovering.iter().rev() {
            self.hover_cancel(interactor, interactable);
        }
    }

    fn interactor_select_valid_targets(&mut self, interactor: Entity, valid_targets: &[Entity]) {
        for &target in valid_targets {
            if !self.is_select_active(interactor) {
                return;
            }
            if self.select_target(interactor) != Some(target)
                && self.mutually_selectable(interactor, target)
            {
                self.select_enter(interactor, target);
            }
        }
    }

    fn interactor_hover_valid_targets(&mut self, interactor: Entity, valid_targets: &[Entity]) {
        for &target in valid_targets {
            if !self.is_hover_active(interactor) {
                return;
            }
            if !self.is_hovering(interactor, target) && self.mutually_hoverable(interactor, target)
            {
                self.hover_enter(interactor, target);
            }
        }
    }

    /// Selects `interactable` with `interactor`, bypassing the interactor's select activity.
    pub fn force_select(&mut self, interactor: Entity, interactable: Entity) {
        self.select_enter(interactor, interactable);
    }

    /// Starts a selection.
    ///
    /// If another interactor holds the interactable, the request is dropped when `interactor`
    /// requires exclusive selection, otherwise the other interactor exits first. A selection
    /// already held by `interactor` on a different interactable exits as well.
    pub fn select_enter(&mut self, interactor: Entity, interactable: Entity) {
        let (Some(interactor_component), Some(interactable_component)) = (
            self.interactor_components.get(&interactor),
            self.interactable_components.get(&interactable),
        ) else {
            warn!("Select enter between unknown {interactor:?} and {interactable:?}");
            return;
        };

        let selecting = interactable_component.state().selecting_interactor();
        if selecting == Some(interactor) {
            return;
        }
        if let Some(other) = selecting {
            if interactor_component.require_select_exclusive() {
                return;
            }
            self.select_exit(other, interactable);
        }
        if let Some(previous) = self.select_target(interactor) {
            self.select_exit(interactor, previous);
        }

        self.select_enter_with(SelectEnterEventArgs {
            interactor,
            interactable,
        });
    }

    pub fn select_exit(&mut self, interactor: Entity, interactable: Entity) {
        self.select_exit_with(SelectExitEventArgs {
            interactor,
            interactable,
            is_canceled: false,
        });
    }

    pub fn select_cancel(&mut self, interactor: Entity, interactable: Entity) {
        self.select_exit_with(SelectExitEventArgs {
            interactor,
            interactable,
            is_canceled: true,
        });
    }

    pub fn hover_enter(&mut self, interactor: Entity, interactable: Entity) {
        if self.is_hovering(interactor, interactable) {
            return;
        }
        self.hover_enter_with(HoverEnterEventArgs {
            interactor,
            interactable,
        });
    }

    pub fn hover_exit(&mut self, interactor: Entity, interactable: Entity) {
        self.hover_exit_with(HoverExitEventArgs {
            interactor,
            interactable,
            is_canceled: false,
        });
    }

    pub fn hover_cancel(&mut self, interactor: Entity, interactable: Entity) {
        self.hover_exit_with(HoverExitEventArgs {
            interactor,
            interactable,
            is_canceled: true,
        });
    }

    fn select_enter_with(&mut self, args: SelectEnterEventArgs) {
        let (Some(interactor), Some(interactable)) = (
            self.interactor_components.get_mut(&args.interactor),
            self.interactable_components.get_mut(&args.interactable),
        ) else {
            return;
        };

        let mut commands = InteractionCommands::default();
        interactor.state_mut().select_entering(args.interactable);
        interactor.on_select_entering(&args);
        interactable.state_mut().select_entering(args.interactor);
        interactable.on_select_entering(&args);
        interactor.on_select_entered(&args, &mut commands);
        interactable.on_select_entered(&args, &mut commands);

        self.events.push(InteractionEvent::SelectEntered(args));
        self.apply_commands(commands);
    }

    fn select_exit_with(&mut self, args: SelectExitEventArgs) {
        let (Some(interactor), Some(interactable)) = (
            self.interactor_components.get_mut(&args.interactor),
            self.interactable_components.get_mut(&args.interactable),
        ) else {
            warn!(
                "Select exit between unknown {:?} and {:?}",
                args.interactor, args.interactable
            );
            return;
        };
        if interactor.state().select_target() != Some(args.interactable) {
            warn!(
                "{:?} tried to exit a selection of {:?} it does not hold",
                args.interactor, args.interactable
            );
            return;
        }

        let mut commands = InteractionCommands::default();
        interactor.state_mut().select_exiting(args.interactable);
        interactor.on_select_exiting(&args);
        interactable.state_mut().select_exiting(args.interactor);
        interactable.on_select_exiting(&args);
        interactor.on_select_exited(&args, &mut commands);
        interactable.on_select_exited(&args, &mut commands);

        self.events.push(InteractionEvent::SelectExited(args));
        self.apply_commands(commands);
    }

    fn hover_enter_with(&mut self, args: HoverEnterEventArgs) {
        let (Some(interactor), Some(interactable)) = (
            self.interactor_components.get_mut(&args.interactor),
            self.interactable_components.get_mut(&args.interactable),
        ) else {
            warn!(
                "Hover enter between unknown {:?} and {:?}",
                args.interactor, args.interactable
            );
            return;
        };

        let mut commands = InteractionCommands::default();
        interactor.state_mut().hover_entering(args.interactable);
        interactor.on_hover_entering(&args);
        interactable.state_mut().hover_entering(args.interactor);
        interactable.on_hover_entering(&args);
        interactor.on_hover_entered(&args, &mut commands);
        let first_hover = interactable.state().hovering_interactors().len() == 1;
        interactable.on_hover_entered(&args, &mut commands);

        if first_hover {
            self.events.push(InteractionEvent::FirstHoverEntered(args));
        }
        self.events.push(InteractionEvent::HoverEntered(args));
        self.apply_commands(commands);
    }

    fn hover_exit_with(&mut self, args: HoverExitEventArgs) {
        let (Some(interactor), Some(interactable)) = (
            self.interactor_components.get_mut(&args.interactor),
            self.interactable_components.get_mut(&args.interactable),
        ) else {
            warn!(
                "Hover exit between unknown {:?} and {:?}",
                args.interactor, args.interactable
            );
            return;
        };
        if !interactor.state().is_hovering(args.interactable) {
            return;
        }

        let mut commands = InteractionCommands::default();
        interactor.state_mut().hover_exiting(args.interactable);
        interactor.on_hover_exiting(&args);
        interactable.state_mut().hover_exiting(args.interactor);
        interactable.on_hover_exiting(&args);
        interactor.on_hover_exited(&args, &mut commands);
        let last_hover = !interactable.state().is_hovered();
        interactable.on_hover_exited(&args, &mut commands);

        if last_hover {
            self.events.push(InteractionEvent::LastHoverExited(args));
        }
        self.events.push(InteractionEvent::HoverExited(args));
        self.apply_commands(commands);
    }

    pub fn activate(&mut self, interactor: Entity, interactable: Entity) {
        let args = ActivateEventArgs {
            interactor,
            interactable,
        };
        let Some(component) = self.interactable_components.get_mut(&interactable) else {
            warn!("Tried to activate {interactable:?} which has no interactable component");
            return;
        };

        let mut commands = InteractionCommands::default();
        component.on_activated(&args, &mut commands);
        self.events.push(InteractionEvent::Activated(args));
        self.apply_commands(commands);
    }

    pub fn deactivate(&mut self, interactor: Entity, interactable: Entity) {
        let args = DeactivateEventArgs {
            interactor,
            interactable,
        };
        let Some(component) = self.interactable_components.get_mut(&interactable) else {
            warn!("Tried to deactivate {interactable:?} which has no interactable component");
            return;
        };

        let mut commands = InteractionCommands::default();
        component.on_deactivated(&args, &mut commands);
        self.events.push(InteractionEvent::Deactivated(args));
        self.apply_commands(commands);
    }

    /// Selects `interactable` and keeps the interactor's select active until
    /// [`end_manual_interaction`](Self::end_manual_interaction).
    pub fn start_manual_interaction(
        &mut self,
        interactor: Entity,
        interactable: Entity,
    ) -> Result<()> {
        if !self.interactors.is_registered(&interactor) {
            warn!("Cannot start manual interaction, {interactor:?} is not registered");
            return Err(InteractionError::InteractorNotRegistered(interactor));
        }

        self.select_enter(interactor, interactable);
        if let Some(component) = self.interactor_components.get_mut(&interactor) {
            component.state_mut().set_manual_interaction(true);
        }
        Ok(())
    }

    /// Ends a manual interaction, exiting its selection.
    pub fn end_manual_interaction(&mut self, interactor: Entity) -> Result<()> {
        if !self.interactors.is_registered(&interactor) {
            warn!("Cannot end manual interaction, {interactor:?} is not registered");
            return Err(InteractionError::InteractorNotRegistered(interactor));
        }
        let performing = self
            .interactor_components
            .get(&interactor)
            .is_some_and(|component| component.state().is_performing_manual_interaction());
        if !performing {
            warn!("Tried to end manual interaction but {interactor:?} was not performing one");
            return Err(InteractionError::NotPerformingManualInteraction(interactor));
        }

        if let Some(target) = self.select_target(interactor) {
            self.select_exit(interactor, target);
        }
        if let Some(component) = self.interactor_components.get_mut(&interactor) {
            component.state_mut().set_manual_interaction(false);
        }
        Ok(())
    }

    /// Forwards a trigger enter on the interactor's volume.
    pub fn trigger_enter(&mut self, interactor: Entity, collider: Entity) {
        let context = context!(self);
        if let Some(component) = self.interactor_components.get_mut(&interactor) {
            component.on_trigger_enter(collider, &context);
        }
    }

    /// Forwards a trigger exit on the interactor's volume.
    pub fn trigger_exit(&mut self, interactor: Entity, collider: Entity) {
        if let Some(component) = self.interactor_components.get_mut(&interactor) {
            component.on_trigger_exit(collider);
        }
    }

    /// Refreshes attach points and collider positions. `position_of` returns the world position
    /// of an entity, or `None` to leave the stored position untouched.
    pub fn sync_positions(&mut self, position_of: impl Fn(Entity) -> Option<Vec3>) {
        for (entity, component) in self.interactor_components.iter_mut() {
            let source = component.state().attach_entity.unwrap_or(*entity);
            if let Some(position) = position_of(source) {
                component.state_mut().attach_point = position;
            }
        }
        for component in self.interactable_components.values_mut() {
            for collider in component.state_mut().colliders.iter_mut() {
                if let Some(position) = position_of(collider.entity) {
                    collider.position = position;
                }
            }
        }
    }

    pub fn apply_commands(&mut self, commands: InteractionCommands) {
        for command in commands {
            match command {
                InteractionCommand::RegisterInteractor(interactor) => {
                    self.register_interactor(interactor);
                }
                InteractionCommand::UnregisterInteractor(interactor) => {
                    self.unregister_interactor(interactor);
                }
                InteractionCommand::RegisterInteractable(interactable) => {
                    self.register_interactable(interactable);
                }
                InteractionCommand::UnregisterInteractable(interactable) => {
                    self.unregister_interactable(interactable);
                }
                InteractionCommand::ForceSelect {
                    interactor,
                    interactable,
                } => self.force_select(interactor, interactable),
                InteractionCommand::SelectExit {
                    interactor,
                    interactable,
                } => self.select_exit(interactor, interactable),
                InteractionCommand::Activate(args) => {
                    self.activate(args.interactor, args.interactable)
                }
                InteractionCommand::Deactivate(args) => {
                    self.deactivate(args.interactor, args.interactable)
                }
            }
        }
    }

    /// Events produced since the last [`drain_events`](Self::drain_events), oldest first.
    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        mem::take(&mut self.events)
    }
}
