use bevy::ecs::entity::Entity;
use bevy::math::Vec3;
use bevy_mod_xr_interaction::contact::TriggerContactMonitor;
use bevy_mod_xr_interaction::context::InteractionContext;
use bevy_mod_xr_interaction::sorting::sort_by_distance_to_point;

/// Interactables touching a trigger volume, in the order contact started.
///
/// Shared by the interactors that pick their targets from trigger contacts.
#[derive(Clone, Debug, Default)]
pub struct ContactTargets {
    monitor: TriggerContactMonitor,
    valid_targets: Vec<Entity>,
}

impl ContactTargets {
    /// Touching interactables, unsorted.
    pub fn targets(&self) -> &[Entity] {
        &self.valid_targets
    }

    pub fn is_empty(&self) -> bool {
        self.valid_targets.is_empty()
    }

    /// Writes the touching interactables into `results`, nearest to `point` first.
    pub fn sorted_targets(
        &self,
        point: Vec3,
        context: &InteractionContext,
        results: &mut Vec<Entity>,
    ) {
        sort_by_distance_to_point(point, &self.valid_targets, context, results);
    }

    pub fn on_registered(&mut self, context: &InteractionContext) {
        for interactable in self.monitor.resolve_unassociated_colliders(context) {
            self.contact_added(interactable);
        }
        self.valid_targets
            .retain(|target| context.is_interactable_registered(*target));
    }

    pub fn on_interactable_registered(
        &mut self,
        interactable: Entity,
        context: &InteractionContext,
    ) {
        let Some(component) = context.interactable(interactable) else {
            return;
        };
        let colliders = component.state().colliders.iter().map(|c| c.entity);
        if self
            .monitor
            .resolve_unassociated_colliders_for(interactable, colliders, context)
        {
            self.contact_added(interactable);
        }
    }

    pub fn on_interactable_unregistered(&mut self, interactable: Entity) {
        self.monitor.dissociate_interactable(interactable);
        self.contact_removed(interactable);
    }

    pub fn on_trigger_enter(&mut self, collider: Entity, context: &InteractionContext) {
        if let Some(interactable) = self.monitor.add_collider(collider, context) {
            self.contact_added(interactable);
        }
    }

    pub fn on_trigger_exit(&mut self, collider: Entity) {
        if let Some(interactable) = self.monitor.remove_collider(collider) {
            self.contact_removed(interactable);
        }
    }

    fn contact_added(&mut self, interactable: Entity) {
        if !self.valid_targets.contains(&interactable) {
            self.valid_targets.push(interactable);
        }
    }

    fn contact_removed(&mut self, interactable: Entity) {
        self.valid_targets.retain(|target| *target != interactable);
    }
}
