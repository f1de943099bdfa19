use bevy::ecs::entity::Entity;
use bevy::utils::{HashMap, HashSet};

use crate::context::ColliderLookup;

/// Tracks which interactables are touching a trigger volume.
///
/// Contacts are reported per interactable, so several colliders of one interactable count as a
/// single contact. Colliders whose interactable isn't known yet are kept aside until
/// [`resolve_unassociated_colliders`](Self::resolve_unassociated_colliders) can map them.
#[derive(Clone, Debug, Default)]
pub struct TriggerContactMonitor {
    entered_colliders: HashMap<Entity, Entity>,
    unordered_interactables: HashSet<Entity>,
    entered_unassociated_colliders: HashSet<Entity>,
}

impl TriggerContactMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `collider` entered the trigger.
    ///
    /// Returns the interactable if this added a new contact.
    pub fn add_collider(&mut self, collider: Entity, lookup: &impl ColliderLookup) -> Option<Entity> {
        let Some(interactable) = lookup.interactable_for_collider(collider) else {
            self.entered_unassociated_colliders.insert(collider);
            return None;
        };

        self.entered_colliders.insert(collider, interactable);
        self.unordered_interactables
            .insert(interactable)
            .then_some(interactable)
    }

    /// Records that `collider` left the trigger.
    ///
    /// Returns the interactable if this removed its last touching collider.
    pub fn remove_collider(&mut self, collider: Entity) -> Option<Entity> {
        if self.entered_unassociated_colliders.remove(&collider) {
            return None;
        }

        let interactable = self.entered_colliders.remove(&collider)?;
        if self.entered_colliders.values().any(|e| *e == interactable) {
            return None;
        }

        self.unordered_interactables
            .remove(&interactable)
            .then_some(interactable)
    }

    /// Maps colliders that entered before their interactable was known.
    ///
    /// Returns the interactables that became new contacts.
    pub fn resolve_unassociated_colliders(&mut self, lookup: &impl ColliderLookup) -> Vec<Entity> {
        let mut added = Vec::new();
        if self.entered_unassociated_colliders.is_empty() {
            return added;
        }

        let resolved: Vec<(Entity, Entity)> = self
            .entered_unassociated_colliders
            .iter()
            .filter_map(|&collider| {
                lookup
                    .interactable_for_collider(collider)
                    .map(|interactable| (collider, interactable))
            })
            .collect();

        for (collider, interactable) in resolved {
            self.entered_unassociated_colliders.remove(&collider);
            self.entered_colliders.insert(collider, interactable);
            if self.unordered_interactables.insert(interactable) {
                added.push(interactable);
            }
        }

        added
    }

    /// Maps the unassociated colliders among `colliders` that resolve to `interactable`.
    ///
    /// Returns `true` if `interactable` became a new contact.
    pub fn resolve_unassociated_colliders_for(
        &mut self,
        interactable: Entity,
        colliders: impl IntoIterator<Item = Entity>,
        lookup: &impl ColliderLookup,
    ) -> bool {
        let mut added = false;
        if self.entered_unassociated_colliders.is_empty() {
            return added;
        }

        for collider in colliders {
            if self.entered_unassociated_colliders.contains(&collider)
                && lookup.interactable_for_collider(collider) == Some(interactable)
            {
                self.entered_unassociated_colliders.remove(&collider);
                self.entered_colliders.insert(collider, interactable);
                added |= self.unordered_interactables.insert(interactable);
            }
        }

        added
    }

    /// Moves the colliders of `interactable` back to the unassociated set, so they resolve again
    /// if it registers later.
    ///
    /// Returns `true` if this removed a contact.
    pub fn dissociate_interactable(&mut self, interactable: Entity) -> bool {
        let colliders: Vec<Entity> = self
            .entered_colliders
            .iter()
            .filter(|(_, owner)| **owner == interactable)
            .map(|(collider, _)| *collider)
            .collect();
        for collider in colliders {
            self.entered_colliders.remove(&collider);
            self.entered_unassociated_colliders.insert(collider);
        }

        self.unordered_interactables.remove(&interactable)
    }

    pub fn is_touching(&self, interactable: Entity) -> bool {
        self.unordered_interactables.contains(&interactable)
    }

    /// The interactables currently touching, in no particular order.
    pub fn contacts(&self) -> impl Iterator<Item = Entity> + '_ {
        self.unordered_interactables.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn colliders_of_one_interactable_collapse_to_one_contact() {
        let mut lookup: HashMap<Entity, Entity> = HashMap::default();
        lookup.insert(entity(10), entity(1));
        lookup.insert(entity(11), entity(1));
        let mut monitor = TriggerContactMonitor::new();

        assert_eq!(monitor.add_collider(entity(10), &lookup), Some(entity(1)));
        assert_eq!(monitor.add_collider(entity(11), &lookup), None);
        assert_eq!(monitor.contacts().count(), 1);

        assert_eq!(monitor.remove_collider(entity(10)), None);
        assert!(monitor.is_touching(entity(1)));
        assert_eq!(monitor.remove_collider(entity(11)), Some(entity(1)));
        assert!(!monitor.is_touching(entity(1)));
    }

    #[test]
    fn unknown_collider_resolves_later() {
        let mut lookup: HashMap<Entity, Entity> = HashMap::default();
        let mut monitor = TriggerContactMonitor::new();

        assert_eq!(monitor.add_collider(entity(10), &lookup), None);
        assert!(monitor.resolve_unassociated_colliders(&lookup).is_empty());

        lookup.insert(entity(10), entity(1));
        assert_eq!(monitor.resolve_unassociated_colliders(&lookup), vec![entity(1)]);
        assert!(monitor.is_touching(entity(1)));
        assert!(monitor.resolve_unassociated_colliders(&lookup).is_empty());
    }

    #[test]
    fn resolve_for_only_takes_matching_colliders() {
        let mut lookup: HashMap<Entity, Entity> = HashMap::default();
        let mut monitor = TriggerContactMonitor::new();
        monitor.add_collider(entity(10), &lookup);
        monitor.add_collider(entity(20), &lookup);

        lookup.insert(entity(10), entity(1));
        lookup.insert(entity(20), entity(2));
        assert!(monitor.resolve_unassociated_colliders_for(entity(1), [entity(10)], &lookup));
        assert!(monitor.is_touching(entity(1)));
        assert!(!monitor.is_touching(entity(2)));

        // The other collider is still waiting to be resolved.
        assert_eq!(monitor.resolve_unassociated_colliders(&lookup), vec![entity(2)]);
    }

    #[test]
    fn removing_unassociated_collider_reports_nothing() {
        let lookup: HashMap<Entity, Entity> = HashMap::default();
        let mut monitor = TriggerContactMonitor::new();
        monitor.add_collider(entity(10), &lookup);
        assert_eq!(monitor.remove_collider(entity(10)), None);
        assert_eq!(monitor.remove_collider(entity(10)), None);
    }

    #[test]
    fn dissociated_interactable_resolves_again() {
        let mut lookup: HashMap<Entity, Entity> = HashMap::default();
        lookup.insert(entity(10), entity(1));
        let mut monitor = TriggerContactMonitor::new();
        monitor.add_collider(entity(10), &lookup);

        assert!(monitor.dissociate_interactable(entity(1)));
        assert!(!monitor.is_touching(entity(1)));
        assert_eq!(monitor.resolve_unassociated_colliders(&lookup), vec![entity(1)]);
    }
}
