use bevy::ecs::entity::Entity;
use bevy::math::Vec3;

use crate::context::InteractionContext;

/// Writes `unsorted` into `results` ordered by squared distance from `point`, nearest first.
///
/// Equal distances keep their order from `unsorted`. Interactables without a stored component
/// sort last.
pub fn sort_by_distance_to_point(
    point: Vec3,
    unsorted: &[Entity],
    context: &InteractionContext,
    results: &mut Vec<Entity>,
) {
    let mut distances: Vec<(Entity, f32)> = unsorted
        .iter()
        .map(|&interactable| {
            let distance = context
                .interactable(interactable)
                .map_or(f32::MAX, |component| component.distance_sqr(point));
            (interactable, distance)
        })
        .collect();
    distances.sort_by(|(_, a), (_, b)| a.total_cmp(b));

    results.clear();
    results.extend(distances.into_iter().map(|(interactable, _)| interactable));
}

#[cfg(test)]
mod tests {
    use bevy::utils::HashMap;

    use super::*;
    use crate::interactable::{Interactable, InteractableCollider, InteractableState};
    use crate::registration::RegistrationList;

    struct Target(InteractableState);

    impl Interactable for Target {
        fn state(&self) -> &InteractableState {
            &self.0
        }

        fn state_mut(&mut self) -> &mut InteractableState {
            &mut self.0
        }
    }

    #[test]
    fn sorts_nearest_first_and_keeps_ties_in_order() {
        let mut components: HashMap<Entity, Box<dyn Interactable>> = HashMap::default();
        let positions = [(1, 5.0), (2, 1.0), (3, 5.0), (4, 3.0)];
        for (index, x) in positions {
            let entity = Entity::from_raw(index);
            let collider = InteractableCollider::at(Entity::from_raw(index + 100), Vec3::X * x);
            components.insert(
                entity,
                Box::new(Target(InteractableState::with_colliders([collider]))),
            );
        }
        let colliders = HashMap::default();
        let interactables = RegistrationList::new();
        let context = InteractionContext::new(&colliders, &interactables, &components);

        let unsorted: Vec<Entity> = [5, 1, 2, 3, 4].map(Entity::from_raw).to_vec();
        let mut results = vec![Entity::from_raw(99)];
        sort_by_distance_to_point(Vec3::ZERO, &unsorted, &context, &mut results);

        let order: Vec<u32> = results.iter().map(|e| e.index()).collect();
        // Entity 5 has no component and sorts last.
        assert_eq!(order, vec![2, 4, 1, 3, 5]);
    }
}
