use bevy::app::{App, FixedUpdate, Last, Plugin, PostUpdate, PreUpdate, Update};
use bevy::ecs::entity::Entity;
use bevy::ecs::event::{Event, EventReader};
use bevy::ecs::schedule::{IntoSystemConfigs, SystemSet};
use bevy::ecs::system::{Query, Res, ResMut, Resource};
use bevy::ecs::world::World;
use bevy::log::info;
use bevy::time::Time;
use bevy::transform::components::GlobalTransform;

use crate::context::UpdatePhase;
use crate::events::*;
use crate::manager::InteractionManager;

/// Adds the [`InteractionManager`] and runs its update passes in the matching schedules.
///
/// | Schedule      | Phase                          |
/// |---------------|--------------------------------|
/// | `FixedUpdate` | [`UpdatePhase::Fixed`]          |
/// | `Update`      | [`UpdatePhase::Dynamic`]        |
/// | `PostUpdate`  | [`UpdatePhase::Late`]           |
/// | `Last`        | [`UpdatePhase::OnBeforeRender`] |
///
/// Produced interactions are sent as Bevy events right after each pass.
pub struct XrInteractionPlugin;

impl Plugin for XrInteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionManager>()
            .init_resource::<InteractionPhases>()
            .add_event::<TriggerContact>()
            .add_event::<HoverEnterEventArgs>()
            .add_event::<HoverExitEventArgs>()
            .add_event::<FirstHoverEntered>()
            .add_event::<LastHoverExited>()
            .add_event::<SelectEnterEventArgs>()
            .add_event::<SelectExitEventArgs>()
            .add_event::<ActivateEventArgs>()
            .add_event::<DeactivateEventArgs>()
            .add_event::<InteractorRegisteredEventArgs>()
            .add_event::<InteractorUnregisteredEventArgs>()
            .add_event::<InteractableRegisteredEventArgs>()
            .add_event::<InteractableUnregisteredEventArgs>()
            .add_systems(
                PreUpdate,
                (sync_interaction_transforms, forward_trigger_contacts)
                    .chain()
                    .in_set(XrInteractionSet::SyncInputs),
            )
            .add_systems(FixedUpdate, phase_systems(UpdatePhase::Fixed))
            .add_systems(Update, phase_systems(UpdatePhase::Dynamic))
            .add_systems(PostUpdate, phase_systems(UpdatePhase::Late))
            .add_systems(Last, phase_systems(UpdatePhase::OnBeforeRender));
        info!("Added XR interaction systems");
    }
}

#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XrInteractionSet {
    /// Transforms and trigger contacts are copied into the manager.
    SyncInputs,
    /// The manager runs an update pass.
    Process,
    /// Interactions from the pass are sent as events.
    SendEvents,
}

/// Which update passes run. All are enabled by default.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractionPhases {
    pub fixed: bool,
    pub dynamic: bool,
    pub late: bool,
    pub before_render: bool,
}

impl Default for InteractionPhases {
    fn default() -> Self {
        Self {
            fixed: true,
            dynamic: true,
            late: true,
            before_render: true,
        }
    }
}

impl InteractionPhases {
    pub fn is_enabled(&self, phase: UpdatePhase) -> bool {
        match phase {
            UpdatePhase::Fixed => self.fixed,
            UpdatePhase::Dynamic => self.dynamic,
            UpdatePhase::Late => self.late,
            UpdatePhase::OnBeforeRender => self.before_render,
        }
    }
}

/// Trigger volume contacts reported by the host's physics.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerContact {
    Entered { interactor: Entity, collider: Entity },
    Exited { interactor: Entity, collider: Entity },
}

fn phase_systems(phase: UpdatePhase) -> impl IntoSystemConfigs<()> {
    (
        update_phase(phase)
            .run_if(phase_enabled(phase))
            .in_set(XrInteractionSet::Process),
        send_interaction_events.in_set(XrInteractionSet::SendEvents),
    )
        .chain()
}

/// A function that returns a [`Condition`](bevy::ecs::schedule::Condition) system that says if
/// the given [`UpdatePhase`] is enabled in [`InteractionPhases`]
pub fn phase_enabled(phase: UpdatePhase) -> impl FnMut(Option<Res<InteractionPhases>>) -> bool {
    move |phases: Option<Res<InteractionPhases>>| phases.map_or(true, |p| p.is_enabled(phase))
}

/// A function that returns a system running one [`InteractionManager`] update pass for `phase`.
pub fn update_phase(
    phase: UpdatePhase,
) -> impl FnMut(ResMut<InteractionManager>, Option<Res<Time>>) {
    move |mut manager: ResMut<InteractionManager>, time: Option<Res<Time>>| {
        let elapsed_seconds = time.map_or(0.0, |time| time.elapsed_seconds());
        manager.update(phase, elapsed_seconds);
    }
}

pub fn sync_interaction_transforms(
    mut manager: ResMut<InteractionManager>,
    transforms: Query<&GlobalTransform>,
) {
    manager.sync_positions(|entity| {
        transforms
            .get(entity)
            .ok()
            .map(GlobalTransform::translation)
    });
}

pub fn forward_trigger_contacts(
    mut manager: ResMut<InteractionManager>,
    mut contacts: EventReader<TriggerContact>,
) {
    for contact in contacts.read() {
        match *contact {
            TriggerContact::Entered {
                interactor,
                collider,
            } => manager.trigger_enter(interactor, collider),
            TriggerContact::Exited {
                interactor,
                collider,
            } => manager.trigger_exit(interactor, collider),
        }
    }
}

/// Drains the [`InteractionManager`] and sends each interaction as its own event type.
pub fn send_interaction_events(world: &mut World) {
    let Some(mut manager) = world.get_resource_mut::<InteractionManager>() else {
        return;
    };
    let events = manager.drain_events();

    for event in events {
        match event {
            InteractionEvent::HoverEntered(args) => {
                world.send_event(args);
            }
            InteractionEvent::HoverExited(args) => {
                world.send_event(args);
            }
            InteractionEvent::FirstHoverEntered(args) => {
                world.send_event(FirstHoverEntered(args));
            }
            InteractionEvent::LastHoverExited(args) => {
                world.send_event(LastHoverExited(args));
            }
            InteractionEvent::SelectEntered(args) => {
                world.send_event(args);
            }
            InteractionEvent::SelectExited(args) => {
                world.send_event(args);
            }
            InteractionEvent::Activated(args) => {
                world.send_event(args);
            }
            InteractionEvent::Deactivated(args) => {
                world.send_event(args);
            }
            InteractionEvent::InteractorRegistered(args) => {
                world.send_event(args);
            }
            InteractionEvent::InteractorUnregistered(args) => {
                world.send_event(args);
            }
            InteractionEvent::InteractableRegistered(args) => {
                world.send_event(args);
            }
            InteractionEvent::InteractableUnregistered(args) => {
                world.send_event(args);
            }
        }
    }
}
