use bevy::ecs::entity::Entity;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InteractionError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionError {
    #[error("{0:?} already has an interactor component")]
    DuplicateInteractor(Entity),
    #[error("{0:?} already has an interactable component")]
    DuplicateInteractable(Entity),
    #[error("Interactor {0:?} is not registered with an interaction manager")]
    InteractorNotRegistered(Entity),
    #[error("Interactor {0:?} is not performing a manual interaction")]
    NotPerformingManualInteraction(Entity),
}
