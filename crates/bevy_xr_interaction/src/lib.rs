pub mod contact;
pub mod context;
pub mod error;
pub mod events;
pub mod interactable;
pub mod interactor;
pub mod layers;
pub mod manager;
pub mod plugin;
pub mod registration;
pub mod sorting;

