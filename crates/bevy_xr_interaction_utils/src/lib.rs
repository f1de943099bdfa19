pub mod contact_targets;
pub mod controller;
pub mod controller_input;
pub mod direct_interactor;
pub mod simple_interactable;
pub mod socket_interactor;
