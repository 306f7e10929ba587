//! Citizen profile: personal fields plus a fixed set of independently managed document slots.

pub mod domain;
pub mod gateway;
pub mod manager;


pub use domain::{
    DocumentSlot, NamedDocument, PersonalDetails, ProfileUpdate, UnknownSlot, UserProfile,
};
pub use gateway::ProfileGateway;
pub use manager::{
    DeleteOutcome, DeletionConfirmer, DocumentSlotManager, ProfileError, ProfileOperation,
    SlotState,
};
