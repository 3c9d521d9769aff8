pub mod participant;
pub mod region;
pub mod session;
pub mod squad;
pub mod state_document;

pub use participant::{MAX_NAME_LEN, Participant};
pub use region::{InvalidRegion, Region, UNPLAYABLE_COST};
pub use session::{Announcement, DEFAULT_CASCADE_LABEL, ServerRegistration, Session};
pub use squad::{SQUAD_CAPACITY, Squad};
pub use state_document::{SlotPosition, StateDocument};
