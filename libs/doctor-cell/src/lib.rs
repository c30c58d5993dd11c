pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    BookedSlotMap, Doctor, DoctorError, DoctorListing, DoctorProfile, SlotDate, SlotLabelError,
    SlotTime,
};
pub use services::slots::{offerable_slots, DaySlots};
