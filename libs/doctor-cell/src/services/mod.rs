pub mod doctor;
pub mod slots;
