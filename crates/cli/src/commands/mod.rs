pub mod doctor;
pub mod lookup;
pub mod serve;
