pub mod attendance;
pub mod bookings;
pub mod registries;
pub mod shifts;
pub mod staff;
