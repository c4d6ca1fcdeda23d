// Per-tick systems operating on tanks.

pub mod collision;
pub mod kinematics;
