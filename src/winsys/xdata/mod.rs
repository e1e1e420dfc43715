pub mod property;
pub mod xconnection;
