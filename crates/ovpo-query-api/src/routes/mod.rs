pub mod health;
pub mod traces;
