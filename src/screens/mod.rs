pub mod crud;
pub mod menu;
pub mod topics;
