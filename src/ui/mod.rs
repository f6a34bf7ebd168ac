pub mod console;
pub mod table;
pub mod theme;
