//! Service implementations

pub mod clock;
pub mod terminal;

pub use clock::SystemClock;
pub use terminal::TerminalDriver;
