//! Pipeline watching

pub mod poller;

pub use poller::{PollEvent, PollEventHandler, Poller};
