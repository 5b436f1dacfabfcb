//! Core of the famcal shared family calendar.
//!
//! - `event` / `household`: the domain model
//! - `wire`: store-native encoding of events
//! - `store`: the document store abstraction and its in-process implementation
//! - `remote`: event subscribe / create / update / delete
//! - `live`: the live event list a view reads from
//! - `view` / `form`: month grid, agenda and the event form

pub mod config;
pub mod error;
pub mod event;
pub mod form;
pub mod household;
pub mod live;
pub mod remote;
pub mod store;
pub mod view;
pub mod wire;

pub use error::{FamCalError, FamCalResult};
pub use event::{CalendarEvent, Category, EventPatch, NewEvent};
pub use household::Member;
pub use live::{EventsSnapshot, LiveEvents};
pub use remote::{EventsRemote, Subscription};
pub use store::{DocumentStore, MemoryStore};
