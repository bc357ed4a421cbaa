//! Database schemas for Greenpoint
//!
//! MongoDB document structures for users, pickups and pledges.

mod metadata;
mod pickup;
mod pledge;
mod user;

pub use metadata::Metadata;
pub use pickup::{PickupDoc, PickupStatus, PICKUP_COLLECTION};
pub use pledge::{PledgeDoc, PLEDGE_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
