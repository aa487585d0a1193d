// Payload types of the cellar API

pub mod account;
pub mod bottle;

pub use account::AccountPayload;
pub use bottle::{BottleColor, BottlePayload, RatePayload};
