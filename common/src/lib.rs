//! Wire types shared between the voter registry backend and its clients.
//!
//! Everything in here is plain serde data: the backend serializes these shapes in its
//! JSON envelopes, and the dashboard deserializes them. Field names are camelCase on
//! the wire.

pub mod model;
pub mod requests;
