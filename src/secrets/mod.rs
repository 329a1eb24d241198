//! Handling for secret-bearing credential fields.
//!
//! Client secrets and certificate references travel through the crate as
//! [`SecretString`], which never prints or serializes its value unless a
//! caller asks for it explicitly. The store wire codec is the only place that
//! does so, through [`serialize_exposed`].

pub mod types;

pub use types::{serialize_exposed, serialize_exposed_opt, SecretString};
