//! Session subdomain: the normalized model-response shapes.

pub mod response;
