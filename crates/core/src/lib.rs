// SPDX-License-Identifier: MIT

//!
//! *Part of the wider GeoMark project*
//!
//! This crate defines the basic datatypes used across the GeoMark project
//! (web API, persistence layer, client, temporal engine).
//!
//! This crate is designed to be used by the rest of the GeoMark project, as
//! well as by other 3rd party projects that want to interact with GeoMark
//! (e.g. via its JSON web API).
//!
//! This crate aims to provide APIs for each type so that if a type is
//! instantiated, the developer can be sure it's valid.
//!

mod api;
mod geo;
mod id;
mod marker;
mod title;
mod user;
mod visibility;

pub use api::*;
pub use geo::*;
pub use id::*;
pub use marker::*;
pub use title::*;
pub use user::*;
pub use visibility::*;
