// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! CRUD operations on the GeoMark tables
//!

mod common;
mod friend;
mod marker;
mod marker_type;
mod user;

pub use common::*;
pub use friend::*;
pub use marker::*;
pub use marker_type::*;
pub use user::*;
