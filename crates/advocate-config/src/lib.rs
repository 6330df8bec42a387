// SPDX-License-Identifier: Apache-2.0

mod loader;
mod schema;

pub use loader::load;
pub use schema::*;
