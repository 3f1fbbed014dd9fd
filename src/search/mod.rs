// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Catalog search: executor/pager, record projection, and the criteria
//! facade.

mod executor;
mod product;
pub mod properties;
mod products;

pub use executor::{execute_paged, SearchError, SearchPage};
pub use product::{NoUserDirectory, Product, PublishStatus, UserDirectory};
pub use products::ProductSearch;
