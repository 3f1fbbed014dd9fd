// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Catalog record entity and its row projection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::search::executor::SearchError;
use crate::search::properties;
use crate::store::Row;

/// Publish lifecycle of a catalog record. The id set is closed; an unmapped
/// id read from the store is a hard error, never a sentinel default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublishStatus {
    New,
    Published,
    Failed,
    Modified,
    Pending,
}

impl PublishStatus {
    pub fn id(self) -> i64 {
        match self {
            PublishStatus::New => 1,
            PublishStatus::Published => 2,
            PublishStatus::Failed => 3,
            PublishStatus::Modified => 4,
            PublishStatus::Pending => 5,
        }
    }

    pub fn from_id(id: i64) -> Result<Self, SearchError> {
        match id {
            1 => Ok(PublishStatus::New),
            2 => Ok(PublishStatus::Published),
            3 => Ok(PublishStatus::Failed),
            4 => Ok(PublishStatus::Modified),
            5 => Ok(PublishStatus::Pending),
            other => Err(SearchError::UnknownPublishStatus(other)),
        }
    }
}

/// Lookup of a user's display name, used to decorate the last-modified-by
/// field. An opaque, possibly slow external call; a failed lookup degrades
/// to an empty display name rather than failing the page.
pub trait UserDirectory: Send + Sync {
    fn display_name(&self, user_id: &str) -> Option<String>;
}

/// A directory that knows nobody.
pub struct NoUserDirectory;

impl UserDirectory for NoUserDirectory {
    fn display_name(&self, _user_id: &str) -> Option<String> {
        None
    }
}

/// One catalog record, projected from a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub path: String,
    pub activation_date: Option<DateTime<Utc>>,
    pub availability_date: Option<DateTime<Utc>>,
    pub creation_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub last_imported_date: Option<DateTime<Utc>>,
    pub brand: String,
    pub ext_id: String,
    pub long_description: String,
    pub product_name: String,
    pub product_title: String,
    pub promo_message: String,
    pub specification: String,
    pub fulfiller_name: String,
    pub vendor: String,
    pub sellable: bool,
    pub gift_wrappable: bool,
    pub comparable: bool,
    pub ship_to_store: bool,
    pub product_status: i64,
    pub fulfiller_id: i64,
    pub publish_status: PublishStatus,
    pub image_associated: bool,
    pub assembly_required: bool,
    pub stick_warranty: bool,
    pub last_modified_by: String,
}

impl Product {
    /// Project a result row into a record.
    ///
    /// The string and boolean properties are optional with defaults; the
    /// three status/id longs are mandatory, and their absence fails the
    /// whole page.
    pub fn from_row(row: &Row, users: &dyn UserDirectory) -> Result<Self, SearchError> {
        let product_status = required_long(row, properties::PRODUCT_STATUS)?;
        let fulfiller_id = required_long(row, properties::FULFILLER_ID)?;
        let publish_status = PublishStatus::from_id(required_long(row, properties::PUBLISH_STATUS)?)?;

        let image_associated = row
            .property_names()
            .any(|name| name.starts_with(properties::IMAGES_PREFIX));

        let editor_id = {
            let by = row.str_property(properties::LAST_MODIFIED_BY, "");
            if by.is_empty() {
                row.str_property(properties::CREATED_BY, "")
            } else {
                by
            }
        };
        let last_modified_by = users.display_name(&editor_id).unwrap_or_default();

        Ok(Product {
            path: row.path().to_string(),
            activation_date: row.date_property(properties::ACTIVATION_DATE),
            availability_date: row.date_property(properties::AVAILABILITY_DATE),
            creation_date: row.date_property(properties::CREATION_DATE),
            last_modified_date: row.date_property(properties::LAST_MODIFIED_DATE),
            last_imported_date: row.date_property(properties::LAST_IMPORTED_DATE),
            brand: row.str_property(properties::BRAND, ""),
            ext_id: row.str_property(properties::EXT_ID, ""),
            long_description: row.str_property(properties::LONG_DESCRIPTION, ""),
            product_name: row.str_property(properties::PRODUCT_NAME, ""),
            product_title: row.str_property(properties::PRODUCT_TITLE, ""),
            promo_message: row.str_property(properties::PROMO_MESSAGE, ""),
            specification: row.str_property(properties::SPECIFICATION, ""),
            fulfiller_name: row.str_property(properties::FULFILLER_NAME, ""),
            vendor: row.str_property(properties::VENDOR, ""),
            sellable: row.bool_property(properties::SELLABLE, false),
            gift_wrappable: row.bool_property(properties::GIFT_WRAPPABLE, false),
            comparable: row.bool_property(properties::PRODUCT_COMPARABLE, false),
            ship_to_store: row.bool_property(properties::SHIP_TO_STORE, false),
            product_status,
            fulfiller_id,
            publish_status,
            image_associated,
            assembly_required: row.bool_property(properties::ASSEMBLY_REQUIRED, false),
            stick_warranty: row.bool_property(properties::STICK_WARRANTY, false),
            last_modified_by,
        })
    }
}

fn required_long(row: &Row, name: &str) -> Result<i64, SearchError> {
    row.long_property(name)
        .ok_or_else(|| SearchError::mapping(row.path(), format!("missing long property '{name}'")))
}
