//! Property names stored on catalog record nodes.

pub const PRODUCT_TITLE: &str = "productTitle";
pub const PUBLISH_STATUS: &str = "publishStatus";
pub const ACTIVATION_DATE: &str = "activationDate";
pub const LAST_IMPORTED_DATE: &str = "lastImportedDate";
pub const LONG_DESCRIPTION: &str = "longDescription";
pub const SPECIFICATION: &str = "specification";
pub const TAGS: &str = "tags";
pub const PROMO_MESSAGE: &str = "promoMessage";
pub const SELLABLE: &str = "sellable";

pub const VENDOR: &str = "vendor";
pub const GIFT_WRAPPABLE: &str = "giftWrappable";
pub const EXT_ID: &str = "extId";
pub const AVAILABILITY_DATE: &str = "availabilityDate";
pub const PRODUCT_NAME: &str = "productName";
pub const PRODUCT_COMPARABLE: &str = "productComparable";
pub const PRODUCT_STATUS: &str = "productStatus";
pub const SHIP_TO_STORE: &str = "shipToStore";
pub const FULFILLER_ID: &str = "fulfillerId";
pub const FULFILLER_NAME: &str = "fulfillerName";
pub const BRAND: &str = "brand";
pub const CREATION_DATE: &str = "creationDate";
pub const LAST_MODIFIED_DATE: &str = "lastModifiedDate";
pub const ASSEMBLY_REQUIRED: &str = "assemblyRequired";
pub const STICK_WARRANTY: &str = "stickWarranty";
pub const LAST_MODIFIED_BY: &str = "lastModifiedBy";
pub const CREATED_BY: &str = "createdBy";

/// Any property whose name starts with this prefix marks the record as
/// having associated images.
pub const IMAGES_PREFIX: &str = "images";

/// Tag values carrying this prefix are hierarchical categories and match
/// their descendants; all other tag values match exactly.
pub const CATEGORY_TAG_PREFIX: &str = "cat:";
