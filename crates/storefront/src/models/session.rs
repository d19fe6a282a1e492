//! Session-related types.
//!
//! Keys under which per-browser state is stored in the session.

/// Session keys used by the storefront.
pub mod keys {
    /// Key for the cart: a JSON object mapping product id to product id.
    pub const CART_PRODUCT_DATA: &str = "cart_product_data";

    /// Key for the URL of the most recently uploaded image.
    pub const IMAGE_URL: &str = "image_url";
}
