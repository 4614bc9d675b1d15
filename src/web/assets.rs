//! Dashboard page, compiled into the binary.

macro_rules! dashboard_asset {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/web/assets/", $file))
    };
}

pub const INDEX_HTML: &str = dashboard_asset!("index.html");
pub const STYLES_CSS: &str = dashboard_asset!("styles.css");
pub const APP_JS: &str = dashboard_asset!("app.js");
