//! Embedded stylesheets and images.

use base64::{Engine as _, engine::general_purpose};
use std::{collections::HashMap, sync::OnceLock};

static ASSET_CACHE: OnceLock<HashMap<&'static str, String>> = OnceLock::new();
static CSS_CACHE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

macro_rules! embed_asset {
    ($name:expr, $mime:expr, $path:expr) => {
        (
            $name,
            $mime,
            include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/", $path)) as &[u8],
        )
    };
}

const ASSETS: &[(&str, &str, &[u8])] = &[embed_asset!(
    "logo",
    "image/svg+xml",
    "assets/images/logo.svg"
)];

pub struct ResourceLoader;

impl ResourceLoader {
    fn get_all_assets() -> HashMap<&'static str, String> {
        ASSETS
            .iter()
            .map(|&(name, mime, bytes)| {
                let data = general_purpose::STANDARD.encode(bytes);
                (name, format!("data:{mime};base64,{data}"))
            })
            .collect()
    }

    /// Returns an embedded image as a data URL.
    pub fn get_asset(name: &str) -> String {
        ASSET_CACHE
            .get_or_init(Self::get_all_assets)
            .get(name)
            .cloned()
            .unwrap_or_else(|| "data:image/png;base64,".into())
    }

    fn get_all_styles() -> HashMap<&'static str, &'static str> {
        let mut m = HashMap::new();
        macro_rules! style {
            ($n:expr, $p:expr) => {
                m.insert($n, include_str!(concat!(env!("CARGO_MANIFEST_DIR"), $p)));
            };
        }
        style!("main", "/assets/styles/main.css");
        style!("auth", "/assets/styles/auth.css");
        style!("dashboard", "/assets/styles/dashboard.css");
        m
    }

    pub fn get_css(name: &str) -> &'static str {
        CSS_CACHE
            .get_or_init(Self::get_all_styles)
            .get(name)
            .copied()
            .unwrap_or("")
    }
}
