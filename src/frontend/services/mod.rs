//! Frontend services bridging the session backend into Dioxus.

pub mod context;
pub mod navigator;
