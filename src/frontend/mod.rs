//! Frontend module for the BusinessPro dashboard.

pub mod app;
pub mod components;
pub mod data;
pub mod pages;
pub mod services;
