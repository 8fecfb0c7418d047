//! On-Road Engine library crate.
//!
//! This crate exposes the on-road price calculation engine and API
//! components as reusable modules.  External applications may depend
//! on the `onroad_engine` crate and call into
//! [`engine::OnRoadEngine`] directly or embed the API via
//! `api::build_router`.

pub mod models;
pub mod error;
pub mod tariff;
pub mod city;
pub mod charges;
pub mod engine;
pub mod format;
pub mod config;
pub mod api;

pub use engine::OnRoadEngine;
pub use error::{PriceError, TariffError};
pub use models::{FuelClass, JurisdictionKey, PriceBand, PriceBreakdown};
