#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate lazy_static;

pub mod animator;
pub mod geo;
pub mod logs;
pub mod map_bridge;
pub mod notifications;
pub mod route_path;
pub mod tracking_session;
pub mod transit_data;
