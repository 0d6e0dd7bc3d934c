//! Music track recommendations blending precomputed offline rankings with
//! online signals from recent user events and item similarity.

pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
