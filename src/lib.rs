//! Timekeeper - declarative job scheduling
//!
//! Callers describe jobs and their firing rules as plain descriptors. The
//! crate translates them into cron or one-shot triggers on a scheduling
//! engine and offers the lifecycle operations around them.

#![allow(missing_docs)]

pub mod app;
pub mod app_info;
pub mod boot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod emails;
pub mod engine;
pub mod environment;
pub mod jobs;
pub mod mailer;
pub mod service;
pub mod setup_tracing;
pub mod translate;
