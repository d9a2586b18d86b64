#![doc = "apipost-sync-core: core logic library for apipost-sync."]

//! This crate contains the upload pipeline for apipost-sync: batching,
//! OpenAPI conversion, the uploader interface and the concurrent coordinator.
//! Transport and configuration-file concerns live in the `apipost-sync` crate.
//!
//! # Usage
//! Build an [`config::UploadTarget`], pick a [`contract::DocumentConverter`]
//! and an [`contract::Uploader`], then call [`synchronise::synchronise`].

pub mod category;
pub mod config;
pub mod contract;
pub mod convert;
pub mod split;
pub mod synchronise;
