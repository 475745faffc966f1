//! GitHub-backed content connector for the web editor.
//!
//! Authenticates editor requests against GitHub OAuth, exposes repository
//! branches as workspaces, and serves file CRUD with commit history drawn
//! from local working copies.

pub mod auth;
pub mod error;
pub mod git;
pub mod github;
pub mod models;
pub mod naming;
pub mod routes;
pub mod storage;
