// ABOUTME: Crate root for the grantor authorization server
// ABOUTME: Sessions, authorization codes, and signed bearer tokens over a relational store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

//! # grantor
//!
//! An OAuth2-style authorization server implementing the authorization-code
//! grant for two principals: end-users and client applications. Users
//! register and authenticate, grant consent to a client, the client exchanges
//! the resulting one-time authorization code for access/refresh tokens, and
//! later refreshes the access token.
//!
//! Three distinct credential kinds flow through the system:
//!
//! - **sessions** ([`session`]) — opaque server-side records with explicit
//!   termination and lazy expiry
//! - **authorization codes** ([`database`]) — short-lived store-generated
//!   grants binding a user to a client
//! - **access/refresh tokens** ([`tokens`]) — self-contained signed tokens
//!   verifiable offline
//!
//! The policy binding them together lives in [`services`]; the wire surface
//! in [`routes`].

pub mod config;
pub mod crypto;
pub mod database;
pub mod errors;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;
pub mod session;
pub mod tokens;
pub mod validation;
