// ABOUTME: Cryptographic helpers for the authorization server
// ABOUTME: Currently just the adaptive password hasher shared by user and client secrets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

pub mod password;

pub use password::{PasswordError, PasswordHasher};
