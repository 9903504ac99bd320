// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod http;
mod logging;
mod supabase;

pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use supabase::{SupabaseConfig, SupabaseConfigLayer, DEFAULT_REQUEST_TIMEOUT_SECS};
