// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dsync-adapters: HTTP clients for the triple store and the delta producer

pub mod producer;
pub mod query;
pub mod sparql;

#[cfg(any(test, feature = "test-support"))]
pub use producer::{FakeProducerAdapter, ProducerCall};
pub use producer::{HttpProducer, ProducerAdapter, ProducerConfig, ProducerError};
pub use query::QueryBuilder;
pub use sparql::SparqlStore;
