// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::term::{Term, Triple};
use crate::vocab::{self, types};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::status::SubStatus;
    use proptest::prelude::*;

    pub fn arb_sub_status() -> impl Strategy<Value = SubStatus> {
        prop_oneof![
            Just(SubStatus::NotStarted),
            Just(SubStatus::Ongoing),
            Just(SubStatus::Success),
            Just(SubStatus::Failure),
        ]
    }
}

// ── File metadata fixtures ──────────────────────────────────────────────

/// Identities of a test file: virtual `http://data.test/files/{name}` with
/// uuid `{name}`, physical `share://{dir}/{name}.pdf`.
#[derive(Debug, Clone)]
pub struct FileFixture {
    pub vuri: String,
    pub vuuid: String,
    pub puri: String,
}

impl FileFixture {
    pub fn new(name: &str, dir: &str) -> Self {
        Self {
            vuri: format!("http://data.test/files/{name}"),
            vuuid: name.to_string(),
            puri: format!("share://{dir}/{name}.pdf"),
        }
    }

    /// Complete virtual-file description.
    pub fn virtual_triples(&self) -> Vec<Triple> {
        describe(&self.vuri, &self.vuuid, None)
    }

    /// Complete physical-file description, linked to the virtual file.
    pub fn physical_triples(&self) -> Vec<Triple> {
        describe(&self.puri, &format!("{}-physical", self.vuuid), Some(&self.vuri))
    }

    /// Both descriptions.
    pub fn triples(&self) -> Vec<Triple> {
        let mut all = self.virtual_triples();
        all.extend(self.physical_triples());
        all
    }
}

fn describe(uri: &str, uuid: &str, data_source: Option<&str>) -> Vec<Triple> {
    let s = || Term::uri(uri);
    let mut triples = vec![
        Triple::new(s(), vocab::RDF_TYPE, Term::uri(types::FILE_DATA_OBJECT)),
        Triple::new(s(), vocab::MU_UUID, Term::literal(uuid)),
        Triple::new(s(), vocab::NFO_FILE_NAME, Term::literal(format!("{uuid}.pdf"))),
        Triple::new(s(), vocab::DCT_FORMAT, Term::literal("application/pdf")),
        Triple::new(s(), vocab::NFO_FILE_SIZE, Term::integer(1024)),
        Triple::new(s(), vocab::DBPEDIA_FILE_EXTENSION, Term::literal("pdf")),
        Triple::new(s(), vocab::DCT_CREATED, Term::typed("2024-01-01T00:00:00Z", vocab::XSD_DATETIME)),
        Triple::new(s(), vocab::DCT_MODIFIED, Term::typed("2024-01-01T00:00:00Z", vocab::XSD_DATETIME)),
    ];
    if let Some(vuri) = data_source {
        triples.push(Triple::new(s(), vocab::NIE_DATA_SOURCE, Term::uri(vuri)));
    }
    triples
}
