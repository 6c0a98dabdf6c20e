// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vocabulary used by the job ledger and the file metadata model.

pub const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const MU_UUID: &str = "http://mu.semte.ch/vocabularies/core/uuid";

pub const DCT_CREATOR: &str = "http://purl.org/dc/terms/creator";
pub const DCT_CREATED: &str = "http://purl.org/dc/terms/created";
pub const DCT_MODIFIED: &str = "http://purl.org/dc/terms/modified";
pub const DCT_IS_PART_OF: &str = "http://purl.org/dc/terms/isPartOf";
pub const DCT_SUBJECT: &str = "http://purl.org/dc/terms/subject";
pub const DCT_FORMAT: &str = "http://purl.org/dc/terms/format";
pub const DCT_REPLACES: &str = "http://purl.org/dc/terms/replaces";

pub const ADMS_STATUS: &str = "http://www.w3.org/ns/adms#status";
pub const COGS_DEPENDS_ON: &str = "http://vocab.deri.ie/cogs#dependsOn";

pub const TASK_OPERATION: &str = "http://redpencil.data.gift/vocabularies/tasks/operation";
pub const TASK_INDEX: &str = "http://redpencil.data.gift/vocabularies/tasks/index";
pub const TASK_RESULTS_CONTAINER: &str =
    "http://redpencil.data.gift/vocabularies/tasks/resultsContainer";
pub const TASK_INPUT_CONTAINER: &str =
    "http://redpencil.data.gift/vocabularies/tasks/inputContainer";
pub const TASK_ERROR: &str = "http://redpencil.data.gift/vocabularies/tasks/error";

pub const OSLC_MESSAGE: &str = "http://open-services.net/ns/core#message";

pub const NFO_FILE_NAME: &str = "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#fileName";
pub const NFO_FILE_SIZE: &str = "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#fileSize";
pub const NIE_DATA_SOURCE: &str =
    "http://www.semanticdesktop.org/ontologies/2007/01/19/nie#dataSource";
pub const DBPEDIA_FILE_EXTENSION: &str = "http://dbpedia.org/ontology/fileExtension";

pub const EXT_SUBJECT: &str = "http://mu.semte.ch/vocabularies/ext/subject";
pub const EXT_DOWNLOAD_ATTEMPTS: &str = "http://mu.semte.ch/vocabularies/ext/downloadAttempts";
pub const EXT_DOWNLOAD_STATUS: &str = "http://mu.semte.ch/vocabularies/ext/downloadStatus";
pub const EXT_REMAPPING_STATUS: &str = "http://mu.semte.ch/vocabularies/ext/remappingStatus";
pub const EXT_MOVING_STATUS: &str = "http://mu.semte.ch/vocabularies/ext/movingStatus";
pub const EXT_REMOVE_STATUS: &str = "http://mu.semte.ch/vocabularies/ext/removeStatus";
pub const EXT_UPDATE_STATUS: &str = "http://mu.semte.ch/vocabularies/ext/updateStatus";
pub const EXT_DELTAFILE_TIMESTAMP: &str =
    "http://mu.semte.ch/vocabularies/ext/hasDeltafileTimestamp";
pub const EXT_DELTAFILE_ID: &str = "http://mu.semte.ch/vocabularies/ext/hasDeltafileId";
pub const EXT_DELTAFILE_NAME: &str = "http://mu.semte.ch/vocabularies/ext/hasDeltafileName";

/// Resource types.
pub mod types {
    pub const JOB: &str = "http://vocab.deri.ie/cogs#Job";
    pub const TASK: &str = "http://redpencil.data.gift/vocabularies/tasks/Task";
    pub const DATA_CONTAINER: &str =
        "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#DataContainer";
    pub const ERROR: &str = "http://open-services.net/ns/core#Error";
    pub const DELTA_ERROR: &str = "http://redpencil.data.gift/vocabularies/deltas/Error";
    pub const FILE_DATA_OBJECT: &str =
        "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#FileDataObject";
    pub const SYNC_TASK: &str = "http://mu.semte.ch/vocabularies/ext/SyncTask";
    pub const FILE_ADD_TASK: &str = "http://mu.semte.ch/vocabularies/ext/FileAddTask";
    pub const FILE_REMOVE_TASK: &str = "http://mu.semte.ch/vocabularies/ext/FileRemoveTask";
    pub const FILE_UPDATE_TASK: &str = "http://mu.semte.ch/vocabularies/ext/FileUpdateTask";
    pub const TASK_FAILURE: &str = "http://mu.semte.ch/vocabularies/ext/TaskFailure";
}

/// Well-known task operations.
pub mod operations {
    pub const DELTA_SYNC_TASK: &str =
        "http://redpencil.data.gift/id/jobs/concept/TaskOperation/deltas/consumer/deltaSyncing";
    pub const INITIAL_SYNC_TASK: &str =
        "http://redpencil.data.gift/id/jobs/concept/TaskOperation/deltas/consumer/initialSyncing";
}

/// `dct:subject` of the container recording which delta file a task ingested.
pub const DELTA_FILE_INFO_CONCEPT: &str =
    "http://redpencil.data.gift/id/concept/DeltaSync/DeltafileInfo";

/// Predicates that must all be present for a virtual or physical file
/// description to count as complete.
pub const FILE_METADATA_PREDICATES: &[&str] = &[
    RDF_TYPE,
    MU_UUID,
    NFO_FILE_NAME,
    DCT_FORMAT,
    NFO_FILE_SIZE,
    DBPEDIA_FILE_EXTENSION,
    DCT_CREATED,
    DCT_MODIFIED,
];
