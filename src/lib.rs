pub mod config;
pub mod db;
pub mod matching; // Normalizer, override rules, scorer, ranker, confidence gate
pub mod mining; // Offline frequent-itemset mining
pub mod models;
pub mod vocabulary; // Snapshot, JSON tables, SQLite source

pub use config::{init_tracing, EngineConfig};
pub use matching::{
    build_report, Diagnosis, DiagnosisEngine, DiagnosisError, DiagnosisReport, RuleTable,
};
pub use vocabulary::{SnapshotHandle, VocabularyLookup, VocabularySnapshot};
