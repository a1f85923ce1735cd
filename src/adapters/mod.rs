// Adapters layer: concrete implementations for external systems (storage, reference CSV, export bundles).

pub mod dataset;
pub mod export;
pub mod storage;
