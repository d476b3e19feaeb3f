//! Integration tests for menu synchronization

mod event_adapter;
mod full_sync;
mod incremental_sync;
mod sled_persistence;
mod support;
