//! Support modules for the resumable collection BDD tests.

pub(crate) mod harness;
pub(crate) mod state;
#[path = "../support/mod.rs"]
pub(crate) mod support;

pub(crate) use harness::{
    mount_details, mount_diffs, mount_search_pages, pull_request_gateway, search_gateway,
};
pub(crate) use state::CollectionState;
