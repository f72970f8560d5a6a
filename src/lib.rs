//! MCP server exposing a small set of GitHub operations and writing prompts.
//!
//! Tools search repositories, fetch repository metadata, list issues, and
//! create issues. Prompts draft issue and pull request descriptions, build
//! repository search queries, and format raw API responses. Both sets are
//! static, name-keyed registries routed through a single [`dispatch::Dispatcher`].

pub mod client;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod prompts;
pub mod registry;
pub mod server;
pub mod tools;
