//! Endpoint catalogs for the services behind the gateway.
//!
//! Each catalog is a thin mapping from a domain operation to exactly one
//! [`GatewayClient::send`](crate::GatewayClient::send) call: a fixed path
//! template, an HTTP verb, and a JSON body assembled from the arguments.
//! Catalogs never branch on or interpret responses — every method returns
//! the raw body text for the caller to parse.
//!
//! The catalogs differ only in path prefix and header set, so they all ride
//! the same parameterized client instead of duplicating the request logic.

mod knowledge_bases;
mod personal_kb;
mod prompt_shares;

pub use knowledge_bases::KnowledgeBases;
pub use personal_kb::PersonalKnowledgeBases;
pub use prompt_shares::PromptShares;
