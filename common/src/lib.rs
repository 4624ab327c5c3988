//! Domain types shared by the survey service: surveys and their questions,
//! submitted responses, user profiles, request payloads, and the results
//! aggregator that turns stored responses into per-question tallies.

pub mod model;
pub mod requests;
pub mod results;
