pub mod fingerprint;
pub mod groups;
pub mod normalize;
pub mod pairing;
pub mod prepare;
pub mod resolve;

pub use fingerprint::{fingerprint_hash_v1, fingerprint_v0};
pub use groups::{build_groups, GroupItem, GroupRow};
pub use normalize::normalize_text;
pub use pairing::{match_pairs, MatchedPair};
pub use prepare::enrich;
pub use resolve::{MappingRule, Resolution, Resolver};
