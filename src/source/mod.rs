//! Source identity across Mihon (numeric ids) and Kotatsu (parser names).

pub mod corpus;
pub mod filter;
pub mod identifier;
pub mod mapping;
pub mod resolver;

pub use corpus::{CorpusNames, NameCorpus, ReferenceTree};
pub use filter::filter_to_common;
pub use identifier::derive_source_id;
pub use mapping::{MappingEntry, MappingTable};
pub use resolver::{
    AllowSet, Ecosystem, FallbackPolicy, Resolved, SourceReference, SourceResolver, Unresolvable,
};
