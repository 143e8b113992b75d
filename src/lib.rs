//! Freebase N-Triples literal normalization and node records.
//!
//! This crate is the decoding core of a Freebase dump ingester:
//!
//! - [`classify`] / [`normalize`] - turn a raw object token into a clean value
//! - [`unescape_key`] - undo the legacy MQL `$XXXX` key escaping
//! - [`Node`] - accumulate one subject's (predicate, value) facts and
//!   serialize them as tab-separated lines
//!
//! Reading dump files and splitting lines into subject, predicate and object
//! is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use lattix_freebase::Node;
//!
//! let mut node = Node::from_subject("<http://rdf.freebase.com/ns/m.02mjmr>");
//! node.add_object(
//!     "http://rdf.freebase.com/ns/type.object.type",
//!     "<http://rdf.freebase.com/ns/people.person>",
//! )
//! .add_object(
//!     "http://rdf.freebase.com/key/wikipedia.en",
//!     "\"Barack_Hussein_Obama$002C_Jr$002E\"",
//! );
//!
//! assert_eq!(node.fact_count(), 2);
//! assert!(node.serialize().contains("\tBarack_Hussein_Obama,_Jr.\t.\n"));
//! ```

mod error;
mod key_escape;
mod literal;
mod node;

pub use error::{Error, Result};
pub use key_escape::{escape_key, unescape_key};
pub use literal::{
    classify, clean_uri, normalize, unescape_ntriples, LiteralKind, Normalizer, NormalizerConfig,
};
pub use node::{Fact, Node};
