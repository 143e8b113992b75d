//! Per-subject node records.
//!
//! A [`Node`] collects every (predicate, value) fact seen for one subject in
//! a Freebase dump. Predicates are kept sorted so the serialized record is
//! reproducible; values keep insertion order within a predicate.

use crate::literal::{clean_uri, normalize};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

/// Terminator token closing every serialized fact.
const TERMINATOR: &str = ".";

/// A node in the Freebase knowledge graph: a topic, a compound value type
/// (CVT), or metadata such as a type.
///
/// Not synchronized; one owner populates a node at a time.
///
/// # Example
///
/// ```rust
/// use lattix_freebase::Node;
///
/// let mut node = Node::new("m.02mjmr");
/// node.add_predicate_value("ns:type", "Person")
///     .add_predicate_value("ns:type", "Award_Winner");
///
/// assert_eq!(
///     node.serialize(),
///     "m.02mjmr\tns:type\tPerson\t.\nm.02mjmr\tns:type\tAward_Winner\t.\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    uri: String,
    predicate_values: BTreeMap<String, Vec<String>>,
}

impl Node {
    /// Create an empty node. The uri is used as given.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            predicate_values: BTreeMap::new(),
        }
    }

    /// Create an empty node from a raw subject token, cleaning it first.
    ///
    /// ```rust
    /// use lattix_freebase::Node;
    ///
    /// let node = Node::from_subject("<http://rdf.freebase.com/ns/M.02mjmr>");
    /// assert_eq!(node.uri(), "http://rdf.freebase.com/ns/m.02mjmr");
    /// ```
    pub fn from_subject(subject: &str) -> Self {
        Self::new(clean_uri(subject))
    }

    /// Append a value to a predicate. No deduplication, no normalization.
    pub fn add_predicate_value(
        &mut self,
        predicate: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.predicate_values
            .entry(predicate.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Normalize a raw object token and append it to a predicate.
    ///
    /// ```rust
    /// use lattix_freebase::Node;
    ///
    /// let mut node = Node::new("m.02mjmr");
    /// node.add_object("key:wikipedia.en", "\"Barack_Hussein_Obama$002C_Jr$002E\"");
    /// assert_eq!(node.values("key:wikipedia.en"), ["Barack_Hussein_Obama,_Jr."]);
    /// ```
    pub fn add_object(&mut self, predicate: impl Into<String>, raw_object: &str) -> &mut Self {
        self.add_predicate_value(predicate, normalize(raw_object))
    }

    /// Subject identifier.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// All facts, keyed by predicate.
    pub fn predicate_values(&self) -> &BTreeMap<String, Vec<String>> {
        &self.predicate_values
    }

    /// Mutable view of all facts.
    ///
    /// Callers must not leave a predicate with an empty value list.
    pub fn predicate_values_mut(&mut self) -> &mut BTreeMap<String, Vec<String>> {
        &mut self.predicate_values
    }

    /// Values of one predicate, in insertion order.
    pub fn values(&self, predicate: &str) -> &[String] {
        self.predicate_values
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of facts.
    pub fn fact_count(&self) -> usize {
        self.predicate_values.values().map(Vec::len).sum()
    }

    /// True if no fact has been added.
    pub fn is_empty(&self) -> bool {
        self.predicate_values.is_empty()
    }

    /// Iterate facts in serialization order.
    pub fn facts(&self) -> impl Iterator<Item = Fact<'_>> {
        self.predicate_values.iter().flat_map(move |(predicate, values)| {
            values.iter().map(move |value| Fact {
                subject: &self.uri,
                predicate,
                value,
            })
        })
    }

    /// Render as tab-separated lines: `uri\tpredicate\tvalue\t.\n`.
    ///
    /// A node with no facts renders as the empty string.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Write the serialized record to a sink.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for fact in self.facts() {
            writeln!(writer, "{fact}")?;
        }
        tracing::debug!(uri = %self.uri, facts = self.fact_count(), "wrote node record");
        Ok(())
    }

    /// Rebuild a node from [`Node::serialize`] output.
    ///
    /// Every line must carry the same subject; blank lines are skipped. Values
    /// holding a newline do not survive the trip.
    pub fn from_serialized(text: &str) -> Result<Self> {
        let mut node: Option<Self> = None;

        for line in text.lines().filter(|l| !l.is_empty()) {
            let fact = Fact::from_line(line)?;
            let node = node.get_or_insert_with(|| Self::new(fact.subject));
            if node.uri != fact.subject {
                return Err(Error::SubjectMismatch {
                    expected: node.uri.clone(),
                    found: fact.subject.to_string(),
                });
            }
            node.add_predicate_value(fact.predicate, fact.value);
        }

        let node = node.ok_or_else(|| Error::InvalidFact("no facts in record".into()))?;
        tracing::debug!(uri = %node.uri, facts = node.fact_count(), "parsed node record");
        Ok(node)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fact in self.facts() {
            writeln!(f, "{fact}")?;
        }
        Ok(())
    }
}

/// One serialized fact of a node, borrowed from the node or a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fact<'a> {
    /// Subject uri.
    pub subject: &'a str,
    /// Predicate.
    pub predicate: &'a str,
    /// Normalized value; may itself contain tabs.
    pub value: &'a str,
}

impl<'a> Fact<'a> {
    /// Parse one `subject\tpredicate\tvalue\t.` line (trailing newline optional).
    ///
    /// ```rust
    /// use lattix_freebase::Fact;
    ///
    /// let fact = Fact::from_line("m.02mjmr\tns:type\tPerson\t.\n").unwrap();
    /// assert_eq!(fact.predicate, "ns:type");
    /// assert_eq!(fact.value, "Person");
    /// ```
    pub fn from_line(line: &'a str) -> Result<Self> {
        let body = line.strip_suffix('\n').unwrap_or(line);
        let invalid = || Error::InvalidFact(body.to_string());

        let mut parts = body.splitn(3, '\t');
        let subject = parts.next().ok_or_else(invalid)?;
        let predicate = parts.next().ok_or_else(invalid)?;
        let rest = parts.next().ok_or_else(invalid)?;
        let value = rest
            .strip_suffix(TERMINATOR)
            .and_then(|r| r.strip_suffix('\t'))
            .ok_or_else(invalid)?;

        Ok(Self {
            subject,
            predicate,
            value,
        })
    }
}

impl fmt::Display for Fact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.subject, self.predicate, self.value, TERMINATOR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Node {
        let mut node = Node::new("m.02mjmr");
        node.add_predicate_value("ns:type", "Person")
            .add_predicate_value("ns:type", "Award_Winner");
        node
    }

    #[test]
    fn test_serialize_insertion_order() {
        assert_eq!(
            person().serialize(),
            "m.02mjmr\tns:type\tPerson\t.\nm.02mjmr\tns:type\tAward_Winner\t.\n"
        );
    }

    #[test]
    fn test_empty_node() {
        let node = Node::new("m.0");
        assert_eq!(node.serialize(), "");
        assert!(node.is_empty());
        assert_eq!(node.fact_count(), 0);
        assert!(node.values("ns:type").is_empty());
    }

    #[test]
    fn test_predicates_sorted() {
        let mut node = Node::new("m.0");
        node.add_predicate_value("ns:zeta", "z")
            .add_predicate_value("ns:alpha", "a1")
            .add_predicate_value("ns:zeta", "z2")
            .add_predicate_value("ns:alpha", "a2");

        let keys: Vec<&String> = node.predicate_values().keys().collect();
        assert_eq!(keys, ["ns:alpha", "ns:zeta"]);
        assert_eq!(
            node.serialize(),
            "m.0\tns:alpha\ta1\t.\nm.0\tns:alpha\ta2\t.\nm.0\tns:zeta\tz\t.\nm.0\tns:zeta\tz2\t.\n"
        );
    }

    #[test]
    fn test_duplicates_kept() {
        let mut node = Node::new("m.0");
        node.add_predicate_value("p", "v").add_predicate_value("p", "v");
        assert_eq!(node.values("p"), ["v", "v"]);
        assert_eq!(node.fact_count(), 2);
    }

    #[test]
    fn test_serialize_is_repeatable() {
        let node = person();
        assert_eq!(node.serialize(), node.serialize());
        assert_eq!(node.serialize(), node.to_string());
    }

    #[test]
    fn test_serialize_mid_population() {
        let mut node = Node::new("m.0");
        node.add_predicate_value("p", "1");
        assert_eq!(node.serialize(), "m.0\tp\t1\t.\n");
        node.add_predicate_value("p", "2");
        assert_eq!(node.serialize(), "m.0\tp\t1\t.\nm.0\tp\t2\t.\n");
    }

    #[test]
    fn test_add_object_normalizes() {
        let mut node = Node::from_subject("<http://rdf.freebase.com/ns/M.02mjmr>");
        node.add_object("ns:type.object.type", "<http://rdf.freebase.com/ns/People.Person>")
            .add_object("ns:type.object.name", "\"Hanna Bieluszko\"@en")
            .add_object("key:en", "\"hanna_bieluszko\"");

        assert_eq!(node.uri(), "http://rdf.freebase.com/ns/m.02mjmr");
        assert_eq!(
            node.values("ns:type.object.type"),
            ["http://rdf.freebase.com/ns/people.person"]
        );
        assert_eq!(node.values("ns:type.object.name"), ["\"Hanna Bieluszko\"@en"]);
        assert_eq!(node.values("key:en"), ["hanna_bieluszko"]);
    }

    #[test]
    fn test_predicate_values_mut() {
        let mut node = person();
        if let Some(values) = node.predicate_values_mut().get_mut("ns:type") {
            values.push("Author".into());
        }
        assert_eq!(node.values("ns:type"), ["Person", "Award_Winner", "Author"]);
    }

    #[test]
    fn test_write_to() {
        let node = person();
        let mut buf = Vec::new();
        node.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), node.serialize());
    }

    #[test]
    fn test_fact_from_line() {
        let fact = Fact::from_line("m.0\tns:desc\ta\tb\t.").unwrap();
        assert_eq!(fact.subject, "m.0");
        assert_eq!(fact.predicate, "ns:desc");
        assert_eq!(fact.value, "a\tb");

        let empty_value = Fact::from_line("m.0\tp\t\t.").unwrap();
        assert_eq!(empty_value.value, "");
    }

    #[test]
    fn test_fact_from_line_rejects_malformed() {
        for line in ["", "m.0", "m.0\tp", "m.0\tp\tv", "m.0\tp\tv .", "m.0\tp\t."] {
            assert!(
                matches!(Fact::from_line(line), Err(Error::InvalidFact(_))),
                "accepted {line:?}"
            );
        }
    }

    #[test]
    fn test_from_serialized_roundtrip() {
        let mut node = person();
        node.add_predicate_value("ns:common.topic.description", "\"tab\there\"@en");
        let parsed = Node::from_serialized(&node.serialize()).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_from_serialized_errors() {
        assert!(matches!(Node::from_serialized(""), Err(Error::InvalidFact(_))));

        let mixed = "m.0\tp\tv\t.\nm.1\tp\tv\t.\n";
        match Node::from_serialized(mixed) {
            Err(Error::SubjectMismatch { expected, found }) => {
                assert_eq!(expected, "m.0");
                assert_eq!(found, "m.1");
            }
            other => panic!("expected subject mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(person()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "uri": "m.02mjmr",
                "predicate_values": { "ns:type": ["Person", "Award_Winner"] }
            })
        );
    }
}
