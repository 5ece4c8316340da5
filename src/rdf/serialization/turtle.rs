//! Turtle format implementation
//!
//! `write_outline` produces the save document: prefix lines, one stanza for the
//! Root, one stanza per item in pre-order and a standalone `dc:description`
//! triple where present. `parse_outline` reads such a document back into flat
//! records. `serialize_quads` dumps the projected quads through rio_turtle.

use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::outline::node::{parse_index, parse_timestamp, RecordError};
use crate::outline::{FlatNodeRecord, NodeId, NodeKind, NodeStore};
use crate::rdf::{local_name, QuadStore, RdfObject, Vocabulary};
use indexmap::IndexMap;
use rio_api::formatter::TriplesFormatter;
use rio_api::model as rio;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleError, TurtleFormatter, TurtleParser};
use std::io::Cursor;
use tracing::{debug, warn};

/// Escape a string for a double-quoted Turtle literal
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", escape_literal(value))
}

/// Serialize the whole outline as the Turtle save document
pub fn write_outline(store: &NodeStore) -> SerializeResult<String> {
    let vocab = store.vocabulary();
    let root = store.get_root().map_err(|_| SerializeError::NoRoot)?;
    let root_iri = vocab.node_iri(root.id.as_str())?;

    let mut out = String::new();
    for ns in vocab.prefixes() {
        out.push_str(&format!("@prefix {}: <{}> .\n", ns.prefix, ns.iri));
    }
    out.push('\n');
    out.push_str(&format!("{} a ts:{} .\n", root_iri, NodeKind::Root.class_name()));

    for id in store.pre_order(&root.id).iter().skip(1) {
        let node = store.get_node(id).map_err(|e| SerializeError::Serialize(e.to_string()))?;
        let iri = vocab.node_iri(node.id.as_str())?;
        let parent_iri = match &node.parent {
            Some(parent) => vocab.node_iri(parent.as_str())?,
            None => {
                warn!(node = %node.id, "item without parent, writing root as parent");
                root_iri.clone()
            }
        };

        out.push('\n');
        out.push_str(&format!("{} a ts:{} ;\n", iri, NodeKind::Item.class_name()));
        if !node.title.is_empty() {
            out.push_str(&format!("    dc:title {} ;\n", quoted(&node.title)));
        }
        if let Some(created) = node.created_lexical() {
            out.push_str(&format!(
                "    dc:created {}^^{} ;\n",
                quoted(&created),
                vocab.xsd_date_time()
            ));
        }
        out.push_str(&format!("    ts:index {} ;\n", quoted(&node.index.to_string())));
        out.push_str(&format!("    ts:parent {} .\n", parent_iri));

        if let Some(description) = &node.description {
            out.push_str(&format!("{} dc:description {} .\n", iri, quoted(description)));
        }
    }

    debug!(bytes = out.len(), nodes = store.node_count(), "serialized outline to Turtle");
    Ok(out)
}

enum RawObject {
    Iri(String),
    Literal(String),
}

/// Parse a Turtle document (as written by [`write_outline`]) into flat records.
///
/// Subjects without a recognised `rdf:type`, or with a malformed index or
/// date, are skipped with a warning.
pub fn parse_outline(input: &str, vocab: &Vocabulary) -> ParseResult<Vec<FlatNodeRecord>> {
    let mut subjects: IndexMap<String, Vec<(String, RawObject)>> = IndexMap::new();
    let mut parser = TurtleParser::new(Cursor::new(input), None);

    parser
        .parse_all(&mut |t| -> Result<(), TurtleError> {
            let subject = match t.subject {
                rio::Subject::NamedNode(n) => n.iri.to_string(),
                _ => return Ok(()),
            };
            let object = match t.object {
                rio::Term::NamedNode(n) => RawObject::Iri(n.iri.to_string()),
                rio::Term::Literal(rio::Literal::Simple { value })
                | rio::Term::Literal(rio::Literal::LanguageTaggedString { value, .. })
                | rio::Term::Literal(rio::Literal::Typed { value, .. }) => {
                    RawObject::Literal(value.to_string())
                }
                _ => return Ok(()),
            };
            subjects
                .entry(subject)
                .or_default()
                .push((t.predicate.iri.to_string(), object));
            Ok(())
        })
        .map_err(|e| ParseError::Parse(e.to_string()))?;

    let mut records = Vec::with_capacity(subjects.len());
    for (subject, properties) in &subjects {
        match record_from_properties(subject, properties, vocab) {
            Ok(record) => records.push(record),
            Err(e) => warn!(subject = %subject, error = %e, "skipping Turtle subject"),
        }
    }
    Ok(records)
}

fn record_from_properties(
    subject: &str,
    properties: &[(String, RawObject)],
    vocab: &Vocabulary,
) -> Result<FlatNodeRecord, RecordError> {
    let kind = properties
        .iter()
        .find_map(|(p, o)| match o {
            RawObject::Iri(class) if p == vocab.rdf_type().as_str() => Some(class),
            _ => None,
        })
        .ok_or(RecordError::MissingField("type"))
        .and_then(|class| {
            NodeKind::from_class_name(local_name(class))
                .ok_or_else(|| RecordError::UnknownType(class.clone()))
        })?;

    let mut record = FlatNodeRecord::new(NodeId::new(local_name(subject)), kind);
    for (predicate, object) in properties {
        let p = predicate.as_str();
        match object {
            RawObject::Literal(value) if p == vocab.dc_title().as_str() => {
                record.title = Some(value.clone());
            }
            RawObject::Literal(value) if p == vocab.dc_created().as_str() => {
                record.created = Some(parse_timestamp(value)?);
            }
            RawObject::Literal(value)
                if p == vocab.dc_description().as_str() || p == vocab.ts_description().as_str() =>
            {
                record.description = Some(value.clone());
            }
            RawObject::Literal(value) if p == vocab.ts_index().as_str() => {
                record.index = Some(parse_index(value)?);
            }
            RawObject::Iri(parent) if p == vocab.ts_parent().as_str() => {
                record.parent = Some(NodeId::new(local_name(parent)));
            }
            _ => {}
        }
    }
    Ok(record)
}

/// Dump the quad collection as Turtle, sorted for stable output
pub fn serialize_quads(quads: &QuadStore) -> SerializeResult<String> {
    let mut output = Vec::new();
    let mut formatter = TurtleFormatter::new(&mut output);

    for quad in quads.sorted() {
        let subject = rio::Subject::NamedNode(rio::NamedNode {
            iri: quad.subject.as_str(),
        });
        let predicate = rio::NamedNode {
            iri: quad.predicate.as_str(),
        };

        let datatype;
        let object = match &quad.object {
            RdfObject::NamedNode(n) => rio::Term::NamedNode(rio::NamedNode { iri: n.as_str() }),
            RdfObject::Literal(l) => {
                if l.is_plain() {
                    rio::Term::Literal(rio::Literal::Simple { value: l.value() })
                } else {
                    datatype = l.datatype();
                    rio::Term::Literal(rio::Literal::Typed {
                        value: l.value(),
                        datatype: rio::NamedNode {
                            iri: datatype.as_str(),
                        },
                    })
                }
            }
        };

        formatter
            .format(&rio::Triple {
                subject,
                predicate,
                object,
            })
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    }

    formatter
        .finish()
        .map_err(|e| SerializeError::Serialize(e.to_string()))?;

    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}
