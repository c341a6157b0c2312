//! YAML front matter loading.
//!
//! Built on the `yaml-rust2` event parser rather than a value tree, because
//! typing depends on how a scalar was written: a plain `2024-01-14` is a
//! timestamp, a quoted `"2024-01-14"` is a string.

use std::collections::HashMap;

use yaml_rust2::{
    parser::{Event, MarkedEventReceiver, Parser},
    scanner::{Marker, TScalarStyle},
};

use crate::value::{Metadata, MetadataValue, Timestamp};

/// Tag suffix that forces a scalar to be read as a string (`!!str`, `!str`).
pub(crate) const STR_TAG: &str = "str";

/// A load failure at a character offset into the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadError {
    pub index: usize,
    pub message: String,
}

impl LoadError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

/// Load a YAML block whose top level must be a mapping.
///
/// An empty block (or one holding only comments) is an empty mapping.
pub(crate) fn load_mapping(block: &str) -> Result<Metadata, LoadError> {
    let mut loader = Loader::default();
    Parser::new_from_str(block)
        .load(&mut loader, false)
        .map_err(|e| LoadError::new(e.marker().index(), e.info()))?;
    loader.finish()
}

/// Type a plain (unquoted, untagged) scalar.
///
/// Follows the YAML 1.2 core schema for booleans, integers and floats. Other
/// text becomes a timestamp when it reads as one, and a string otherwise.
pub(crate) fn resolve_plain(text: &str) -> Result<MetadataValue, String> {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => {
            return Err("null values are not supported".to_string());
        }
        "true" | "True" | "TRUE" => return Ok(MetadataValue::Boolean(true)),
        "false" | "False" | "FALSE" => return Ok(MetadataValue::Boolean(false)),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return Ok(MetadataValue::Float(f64::INFINITY));
        }
        "-.inf" | "-.Inf" | "-.INF" => return Ok(MetadataValue::Float(f64::NEG_INFINITY)),
        ".nan" | ".NaN" | ".NAN" => return Ok(MetadataValue::Float(f64::NAN)),
        _ => {}
    }

    if let Ok(i) = text.parse::<i64>() {
        return Ok(MetadataValue::Integer(i));
    }
    // Rust also accepts `inf` and `NaN`, which YAML reads as strings.
    if text.bytes().any(|b| b.is_ascii_digit())
        && let Ok(x) = text.parse::<f64>()
    {
        return Ok(MetadataValue::Float(x));
    }
    if let Some(ts) = Timestamp::parse_str(text) {
        return Ok(MetadataValue::Timestamp(ts));
    }
    Ok(MetadataValue::String(text.to_string()))
}

/// Whether a string would come back as a string if written as a plain scalar.
pub(crate) fn reads_back_as_string(text: &str) -> bool {
    matches!(resolve_plain(text), Ok(MetadataValue::String(_)))
}

/// Collection under construction.
enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<MetadataValue>,
    },
    Mapping {
        anchor: usize,
        entries: Metadata,
        /// Key waiting for its value, with its offset.
        key: Option<(String, usize)>,
    },
}

#[derive(Default)]
struct Loader {
    stack: Vec<Frame>,
    root: Option<MetadataValue>,
    anchors: HashMap<usize, MetadataValue>,
    error: Option<LoadError>,
}

impl Loader {
    fn finish(self) -> Result<Metadata, LoadError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.root {
            None => Ok(Metadata::new()),
            Some(MetadataValue::Table(metadata)) => Ok(metadata),
            Some(other) => Err(LoadError::new(
                0,
                format!("expected a mapping, found {}", other.type_name()),
            )),
        }
    }

    fn expects_key(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Mapping { key: None, .. }))
    }

    /// Offset to report for a bad value: its key when it has one.
    fn value_index(&self, index: usize) -> usize {
        match self.stack.last() {
            Some(Frame::Mapping {
                key: Some((_, key_index)),
                ..
            }) => *key_index,
            _ => index,
        }
    }

    fn reject_collection_key(&self, index: usize) -> Result<(), LoadError> {
        if self.expects_key() {
            return Err(LoadError::new(index, "metadata keys must be plain strings"));
        }
        Ok(())
    }

    fn handle(&mut self, event: Event, index: usize) -> Result<(), LoadError> {
        match event {
            Event::Scalar(text, style, anchor, tag) => {
                if self.expects_key() {
                    if let Some(Frame::Mapping { key, .. }) = self.stack.last_mut() {
                        *key = Some((text, index));
                    }
                    return Ok(());
                }

                let forced_string = tag.as_ref().is_some_and(|t| t.suffix == STR_TAG);
                let value = if style == TScalarStyle::Plain && !forced_string {
                    resolve_plain(&text)
                        .map_err(|message| LoadError::new(self.value_index(index), message))?
                } else {
                    MetadataValue::String(text)
                };
                self.complete(value, anchor, index)
            }

            Event::SequenceStart(anchor, _) => {
                self.reject_collection_key(index)?;
                self.stack.push(Frame::Sequence {
                    anchor,
                    items: Vec::new(),
                });
                Ok(())
            }

            Event::MappingStart(anchor, _) => {
                self.reject_collection_key(index)?;
                self.stack.push(Frame::Mapping {
                    anchor,
                    entries: Metadata::new(),
                    key: None,
                });
                Ok(())
            }

            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence { anchor, items }) => {
                    self.complete(MetadataValue::List(items), anchor, index)
                }
                Some(Frame::Mapping {
                    anchor, entries, ..
                }) => self.complete(MetadataValue::Table(entries), anchor, index),
                None => Ok(()),
            },

            Event::Alias(id) => {
                self.reject_collection_key(index)?;
                let value = self
                    .anchors
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| LoadError::new(index, "unknown alias"))?;
                self.complete(value, 0, index)
            }

            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => Ok(()),
        }
    }

    /// Attach a finished value to its parent.
    fn complete(
        &mut self,
        value: MetadataValue,
        anchor: usize,
        index: usize,
    ) -> Result<(), LoadError> {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }

        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping { entries, key, .. }) => {
                let Some((name, key_index)) = key.take() else {
                    return Err(LoadError::new(index, "metadata keys must be plain strings"));
                };
                if entries.contains_key(&name) {
                    return Err(LoadError::new(
                        key_index,
                        format!("duplicate key `{name}`"),
                    ));
                }
                entries.insert(name, value);
            }
        }
        Ok(())
    }
}

impl MarkedEventReceiver for Loader {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.handle(event, mark.index()) {
            self.error = Some(error);
        }
    }
}
