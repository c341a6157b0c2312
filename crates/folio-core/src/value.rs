//! Typed metadata values.
//!
//! Front matter mixes strings, numbers, booleans, lists and timestamps in a
//! single mapping. Each value is a [`MetadataValue`] variant; callers resolve
//! the type with a `match` or one of the `as_*` accessors.

use std::{collections::HashMap, fmt};

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};

use crate::{
    error::{CoreError, Result},
    yaml,
};

/// Metadata mapping. Key order is not significant.
pub type Metadata = HashMap<String, MetadataValue>;

/// A single typed front matter value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Text value.
    String(String),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Ordered sequence, usually of strings (`tags = ["rust", "blog"]`).
    List(Vec<MetadataValue>),
    /// Date, time or datetime.
    Timestamp(Timestamp),
    /// Nested mapping such as `[taxonomies]` or `[extra]`.
    Table(Metadata),
}

/// A timestamp at the precision the author wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Calendar date, e.g. `2024-01-14`.
    Date(NaiveDate),
    /// Local datetime without an offset, e.g. `2024-01-14T10:00:00`.
    DateTime(NaiveDateTime),
    /// Datetime with an explicit UTC offset, e.g. `2024-01-14T10:00:00+02:00`.
    Offset(DateTime<FixedOffset>),
    /// Time of day only, e.g. `10:00:00`.
    Time(NaiveTime),
}

impl MetadataValue {
    /// Human readable name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::List(_) => "list",
            Self::Timestamp(_) => "timestamp",
            Self::Table(_) => "table",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Metadata> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Resolve a list whose items are all strings.
    ///
    /// Returns `None` for non-lists and for lists holding any other type.
    pub fn as_str_list(&self) -> Option<Vec<&str>> {
        match self {
            Self::List(items) => items.iter().map(Self::as_str).collect(),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Table(table) => {
                let mut keys: Vec<_> = table.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key} = {}", table[key])?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Offset(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
        }
    }
}

impl Timestamp {
    /// Interpret a string as a timestamp.
    ///
    /// Accepts RFC 3339 datetimes, local datetimes (`T` or space separated)
    /// and `YYYY-MM-DD` dates.
    pub fn parse_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::Offset(dt));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self::DateTime(dt));
            }
        }
        if s.len() == 10
            && let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        {
            return Some(Self::Date(d));
        }
        None
    }

    /// Point in time used for ordering, in UTC where an offset is known.
    ///
    /// Dates sort as midnight; a bare time of day has no position and
    /// returns `None`.
    pub fn sort_key(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(d) => d.and_hms_opt(0, 0, 0),
            Self::DateTime(dt) => Some(*dt),
            Self::Offset(dt) => Some(dt.naive_utc()),
            Self::Time(_) => None,
        }
    }

    pub(crate) fn from_toml(dt: &toml::value::Datetime) -> Option<Self> {
        let date = dt.date.and_then(|d| {
            NaiveDate::from_ymd_opt(i32::from(d.year), u32::from(d.month), u32::from(d.day))
        });
        let time = dt.time.and_then(|t| {
            NaiveTime::from_hms_nano_opt(
                u32::from(t.hour),
                u32::from(t.minute),
                u32::from(t.second),
                t.nanosecond,
            )
        });

        match (dt.date.is_some(), dt.time.is_some(), dt.offset) {
            (true, false, None) => date.map(Self::Date),
            (false, true, None) => time.map(Self::Time),
            (true, true, None) => Some(Self::DateTime(NaiveDateTime::new(date?, time?))),
            (true, true, Some(offset)) => {
                let seconds = match offset {
                    toml::value::Offset::Z => 0,
                    toml::value::Offset::Custom { minutes } => i32::from(minutes) * 60,
                };
                let local = NaiveDateTime::new(date?, time?);
                FixedOffset::east_opt(seconds)?
                    .from_local_datetime(&local)
                    .single()
                    .map(Self::Offset)
            }
            _ => None,
        }
    }

    /// Fails for years outside `0..=65535`, which TOML cannot hold.
    pub(crate) fn to_toml(self) -> Result<toml::value::Datetime> {
        let date = |d: NaiveDate| -> Result<toml::value::Date> {
            let year = u16::try_from(d.year()).map_err(|_| {
                CoreError::render(format!("year {} is out of range for TOML", d.year()))
            })?;
            Ok(toml::value::Date {
                year,
                month: d.month() as u8,
                day: d.day() as u8,
            })
        };
        let time = |t: NaiveTime| toml::value::Time {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
            second: t.second() as u8,
            nanosecond: t.nanosecond(),
        };

        Ok(match self {
            Self::Date(d) => toml::value::Datetime {
                date: Some(date(d)?),
                time: None,
                offset: None,
            },
            Self::Time(t) => toml::value::Datetime {
                date: None,
                time: Some(time(t)),
                offset: None,
            },
            Self::DateTime(dt) => toml::value::Datetime {
                date: Some(date(dt.date())?),
                time: Some(time(dt.time())),
                offset: None,
            },
            Self::Offset(dt) => {
                let seconds = dt.offset().local_minus_utc();
                let offset = if seconds == 0 {
                    toml::value::Offset::Z
                } else {
                    toml::value::Offset::Custom {
                        minutes: (seconds / 60) as i16,
                    }
                };
                let local = dt.naive_local();
                toml::value::Datetime {
                    date: Some(date(local.date())?),
                    time: Some(time(local.time())),
                    offset: Some(offset),
                }
            }
        })
    }
}

/// Convert a TOML value. Fails only on datetimes chrono cannot represent.
pub(crate) fn from_toml(value: toml::Value) -> std::result::Result<MetadataValue, String> {
    Ok(match value {
        toml::Value::String(s) => MetadataValue::String(s),
        toml::Value::Integer(i) => MetadataValue::Integer(i),
        toml::Value::Float(x) => MetadataValue::Float(x),
        toml::Value::Boolean(b) => MetadataValue::Boolean(b),
        toml::Value::Datetime(dt) => Timestamp::from_toml(&dt)
            .map(MetadataValue::Timestamp)
            .ok_or_else(|| format!("unsupported datetime `{dt}`"))?,
        toml::Value::Array(items) => MetadataValue::List(
            items
                .into_iter()
                .map(from_toml)
                .collect::<std::result::Result<_, _>>()?,
        ),
        toml::Value::Table(table) => MetadataValue::Table(from_toml_table(table)?),
    })
}

pub(crate) fn from_toml_table(table: toml::Table) -> std::result::Result<Metadata, String> {
    table
        .into_iter()
        .map(|(key, value)| Ok((key, from_toml(value)?)))
        .collect()
}

pub(crate) fn to_toml(value: &MetadataValue) -> Result<toml::Value> {
    Ok(match value {
        MetadataValue::String(s) => toml::Value::String(s.clone()),
        MetadataValue::Integer(i) => toml::Value::Integer(*i),
        MetadataValue::Float(x) => toml::Value::Float(*x),
        MetadataValue::Boolean(b) => toml::Value::Boolean(*b),
        MetadataValue::Timestamp(ts) => toml::Value::Datetime(ts.to_toml()?),
        MetadataValue::List(items) => {
            toml::Value::Array(items.iter().map(to_toml).collect::<Result<_>>()?)
        }
        MetadataValue::Table(table) => toml::Value::Table(to_toml_table(table)?),
    })
}

pub(crate) fn to_toml_table(metadata: &Metadata) -> Result<toml::Table> {
    metadata
        .iter()
        .map(|(key, value)| Ok((key.clone(), to_toml(value)?)))
        .collect()
}

/// Convert to a YAML value for rendering.
///
/// Strings that would read back as another type when written plain (`42`,
/// `2024-01-14`, `null`) are tagged `!str`.
pub(crate) fn to_yaml(value: &MetadataValue) -> serde_yaml::Value {
    use serde_yaml::{
        Value,
        value::{Tag, TaggedValue},
    };

    match value {
        MetadataValue::String(s) if !yaml::reads_back_as_string(s) => {
            Value::Tagged(Box::new(TaggedValue {
                tag: Tag::new(yaml::STR_TAG),
                value: Value::String(s.clone()),
            }))
        }
        MetadataValue::String(s) => Value::String(s.clone()),
        MetadataValue::Integer(i) => Value::Number((*i).into()),
        MetadataValue::Float(x) => Value::Number((*x).into()),
        MetadataValue::Boolean(b) => Value::Bool(*b),
        MetadataValue::Timestamp(ts) => Value::String(ts.to_string()),
        MetadataValue::List(items) => Value::Sequence(items.iter().map(to_yaml).collect()),
        MetadataValue::Table(table) => Value::Mapping(to_yaml_mapping(table)),
    }
}

pub(crate) fn to_yaml_mapping(metadata: &Metadata) -> serde_yaml::Mapping {
    let mut keys: Vec<_> = metadata.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| (serde_yaml::Value::String(key.clone()), to_yaml(&metadata[key])))
        .collect()
}
