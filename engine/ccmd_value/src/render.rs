//! Bounded rendering.
//!
//! Lists and maps share their payloads, so a value built from a few
//! directives can render to far more text than memory allows. Rendering
//! streams the value through a writer that stops at a byte limit instead of
//! building the text first and measuring it afterwards.

use std::io;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::value::Value;

/// A value whose rendering is longer than the allowed limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("rendered value is longer than {limit} bytes")]
pub struct RenderLimit {
    pub limit: usize,
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Collects bytes until `limit` would be passed, then fails every write.
struct LimitedWriter {
    buf: Vec<u8>,
    limit: usize,
}

impl io::Write for LimitedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.len() + data.len() > self.limit {
            return Err(io::Error::other("render limit reached"));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Value {
    /// Render like [`Value::to_output`], failing as soon as the text would
    /// pass `limit` bytes.
    pub fn render(&self, limit: usize) -> Result<String, RenderLimit> {
        match self {
            Value::Str(s) if s.len() > limit => Err(RenderLimit { limit }),
            Value::List(_) | Value::Map(_) => self.render_json(limit),
            scalar => {
                let text = scalar.to_output();
                if text.len() > limit {
                    return Err(RenderLimit { limit });
                }
                Ok(text)
            }
        }
    }

    /// JSON text of the value, strings quoted, within `limit` bytes.
    pub fn render_json(&self, limit: usize) -> Result<String, RenderLimit> {
        let too_long = RenderLimit { limit };
        let mut writer = LimitedWriter {
            buf: Vec::new(),
            limit,
        };
        serde_json::to_writer(&mut writer, self).map_err(|_| too_long)?;
        String::from_utf8(writer.buf).map_err(|_| too_long)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doubled(times: usize) -> Value {
        let mut value = Value::string("ab");
        for _ in 0..times {
            value = Value::list(vec![value.clone(), value]);
        }
        value
    }

    #[test]
    fn test_render_matches_output_within_limit() {
        let value = Value::map_from([
            ("n", Value::Int(1)),
            ("f", Value::Float(f64::NAN)),
            ("s", Value::list(vec![Value::string("x\"y"), Value::Null])),
        ]);
        assert_eq!(value.render(1024), Ok(value.to_output()));
        assert_eq!(Value::Float(2.5).render(8), Ok("2.5".to_string()));
    }

    #[test]
    fn test_render_stops_at_limit() {
        // 2^40 leaves; rendering must give up long before materialising them.
        let value = doubled(40);
        assert_eq!(value.render(4096), Err(RenderLimit { limit: 4096 }));
    }

    #[test]
    fn test_render_limit_is_inclusive() {
        let value = Value::list(vec![Value::Int(1)]);
        assert_eq!(value.render(3), Ok("[1]".to_string()));
        assert!(value.render(2).is_err());
        assert!(Value::string("abcd").render(3).is_err());
        assert_eq!(Value::Null.render(0), Ok(String::new()));
    }

    #[test]
    fn test_render_json_quotes_strings() {
        assert_eq!(
            Value::string("a\"b").render_json(16),
            Ok(r#""a\"b""#.to_string())
        );
        assert_eq!(Value::Float(f64::INFINITY).render_json(8), Ok("null".to_string()));
        assert!(Value::string("abc").render_json(4).is_err());
    }
}
