//! Structural event stream over a JSON document.
//!
//! [`stream`] drives `serde_json`'s deserializer with a visitor that forwards
//! every structural token to an [`EventHandler`] as it is read. No tree is
//! built and nothing is buffered beyond the current key or string.

use std::fmt;
use std::io::Read;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

/// One structural token of a JSON document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    StartMap,
    EndMap,
    StartArray,
    EndArray,
    Key(&'a str),
    Str(&'a str),
    Number,
    Bool(bool),
    Null,
}

/// Consumer of the event stream.
pub trait EventHandler {
    type Error: std::error::Error;

    /// Handle a single event. Returning an error aborts the stream.
    fn handle(&mut self, event: Event<'_>) -> Result<(), Self::Error>;
}

/// Why a stream stopped early.
#[derive(Debug)]
pub enum StreamError<E> {
    /// Transport or syntax failure reported by the JSON reader.
    Json(serde_json::Error),
    /// The handler rejected an event.
    Handler(E),
}

/// Stream every event of the JSON document in `reader` to `handler`.
///
/// Trailing non-whitespace after the document is a syntax error.
pub fn stream<R: Read, H: EventHandler>(
    reader: R,
    handler: &mut H,
) -> Result<(), StreamError<H::Error>> {
    let mut sink = Sink {
        handler,
        failure: None,
    };
    let mut de = serde_json::Deserializer::from_reader(reader);
    let result = Node { sink: &mut sink }
        .deserialize(&mut de)
        .and_then(|()| de.end());

    match result {
        Ok(()) => Ok(()),
        Err(err) => Err(match sink.failure.take() {
            Some(failure) => StreamError::Handler(failure),
            None => StreamError::Json(err),
        }),
    }
}

/// Holds the handler and the first error it returned; serde only carries a
/// message through its own error type.
struct Sink<'h, H: EventHandler> {
    handler: &'h mut H,
    failure: Option<H::Error>,
}

impl<H: EventHandler> Sink<'_, H> {
    fn emit<E: de::Error>(&mut self, event: Event<'_>) -> Result<(), E> {
        self.handler.handle(event).map_err(|err| {
            let message = err.to_string();
            self.failure = Some(err);
            E::custom(message)
        })
    }
}

/// Seed and visitor for one JSON value at any depth.
struct Node<'a, 'h, H: EventHandler> {
    sink: &'a mut Sink<'h, H>,
}

impl<'de, H: EventHandler> DeserializeSeed<'de> for Node<'_, '_, H> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, H: EventHandler> Visitor<'de> for Node<'_, '_, H> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.sink.emit(Event::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<(), E> {
        self.sink.emit(Event::Number)
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<(), E> {
        self.sink.emit(Event::Number)
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<(), E> {
        self.sink.emit(Event::Number)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.sink.emit(Event::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.sink.emit(Event::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<(), E> {
        self.sink.emit(Event::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        self.sink.emit::<A::Error>(Event::StartArray)?;
        while seq
            .next_element_seed(Node {
                sink: &mut *self.sink,
            })?
            .is_some()
        {}
        self.sink.emit(Event::EndArray)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        self.sink.emit::<A::Error>(Event::StartMap)?;
        while let Some(key) = map.next_key::<String>()? {
            self.sink.emit::<A::Error>(Event::Key(&key))?;
            map.next_value_seed(Node {
                sink: &mut *self.sink,
            })?;
        }
        self.sink.emit(Event::EndMap)
    }
}
