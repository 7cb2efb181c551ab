//! Document context tracker: the state machine that knows which region of
//! the tool list is open.
//!
//! The tracker keeps one frame per open container. A frame remembers the
//! [`Region`] it belongs to and, for maps, the most recent key.
//! Entering a container derives the child region from the parent region, the
//! pending key and the container kind:
//!
//! ```text
//! Outer ── default label ──────── [ ] → DefaultList
//!       ── generic tool label ─── [ ] → GenericToolList
//!       ── attribute map label ── { } → AttributeMap ── "generic" ── [ ] → Section(Generic)
//!       ── anything else ──────── → Outer                └─ other key ─ [ ] → Section(Tool(key))
//! ```
//!
//! The three list regions hold strings only. A container opened inside one
//! is rejected instead of being folded into the enclosing list, and exits
//! always pop exactly the frame they close.
//!
//! The tracker does not act on what it sees; it emits [`Signal`]s that the
//! enumeration and resolution passes interpret.

use std::fmt;

use scarfconv_config::tool_list::Labels;
use tracing::{trace, warn};

use crate::events::Event;

/// Errors raised when the document shape cannot be tracked.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("{container} nested inside {region} at {path}")]
    NestedRegion {
        region: String,
        container: Container,
        path: String,
    },

    #[error("unbalanced {found} at {path}")]
    Unbalanced { found: String, path: String },
}

/// A JSON container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Map,
    Array,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Map => f.write_str("map"),
            Container::Array => f.write_str("array"),
        }
    }
}

/// A keyed entry of the attribute map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// The shared attribute set for generic tools.
    Generic,
    /// The attribute set of one named tool.
    Tool(String),
}

/// The semantic region a container belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// Any container outside the special regions.
    Outer,
    /// The array enumerating every known attribute.
    DefaultList,
    /// The array of tool names that use the generic set.
    GenericToolList,
    /// The map of `generic` / tool name to attribute arrays.
    AttributeMap,
    /// One attribute array inside the attribute map.
    Section(Section),
    /// A container whose contents are ignored.
    Opaque,
}

impl Region {
    /// Whether this region is a flat list of strings.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Region::DefaultList | Region::GenericToolList | Region::Section(_)
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Outer => f.write_str("document"),
            Region::DefaultList => f.write_str("default attribute list"),
            Region::GenericToolList => f.write_str("generic tool list"),
            Region::AttributeMap => f.write_str("attribute map"),
            Region::Section(Section::Generic) => f.write_str("generic attribute section"),
            Region::Section(Section::Tool(tool)) => write!(f, "attribute section for {tool}"),
            Region::Opaque => f.write_str("ignored region"),
        }
    }
}

/// Which list a string member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum List<'a> {
    Default,
    GenericTools,
    Section(&'a Section),
}

/// What the tracker observed for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal<'a> {
    /// An attribute-map array was entered.
    SectionOpened(&'a Section),
    /// A string inside one of the list regions.
    Member { list: List<'a>, value: &'a str },
}

#[derive(Debug)]
struct Frame {
    container: Container,
    region: Region,
    /// Most recent key, for map frames.
    key: Option<String>,
}

/// Stack-based region tracker over a structural event stream.
#[derive(Debug)]
pub struct ContextTracker {
    labels: Labels,
    stack: Vec<Frame>,
}

impl ContextTracker {
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            stack: Vec::new(),
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Number of open containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Region of the innermost open container.
    pub fn region(&self) -> &Region {
        self.stack.last().map_or(&Region::Outer, |f| &f.region)
    }

    /// A JSONPath-like location of the innermost container, e.g.
    /// `$.ScarfAttributes.generic[]`.
    pub fn path(&self) -> String {
        let mut path = String::from("$");
        for frame in &self.stack {
            match (frame.container, &frame.key) {
                (Container::Map, Some(key)) => {
                    path.push('.');
                    path.push_str(key);
                }
                (Container::Map, None) => {}
                (Container::Array, _) => path.push_str("[]"),
            }
        }
        path
    }

    /// Feed one event and return what it means, if anything.
    pub fn advance<'a>(&'a mut self, event: Event<'a>) -> Result<Option<Signal<'a>>, TrackerError> {
        match event {
            Event::Key(key) => self.key(key),
            Event::StartMap => self.enter(Container::Map),
            Event::StartArray => self.enter(Container::Array),
            Event::EndMap => self.exit(Container::Map),
            Event::EndArray => self.exit(Container::Array),
            Event::Str(value) => Ok(self.scalar(Some(value))),
            Event::Number | Event::Bool(_) | Event::Null => Ok(self.scalar(None)),
        }
    }

    fn key(&mut self, key: &str) -> Result<Option<Signal<'_>>, TrackerError> {
        match self.stack.last_mut() {
            Some(frame) if frame.container == Container::Map => {
                frame.key = Some(key.to_string());
                Ok(None)
            }
            _ => Err(TrackerError::Unbalanced {
                found: format!("key {key:?}"),
                path: self.path(),
            }),
        }
    }

    fn enter(&mut self, container: Container) -> Result<Option<Signal<'_>>, TrackerError> {
        let (parent, key) = match self.stack.last() {
            Some(frame) => (frame.region.clone(), frame.key.clone()),
            None => (Region::Outer, None),
        };

        if parent.is_list() {
            return Err(TrackerError::NestedRegion {
                region: parent.to_string(),
                container,
                path: self.path(),
            });
        }

        let region = self.child_region(&parent, key.as_deref(), container);
        trace!(path = %self.path(), %region, "Entering {container}");
        self.stack.push(Frame {
            container,
            region,
            key: None,
        });

        Ok(self.stack.last().and_then(|frame| match &frame.region {
            Region::Section(section) => Some(Signal::SectionOpened(section)),
            _ => None,
        }))
    }

    fn child_region(&self, parent: &Region, key: Option<&str>, container: Container) -> Region {
        let labels = &self.labels;
        match parent {
            Region::Outer => {
                let Some(key) = key else {
                    return Region::Outer;
                };
                let (region, expected) = if key == labels.default_attributes {
                    (Region::DefaultList, Container::Array)
                } else if key == labels.generic_tool_list {
                    (Region::GenericToolList, Container::Array)
                } else if key == labels.attribute_map {
                    (Region::AttributeMap, Container::Map)
                } else {
                    return Region::Outer;
                };
                if container == expected {
                    region
                } else {
                    warn!(
                        path = %self.path(),
                        key,
                        "Expected {expected} for {region}, found {container}; ignoring it"
                    );
                    Region::Opaque
                }
            }
            Region::AttributeMap => match (key, container) {
                (Some(key), Container::Array) if key == labels.generic => {
                    Region::Section(Section::Generic)
                }
                (Some(key), Container::Array) => Region::Section(Section::Tool(key.to_string())),
                (key, _) => {
                    warn!(
                        path = %self.path(),
                        key = key.unwrap_or_default(),
                        "Attribute map entries must be arrays; ignoring {container}"
                    );
                    Region::Opaque
                }
            },
            // List regions are rejected by the caller.
            _ => Region::Opaque,
        }
    }

    fn exit(&mut self, container: Container) -> Result<Option<Signal<'_>>, TrackerError> {
        match self.stack.pop() {
            Some(frame) if frame.container == container => {
                trace!(path = %self.path(), region = %frame.region, "Leaving {container}");
                Ok(None)
            }
            Some(frame) => {
                let found = format!("end of {container} inside {}", frame.container);
                self.stack.push(frame);
                Err(TrackerError::Unbalanced {
                    found,
                    path: self.path(),
                })
            }
            None => Err(TrackerError::Unbalanced {
                found: format!("end of {container}"),
                path: self.path(),
            }),
        }
    }

    fn scalar<'a>(&'a self, value: Option<&'a str>) -> Option<Signal<'a>> {
        let frame = self.stack.last()?;
        let list = match &frame.region {
            Region::DefaultList => List::Default,
            Region::GenericToolList => List::GenericTools,
            Region::Section(section) => List::Section(section),
            _ => return None,
        };
        value.map(|value| Signal::Member { list, value })
    }
}
