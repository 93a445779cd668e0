//! A small framed model.

use nexus_common::error::FrameResult;
use nexus_frames::{Frame, FramedObject, FramedValue, ObjectHandle};

/// Street every test address starts with.
pub const OLD_STREET: &str = "123 Any Street";

/// City every test address starts with.
pub const OLD_CITY: &str = "AnyTown";

/// Street tests write.
pub const NEW_STREET: &str = "456 New Street";

/// An address with two independently framed fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    street: FramedValue<String>,
    city: FramedValue<String>,
}

impl Address {
    /// Creates an address in `frame`.
    pub fn new(frame: &Frame, street: &str, city: &str) -> FrameResult<Self> {
        Ok(Self {
            street: FramedValue::new(frame, street.to_string())?,
            city: FramedValue::new(frame, city.to_string())?,
        })
    }

    /// Creates an address visible to every frame.
    pub fn with_initial(street: &str, city: &str) -> Self {
        Self {
            street: FramedValue::with_initial(street.to_string()),
            city: FramedValue::with_initial(city.to_string()),
        }
    }

    /// Creates `count` addresses in `frame`, all at the old street and city.
    pub fn many(frame: &Frame, count: usize) -> FrameResult<Vec<Self>> {
        (0..count)
            .map(|_| Self::new(frame, OLD_STREET, OLD_CITY))
            .collect()
    }

    /// Reads the street.
    pub fn street(&self, frame: &Frame) -> FrameResult<String> {
        self.street.readable(frame)
    }

    /// Writes the street.
    pub fn set_street(&self, frame: &Frame, street: &str) -> FrameResult<()> {
        self.street.set(frame, street.to_string())
    }

    /// Reads the city.
    pub fn city(&self, frame: &Frame) -> FrameResult<String> {
        self.city.readable(frame)
    }

    /// Writes the city.
    pub fn set_city(&self, frame: &Frame, city: &str) -> FrameResult<()> {
        self.city.set(frame, city.to_string())
    }

    /// Returns the framed street field.
    pub fn street_value(&self) -> &FramedValue<String> {
        &self.street
    }

    /// Returns the framed city field.
    pub fn city_value(&self) -> &FramedValue<String> {
        &self.city
    }

    /// Returns the handle observers see for the street field.
    pub fn street_handle(&self) -> ObjectHandle {
        self.street.handle()
    }
}
