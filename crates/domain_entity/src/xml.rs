//! XML form of a record
//!
//! Records are written as a small, schema-driven document:
//!
//! ```xml
//! <Entity logicalName="account" id="…">
//!   <Attributes>
//!     <Attribute name="name" type="string">Contoso</Attribute>
//!     <Attribute name="fax" type="null"/>
//!     <Attribute name="primarycontactid" type="entityReference" logicalName="contact" id="…"/>
//!     <Attribute name="parent.name" type="aliasedValue" entityLogicalName="account" attributeLogicalName="name">
//!       <Value type="string">Parent Co</Value>
//!     </Attribute>
//!     <Attribute name="to" type="entityCollection" entityName="activityparty">
//!       <Entity …>…</Entity>
//!     </Attribute>
//!   </Attributes>
//! </Entity>
//! ```
//!
//! Every `type` tag must be registered with the serializer's [`KnownTypes`];
//! both directions refuse kinds that are not.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{EntityId, Money};

use crate::entity::Entity;
use crate::error::SerializationError;
use crate::value::{
    AliasedValue, AttributeValue, EntityCollection, EntityReference, OptionSetValue, ValueKind,
};

const ENTITY: &str = "Entity";
const ATTRIBUTES: &str = "Attributes";
const ATTRIBUTE: &str = "Attribute";
const VALUE: &str = "Value";
const NULL_TYPE: &str = "null";

/// Registry of value kinds the serializer may read and write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownTypes {
    kinds: BTreeSet<ValueKind>,
}

impl Default for KnownTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl KnownTypes {
    /// A registry with no kinds; only nulls can be encoded
    pub fn empty() -> Self {
        Self {
            kinds: BTreeSet::new(),
        }
    }

    /// A registry with every kind
    pub fn all() -> Self {
        Self {
            kinds: ValueKind::ALL.into_iter().collect(),
        }
    }

    /// Registers a kind
    pub fn register(mut self, kind: ValueKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    /// Removes a kind
    pub fn unregister(mut self, kind: ValueKind) -> Self {
        self.kinds.remove(&kind);
        self
    }

    pub fn is_known(&self, kind: ValueKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Maps a type tag to a registered kind
    pub fn resolve(&self, tag: &str) -> Result<ValueKind, SerializationError> {
        ValueKind::from_tag(tag)
            .filter(|kind| self.is_known(*kind))
            .ok_or_else(|| SerializationError::UnknownType(tag.to_string()))
    }
}

/// Encodes records to XML and back
#[derive(Debug, Clone, Default)]
pub struct EntitySerializer {
    known_types: KnownTypes,
}

impl EntitySerializer {
    pub fn new(known_types: KnownTypes) -> Self {
        Self { known_types }
    }

    pub fn known_types(&self) -> &KnownTypes {
        &self.known_types
    }

    /// Writes a record as an XML document
    ///
    /// # Errors
    ///
    /// `SerializationError::UnregisteredType` if the record holds a value
    /// whose kind is not registered, `SerializationError::Write` if the
    /// writer fails.
    pub fn serialize(&self, entity: &Entity) -> Result<String, SerializationError> {
        let mut writer = Writer::new(Vec::new());
        self.write_entity(&mut writer, entity)?;
        let xml = String::from_utf8(writer.into_inner())
            .map_err(|e| SerializationError::Write(e.to_string()))?;
        debug!(entity = %entity.logical_name, bytes = xml.len(), "serialized record");
        Ok(xml)
    }

    /// Reads a record written by [`EntitySerializer::serialize`]
    ///
    /// # Errors
    ///
    /// Malformed XML, unknown type tags, missing attributes, and values that
    /// do not parse as their declared type are all reported as
    /// `SerializationError`.
    pub fn deserialize(&self, xml: &str) -> Result<Entity, SerializationError> {
        let mut decoder = Decoder {
            reader: Reader::from_str(xml),
            known_types: &self.known_types,
        };

        let entity = match decoder.next_structural()? {
            Event::Start(start) if is_named(&start, ENTITY) => decoder.read_entity(&start)?,
            other => return Err(unexpected("<Entity>", &other)),
        };

        match decoder.next_structural()? {
            Event::Eof => {}
            other => return Err(unexpected("end of document", &other)),
        }

        debug!(entity = %entity.logical_name, attributes = entity.len(), "deserialized record");
        Ok(entity)
    }

    fn write_entity(
        &self,
        writer: &mut Writer<Vec<u8>>,
        entity: &Entity,
    ) -> Result<(), SerializationError> {
        let id = entity.id.to_string();
        let mut start = BytesStart::new(ENTITY);
        start.push_attribute(("logicalName", entity.logical_name.as_str()));
        start.push_attribute(("id", id.as_str()));
        emit(writer, Event::Start(start))?;

        if entity.is_empty() {
            emit(writer, Event::Empty(BytesStart::new(ATTRIBUTES)))?;
        } else {
            emit(writer, Event::Start(BytesStart::new(ATTRIBUTES)))?;
            for (name, slot) in entity.iter() {
                self.write_value(writer, ATTRIBUTE, Some(name), slot)?;
            }
            emit(writer, Event::End(BytesEnd::new(ATTRIBUTES)))?;
        }

        emit(writer, Event::End(BytesEnd::new(ENTITY)))
    }

    fn write_value(
        &self,
        writer: &mut Writer<Vec<u8>>,
        element: &'static str,
        name: Option<&str>,
        slot: Option<&AttributeValue>,
    ) -> Result<(), SerializationError> {
        let mut start = BytesStart::new(element);
        if let Some(name) = name {
            start.push_attribute(("name", name));
        }

        let Some(value) = slot else {
            start.push_attribute(("type", NULL_TYPE));
            return emit(writer, Event::Empty(start));
        };

        let kind = value.kind();
        if !self.known_types.is_known(kind) {
            return Err(SerializationError::UnregisteredType(kind.as_str()));
        }
        start.push_attribute(("type", kind.as_str()));

        match value {
            AttributeValue::EntityReference(reference) => {
                let id = reference.id.to_string();
                start.push_attribute(("logicalName", reference.logical_name.as_str()));
                start.push_attribute(("id", id.as_str()));
                if let Some(display) = &reference.name {
                    start.push_attribute(("displayName", display.as_str()));
                }
                emit(writer, Event::Empty(start))
            }
            AttributeValue::Aliased(aliased) => {
                start.push_attribute(("entityLogicalName", aliased.entity_logical_name.as_str()));
                start.push_attribute((
                    "attributeLogicalName",
                    aliased.attribute_logical_name.as_str(),
                ));
                emit(writer, Event::Start(start))?;
                self.write_value(writer, VALUE, None, Some(&aliased.value))?;
                emit(writer, Event::End(BytesEnd::new(element)))
            }
            AttributeValue::EntityCollection(collection) => {
                start.push_attribute(("entityName", collection.entity_name.as_str()));
                emit(writer, Event::Start(start))?;
                for child in &collection.entities {
                    self.write_entity(writer, child)?;
                }
                emit(writer, Event::End(BytesEnd::new(element)))
            }
            scalar => {
                let text = scalar_text(scalar)?;
                emit(writer, Event::Start(start))?;
                if !text.is_empty() {
                    emit(writer, Event::Text(BytesText::new(&text)))?;
                }
                emit(writer, Event::End(BytesEnd::new(element)))
            }
        }
    }
}

impl Entity {
    /// Writes this record as XML using every known type
    pub fn serialize(&self) -> Result<String, SerializationError> {
        EntitySerializer::default().serialize(self)
    }

    /// Reads a record from XML using every known type
    pub fn deserialize(xml: &str) -> Result<Entity, SerializationError> {
        EntitySerializer::default().deserialize(xml)
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SerializationError> {
    writer
        .write_event(event)
        .map_err(|e| SerializationError::Write(e.to_string()))
}

/// Latest year RFC 3339 can express
const MAX_YEAR: i32 = 9999;

fn scalar_text(value: &AttributeValue) -> Result<String, SerializationError> {
    let text = match value {
        AttributeValue::String(s) => s.clone(),
        AttributeValue::DateTime(v) => {
            let text = v.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            if !(0..=MAX_YEAR).contains(&v.year()) {
                return Err(SerializationError::invalid(ValueKind::DateTime.as_str(), text));
            }
            text
        }
        AttributeValue::Money(m) => m.amount().to_string(),
        other => other.to_string(),
    };
    Ok(text)
}

fn parse_scalar(kind: ValueKind, text: &str) -> Result<AttributeValue, SerializationError> {
    let invalid = || SerializationError::invalid(kind.as_str(), text);
    let value = match kind {
        ValueKind::String => AttributeValue::String(text.to_string()),
        ValueKind::Integer => AttributeValue::Integer(text.parse().map_err(|_| invalid())?),
        ValueKind::BigInt => AttributeValue::BigInt(text.parse().map_err(|_| invalid())?),
        ValueKind::Double => AttributeValue::Double(text.parse().map_err(|_| invalid())?),
        ValueKind::Decimal => {
            AttributeValue::Decimal(Decimal::from_str(text).map_err(|_| invalid())?)
        }
        ValueKind::Boolean => AttributeValue::Boolean(match text {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return Err(invalid()),
        }),
        ValueKind::DateTime => AttributeValue::DateTime(
            DateTime::parse_from_rfc3339(text)
                .map_err(|_| invalid())?
                .with_timezone(&Utc),
        ),
        ValueKind::Guid => AttributeValue::Guid(Uuid::parse_str(text).map_err(|_| invalid())?),
        ValueKind::OptionSet => {
            AttributeValue::OptionSet(OptionSetValue::new(text.parse().map_err(|_| invalid())?))
        }
        ValueKind::Money => {
            AttributeValue::Money(Money::new(Decimal::from_str(text).map_err(|_| invalid())?))
        }
        ValueKind::EntityReference | ValueKind::Aliased | ValueKind::EntityCollection => {
            return Err(invalid())
        }
    };
    Ok(value)
}

fn is_named(start: &BytesStart<'_>, name: &str) -> bool {
    start.name().as_ref() == name.as_bytes()
}

fn describe(event: &Event<'_>) -> String {
    match event {
        Event::Start(e) | Event::Empty(e) => {
            format!("<{}>", String::from_utf8_lossy(e.name().as_ref()))
        }
        Event::End(e) => format!("</{}>", String::from_utf8_lossy(e.name().as_ref())),
        Event::Text(_) | Event::CData(_) => "text".to_string(),
        Event::Eof => "end of document".to_string(),
        _ => "markup".to_string(),
    }
}

fn unexpected(expected: &'static str, event: &Event<'_>) -> SerializationError {
    SerializationError::Unexpected {
        expected,
        found: describe(event),
    }
}

fn optional_attr(
    start: &BytesStart<'_>,
    attribute: &'static str,
) -> Result<Option<String>, SerializationError> {
    match start
        .try_get_attribute(attribute)
        .map_err(quick_xml::Error::from)?
    {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn required_attr(
    start: &BytesStart<'_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, SerializationError> {
    optional_attr(start, attribute)?
        .ok_or(SerializationError::MissingAttribute { element, attribute })
}

fn parse_id(text: &str) -> Result<EntityId, SerializationError> {
    text.parse()
        .map_err(|_| SerializationError::invalid("guid", text))
}

struct Decoder<'a, 'k> {
    reader: Reader<&'a [u8]>,
    known_types: &'k KnownTypes,
}

impl<'a> Decoder<'a, '_> {
    /// Next event that carries structure, skipping declarations, comments,
    /// and whitespace between elements
    fn next_structural(&mut self) -> Result<Event<'a>, SerializationError> {
        loop {
            match self.reader.read_event()? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
                Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => continue,
                other => return Ok(other),
            }
        }
    }

    fn expect_end(&mut self, element: &'static str) -> Result<(), SerializationError> {
        match self.next_structural()? {
            Event::End(end) if end.name().as_ref() == element.as_bytes() => Ok(()),
            other => Err(unexpected("closing tag", &other)),
        }
    }

    /// Collects the text content of `element` up to its closing tag
    fn read_text(&mut self, element: &'static str) -> Result<String, SerializationError> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(c) => text.push_str(
                    std::str::from_utf8(&c)
                        .map_err(|e| SerializationError::invalid("text", e.to_string()))?,
                ),
                Event::Comment(_) => continue,
                Event::End(end) if end.name().as_ref() == element.as_bytes() => return Ok(text),
                other => return Err(unexpected("text content", &other)),
            }
        }
    }

    fn read_entity(&mut self, start: &BytesStart<'a>) -> Result<Entity, SerializationError> {
        let logical_name = required_attr(start, ENTITY, "logicalName")?;
        let id = parse_id(&required_attr(start, ENTITY, "id")?)?;
        let mut entity = Entity::with_id(logical_name, id);

        match self.next_structural()? {
            Event::Empty(e) if is_named(&e, ATTRIBUTES) => {}
            Event::Start(e) if is_named(&e, ATTRIBUTES) => loop {
                match self.next_structural()? {
                    Event::Start(e) if is_named(&e, ATTRIBUTE) => {
                        let (name, value) = self.read_attribute(&e, false)?;
                        entity.insert_optional(name, value);
                    }
                    Event::Empty(e) if is_named(&e, ATTRIBUTE) => {
                        let (name, value) = self.read_attribute(&e, true)?;
                        entity.insert_optional(name, value);
                    }
                    Event::End(e) if e.name().as_ref() == ATTRIBUTES.as_bytes() => break,
                    other => return Err(unexpected("<Attribute>", &other)),
                }
            },
            other => return Err(unexpected("<Attributes>", &other)),
        }

        self.expect_end(ENTITY)?;
        Ok(entity)
    }

    fn read_attribute(
        &mut self,
        start: &BytesStart<'a>,
        empty: bool,
    ) -> Result<(String, Option<AttributeValue>), SerializationError> {
        let name = required_attr(start, ATTRIBUTE, "name")?;
        let value = self.read_value(start, ATTRIBUTE, empty)?;
        Ok((name, value))
    }

    fn read_value(
        &mut self,
        start: &BytesStart<'a>,
        element: &'static str,
        empty: bool,
    ) -> Result<Option<AttributeValue>, SerializationError> {
        let tag = required_attr(start, element, "type")?;
        if tag == NULL_TYPE {
            if !empty {
                self.expect_end(element)?;
            }
            return Ok(None);
        }

        let kind = self.known_types.resolve(&tag)?;
        let value = match kind {
            ValueKind::EntityReference => {
                let logical_name = required_attr(start, element, "logicalName")?;
                let id = parse_id(&required_attr(start, element, "id")?)?;
                let mut reference = EntityReference::new(logical_name, id);
                reference.name = optional_attr(start, "displayName")?;
                if !empty {
                    self.expect_end(element)?;
                }
                AttributeValue::EntityReference(reference)
            }
            ValueKind::Aliased => {
                let entity_logical_name = required_attr(start, element, "entityLogicalName")?;
                let attribute_logical_name =
                    required_attr(start, element, "attributeLogicalName")?;
                if empty {
                    return Err(SerializationError::Unexpected {
                        expected: "<Value>",
                        found: format!("empty <{}>", element),
                    });
                }
                let inner = match self.next_structural()? {
                    Event::Start(e) if is_named(&e, VALUE) => self.read_value(&e, VALUE, false)?,
                    Event::Empty(e) if is_named(&e, VALUE) => self.read_value(&e, VALUE, true)?,
                    other => return Err(unexpected("<Value>", &other)),
                };
                let inner = inner.ok_or_else(|| SerializationError::invalid("aliasedValue", NULL_TYPE))?;
                self.expect_end(element)?;
                AttributeValue::Aliased(AliasedValue {
                    entity_logical_name,
                    attribute_logical_name,
                    value: Box::new(inner),
                })
            }
            ValueKind::EntityCollection => {
                let mut collection =
                    EntityCollection::new(required_attr(start, element, "entityName")?);
                if !empty {
                    loop {
                        match self.next_structural()? {
                            Event::Start(e) if is_named(&e, ENTITY) => {
                                collection.push(self.read_entity(&e)?);
                            }
                            Event::End(e) if e.name().as_ref() == element.as_bytes() => break,
                            other => return Err(unexpected("<Entity>", &other)),
                        }
                    }
                }
                AttributeValue::EntityCollection(collection)
            }
            scalar => {
                let text = if empty {
                    String::new()
                } else {
                    self.read_text(element)?
                };
                parse_scalar(scalar, &text)?
            }
        };

        Ok(Some(value))
    }
}
