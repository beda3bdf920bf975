use crate::marker::Annotation;
use crate::protocol::{Outcome, Protocol};
use serde::de::{self, DeserializeOwned, IgnoredAny, Visitor};
use serde::{Deserialize, Deserializer, forward_to_deserialize_any};
use serde_json::Value;
use std::any::type_name;
use std::fmt;

/// A structured result type that responses are decoded into.
///
/// Decoding goes through `serde`; `field_annotations` lists the result
/// fields whose values are derived from the raw response by response markers
/// instead of (or on top of) the response payload.
pub trait Record<P: Protocol>: DeserializeOwned + Send + 'static {
    fn field_annotations() -> Vec<FieldAnnotation<P>> {
        Vec::new()
    }

    /// Payload keys the record decodes from, or `None` when they cannot be
    /// known up front (maps, newtypes, untyped values).
    ///
    /// Annotated fields are checked against these names at bind time. The
    /// default asks the record's `Deserialize` impl for its struct fields.
    fn field_names() -> Option<Vec<&'static str>> {
        struct_fields::<Self>().map(|fields| fields.to_vec())
    }
}

/// Markers attached to one result field.
#[derive(Debug)]
pub struct FieldAnnotation<P: Protocol> {
    name: String,
    annotation: Annotation<P>,
}

impl<P: Protocol> Clone for FieldAnnotation<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            annotation: self.annotation.clone(),
        }
    }
}

impl<P: Protocol> FieldAnnotation<P> {
    pub fn new(name: impl Into<String>, annotation: Annotation<P>) -> Self {
        Self {
            name: name.into(),
            annotation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotation(&self) -> &Annotation<P> {
        &self.annotation
    }
}

type Decoder = fn(Value) -> Result<Outcome, serde_json::Error>;

/// A [`Record`] type, erased so it can be stored in a signature.
pub struct ResultType<P: Protocol> {
    name: &'static str,
    fields: Vec<FieldAnnotation<P>>,
    field_names: Option<Vec<&'static str>>,
    decode: Decoder,
}

impl<P: Protocol> ResultType<P> {
    pub fn of<R: Record<P>>() -> Self {
        Self {
            name: type_name::<R>(),
            fields: R::field_annotations(),
            field_names: R::field_names(),
            decode: decode_record::<R>,
        }
    }

    /// The default result of methods that declare none.
    pub fn successful() -> Self {
        Self::of::<SuccessfulResponse>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldAnnotation<P>] {
        &self.fields
    }

    /// Payload keys of the record, when known.
    pub fn field_names(&self) -> Option<&[&'static str]> {
        self.field_names.as_deref()
    }

    pub fn decode(&self, payload: Value) -> Result<Outcome, serde_json::Error> {
        (self.decode)(payload)
    }
}

impl<P: Protocol> Clone for ResultType<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            fields: self.fields.clone(),
            field_names: self.field_names.clone(),
            decode: self.decode,
        }
    }
}

impl<P: Protocol> fmt::Debug for ResultType<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

fn decode_record<R: DeserializeOwned + Send + 'static>(
    payload: Value,
) -> Result<Outcome, serde_json::Error> {
    let record: R = serde_json::from_value(payload)?;
    Ok(Box::new(record))
}

/// Successful, empty result. Accepts any payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuccessfulResponse;

impl<'de> Deserialize<'de> for SuccessfulResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer).map(|_| SuccessfulResponse)
    }
}

impl<P: Protocol> Record<P> for SuccessfulResponse {}

/// The raw payload, undecoded.
impl<P: Protocol> Record<P> for Value {}

/// Struct field names `T` hands to `deserialize_struct`, if it is a struct.
fn struct_fields<T: DeserializeOwned>() -> Option<&'static [&'static str]> {
    let mut fields = None;
    let _ = T::deserialize(FieldRecorder {
        fields: &mut fields,
    });
    fields
}

/// Deserializer that fails every request, noting the field list of the
/// first struct asked for.
struct FieldRecorder<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de> Deserializer<'de> for FieldRecorder<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.fields = Some(fields);
        Err(de::Error::custom("field names recorded"))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}
