mod common;

use common::*;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use wirebind::{Blocking, BoxError, Error, Fault, NonBlocking, Record, Response};

// --- Test Setup: Number Conversion ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Words {
    pub words: String,
}

impl Record<Recording> for Words {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NumberTooLarge {
    pub fault: String,
}

impl Record<Recording> for NumberTooLarge {}

#[derive(Debug, thiserror::Error)]
#[error("conversion failed: {0}")]
pub struct NumberTooLargeError(String);

impl Fault for NumberTooLarge {
    type Error = NumberTooLargeError;

    fn into_error(self) -> NumberTooLargeError {
        NumberTooLargeError(self.fault)
    }
}

wirebind::service! {
    pub trait Converter: Recording {
        fn to_words(&self, number: i64 => [Entry("number")]) -> Response<Words, NumberTooLarge>;
    }
}

/// Spells out small numbers; answers with a fault for anything else, and
/// with an unrelated body for zero.
fn converter(request: &RecordedRequest) -> Result<RecordedResponse, BoxError> {
    let number = request
        .entries
        .iter()
        .find(|(name, _)| name == "number")
        .and_then(|(_, value)| value.as_i64())
        .unwrap_or_default();

    let body = match number {
        0 => json!({ "unexpected": true }),
        42 => json!({ "words": "forty two" }),
        _ => json!({ "fault": "number too large" }),
    };

    Ok(RecordedResponse {
        headers: Vec::new(),
        body,
    })
}

fn backend() -> MockBackend {
    MockBackend::with_responder(Arc::new(converter))
}

type BlockingConverter = dyn Converter<Mode = Blocking>;
type AsyncConverter = dyn Converter<Mode = NonBlocking>;

// --- Decoding Alternatives ---

#[test]
fn test_success_payload_decodes_to_success() {
    let service = BlockingConverter::bind(backend()).unwrap();

    let response = service.to_words(42).unwrap();

    assert!(response.is_success());
    assert!(response.raise_for_result().is_ok());
    assert_eq!(
        response.into_result().unwrap(),
        Words {
            words: "forty two".to_owned()
        }
    );
}

#[test]
fn test_fault_payload_decodes_to_fault() {
    let service = BlockingConverter::bind(backend()).unwrap();

    let response = service.to_words(-1).unwrap();

    assert!(response.is_fault());
    let error = response.raise_for_result().unwrap_err();
    assert_eq!(error.to_string(), "conversion failed: number too large");
    assert!(response.clone().success().is_none());
    assert_eq!(
        response.fault(),
        Some(NumberTooLarge {
            fault: "number too large".to_owned()
        })
    );
}

#[test]
fn test_fault_into_result_is_the_fault_error() {
    let service = BlockingConverter::bind(backend()).unwrap();

    let error = service.to_words(100500).unwrap().into_result().unwrap_err();

    assert_eq!(error.to_string(), "conversion failed: number too large");
}

#[test]
fn test_payload_matching_no_alternative_is_a_decode_error() {
    let service = BlockingConverter::bind(backend()).unwrap();

    let error = service.to_words(0).unwrap_err();

    assert!(matches!(
        error,
        Error::Decode { ref method, .. } if method == "to_words"
    ));
}

#[test]
fn test_response_decodes_directly_from_json() {
    let fault: Response<Words, NumberTooLarge> =
        serde_json::from_value(json!({ "fault": "nope" })).unwrap();
    let success: Response<Words, NumberTooLarge> =
        serde_json::from_value(json!({ "words": "one" })).unwrap();

    assert!(fault.is_fault());
    assert!(success.is_success());
    assert!(serde_json::from_value::<Response<Words, NumberTooLarge>>(Value::Null).is_err());
}

#[tokio::test]
async fn test_async_fault_payload_decodes_to_fault() {
    let service =
        AsyncConverter::bind(MockAsyncBackend::with_responder(Arc::new(converter))).unwrap();

    let success = service.to_words(42).await.unwrap();
    let fault = service.to_words(7).await.unwrap();

    assert!(success.raise_for_result().is_ok());
    assert!(fault.raise_for_result().is_err());
}
