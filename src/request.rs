use crate::arguments::Arguments;
use crate::error::{ArgumentError, Error};
use crate::marker::CallResult;
use crate::protocol::Protocol;
use crate::signature::{BoundParameterMarker, BoundResponseMarkers, Signature};
use serde_json::{Map, Value};

/// Binds `arguments` and builds the outgoing request for one call.
///
/// Method markers prepare the request first, then every parameter marker is
/// applied in signature order so that repeated locations accumulate in call
/// order. Nothing here touches the transport.
pub fn build_request<P: Protocol>(
    signature: &Signature<P>,
    arguments: &Arguments,
) -> Result<P::Request, Error> {
    let bound = signature.bind_arguments(arguments)?;
    let mut request = P::Request::default();

    for marker in signature.method_markers() {
        marker
            .prepare_request(&mut request, &bound)
            .map_err(|reason| ArgumentError::Request {
                method: signature.name().to_owned(),
                reason,
            })?;
    }

    for BoundParameterMarker { name, marker } in signature.parameter_markers() {
        let Some(value) = bound.get(name) else {
            continue;
        };
        marker
            .apply(&mut request, value)
            .map_err(|reason| ArgumentError::Invalid {
                method: signature.name().to_owned(),
                parameter: name.clone(),
                reason,
            })?;
    }

    tracing::trace!(method = %signature.name(), ?request, "request built");
    Ok(request)
}

/// Decodes a raw response into the signature's result type.
///
/// Response markers write their values into the payload under the field
/// name, in declaration order, so the last marker of a field wins. The record
/// decoder runs once all markers are applied.
pub fn decode_response<P: Protocol>(signature: &Signature<P>, response: &P::Response) -> CallResult {
    let return_type = signature.return_type();
    let decode_error = |field: Option<&str>, reason: String| Error::Decode {
        method: signature.name().to_owned(),
        result_type: return_type.name().to_owned(),
        field: field.map(str::to_owned),
        reason,
    };

    let mut payload = P::payload(response).map_err(|reason| decode_error(None, reason))?;

    if !signature.response_markers().is_empty() {
        if payload.is_null() {
            payload = Value::Object(Map::new());
        }
        let Value::Object(fields) = &mut payload else {
            return Err(decode_error(
                None,
                "payload must be an object to carry marked fields".to_owned(),
            ));
        };

        for BoundResponseMarkers { name, markers } in signature.response_markers() {
            for marker in markers {
                let value = marker
                    .apply(response)
                    .map_err(|reason| decode_error(Some(name), reason))?;
                fields.insert(name.clone(), value);
            }
        }
    }

    return_type
        .decode(payload)
        .map_err(|error| decode_error(None, error.to_string()))
}
