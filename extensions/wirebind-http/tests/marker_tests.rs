use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Value, json};
use wirebind::{
    Annotation, Arguments, BindingError, Error, FieldAnnotation, MethodSpec, Parameter, Record,
    Signature, build_request, decode_response,
};
use wirebind_http::http::{HeaderMap, HeaderValue, Method, StatusCode};
use wirebind_http::{
    FormData, FormField, Header, Http, HttpMethod, HttpRequest, HttpResponse, Json, JsonField,
    Path, QueryParam, ReasonPhrase, ResponseHeader, ResponseStatus, Text,
};

fn signature(method: MethodSpec<Http>) -> Signature<Http> {
    Signature::from_method(&method).unwrap()
}

fn request(method: MethodSpec<Http>, arguments: Arguments) -> HttpRequest {
    build_request(&signature(method), &arguments).unwrap()
}

#[test]
fn test_method_and_path_default_to_get_root() {
    let request = request(MethodSpec::new("ping"), Arguments::new());

    assert_eq!(request.method_or_default(), Method::GET);
    assert_eq!(request.path_or_default(), "/");
}

#[test]
fn test_method_marker_sets_verb_and_path_template() {
    let request = request(
        MethodSpec::new("get_item")
            .marker(HttpMethod::delete())
            .marker(Path::new("/items/{id}/tags/{tag}"))
            .parameter(Parameter::new("id"))
            .parameter(Parameter::new("tag")),
        Arguments::new().arg(42).arg("blue"),
    );

    assert_eq!(request.method, Some(Method::DELETE));
    assert_eq!(request.path.as_deref(), Some("/items/42/tags/blue"));
}

#[test]
fn test_path_placeholders_are_percent_encoded() {
    let request = request(
        MethodSpec::new("get_file")
            .marker(Path::new("/files/{name}"))
            .parameter(Parameter::new("name")),
        Arguments::new().arg("a/b?c#d e"),
    );

    assert_eq!(request.path.as_deref(), Some("/files/a%2Fb%3Fc%23d%20e"));
}

#[test]
fn test_path_placeholder_must_name_a_parameter() {
    let error = Signature::from_method(
        &MethodSpec::<Http>::new("get_item").marker(Path::new("/items/{item_id}")),
    )
    .unwrap_err();

    assert!(matches!(error, BindingError::MalformedMarker { .. }));
}

#[test]
fn test_malformed_path_template_is_rejected() {
    for template in ["/items/{id", "/items/id}", "/items/{}"] {
        let error = Signature::from_method(
            &MethodSpec::<Http>::new("get_item")
                .marker(Path::new(template))
                .parameter(Parameter::new("id")),
        )
        .unwrap_err();

        assert!(
            matches!(error, BindingError::MalformedMarker { .. }),
            "template {template} should be rejected"
        );
    }
}

#[test]
fn test_invalid_method_token_is_rejected() {
    let error =
        Signature::from_method(&MethodSpec::<Http>::new("odd").marker(HttpMethod::new("GE T")))
            .unwrap_err();

    assert!(matches!(error, BindingError::MalformedMarker { .. }));
}

#[test]
fn test_invalid_header_name_is_rejected() {
    let error = Signature::from_method(
        &MethodSpec::<Http>::new("send").parameter(Parameter::new("value").marker(Header::new("x foo"))),
    )
    .unwrap_err();

    assert!(matches!(error, BindingError::MalformedMarker { .. }));
}

#[test]
fn test_query_params_accumulate_in_call_order() {
    let request = request(
        MethodSpec::new("get_anything")
            .parameter(Parameter::new("foo").marker(QueryParam::new("foobar")))
            .parameter(Parameter::new("bar").marker(QueryParam::new("foobar"))),
        Arguments::new().kwarg("foo", 100500).kwarg("bar", 100501),
    );

    assert_eq!(
        request.query,
        vec![
            ("foobar".to_owned(), "100500".to_owned()),
            ("foobar".to_owned(), "100501".to_owned()),
        ]
    );
}

#[test]
fn test_arrays_expand_and_null_is_skipped() {
    let request = request(
        MethodSpec::new("search")
            .parameter(Parameter::new("tags").marker(QueryParam::new("tag")))
            .parameter(Parameter::new("page").marker(QueryParam::new("page"))),
        Arguments::new().arg(json!(["a", "b"])).arg(Value::Null),
    );

    assert_eq!(
        request.query,
        vec![
            ("tag".to_owned(), "a".to_owned()),
            ("tag".to_owned(), "b".to_owned()),
        ]
    );
}

#[test]
fn test_header_defaults_are_applied() {
    let request = request(
        MethodSpec::new("get_headers")
            .parameter(Parameter::new("foo").marker(Header::new("x-foo")))
            .parameter(
                Parameter::new("bar")
                    .default_value("barval")
                    .marker(Header::new("x-bar")),
            )
            .parameter(
                Parameter::new("baz")
                    .default_factory(|| Ok(json!("bazval")))
                    .marker(Header::new("x-baz")),
            ),
        Arguments::new().kwarg("foo", "fooval"),
    );

    assert_eq!(
        request.headers,
        vec![
            ("x-foo".to_owned(), "fooval".to_owned()),
            ("x-bar".to_owned(), "barval".to_owned()),
            ("x-baz".to_owned(), "bazval".to_owned()),
        ]
    );
}

#[test]
fn test_header_value_with_newline_is_an_argument_error() {
    let error = build_request(
        &signature(
            MethodSpec::new("send").parameter(Parameter::new("value").marker(Header::new("x-foo"))),
        ),
        &Arguments::new().arg("bad\nvalue"),
    )
    .unwrap_err();

    assert!(matches!(error, Error::Arguments(_)));
}

#[test]
fn test_form_data_and_form_fields_share_the_form() {
    let request = request(
        MethodSpec::new("post_anything")
            .marker(HttpMethod::post())
            .parameter(Parameter::new("data").marker(FormData))
            .parameter(Parameter::new("bar").marker(FormField::new("barqux")))
            .parameter(Parameter::new("qux").marker(FormField::new("barqux"))),
        Arguments::new()
            .kwarg("data", json!({ "foo": 42 }))
            .kwarg("bar", 100500)
            .kwarg("qux", 100501),
    );

    assert_eq!(
        request.form,
        vec![
            ("foo".to_owned(), "42".to_owned()),
            ("barqux".to_owned(), "100500".to_owned()),
            ("barqux".to_owned(), "100501".to_owned()),
        ]
    );
}

#[test]
fn test_form_data_rejects_non_records() {
    let error = build_request(
        &signature(MethodSpec::new("post").parameter(Parameter::new("data").marker(FormData))),
        &Arguments::new().arg(5),
    )
    .unwrap_err();

    assert!(error.to_string().contains("form data must be a record"));
}

#[test]
fn test_json_body_and_json_fields_merge() {
    let request = request(
        MethodSpec::new("create")
            .parameter(Parameter::new("body").marker(Json))
            .parameter(Parameter::new("name").marker(JsonField::new("name"))),
        Arguments::new().arg(json!({ "size": 3 })).arg("widget"),
    );

    assert_eq!(request.json, Some(json!({ "size": 3, "name": "widget" })));
}

#[derive(Debug, Deserialize, PartialEq)]
struct Described {
    status: u16,
    reason: Option<String>,
    request_id: Option<String>,
    missing: Option<String>,
    text: String,
}

impl Record<Http> for Described {
    fn field_annotations() -> Vec<FieldAnnotation<Http>> {
        vec![
            FieldAnnotation::new("status", Annotation::new().with(ResponseStatus)),
            FieldAnnotation::new("reason", Annotation::new().with(ReasonPhrase)),
            FieldAnnotation::new(
                "request_id",
                Annotation::new().with(ResponseHeader::new("x-request-id")),
            ),
            FieldAnnotation::new(
                "missing",
                Annotation::new().with(ResponseHeader::new("x-missing")),
            ),
            FieldAnnotation::new("text", Annotation::new().with(Text)),
        ]
    }
}

#[test]
fn test_response_markers_fill_result_fields() {
    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", HeaderValue::from_static("abc"));
    let response = HttpResponse::new(
        StatusCode::CREATED,
        headers,
        Bytes::from_static(br#"{"note":"done"}"#),
    );

    let outcome = decode_response(
        &signature(MethodSpec::new("create").returns::<Described>()),
        &response,
    )
    .unwrap();

    assert_eq!(
        *outcome.downcast::<Described>().unwrap(),
        Described {
            status: 201,
            reason: Some("Created".to_owned()),
            request_id: Some("abc".to_owned()),
            missing: None,
            text: r#"{"note":"done"}"#.to_owned(),
        }
    );
}

#[test]
fn test_payload_of_empty_and_text_bodies() {
    let empty = HttpResponse::new(StatusCode::NO_CONTENT, HeaderMap::new(), Bytes::new());
    let text = HttpResponse::new(StatusCode::OK, HeaderMap::new(), "plain words");
    let json = HttpResponse::new(StatusCode::OK, HeaderMap::new(), r#"{"a":1}"#);

    assert_eq!(<Http as wirebind::Protocol>::payload(&empty), Ok(Value::Null));
    assert_eq!(
        <Http as wirebind::Protocol>::payload(&text),
        Ok(json!("plain words"))
    );
    assert_eq!(<Http as wirebind::Protocol>::payload(&json), Ok(json!({ "a": 1 })));
}
