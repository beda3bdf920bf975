use crate::protocol::{Http, HttpRequest};
use crate::render::render_values;
use http::Method;
use wirebind::{BoundArguments, Marker, MethodMarker};

/// Fixes the HTTP method of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMethod(String);

impl HttpMethod {
    /// Any method token; validated when the interface is bound.
    pub fn new(method: impl Into<String>) -> Self {
        Self(method.into())
    }

    pub fn get() -> Self {
        Self::new("GET")
    }

    pub fn post() -> Self {
        Self::new("POST")
    }

    pub fn put() -> Self {
        Self::new("PUT")
    }

    pub fn patch() -> Self {
        Self::new("PATCH")
    }

    pub fn delete() -> Self {
        Self::new("DELETE")
    }

    fn parse(&self) -> Result<Method, String> {
        Method::from_bytes(self.0.as_bytes())
            .map_err(|error| format!("invalid HTTP method `{}`: {error}", self.0))
    }
}

impl MethodMarker<Http> for HttpMethod {
    fn prepare_request(
        &self,
        request: &mut HttpRequest,
        _arguments: &BoundArguments,
    ) -> Result<(), String> {
        request.method = Some(self.parse()?);
        Ok(())
    }

    fn check(&self, _parameters: &[&str]) -> Result<(), String> {
        self.parse().map(|_| ())
    }
}

impl From<HttpMethod> for Marker<Http> {
    fn from(marker: HttpMethod) -> Self {
        Marker::method(marker)
    }
}

/// Fixes the request path.
///
/// `{name}` placeholders are replaced by the percent-encoded value of the
/// parameter `name`; every placeholder must name a parameter of the method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path(String);

impl Path {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn template(&self) -> &str {
        &self.0
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn segments(template: &str) -> Result<Vec<Segment<'_>>, String> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(format!("unmatched `}}` in path `{template}`"));
        }

        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| format!("unclosed `{{` in path `{template}`"))?;
        let name = &after[..close];
        if name.is_empty() || name.contains('{') {
            return Err(format!("malformed placeholder in path `{template}`"));
        }

        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        segments.push(Segment::Placeholder(name));
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Ok(segments)
}

impl MethodMarker<Http> for Path {
    fn prepare_request(
        &self,
        request: &mut HttpRequest,
        arguments: &BoundArguments,
    ) -> Result<(), String> {
        let mut path = String::with_capacity(self.0.len());

        for segment in segments(&self.0)? {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Placeholder(name) => {
                    let value = arguments
                        .get(name)
                        .ok_or_else(|| format!("no argument for path placeholder `{name}`"))?;
                    let encoded: Vec<String> = render_values(value)
                        .iter()
                        .map(|rendered| urlencoding::encode(rendered).into_owned())
                        .collect();
                    path.push_str(&encoded.join(","));
                }
            }
        }

        request.path = Some(path);
        Ok(())
    }

    fn check(&self, parameters: &[&str]) -> Result<(), String> {
        for segment in segments(&self.0)? {
            if let Segment::Placeholder(name) = segment {
                if !parameters.contains(&name) {
                    return Err(format!("path placeholder `{name}` names no parameter"));
                }
            }
        }
        Ok(())
    }
}

impl From<Path> for Marker<Http> {
    fn from(marker: Path) -> Self {
        Marker::method(marker)
    }
}
