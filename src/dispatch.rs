//! Named-method adapter for a host transport.
//!
//! A host channel delivers `(method, arguments)` pairs with loosely typed
//! argument mappings and expects either a JSON result or an
//! [`ErrorPayload`]. [`dispatch`] is that boundary: it deserialises the
//! arguments into the `*Args` types of [`crate::request`], runs the operation
//! on the service and serialises the outcome.
//!
//! | Method | Aliases | Result |
//! |--------|---------|--------|
//! | `testAccess` | `testPdfAccess` | [`crate::AccessReport`] mapping |
//! | `renderPlainSurface` | `renderSimpleBitmap` | [`crate::PlainSurface`] mapping |
//! | `convertPage` | `convertPdfToBitmap` | [`crate::RenderResult`] mapping |
//! | `getPageCount` | `getPdfPageCount` | integer |
//! | `getPlatformVersion` | | `"<os> <arch>"` string |
//!
//! Unknown methods yield [`ErrorKind::NotImplemented`].

use crate::error::{ErrorKind, ErrorPayload, RenderError};
use crate::request::{ConvertArgs, PathArgs, PlainSurfaceArgs};
use crate::service::Pdf2BitmapService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Methods understood by [`dispatch`], after alias resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    TestAccess,
    RenderPlainSurface,
    ConvertPage,
    GetPageCount,
    GetPlatformVersion,
}

impl Method {
    /// Resolve a method name or one of its legacy aliases.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "testAccess" | "testPdfAccess" => Some(Method::TestAccess),
            "renderPlainSurface" | "renderSimpleBitmap" => Some(Method::RenderPlainSurface),
            "convertPage" | "convertPdfToBitmap" => Some(Method::ConvertPage),
            "getPageCount" | "getPdfPageCount" => Some(Method::GetPageCount),
            "getPlatformVersion" => Some(Method::GetPlatformVersion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::TestAccess => "testAccess",
            Method::RenderPlainSurface => "renderPlainSurface",
            Method::ConvertPage => "convertPage",
            Method::GetPageCount => "getPageCount",
            Method::GetPlatformVersion => "getPlatformVersion",
        }
    }
}

/// Run `method` with `args` against `service`.
///
/// `args` may be `null` or an object; missing keys take their defaults.
pub async fn dispatch(
    service: &Pdf2BitmapService,
    method: &str,
    args: Value,
) -> Result<Value, ErrorPayload> {
    let Some(resolved) = Method::parse(method) else {
        return Err(ErrorPayload::new(
            ErrorKind::NotImplemented,
            format!("Method '{method}' is not implemented"),
        ));
    };
    debug!("dispatch {} (as {})", method, resolved.as_str());

    match resolved {
        Method::TestAccess => {
            let path = parse_args::<PathArgs>(args)?.into_path()?;
            to_value(service.test_access(path).await?)
        }
        Method::RenderPlainSurface => {
            let request = parse_args::<PlainSurfaceArgs>(args)?.into_request()?;
            to_value(service.render_plain_surface(request).await?)
        }
        Method::ConvertPage => {
            let request = parse_args::<ConvertArgs>(args)?.into_request()?;
            to_value(service.convert_page(request).await?)
        }
        Method::GetPageCount => {
            let path = parse_args::<PathArgs>(args)?.into_path()?;
            to_value(service.page_count(path).await?)
        }
        Method::GetPlatformVersion => Ok(Value::String(platform_version())),
    }
}

/// Host OS and architecture, e.g. `"linux x86_64"`.
pub fn platform_version() -> String {
    format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}

fn parse_args<T: DeserializeOwned + Default>(args: Value) -> Result<T, RenderError> {
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args)
        .map_err(|e| RenderError::invalid_argument(format!("Malformed arguments: {e}")))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ErrorPayload> {
    serde_json::to_value(value).map_err(|e| {
        ErrorPayload::from(RenderError::Unexpected(format!(
            "Failed to serialise result: {e}"
        )))
    })
}
