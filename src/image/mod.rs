//! Loading image references and encoding them as base64 payloads.
//!
//! A reference is whatever the capture layer hands over: a path on disk, a
//! `file://` URI, a `data:` URI, an `http(s)://` blob URL, or bytes that are
//! already in memory. Local references go through the [`Runtime`]; blob URLs
//! are fetched with the shared reqwest client.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::debug;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};

use crate::error::{EncodingError, EncodingErrorKind};
use crate::http::check_status;
use crate::runtime::Runtime;

/// MIME type assumed when nothing better is known.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// A reference to an image to be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A file on the local filesystem
    Path(PathBuf),
    /// An inline `data:` URI
    DataUri(String),
    /// A blob reachable over HTTP(S)
    Url(String),
    /// Bytes already loaded in memory
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Classifies a textual reference. Never fails; anything that is not a
    /// recognised URI is taken as a filesystem path.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        if starts_with_ignore_case(reference, "data:") {
            ImageSource::DataUri(reference.to_string())
        } else if starts_with_ignore_case(reference, "http://")
            || starts_with_ignore_case(reference, "https://")
        {
            ImageSource::Url(reference.to_string())
        } else if starts_with_ignore_case(reference, "file://") {
            ImageSource::Path(file_uri_to_path(reference))
        } else {
            ImageSource::Path(PathBuf::from(reference))
        }
    }

    /// Human-readable form of the reference for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::DataUri(uri) => {
                let header = uri.split(',').next().unwrap_or(uri);
                format!("{},...", header)
            }
            ImageSource::Url(url) => url.clone(),
            ImageSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }

    /// File name to report when uploading the image as a form part.
    pub fn file_name(&self) -> String {
        let from_path = |p: &Path| {
            p.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .filter(|name| !name.is_empty())
        };

        let name = match self {
            ImageSource::Path(path) => from_path(path),
            ImageSource::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                path.rsplit('/')
                    .next()
                    .filter(|name| !name.is_empty() && name.contains('.'))
                    .map(str::to_string)
            }
            _ => None,
        };

        name.unwrap_or_else(|| format!("image.{}", extension_for(&self.mime_type())))
    }

    /// Best guess at the MIME type, from the data URI header or the file extension.
    pub fn mime_type(&self) -> String {
        match self {
            ImageSource::DataUri(uri) => {
                let header = uri
                    .get(5..)
                    .and_then(|rest| rest.split(',').next())
                    .unwrap_or_default();
                let media_type = header.split(';').next().unwrap_or_default().trim();
                if is_media_type(media_type) {
                    media_type.to_ascii_lowercase()
                } else {
                    DEFAULT_MIME_TYPE.to_string()
                }
            }
            ImageSource::Path(path) => mime_for_extension(path.extension().and_then(|e| e.to_str())),
            ImageSource::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                mime_for_extension(Path::new(path).extension().and_then(|e| e.to_str()))
            }
            ImageSource::Bytes(_) => DEFAULT_MIME_TYPE.to_string(),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(reference: &str) -> Self {
        ImageSource::parse(reference)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Reads the raw bytes behind an image reference.
#[tracing::instrument(skip(runtime, client, source), fields(source = %source.describe()))]
pub async fn load_image<R: Runtime>(
    runtime: &R,
    client: &Client,
    source: &ImageSource,
) -> Result<Vec<u8>, EncodingError> {
    let fail = |kind: EncodingErrorKind| EncodingError::new(source.describe(), kind);

    let bytes = match source {
        ImageSource::Path(path) => {
            debug!("Reading image from {}", path.display());
            runtime.read(path).map_err(|e| fail(EncodingErrorKind::Read(e)))?
        }
        ImageSource::DataUri(uri) => decode_data_uri(uri).map_err(fail)?,
        ImageSource::Url(url) => {
            debug!("Fetching image blob from {}", url);
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| fail(EncodingErrorKind::Fetch(e)))?;
            let response = check_status(response)
                .await
                .map_err(|e| fail(EncodingErrorKind::FetchStatus(e.status)))?;
            response
                .bytes()
                .await
                .map_err(|e| fail(EncodingErrorKind::Fetch(e)))?
                .to_vec()
        }
        ImageSource::Bytes(bytes) => bytes.clone(),
    };

    if bytes.is_empty() {
        return Err(fail(EncodingErrorKind::Empty));
    }

    debug!("Loaded {} bytes of image data", bytes.len());
    Ok(bytes)
}

/// Loads an image reference and returns its standard, padded base64 encoding.
pub async fn encode_image<R: Runtime>(
    runtime: &R,
    client: &Client,
    source: &ImageSource,
) -> Result<String, EncodingError> {
    let bytes = load_image(runtime, client, source).await?;
    Ok(STANDARD.encode(bytes))
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, EncodingErrorKind> {
    let rest = uri.get(5..).ok_or(EncodingErrorKind::MalformedDataUri)?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or(EncodingErrorKind::MalformedDataUri)?;

    let is_base64 = header
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"));

    if is_base64 {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(cleaned)
            .map_err(EncodingErrorKind::InvalidBase64)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Local path of a `file://` URI, percent-decoded. URIs naming a remote
/// host are kept verbatim after the scheme.
fn file_uri_to_path(uri: &str) -> PathBuf {
    match Url::parse(uri).ok().and_then(|url| url.to_file_path().ok()) {
        Some(path) => path,
        None => PathBuf::from(uri.get("file://".len()..).unwrap_or_default()),
    }
}

/// `type/subtype` made of RFC 6838 token characters.
fn is_media_type(value: &str) -> bool {
    let is_token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    value
        .split_once('/')
        .is_some_and(|(kind, subtype)| is_token(kind) && is_token(subtype))
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn mime_for_extension(extension: Option<&str>) -> String {
    let mime = match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        _ => DEFAULT_MIME_TYPE,
    };
    mime.to_string()
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/heic" => "heic",
        _ => "jpg",
    }
}
