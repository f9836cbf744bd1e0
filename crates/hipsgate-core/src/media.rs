//! Media type inference from file extensions.
//!
//! Astronomy formats take precedence over the generic table: `.fits` is
//! `application/fits` and `.xml` is a VOTable. Textual types carry a UTF-8
//! charset. Unknown extensions fall back to `text/plain; charset=utf-8`.

use mime::Mime;

use crate::path::RequestPath;

/// Media type for FITS images and tables.
pub const FITS: &str = "application/fits";

/// Media type for VOTable documents.
pub const VOTABLE: &str = "application/x-votable+xml";

/// Extension → media type, for everything without a dedicated override.
static EXTENSIONS: &[(&str, &str)] = &[
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("fit", "application/fits"),
    ("fts", "application/fits"),
    ("gif", "image/gif"),
    ("gz", "application/gzip"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ico", "image/vnd.microsoft.icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("md", "text/markdown"),
    ("mjs", "text/javascript"),
    ("parquet", "application/vnd.apache.parquet"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("tar", "application/x-tar"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("tsv", "text/tab-separated-values"),
    ("txt", "text/plain"),
    ("wasm", "application/wasm"),
    ("webp", "image/webp"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("zip", "application/zip"),
];

/// Media type served for `path`.
///
/// # Examples
///
/// ```
/// use hipsgate_core::media::media_type;
/// use hipsgate_core::path::RequestPath;
///
/// let path = RequestPath::parse("Norder3/Allsky.fits").unwrap();
/// assert_eq!(media_type(&path), "application/fits");
/// assert_eq!(media_type(&RequestPath::index()), "text/html; charset=utf-8");
/// assert_eq!(
///     media_type(&RequestPath::parse("properties").unwrap()),
///     "text/plain; charset=utf-8"
/// );
/// ```
#[must_use]
pub fn media_type(path: &RequestPath) -> String {
    let Some(ext) = path.extension() else {
        return fallback();
    };
    let ext = ext.to_ascii_lowercase();
    match ext.as_str() {
        "fits" => FITS.to_owned(),
        "xml" => VOTABLE.to_owned(),
        other => EXTENSIONS
            .iter()
            .find(|(candidate, _)| *candidate == other)
            .and_then(|(_, essence)| essence.parse::<Mime>().ok())
            .map_or_else(fallback, |mime| with_charset(&mime)),
    }
}

fn with_charset(mime: &Mime) -> String {
    if mime.type_() == mime::TEXT && mime.get_param(mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.to_string()
    }
}

fn fallback() -> String {
    mime::TEXT_PLAIN_UTF_8.to_string()
}
