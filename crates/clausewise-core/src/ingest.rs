//! Document ingestion: allowlist and size checks, temp-file handling, and
//! plain-text extraction for TXT, DOCX and PDF uploads.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Config;

const PREVIEW_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Unsupported file format: {0:?} (allowed: pdf, docx, txt)")]
    UnsupportedFormat(String),

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Could not extract text: {0}")]
    ExtractionFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Resolve the format from a filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(IngestError::UnsupportedFormat(ext)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

/// Text extracted from one upload.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    /// SHA-256 of the uploaded bytes, hex encoded.
    pub file_id: String,
    pub text: String,
}

impl ExtractedDocument {
    pub fn preview(&self) -> String {
        text_preview(&self.text)
    }
}

pub struct DocumentIngestor {
    upload_dir: PathBuf,
    max_bytes: usize,
    pdftotext_bin: String,
    extraction_timeout: Duration,
}

impl DocumentIngestor {
    pub fn new(upload_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_bytes,
            pdftotext_bin: "pdftotext".into(),
            extraction_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.upload_dir, config.max_upload_bytes)
            .with_pdftotext(&config.pdftotext_bin)
            .with_timeout(config.extraction_timeout_s)
    }

    pub fn with_pdftotext(mut self, bin: &str) -> Self {
        self.pdftotext_bin = bin.to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.extraction_timeout = Duration::from_secs(secs);
        self
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate raw request text against the size limit.
    pub fn ingest_text(&self, text: String) -> Result<String> {
        self.check_size(text.len())?;
        Ok(text)
    }

    /// Extract plain text from an uploaded file.
    ///
    /// The bytes are written to a uniquely named temp file under the upload
    /// directory; the file is removed when this returns, on success or error.
    /// File I/O and TXT/DOCX parsing run on the blocking pool.
    pub async fn ingest_file(&self, filename: &str, data: &[u8]) -> Result<ExtractedDocument> {
        let format = DocumentFormat::from_filename(filename)?;
        self.check_size(data.len())?;

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let upload_dir = self.upload_dir.clone();
        let suffix = format!(".{}", format.extension());
        let tmpfile = blocking(move || {
            Ok(tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(&upload_dir)?)
        })
        .await?;
        tokio::fs::write(tmpfile.path(), data).await?;

        debug!(filename, ?format, bytes = data.len(), path = %tmpfile.path().display(), "extracting upload");

        let path = tmpfile.path().to_path_buf();
        let limit = self.max_bytes;
        let text = match format {
            DocumentFormat::Txt => blocking(move || extract_txt(&path)).await?,
            DocumentFormat::Docx => blocking(move || extract_docx(&path, limit)).await?,
            DocumentFormat::Pdf => self.extract_pdf(&path, data).await?,
        };

        Ok(ExtractedDocument {
            filename: filename.to_string(),
            format,
            file_id: content_id(data),
            text,
        })
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_bytes {
            return Err(IngestError::FileTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    async fn extract_pdf(&self, path: &Path, data: &[u8]) -> Result<String> {
        if !data.starts_with(b"%PDF") {
            return Err(IngestError::ExtractionFailure(
                "not a valid PDF (missing %PDF header)".into(),
            ));
        }

        let output = tokio::time::timeout(
            self.extraction_timeout,
            Command::new(&self.pdftotext_bin)
                .arg("-enc")
                .arg("UTF-8")
                .arg(path)
                .arg("-")
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            IngestError::ExtractionFailure(format!(
                "{} timed out after {}s",
                self.pdftotext_bin,
                self.extraction_timeout.as_secs()
            ))
        })?
        .map_err(|e| {
            IngestError::ExtractionFailure(format!("failed to run {}: {e}", self.pdftotext_bin))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "pdftotext failed: {}", stderr.trim());
            return Err(IngestError::ExtractionFailure(format!(
                "PDF could not be read: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| IngestError::Io(std::io::Error::other(e)))?
}

fn extract_txt(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|e| IngestError::ExtractionFailure(format!("text file is not valid UTF-8: {e}")))
}

/// The inflated document body is held to the same `limit` as uploads. The
/// declared entry size is checked first, then the read itself is capped in
/// case the header lies.
fn extract_docx(path: &Path, limit: usize) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| IngestError::ExtractionFailure(format!("DOCX is not a zip container: {e}")))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| IngestError::ExtractionFailure(format!("DOCX has no document body: {e}")))?;

    let cap = limit as u64;
    if entry.size() > cap {
        return Err(IngestError::FileTooLarge {
            size: usize::try_from(entry.size()).unwrap_or(usize::MAX),
            limit,
        });
    }

    let mut body = Vec::new();
    entry
        .take(cap + 1)
        .read_to_end(&mut body)
        .map_err(|e| IngestError::ExtractionFailure(format!("DOCX body unreadable: {e}")))?;
    if body.len() > limit {
        return Err(IngestError::FileTooLarge {
            size: body.len(),
            limit,
        });
    }

    let xml = String::from_utf8(body)
        .map_err(|e| IngestError::ExtractionFailure(format!("DOCX body is not valid UTF-8: {e}")))?;
    Ok(docx_xml_to_text(&xml))
}

#[allow(clippy::unwrap_used)]
fn docx_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\s*/>|<w:br\s*/>|</w:p>").unwrap()
    })
}

/// Flatten WordprocessingML into plain text, one line per paragraph.
pub fn docx_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    for caps in docx_token_re().captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            out.push_str(&unescape_xml(run.as_str()));
            continue;
        }
        match caps.get(0).map(|m| m.as_str()) {
            Some(tag) if tag.starts_with("<w:tab") => out.push('\t'),
            Some(_) => out.push('\n'),
            None => {}
        }
    }
    out
}

/// Decode the predefined XML entities and numeric character references.
/// Anything unrecognised is kept as written.
fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            },
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        },
    }
}

/// Reduce a client-supplied filename to a safe basename.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// First 500 chars of `text`, with `...` appended when truncated.
pub fn text_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn content_id(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
