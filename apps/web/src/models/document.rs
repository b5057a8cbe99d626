use bytes::Bytes;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Document types the backend's résumé parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detects the kind from the file extension, falling back to the declared
    /// content type. This is an input filter, not a security check.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("pdf") => return Some(DocumentKind::Pdf),
            Some("docx") => return Some(DocumentKind::Docx),
            _ => {}
        }

        let mime = content_type?
            .split(';')
            .next()
            .map(|m| m.trim().to_ascii_lowercase())?;
        match mime.as_str() {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

/// A résumé file accepted by the upload widget.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

impl ResumeFile {
    /// Name sent to the backend. The backend validates by extension, so a
    /// file accepted on content type alone gets the matching extension.
    pub fn upload_name(&self) -> String {
        if DocumentKind::detect(&self.file_name, None) == Some(self.kind) {
            self.file_name.clone()
        } else {
            let stem = if self.file_name.trim().is_empty() {
                "resume"
            } else {
                self.file_name.as_str()
            };
            format!("{stem}.{}", self.kind.extension())
        }
    }
}
