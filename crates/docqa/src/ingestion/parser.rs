//! Multi-format text extraction with content sniffing

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

use super::fetcher::DownloadedFile;

/// Extracted text with metadata
#[derive(Debug, Clone)]
pub struct ParsedText {
    /// File type the content was extracted from
    pub file_type: FileType,
    /// Extracted plain text
    pub content: String,
    /// Content hash of the extracted text
    pub content_hash: String,
    /// Total pages (if applicable)
    pub total_pages: Option<u32>,
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Sniff the file type: magic bytes first, then the Content-Type
    /// header, then the URL extension.
    pub fn sniff_type(filename: &str, content_type: Option<&str>, data: &[u8]) -> FileType {
        if data.starts_with(b"%PDF-") {
            return FileType::Pdf;
        }
        // DOCX is a ZIP container; the local-file header is enough here
        // since ZIP is not otherwise an accepted input
        if data.starts_with(b"PK\x03\x04") {
            return FileType::Docx;
        }

        if let Some(mime) = content_type {
            let from_mime = FileType::from_mime(mime);
            if from_mime.is_supported() {
                return from_mime;
            }
        }

        if let Some(mime) = mime_guess::from_path(filename).first_raw() {
            let from_mime = FileType::from_mime(mime);
            if from_mime.is_supported() {
                return from_mime;
            }
        }

        let extension = filename.rsplit('.').next().unwrap_or("");
        FileType::from_extension(extension)
    }

    /// Extract plain text from a downloaded file
    pub fn parse(file: &DownloadedFile) -> Result<ParsedText> {
        let file_type = Self::sniff_type(&file.filename, file.content_type.as_deref(), &file.data);

        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType(format!(
                "'{}' (content-type: {})",
                file.filename,
                file.content_type.as_deref().unwrap_or("unknown")
            )));
        }

        let parsed = match file_type {
            FileType::Pdf => Self::parse_pdf(&file.data)?,
            FileType::Docx => Self::parse_docx(&file.data)?,
            FileType::Eml => Self::parse_eml(&file.data)?,
            FileType::Txt | FileType::Markdown => Self::parse_text(&file.data, file_type)?,
            FileType::Html => Self::parse_html(&file.data)?,
            FileType::Unknown => unreachable!("unsupported types rejected above"),
        };

        if parsed.content.trim().is_empty() {
            return Err(Error::extract(
                &file.filename,
                "no text content could be extracted",
            ));
        }

        Ok(parsed)
    }

    /// Parse PDF document
    fn parse_pdf(data: &[u8]) -> Result<ParsedText> {
        let raw = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::extract("document.pdf", e.to_string()))?;

        let content = clean_text(&raw);

        // Page count comes from the document catalog; extraction itself is
        // not page-aware
        let total_pages = match lopdf::Document::load_mem(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(_) => None,
        };

        Ok(ParsedText {
            file_type: FileType::Pdf,
            content_hash: hash_content(&content),
            content,
            total_pages,
        })
    }

    /// Parse DOCX document
    fn parse_docx(data: &[u8]) -> Result<ParsedText> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::extract("document.docx", e.to_string()))?;

        let mut content = String::new();

        for child in doc.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(p) => {
                    Self::collect_paragraph_text(&p, &mut content);
                    content.push('\n');
                }
                docx_rs::DocumentChild::Table(table) => {
                    for row in table.rows {
                        let docx_rs::TableChild::TableRow(row) = row;
                        for cell in row.cells {
                            let docx_rs::TableRowChild::TableCell(cell) = cell;
                            for cell_child in cell.children {
                                if let docx_rs::TableCellContent::Paragraph(p) = cell_child {
                                    Self::collect_paragraph_text(&p, &mut content);
                                    content.push(' ');
                                }
                            }
                        }
                        content.push('\n');
                    }
                }
                _ => {}
            }
        }

        let content = clean_text(&content);

        Ok(ParsedText {
            file_type: FileType::Docx,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        })
    }

    /// Collect run text from a paragraph
    fn collect_paragraph_text(paragraph: &docx_rs::Paragraph, out: &mut String) {
        for child in &paragraph.children {
            if let docx_rs::ParagraphChild::Run(run) = child {
                for run_child in &run.children {
                    if let docx_rs::RunChild::Text(t) = run_child {
                        out.push_str(&t.text);
                    }
                }
            }
        }
    }

    /// Parse an RFC 822 email, collecting text/plain parts
    fn parse_eml(data: &[u8]) -> Result<ParsedText> {
        let mail = mailparse::parse_mail(data)
            .map_err(|e| Error::extract("message.eml", e.to_string()))?;

        let mut parts = Vec::new();
        Self::collect_plain_parts(&mail, &mut parts);

        // Non-multipart messages with an unlabeled body still have content
        if parts.is_empty() && mail.subparts.is_empty() {
            if let Ok(body) = mail.get_body() {
                parts.push(body);
            }
        }

        let content = clean_text(&parts.join("\n"));

        Ok(ParsedText {
            file_type: FileType::Eml,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        })
    }

    /// Walk MIME parts depth-first, collecting text/plain bodies
    fn collect_plain_parts(part: &mailparse::ParsedMail, out: &mut Vec<String>) {
        if part.subparts.is_empty() {
            if part.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
                if let Ok(body) = part.get_body() {
                    out.push(body);
                }
            }
        } else {
            for sub in &part.subparts {
                Self::collect_plain_parts(sub, out);
            }
        }
    }

    /// Parse plain text or markdown
    fn parse_text(data: &[u8], file_type: FileType) -> Result<ParsedText> {
        let content = clean_text(&String::from_utf8_lossy(data));

        Ok(ParsedText {
            file_type,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        })
    }

    /// Parse HTML, dropping markup and non-content elements
    fn parse_html(data: &[u8]) -> Result<ParsedText> {
        let html = String::from_utf8_lossy(data);
        let document = scraper::Html::parse_document(&html);

        let mut content = String::new();
        for node in document.root_element().descendants() {
            if let scraper::Node::Text(text) = node.value() {
                let in_non_content = node.ancestors().any(|a| match a.value() {
                    scraper::Node::Element(el) => {
                        matches!(el.name(), "script" | "style" | "head" | "noscript")
                    }
                    _ => false,
                });
                if !in_non_content {
                    content.push_str(text);
                    content.push('\n');
                }
            }
        }

        let content = clean_text(&content);

        Ok(ParsedText {
            file_type: FileType::Html,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        })
    }
}

/// Normalize extracted text: strip NULs, trim lines, collapse blank lines
fn clean_text(raw: &str) -> String {
    raw.replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// SHA-256 hash of content, hex-encoded
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
