//! Word `.docx` codec.
//!
//! A DOCX file is a ZIP archive of XML parts. Only the parts that hold
//! paragraph text are rewritten; every other entry is copied raw, in its
//! original order and with its original compression.

mod xml;

use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, trace};
use zip::{ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

use docfill_core::{
    application::{
        ApplicationError,
        ports::{DocumentCodec, FilledDocument},
    },
    domain::{MissingPolicy, SubstitutionReport, VariableMap},
    error::{DocfillError, DocfillResult},
};

const MAIN_PART: &str = "word/document.xml";

static TEXT_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^word/(?:document|header\d*|footer\d*|footnotes|endnotes)\.xml$")
        .expect("part pattern is valid")
});

/// Codec for Office Open XML word-processing documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxCodec;

impl DocxCodec {
    pub fn new() -> Self {
        Self
    }
}

fn is_text_part(name: &str) -> bool {
    TEXT_PART.is_match(name)
}

fn open(document: &[u8]) -> DocfillResult<ZipArchive<Cursor<&[u8]>>> {
    let archive = ZipArchive::new(Cursor::new(document))
        .map_err(|e| invalid(format!("not a ZIP archive: {e}")))?;

    if archive.index_for_name(MAIN_PART).is_none() {
        return Err(invalid(format!("archive has no {MAIN_PART}")));
    }
    Ok(archive)
}

fn entry_name(archive: &mut ZipArchive<Cursor<&[u8]>>, index: usize) -> DocfillResult<String> {
    let raw = archive.by_index_raw(index).map_err(|e| invalid(e.to_string()))?;
    Ok(raw.name().to_string())
}

/// Pre-allocation for an inflated part.
///
/// The declared size comes from the archive header and is not trusted past a
/// small multiple of the archive itself; larger parts just grow while read.
fn capacity_hint(declared: u64, archive_len: usize) -> usize {
    usize::try_from(declared)
        .unwrap_or(usize::MAX)
        .min(archive_len.saturating_mul(4))
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    archive_len: usize,
) -> DocfillResult<String> {
    let mut entry = archive.by_index(index).map_err(|e| invalid(e.to_string()))?;
    let name = entry.name().to_string();
    let mut xml = String::with_capacity(capacity_hint(entry.size(), archive_len));
    entry
        .read_to_string(&mut xml)
        .map_err(|e| invalid(format!("{name}: {e}")))?;
    Ok(xml)
}

impl DocumentCodec for DocxCodec {
    #[instrument(skip_all, fields(bytes = document.len()))]
    fn placeholders(&self, document: &[u8]) -> DocfillResult<BTreeSet<String>> {
        let mut archive = open(document)?;
        let mut found = BTreeSet::new();

        for i in 0..archive.len() {
            let name = entry_name(&mut archive, i)?;
            if !is_text_part(&name) {
                continue;
            }
            let xml = read_part(&mut archive, i, document.len())?;
            let names = xml::part_placeholders(&xml);
            trace!(part = %name, count = names.len(), "Scanned part");
            found.extend(names);
        }

        debug!(count = found.len(), "Placeholders found");
        Ok(found)
    }

    #[instrument(skip_all, fields(bytes = document.len(), policy = %policy))]
    fn fill(
        &self,
        document: &[u8],
        variables: &VariableMap,
        policy: MissingPolicy,
    ) -> DocfillResult<FilledDocument> {
        let mut archive = open(document)?;
        let escaped = variables.map_values(xml::escape_text);

        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(document.len())));
        let mut report = SubstitutionReport::default();

        for i in 0..archive.len() {
            let (name, method) = {
                let raw = archive.by_index_raw(i).map_err(|e| invalid(e.to_string()))?;
                (raw.name().to_string(), raw.compression())
            };

            if is_text_part(&name) {
                let xml = read_part(&mut archive, i, document.len())?;
                let (rewritten, part_report) = xml::fill_part(&xml, &escaped, policy);
                report.absorb(part_report);

                if let Some(rewritten) = rewritten {
                    trace!(part = %name, "Part rewritten");
                    let options = SimpleFileOptions::default().compression_method(method);
                    writer
                        .start_file(name.as_str(), options)
                        .map_err(rendering)?;
                    writer
                        .write_all(rewritten.as_bytes())
                        .map_err(|e| rendering(ZipError::Io(e)))?;
                    continue;
                }
            }

            let raw = archive.by_index_raw(i).map_err(|e| invalid(e.to_string()))?;
            writer.raw_copy_file(raw).map_err(rendering)?;
        }

        let bytes = writer.finish().map_err(rendering)?.into_inner();
        debug!(
            replaced = report.replaced,
            unresolved = report.unresolved.len(),
            "Document filled"
        );

        Ok(FilledDocument { bytes, report })
    }
}

fn invalid(reason: String) -> DocfillError {
    ApplicationError::InvalidDocument { reason }.into()
}

fn rendering(e: ZipError) -> DocfillError {
    ApplicationError::RenderingFailed {
        reason: format!("failed to write archive: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::CompressionMethod;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types/>"#;

    fn body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}<w:sectPr/></w:body></w:document>"#
        )
    }

    fn docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut w = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            let method = if name.ends_with(".png") {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            w.start_file(*name, SimpleFileOptions::default().compression_method(method))
                .unwrap();
            w.write_all(content.as_bytes()).unwrap();
        }
        w.finish().unwrap().into_inner()
    }

    fn entries(bytes: &[u8]) -> Vec<(String, String, CompressionMethod)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut f = archive.by_index(i).unwrap();
                let mut s = String::new();
                f.read_to_string(&mut s).unwrap();
                (f.name().to_string(), s, f.compression())
            })
            .collect()
    }

    fn part(bytes: &[u8], name: &str) -> String {
        entries(bytes)
            .into_iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, s, _)| s)
            .unwrap()
    }

    fn vars(pairs: &[(&str, &str)]) -> VariableMap {
        VariableMap::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn sample() -> Vec<u8> {
        docx(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            (
                "word/document.xml",
                &body(concat!(
                    "<w:p><w:r><w:t>{{title}}</w:t></w:r></w:p>",
                    "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>By {{au</w:t></w:r>",
                    "<w:r><w:rPr><w:i/></w:rPr><w:t>thor}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"
                )),
            ),
            ("word/header1.xml", "<w:hdr><w:p><w:r><w:t>{{title}} header</w:t></w:r></w:p></w:hdr>"),
            ("word/footer2.xml", "<w:ftr><w:p><w:r><w:t>Page {{page}}</w:t></w:r></w:p></w:ftr>"),
            ("word/styles.xml", "<w:styles>{{title}}</w:styles>"),
            ("word/media/image1.png", "PNGDATA"),
        ])
    }

    #[test]
    fn declared_part_size_is_capped_by_archive_size() {
        assert_eq!(capacity_hint(u64::MAX, 1024), 4096);
        assert_eq!(capacity_hint(100, 1024), 100);
        assert_eq!(capacity_hint(u64::from(u32::MAX), 0), 0);
    }

    #[test]
    fn finds_placeholders_in_body_tables_headers_and_footers() {
        let names: Vec<String> = DocxCodec::new()
            .placeholders(&sample())
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(names, vec!["author", "page", "title"]);
    }

    #[test]
    fn fills_every_text_part() {
        let filled = DocxCodec::new()
            .fill(
                &sample(),
                &vars(&[("title", "年度通知"), ("author", "默认作者"), ("page", "1")]),
                MissingPolicy::Keep,
            )
            .unwrap();

        let doc = part(&filled.bytes, "word/document.xml");
        assert!(doc.contains(">年度通知</w:t>"));
        assert!(doc.contains(">By 默认作者</w:t>"));
        assert!(doc.contains("<w:rPr><w:i/></w:rPr><w:t xml:space=\"preserve\"></w:t>"));
        assert!(part(&filled.bytes, "word/header1.xml").contains(">年度通知 header</w:t>"));
        assert!(part(&filled.bytes, "word/footer2.xml").contains(">Page 1</w:t>"));
        assert_eq!(filled.report.replaced, 4);
        assert!(filled.report.is_complete());
    }

    #[test]
    fn preserves_entry_order_compression_and_other_parts() {
        let original = sample();
        let filled = DocxCodec::new()
            .fill(&original, &vars(&[("title", "X")]), MissingPolicy::Keep)
            .unwrap();

        let before = entries(&original);
        let after = entries(&filled.bytes);
        assert_eq!(before.len(), after.len());
        for ((bn, bs, bm), (an, as_, am)) in before.iter().zip(&after) {
            assert_eq!(bn, an);
            assert_eq!(bm, am);
            if !is_text_part(bn) {
                assert_eq!(bs, as_, "{bn} changed");
            }
        }
        assert_eq!(part(&filled.bytes, "word/styles.xml"), "<w:styles>{{title}}</w:styles>");
    }

    #[test]
    fn document_without_tokens_is_unchanged() {
        let original = docx(&[("word/document.xml", &body("<w:p><w:r><w:t>plain</w:t></w:r></w:p>"))]);
        let filled = DocxCodec::new()
            .fill(&original, &vars(&[("x", "1")]), MissingPolicy::Empty)
            .unwrap();

        assert_eq!(entries(&original), entries(&filled.bytes));
        assert!(!filled.report.changed);
    }

    #[test]
    fn reports_unresolved_names() {
        let filled = DocxCodec::new()
            .fill(&sample(), &vars(&[("title", "X")]), MissingPolicy::Keep)
            .unwrap();

        let unresolved: Vec<&str> = filled.report.unresolved.iter().map(String::as_str).collect();
        assert_eq!(unresolved, vec!["author", "page"]);
        assert!(part(&filled.bytes, "word/footer2.xml").contains("{{page}}"));
    }

    #[test]
    fn rejects_non_zip_input() {
        let err = DocxCodec::new().placeholders(b"not a zip at all").unwrap_err();
        assert!(matches!(
            err,
            DocfillError::Application(ApplicationError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn rejects_zip_without_main_part() {
        let bytes = docx(&[("[Content_Types].xml", CONTENT_TYPES)]);
        let err = DocxCodec::new()
            .fill(&bytes, &VariableMap::new(), MissingPolicy::Keep)
            .unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn text_part_names() {
        assert!(is_text_part("word/document.xml"));
        assert!(is_text_part("word/header3.xml"));
        assert!(is_text_part("word/footnotes.xml"));
        assert!(!is_text_part("word/styles.xml"));
        assert!(!is_text_part("word/_rels/document.xml.rels"));
        assert!(!is_text_part("customXml/document.xml"));
    }

    #[test]
    fn generates_through_the_service_on_an_in_memory_library() {
        use std::path::{Path, PathBuf};

        use docfill_core::{
            application::{GenerateRequest, GenerateService},
            domain::{Template, TemplateContent, TemplateRegistry},
        };

        use crate::filesystem::MemoryFilesystem;

        let notice = Template::builder()
            .name("notice")
            .category("official")
            .defaults(vars(&[("author", "默认作者")]))
            .content(TemplateContent::File(PathBuf::from("lib/official/notice.docx")))
            .build()
            .unwrap();
        let fs = MemoryFilesystem::new().with_file("lib/official/notice.docx", sample());
        let service = GenerateService::new(
            Box::new(TemplateRegistry::from_templates([notice]).unwrap()),
            Box::new(DocxCodec::new()),
            Box::new(fs.clone()),
        );
        let request = GenerateRequest {
            template: "official/notice".into(),
            overrides: vec!["title=年度通知".into()],
            policy: MissingPolicy::Keep,
            ..Default::default()
        };

        let outcome = service
            .generate(request.clone(), Path::new("out/notice.docx"), false)
            .unwrap();
        assert_eq!(outcome.report.unresolved.iter().collect::<Vec<_>>(), ["page"]);

        let written = fs.read_file(Path::new("out/notice.docx")).unwrap();
        assert!(part(&written, "word/document.xml").contains(">By 默认作者</w:t>"));
        assert!(part(&written, "word/header1.xml").contains(">年度通知 header</w:t>"));

        // A second run without overwrite leaves the first output alone.
        assert!(
            service
                .generate(request, Path::new("out/notice.docx"), false)
                .is_err()
        );
        assert_eq!(
            fs.list_files(),
            vec![
                PathBuf::from("lib/official/notice.docx"),
                PathBuf::from("out/notice.docx"),
            ]
        );
    }
}
