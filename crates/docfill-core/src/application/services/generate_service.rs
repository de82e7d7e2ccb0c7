//! Generate Service - main application orchestrator.
//!
//! This service coordinates the whole generation workflow:
//! 1. Parse command-line overrides (before any file I/O)
//! 2. Look the template up and read its document
//! 3. Resolve the variable layers into one mapping
//! 4. Fill the document and write it atomically
//!
//! Planning and execution are split so a caller can inspect the plan
//! (dry run) or add values for placeholders that are still missing
//! (interactive prompting) before anything is written.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{DocumentCodec, Filesystem, TemplateStore},
        services::load_document,
    },
    domain::{
        MissingPolicy, SubstitutionReport, Template, VariableMap, parse_overrides, resolve_layers,
    },
    error::DocfillResult,
};

/// Everything needed to fill one template.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Template id, bare name, or a name the store understands.
    pub template: String,
    /// Raw `key=value` strings from the command line.
    pub overrides: Vec<String>,
    /// Values from a `--vars` file.
    pub variables_file: VariableMap,
    /// Built-in values (`DATE`, `YEAR`); the lowest layer.
    pub builtins: VariableMap,
    pub policy: MissingPolicy,
}

/// A resolved but not yet written generation.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub template: Template,
    pub variables: VariableMap,
    /// Placeholder names found in the template document.
    pub placeholders: BTreeSet<String>,
    pub policy: MissingPolicy,
    document: Vec<u8>,
}

impl GenerationPlan {
    /// Placeholders without a resolved value, sorted.
    pub fn missing(&self) -> Vec<&str> {
        self.placeholders
            .iter()
            .map(String::as_str)
            .filter(|name| !self.variables.contains(name))
            .collect()
    }

    /// Add or replace one resolved value (e.g. answered at a prompt).
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) -> DocfillResult<()> {
        self.variables.insert(name, value)?;
        Ok(())
    }
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub template_id: String,
    pub output: PathBuf,
    pub report: SubstitutionReport,
}

/// Main generation service.
pub struct GenerateService {
    store: Box<dyn TemplateStore>,
    codec: Box<dyn DocumentCodec>,
    filesystem: Box<dyn Filesystem>,
}

impl GenerateService {
    /// Create a new generate service with the given adapters.
    pub fn new(
        store: Box<dyn TemplateStore>,
        codec: Box<dyn DocumentCodec>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            store,
            codec,
            filesystem,
        }
    }

    /// Resolve a request into a [`GenerationPlan`] without writing anything.
    ///
    /// Overrides are parsed first; a malformed one fails the request before
    /// the template library or any document is touched.
    #[instrument(skip_all, fields(template = %request.template))]
    pub fn plan(&self, request: GenerateRequest) -> DocfillResult<GenerationPlan> {
        let overrides = parse_overrides(&request.overrides)?;
        debug!(count = overrides.len(), "Overrides parsed");

        let template = self.store.get(&request.template)?;
        info!(id = %template.id(), source = %template.content(), "Template resolved");

        let document = load_document(self.filesystem.as_ref(), &template)?;
        let placeholders = self.codec.placeholders(&document)?;

        let variables = resolve_layers([
            &request.builtins,
            template.defaults(),
            &request.variables_file,
            &overrides,
        ]);
        debug!(
            placeholders = placeholders.len(),
            variables = variables.len(),
            "Variables resolved"
        );

        Ok(GenerationPlan {
            template,
            variables,
            placeholders,
            policy: request.policy,
            document,
        })
    }

    /// Fill the plan's document and write it to `output`.
    ///
    /// The document is produced fully in memory before the atomic write,
    /// so a failure at any step leaves no partial file behind.
    #[instrument(skip_all, fields(template = %plan.template.id(), output = %output.display()))]
    pub fn execute(
        &self,
        plan: &GenerationPlan,
        output: &Path,
        overwrite: bool,
    ) -> DocfillResult<GenerateOutcome> {
        if !overwrite && self.filesystem.exists(output) {
            return Err(ApplicationError::OutputExists {
                path: output.to_path_buf(),
            }
            .into());
        }

        let filled = self
            .codec
            .fill(&plan.document, &plan.variables, plan.policy)?;

        self.filesystem.write_atomic(output, &filled.bytes)?;

        if !filled.report.unresolved.is_empty() {
            warn!(
                unresolved = ?filled.report.unresolved,
                policy = %plan.policy,
                "Some placeholders had no value"
            );
        }
        info!(replaced = filled.report.replaced, "Document written");

        Ok(GenerateOutcome {
            template_id: plan.template.id(),
            output: output.to_path_buf(),
            report: filled.report,
        })
    }

    /// Plan and execute in one step.
    pub fn generate(
        &self,
        request: GenerateRequest,
        output: &Path,
        overwrite: bool,
    ) -> DocfillResult<GenerateOutcome> {
        let plan = self.plan(request)?;
        self.execute(&plan, output, overwrite)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        application::{
            FilledDocument,
            ports::output::{MockDocumentCodec, MockFilesystem, MockTemplateStore},
        },
        domain::{
            DomainError, TemplateContent, TemplateRegistry, placeholders, render_text,
        },
        error::DocfillError,
    };

    /// Treats the document bytes as one UTF-8 run.
    struct PlainTextCodec;

    impl DocumentCodec for PlainTextCodec {
        fn placeholders(&self, document: &[u8]) -> DocfillResult<BTreeSet<String>> {
            Ok(placeholders(&[String::from_utf8_lossy(document)]))
        }

        fn fill(
            &self,
            document: &[u8],
            variables: &VariableMap,
            policy: MissingPolicy,
        ) -> DocfillResult<FilledDocument> {
            let (text, report) = render_text(&String::from_utf8_lossy(document), variables, policy);
            Ok(FilledDocument {
                bytes: text.into_bytes(),
                report,
            })
        }
    }

    /// Records the last write.
    #[derive(Clone, Default)]
    struct RecordingFs {
        written: Arc<Mutex<Option<(PathBuf, Vec<u8>)>>>,
        existing: Vec<PathBuf>,
    }

    impl Filesystem for RecordingFs {
        fn read(&self, path: &Path) -> DocfillResult<Vec<u8>> {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "not readable in tests".into(),
            }
            .into())
        }

        fn exists(&self, path: &Path) -> bool {
            self.existing.iter().any(|p| p == path)
        }

        fn write_atomic(&self, path: &Path, bytes: &[u8]) -> DocfillResult<()> {
            *self.written.lock().unwrap() = Some((path.to_path_buf(), bytes.to_vec()));
            Ok(())
        }
    }

    fn notice() -> Template {
        Template::builder()
            .name("notice")
            .category("official")
            .defaults(
                VariableMap::from_pairs([("title", "默认标题"), ("author", "默认作者")]).unwrap(),
            )
            .content(TemplateContent::Inline(Arc::from(
                "{{title}} / {{author}} / {{date}}".as_bytes(),
            )))
            .build()
            .unwrap()
    }

    fn service(fs: RecordingFs) -> GenerateService {
        let registry = TemplateRegistry::from_templates([notice()]).unwrap();
        GenerateService::new(Box::new(registry), Box::new(PlainTextCodec), Box::new(fs))
    }

    fn written(fs: &RecordingFs) -> String {
        let guard = fs.written.lock().unwrap();
        let (_, bytes) = guard.as_ref().expect("nothing written");
        String::from_utf8(bytes.clone()).unwrap()
    }

    #[test]
    fn override_beats_template_default() {
        let fs = RecordingFs::default();
        let svc = service(fs.clone());

        let outcome = svc
            .generate(
                GenerateRequest {
                    template: "notice".into(),
                    overrides: vec!["title=年度通知".into()],
                    ..Default::default()
                },
                Path::new("out.docx"),
                false,
            )
            .unwrap();

        assert_eq!(written(&fs), "年度通知 / 默认作者 / {{date}}");
        assert_eq!(outcome.template_id, "official/notice");
        assert_eq!(outcome.report.replaced, 2);
        assert!(outcome.report.unresolved.contains("date"));
    }

    #[test]
    fn layers_apply_in_order() {
        let fs = RecordingFs::default();
        let svc = service(fs.clone());

        svc.generate(
            GenerateRequest {
                template: "official/notice".into(),
                overrides: vec!["author=cli".into()],
                variables_file: VariableMap::from_pairs([("author", "file"), ("date", "file")])
                    .unwrap(),
                builtins: VariableMap::from_pairs([("date", "builtin"), ("title", "builtin")])
                    .unwrap(),
                policy: MissingPolicy::Keep,
            },
            Path::new("out.docx"),
            false,
        )
        .unwrap();

        assert_eq!(written(&fs), "默认标题 / cli / file");
    }

    #[test]
    fn empty_policy_blanks_missing() {
        let fs = RecordingFs::default();
        let svc = service(fs.clone());

        svc.generate(
            GenerateRequest {
                template: "notice".into(),
                policy: MissingPolicy::Empty,
                ..Default::default()
            },
            Path::new("out.docx"),
            false,
        )
        .unwrap();

        assert_eq!(written(&fs), "默认标题 / 默认作者 / ");
    }

    #[test]
    fn plan_reports_missing_and_accepts_answers() {
        let fs = RecordingFs::default();
        let svc = service(fs.clone());

        let mut plan = svc
            .plan(GenerateRequest {
                template: "notice".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(plan.missing(), vec!["date"]);

        plan.set_variable("date", "2026-10-14").unwrap();
        assert!(plan.missing().is_empty());

        svc.execute(&plan, Path::new("out.docx"), false).unwrap();
        assert_eq!(written(&fs), "默认标题 / 默认作者 / 2026-10-14");
    }

    #[test]
    fn existing_output_requires_overwrite() {
        let fs = RecordingFs {
            existing: vec![PathBuf::from("out.docx")],
            ..Default::default()
        };
        let svc = service(fs.clone());
        let request = GenerateRequest {
            template: "notice".into(),
            ..Default::default()
        };

        let err = svc
            .generate(request.clone(), Path::new("out.docx"), false)
            .unwrap_err();
        assert!(matches!(
            err,
            DocfillError::Application(ApplicationError::OutputExists { .. })
        ));
        assert!(fs.written.lock().unwrap().is_none());

        svc.generate(request, Path::new("out.docx"), true).unwrap();
        assert!(fs.written.lock().unwrap().is_some());
    }

    #[test]
    fn malformed_override_aborts_before_any_io() {
        let mut store = MockTemplateStore::new();
        store.expect_get().never();
        let mut codec = MockDocumentCodec::new();
        codec.expect_placeholders().never();
        codec.expect_fill().never();
        let mut fs = MockFilesystem::new();
        fs.expect_read().never();
        fs.expect_exists().never();
        fs.expect_write_atomic().never();

        let svc = GenerateService::new(Box::new(store), Box::new(codec), Box::new(fs));
        let err = svc
            .generate(
                GenerateRequest {
                    template: "notice".into(),
                    overrides: vec!["title=ok".into(), "novalue".into()],
                    ..Default::default()
                },
                Path::new("out.docx"),
                false,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            DocfillError::Domain(DomainError::MalformedOverride { .. })
        ));
    }

    #[test]
    fn unknown_template_is_not_found() {
        let svc = service(RecordingFs::default());
        let err = svc
            .plan(GenerateRequest {
                template: "invoice".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DocfillError::Domain(DomainError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn codec_failure_writes_nothing() {
        let mut codec = MockDocumentCodec::new();
        codec
            .expect_placeholders()
            .returning(|_| Ok(BTreeSet::new()));
        codec.expect_fill().returning(|_, _, _| {
            Err(ApplicationError::InvalidDocument {
                reason: "not a zip archive".into(),
            }
            .into())
        });

        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);
        fs.expect_write_atomic().never();

        let registry = TemplateRegistry::from_templates([notice()]).unwrap();
        let svc = GenerateService::new(Box::new(registry), Box::new(codec), Box::new(fs));

        let result = svc.generate(
            GenerateRequest {
                template: "notice".into(),
                ..Default::default()
            },
            Path::new("out.docx"),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn file_templates_are_read_through_the_filesystem_port() {
        let template = Template::builder()
            .name("letter")
            .content(TemplateContent::File(PathBuf::from("lib/letter.docx")))
            .build()
            .unwrap();

        let mut store = MockTemplateStore::new();
        store
            .expect_get()
            .withf(|name| name == "letter")
            .return_once(move |_| Ok(template));

        let mut fs = MockFilesystem::new();
        fs.expect_read()
            .withf(|p| p == Path::new("lib/letter.docx"))
            .returning(|_| Ok(b"Dear {{name}}".to_vec()));

        let svc = GenerateService::new(Box::new(store), Box::new(PlainTextCodec), Box::new(fs));
        let plan = svc
            .plan(GenerateRequest {
                template: "letter".into(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(plan.missing(), vec!["name"]);
    }
}
