//! End-to-end orchestrator tests.
//!
//! The external tools (pdf2svg, inkscape) are replaced by mock stage
//! implementations injected through the config builder — the same seam an
//! embedder with its own renderer would use. Input PDFs are synthesised
//! with lopdf in tempdirs, so the whole suite runs hermetically.

use async_trait::async_trait;
use pdf2ppt::{
    convert_to, ConversionConfig, PageExtractor, PageTranscoder, Pdf2PptError, ProgressEvent,
    ProgressSink, ProgressStatus, QualityWarning, SlideAssembler, StageOutcome, Workspace,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Build a minimal n-page PDF with Info metadata on disk.
fn write_sample_pdf(path: &Path, pages: usize, title: &str) {
    use lopdf::{dictionary, Document, Object};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 720.into(), 540.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal("Deck Author"),
    });
    doc.trailer.set("Info", info_id);

    doc.save(path).expect("save sample pdf");
}

/// Extractor mock: writes one SVG artifact per document page.
struct FakeExtractor {
    total_pages: usize,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PageExtractor for FakeExtractor {
    async fn extract(&self, _pdf: &Path, workspace: &Workspace) -> Result<(), Pdf2PptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for page in 1..=self.total_pages as u32 {
            std::fs::write(workspace.svg_path(page), format!("<svg>page {page}</svg>"))
                .map_err(|e| Pdf2PptError::ExtractionFailed {
                    detail: e.to_string(),
                })?;
        }
        Ok(())
    }
}

/// Transcoder mock: writes the EMF artifact, optionally warning or failing
/// on configured pages.
struct FakeTranscoder {
    warn_pages: Vec<u32>,
    fail_pages: Vec<u32>,
    calls: Arc<AtomicUsize>,
}

impl FakeTranscoder {
    fn clean(calls: &Arc<AtomicUsize>) -> Arc<Self> {
        Arc::new(Self {
            warn_pages: vec![],
            fail_pages: vec![],
            calls: Arc::clone(calls),
        })
    }
}

#[async_trait]
impl PageTranscoder for FakeTranscoder {
    async fn transcode(&self, _pdf: &Path, page: u32, workspace: &Workspace) -> StageOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pages.contains(&page) {
            return StageOutcome::failed(page, "simulated tool crash");
        }
        if std::fs::write(workspace.emf_path(page), format!("EMF-{page}")).is_err() {
            return StageOutcome::failed(page, "write failed");
        }
        if self.warn_pages.contains(&page) {
            StageOutcome::ok_with_warning(page, QualityWarning::TransparencyRisk)
        } else {
            StageOutcome::ok(page)
        }
    }
}

/// Assembler mock: records the selection order and writes a stub output.
struct RecordingAssembler {
    received: Arc<Mutex<Vec<u32>>>,
}

#[async_trait]
impl SlideAssembler for RecordingAssembler {
    async fn assemble(
        &self,
        _doc: &pdf2ppt::DocumentInfo,
        pages: &[u32],
        _workspace: &Workspace,
        output: &Path,
    ) -> Result<(), Pdf2PptError> {
        *self.received.lock().unwrap() = pages.to_vec();
        std::fs::write(output, b"stub").map_err(|e| Pdf2PptError::AssemblyFailed {
            detail: e.to_string(),
        })
    }
}

/// Sink that collects the whole event sequence.
struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct Scenario {
    _dir: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn scenario(pages: usize) -> Scenario {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.pdf");
    let output = dir.path().join("deck.pptx");
    write_sample_pdf(&input, pages, "Sample Deck");
    Scenario {
        _dir: dir,
        input,
        output,
    }
}

fn mocked_config(pages: usize) -> (ConversionConfig, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let extract_calls = Arc::new(AtomicUsize::new(0));
    let transcode_calls = Arc::new(AtomicUsize::new(0));
    let config = ConversionConfig::builder()
        .parallel(4)
        .extractor(Arc::new(FakeExtractor {
            total_pages: pages,
            calls: Arc::clone(&extract_calls),
        }))
        .transcoder(FakeTranscoder::clean(&transcode_calls))
        .build()
        .unwrap();
    (config, extract_calls, transcode_calls)
}

// ── Full-job scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn all_pages_convert_with_defaults() {
    let s = scenario(20);
    let (config, extract_calls, transcode_calls) = mocked_config(20);

    let result = convert_to(&s.input, &s.output, &config).await.unwrap();

    assert_eq!(result.pages_converted, 20);
    assert_eq!(result.total_pages, 20);
    assert!(result.warning_pages.is_empty());
    assert_eq!(result.output_path, s.output);
    assert!(s.output.exists());
    assert_eq!(result.metadata.title.as_deref(), Some("Sample Deck"));

    assert_eq!(extract_calls.load(Ordering::SeqCst), 1, "one whole-document call");
    assert_eq!(transcode_calls.load(Ordering::SeqCst), 20, "one call per page");

    // Successful job removes its workspace.
    assert!(!Workspace::dir_for(&s.input).exists());
}

#[tokio::test]
async fn page_subset_drives_assembly_in_selection_order() {
    let s = scenario(10);
    let received = Arc::new(Mutex::new(Vec::new()));
    let transcode_calls = Arc::new(AtomicUsize::new(0));

    let config = ConversionConfig::builder()
        .pages("1-3,8")
        .extractor(Arc::new(FakeExtractor {
            total_pages: 10,
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .transcoder(FakeTranscoder::clean(&transcode_calls))
        .assembler(Arc::new(RecordingAssembler {
            received: Arc::clone(&received),
        }))
        .build()
        .unwrap();

    let result = convert_to(&s.input, &s.output, &config).await.unwrap();

    assert_eq!(result.pages_converted, 4);
    assert_eq!(result.total_pages, 10);
    assert_eq!(*received.lock().unwrap(), vec![1, 2, 3, 8]);
    assert_eq!(transcode_calls.load(Ordering::SeqCst), 4, "only selected pages");
}

#[tokio::test]
async fn existing_output_without_overwrite_fails_before_any_stage() {
    let s = scenario(5);
    std::fs::write(&s.output, b"already here").unwrap();
    let (config, extract_calls, transcode_calls) = mocked_config(5);

    let err = convert_to(&s.input, &s.output, &config).await.unwrap_err();

    assert!(matches!(err, Pdf2PptError::OutputExists { .. }));
    assert_eq!(extract_calls.load(Ordering::SeqCst), 0);
    assert_eq!(transcode_calls.load(Ordering::SeqCst), 0);
    // Validation errors never touch the workspace.
    assert!(!Workspace::dir_for(&s.input).exists());
    // The pre-existing file is untouched.
    assert_eq!(std::fs::read(&s.output).unwrap(), b"already here");
}

#[tokio::test]
async fn overwrite_allows_replacing_output() {
    let s = scenario(3);
    std::fs::write(&s.output, b"old").unwrap();

    let (mut config, _, _) = mocked_config(3);
    config.overwrite = true;

    let result = convert_to(&s.input, &s.output, &config).await.unwrap();
    assert_eq!(result.pages_converted, 3);
    assert_ne!(std::fs::read(&s.output).unwrap(), b"old");
}

#[tokio::test]
async fn transparency_warning_is_collected_not_fatal() {
    let s = scenario(10);
    let config = ConversionConfig::builder()
        .extractor(Arc::new(FakeExtractor {
            total_pages: 10,
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .transcoder(Arc::new(FakeTranscoder {
            warn_pages: vec![5],
            fail_pages: vec![],
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .build()
        .unwrap();

    let result = convert_to(&s.input, &s.output, &config).await.unwrap();

    assert_eq!(result.pages_converted, 10);
    assert_eq!(result.warning_pages, vec![5]);
    assert!(s.output.exists());
}

#[tokio::test]
async fn hard_transcode_failure_is_stage_fatal_and_keeps_workspace() {
    let s = scenario(6);
    let config = ConversionConfig::builder()
        .extractor(Arc::new(FakeExtractor {
            total_pages: 6,
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .transcoder(Arc::new(FakeTranscoder {
            warn_pages: vec![],
            fail_pages: vec![3],
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .build()
        .unwrap();

    let err = convert_to(&s.input, &s.output, &config).await.unwrap_err();

    match err {
        Pdf2PptError::TranscodeFailed { page, ref detail } => {
            assert_eq!(page, 3);
            assert!(detail.contains("simulated tool crash"));
        }
        other => panic!("expected TranscodeFailed, got {other:?}"),
    }

    assert!(!s.output.exists(), "no output on failure");
    assert!(
        Workspace::dir_for(&s.input).exists(),
        "workspace kept for postmortem"
    );

    // Re-running after the fault clears succeeds without manual cleanup:
    // the retained workspace is re-acquired idempotently.
    let (config, _, _) = mocked_config(6);
    let result = convert_to(&s.input, &s.output, &config).await.unwrap();
    assert_eq!(result.pages_converted, 6);
    assert!(!Workspace::dir_for(&s.input).exists());
}

#[tokio::test]
async fn keep_artifacts_retains_workspace_on_success() {
    let s = scenario(2);
    let (mut config, _, _) = mocked_config(2);
    config.keep_artifacts = true;

    convert_to(&s.input, &s.output, &config).await.unwrap();

    let ws = Workspace::dir_for(&s.input);
    assert!(ws.exists());
    assert!(ws.join("page-1.svg").exists());
    assert!(ws.join("page-1.emf").exists());
}

// ── Progress-event sequence ──────────────────────────────────────────────────

#[tokio::test]
async fn progress_events_are_monotonic_with_terminal_success() {
    let s = scenario(8);
    let sink = Arc::new(CollectingSink {
        events: Mutex::new(vec![]),
    });

    let (mut config, _, _) = mocked_config(8);
    config.progress_sink = Some(Arc::clone(&sink) as Arc<dyn ProgressSink>);

    convert_to(&s.input, &s.output, &config).await.unwrap();

    let events = sink.events.lock().unwrap();
    assert!(events.len() >= 5, "expected checkpoints for every stage");

    let first = events.first().unwrap();
    assert_eq!(first.percent, 0);
    assert_eq!(first.status, ProgressStatus::Processing);

    let mut prev = 0u8;
    for event in events.iter() {
        assert!(event.percent >= prev, "percent went backwards");
        prev = event.percent;
    }

    let last = events.last().unwrap();
    assert_eq!(last.status, ProgressStatus::Completed);
    assert_eq!(last.percent, 100);
    assert_eq!(last.output_file.as_deref(), Some(s.output.as_path()));
}

#[tokio::test]
async fn progress_terminal_error_names_the_cause() {
    let s = scenario(4);
    std::fs::write(&s.output, b"existing").unwrap();

    let sink = Arc::new(CollectingSink {
        events: Mutex::new(vec![]),
    });
    let (mut config, _, _) = mocked_config(4);
    config.progress_sink = Some(Arc::clone(&sink) as Arc<dyn ProgressSink>);

    let _ = convert_to(&s.input, &s.output, &config).await.unwrap_err();

    let events = sink.events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.status, ProgressStatus::Error);
    assert!(last.error.as_deref().unwrap().contains("Output file exists"));
}

// ── Real assembler end-to-end ────────────────────────────────────────────────

#[tokio::test]
async fn produced_package_carries_pages_in_selection_order() {
    use std::io::Read;

    let s = scenario(10);
    let config = ConversionConfig::builder()
        .pages("2,1")
        .extractor(Arc::new(FakeExtractor {
            total_pages: 10,
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .transcoder(FakeTranscoder::clean(&Arc::new(AtomicUsize::new(0))))
        .build()
        .unwrap();

    let result = convert_to(&s.input, &s.output, &config).await.unwrap();
    assert_eq!(result.pages_converted, 2);

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&s.output).unwrap()).unwrap();

    // Slide 1 is page 2, slide 2 is page 1 — selection order, not document order.
    let mut first = String::new();
    archive
        .by_name("ppt/media/image1.emf")
        .unwrap()
        .read_to_string(&mut first)
        .unwrap();
    assert_eq!(first, "EMF-2");

    let mut second = String::new();
    archive
        .by_name("ppt/media/image2.emf")
        .unwrap()
        .read_to_string(&mut second)
        .unwrap();
    assert_eq!(second, "EMF-1");

    // Metadata is cloned from the source document.
    let mut core = String::new();
    archive
        .by_name("docProps/core.xml")
        .unwrap()
        .read_to_string(&mut core)
        .unwrap();
    assert!(core.contains("Sample Deck"));
}

// ── Streaming surface ────────────────────────────────────────────────────────

#[tokio::test]
async fn stream_surface_relays_the_same_sequence() {
    use tokio_stream::StreamExt;

    let s = scenario(5);
    let (config, _, _) = mocked_config(5);

    let mut stream = pdf2ppt::convert_stream_to(s.input.clone(), s.output.clone(), &config);

    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }

    assert!(!events.is_empty());
    let last = events.last().unwrap();
    assert_eq!(last.status, ProgressStatus::Completed);
    assert_eq!(last.output_file.as_deref(), Some(s.output.as_path()));
    assert!(s.output.exists());
}

// ── Report surface ───────────────────────────────────────────────────────────

#[tokio::test]
async fn job_report_matches_the_tool_result_shape() {
    let s = scenario(10);
    let config = ConversionConfig::builder()
        .pages("1-4")
        .extractor(Arc::new(FakeExtractor {
            total_pages: 10,
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .transcoder(Arc::new(FakeTranscoder {
            warn_pages: vec![3],
            fail_pages: vec![],
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .build()
        .unwrap();

    let result = convert_to(&s.input, &s.output, &config).await.unwrap();
    let report = pdf2ppt::JobReport::success(&result);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["status"], "success");
    assert_eq!(json["pages_converted"], 4);
    assert_eq!(json["total_pages"], 10);
    assert_eq!(json["warning_pages"][0], 3);
    assert!(json["warning"]
        .as_str()
        .unwrap()
        .contains("transparency issues"));
}
