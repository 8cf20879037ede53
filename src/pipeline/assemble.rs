//! Stage 3: presentation-container assembly.
//!
//! One pass per job: reads the source document's per-page geometry and
//! metadata plus the workspace's EMF artifacts — in selection order — and
//! writes the final `.pptx` package. Slide order in the output is exactly
//! the page-selection order, which may reorder or subset the source.
//!
//! The package is written to a temp file next to the target and renamed
//! into place, so a failed assembly never leaves a partial output.
//!
//! ## Package layout
//!
//! A `.pptx` is a zip of OOXML parts. The writer emits the minimal set
//! PowerPoint accepts: content types, package relationships, core/app
//! properties (core cloned from the PDF Info dictionary), the presentation
//! part with the slide list and slide size (taken from the first selected
//! page, points → EMU), one blank master/layout/theme, and per selected
//! page a slide with a single full-bleed EMF picture.

use crate::error::Pdf2PptError;
use crate::output::DocumentMetadata;
use crate::pipeline::probe::DocumentInfo;
use crate::workspace::Workspace;
use async_trait::async_trait;
use quick_xml::escape::escape;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// English Metric Units per PDF point (1 pt = 1/72 in, 914400 EMU/in).
const EMU_PER_POINT: f64 = 12700.0;

/// Assembly contract: write the output container from workspace artifacts.
///
/// Inject a custom implementation through
/// [`crate::config::ConversionConfigBuilder::assembler`].
#[async_trait]
pub trait SlideAssembler: Send + Sync {
    /// Write the presentation at `output`, one slide per entry of `pages`,
    /// in that exact order.
    async fn assemble(
        &self,
        doc: &DocumentInfo,
        pages: &[u32],
        workspace: &Workspace,
        output: &Path,
    ) -> Result<(), Pdf2PptError>;
}

/// Default assembler: builds the OOXML package directly.
pub struct PptxAssembler;

#[async_trait]
impl SlideAssembler for PptxAssembler {
    async fn assemble(
        &self,
        doc: &DocumentInfo,
        pages: &[u32],
        workspace: &Workspace,
        output: &Path,
    ) -> Result<(), Pdf2PptError> {
        info!("Assembling {} slides into '{}'", pages.len(), output.display());

        let doc = doc.clone();
        let pages = pages.to_vec();
        let workspace = workspace.clone();
        let output = output.to_path_buf();

        tokio::task::spawn_blocking(move || write_package(&doc, &pages, &workspace, &output))
            .await
            .map_err(|e| Pdf2PptError::Internal(format!("assembly task panicked: {e}")))?
    }
}

fn write_package(
    doc: &DocumentInfo,
    pages: &[u32],
    workspace: &Workspace,
    output: &Path,
) -> Result<(), Pdf2PptError> {
    if pages.is_empty() {
        return Err(Pdf2PptError::AssemblyFailed {
            detail: "page selection is empty".to_string(),
        });
    }

    // Slide size from the first selected page; pictures are placed
    // full-bleed at this extent.
    let (width_pt, height_pt) = doc.page_size(pages[0]);
    let cx = pt_to_emu(width_pt);
    let cy = pt_to_emu(height_pt);

    // Temp file in the target directory so the final rename stays on one
    // filesystem.
    let tmp_path = output.with_extension("pptx.tmp");
    let file = std::fs::File::create(&tmp_path).map_err(|e| Pdf2PptError::AssemblyFailed {
        detail: format!("cannot create '{}': {e}", tmp_path.display()),
    })?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let result = (|| -> Result<(), Pdf2PptError> {
        let mut part = |name: &str, content: &str| -> Result<(), Pdf2PptError> {
            zip.start_file(name, options).map_err(zip_err)?;
            zip.write_all(content.as_bytes()).map_err(io_err)?;
            Ok(())
        };

        part("[Content_Types].xml", &content_types_xml(pages.len()))?;
        part("_rels/.rels", PACKAGE_RELS)?;
        part("docProps/core.xml", &core_properties_xml(&doc.metadata))?;
        part("docProps/app.xml", &app_properties_xml(pages.len()))?;
        part("ppt/presentation.xml", &presentation_xml(pages.len(), cx, cy))?;
        part("ppt/_rels/presentation.xml.rels", &presentation_rels_xml(pages.len()))?;
        part("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER)?;
        part("ppt/slideMasters/_rels/slideMaster1.xml.rels", SLIDE_MASTER_RELS)?;
        part("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT)?;
        part("ppt/slideLayouts/_rels/slideLayout1.xml.rels", SLIDE_LAYOUT_RELS)?;
        part("ppt/theme/theme1.xml", THEME)?;

        for (idx, &page) in pages.iter().enumerate() {
            let slide_no = idx + 1;

            let emf_path = workspace.emf_path(page);
            let emf = std::fs::read(&emf_path).map_err(|e| Pdf2PptError::AssemblyFailed {
                detail: format!(
                    "missing transcoded artifact for page {page} ('{}'): {e}",
                    emf_path.display()
                ),
            })?;

            zip.start_file(format!("ppt/media/image{slide_no}.emf"), options)
                .map_err(zip_err)?;
            zip.write_all(&emf).map_err(io_err)?;

            zip.start_file(format!("ppt/slides/slide{slide_no}.xml"), options)
                .map_err(zip_err)?;
            zip.write_all(slide_xml(page, cx, cy).as_bytes())
                .map_err(io_err)?;

            zip.start_file(format!("ppt/slides/_rels/slide{slide_no}.xml.rels"), options)
                .map_err(zip_err)?;
            zip.write_all(slide_rels_xml(slide_no).as_bytes())
                .map_err(io_err)?;
        }

        zip.finish().map_err(zip_err)?;
        Ok(())
    })();

    if let Err(e) = result {
        // Never leave a partial container behind.
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, output).map_err(|e| Pdf2PptError::AssemblyFailed {
        detail: format!("cannot move package into place at '{}': {e}", output.display()),
    })?;

    debug!("Package written: {}", output.display());
    Ok(())
}

fn zip_err(e: zip::result::ZipError) -> Pdf2PptError {
    Pdf2PptError::AssemblyFailed {
        detail: format!("zip: {e}"),
    }
}

fn io_err(e: std::io::Error) -> Pdf2PptError {
    Pdf2PptError::AssemblyFailed {
        detail: format!("write: {e}"),
    }
}

fn pt_to_emu(pt: f64) -> i64 {
    (pt * EMU_PER_POINT).round() as i64
}

/// Derive the default output path from the input: same stem, `.pptx`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("pptx")
}

// ── Part templates ───────────────────────────────────────────────────────

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

fn content_types_xml(slides: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Default Extension=\"emf\" ContentType=\"image/x-emf\"/>\
         <Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
         <Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
         <Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
         <Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
         <Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
         <Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>",
    );
    for n in 1..=slides {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
        ));
    }
    xml.push_str("</Types>");
    xml
}

const PACKAGE_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"ppt/presentation.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
<Relationship Id=\"rId3\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties\" Target=\"docProps/app.xml\"/>\
</Relationships>";

/// Core properties, cloning the source document's Info dictionary.
fn core_properties_xml(meta: &DocumentMetadata) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        "<cp:coreProperties \
         xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
         xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
         xmlns:dcterms=\"http://purl.org/dc/terms/\" \
         xmlns:dcmitype=\"http://purl.org/dc/dcmitype/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
    );
    if let Some(ref title) = meta.title {
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape(title)));
    }
    if let Some(ref author) = meta.author {
        xml.push_str(&format!("<dc:creator>{}</dc:creator>", escape(author)));
    }
    if let Some(ref subject) = meta.subject {
        xml.push_str(&format!("<dc:subject>{}</dc:subject>", escape(subject)));
    }
    if let Some(ref keywords) = meta.keywords {
        xml.push_str(&format!("<cp:keywords>{}</cp:keywords>", escape(keywords)));
    }
    xml.push_str("</cp:coreProperties>");
    xml
}

fn app_properties_xml(slides: usize) -> String {
    format!(
        "{XML_DECL}<Properties \
         xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" \
         xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">\
         <Application>pdf2ppt</Application>\
         <Slides>{slides}</Slides>\
         </Properties>"
    )
}

const NS_TRIPLE: &str = "xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"";

fn presentation_xml(slides: usize, cx: i64, cy: i64) -> String {
    let mut xml = format!(
        "{XML_DECL}<p:presentation {NS_TRIPLE}>\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
         <p:sldIdLst>"
    );
    for n in 1..=slides {
        // rId1 is the master; slides start at rId2.
        xml.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
            255 + n,
            n + 1
        ));
    }
    xml.push_str(&format!(
        "</p:sldIdLst>\
         <p:sldSz cx=\"{cx}\" cy=\"{cy}\"/>\
         <p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
         </p:presentation>"
    ));
    xml
}

fn presentation_rels_xml(slides: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>",
    );
    for n in 1..=slides {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{n}.xml\"/>",
            n + 1
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn slide_xml(page: u32, cx: i64, cy: i64) -> String {
    format!(
        "{XML_DECL}<p:sld {NS_TRIPLE}>\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>\
         <p:pic>\
         <p:nvPicPr><p:cNvPr id=\"2\" name=\"Page {page}\"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>\
         <p:blipFill><a:blip r:embed=\"rId1\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
         <p:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr>\
         </p:pic>\
         </p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
         </p:sld>"
    )
}

fn slide_rels_xml(slide_no: usize) -> String {
    format!(
        "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"../media/image{slide_no}.emf\"/>\
         <Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>\
         </Relationships>"
    )
}

const SLIDE_MASTER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<p:sldMaster xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
<p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val=\"FFFFFF\"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>\
<p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>\
<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\
<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
</p:sldMaster>";

const SLIDE_MASTER_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme\" Target=\"../theme/theme1.xml\"/>\
</Relationships>";

const SLIDE_LAYOUT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<p:sldLayout xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" type=\"blank\">\
<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
</p:sldLayout>";

const SLIDE_LAYOUT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"../slideMasters/slideMaster1.xml\"/>\
</Relationships>";

const THEME: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"pdf2ppt\">\
<a:themeElements>\
<a:clrScheme name=\"pdf2ppt\">\
<a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
<a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
<a:dk2><a:srgbClr val=\"44546A\"/></a:dk2>\
<a:lt2><a:srgbClr val=\"E7E6E6\"/></a:lt2>\
<a:accent1><a:srgbClr val=\"4472C4\"/></a:accent1>\
<a:accent2><a:srgbClr val=\"ED7D31\"/></a:accent2>\
<a:accent3><a:srgbClr val=\"A5A5A5\"/></a:accent3>\
<a:accent4><a:srgbClr val=\"FFC000\"/></a:accent4>\
<a:accent5><a:srgbClr val=\"5B9BD5\"/></a:accent5>\
<a:accent6><a:srgbClr val=\"70AD47\"/></a:accent6>\
<a:hlink><a:srgbClr val=\"0563C1\"/></a:hlink>\
<a:folHlink><a:srgbClr val=\"954F72\"/></a:folHlink>\
</a:clrScheme>\
<a:fontScheme name=\"pdf2ppt\">\
<a:majorFont><a:latin typeface=\"Calibri Light\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
</a:fontScheme>\
<a:fmtScheme name=\"pdf2ppt\">\
<a:fillStyleLst>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
</a:fillStyleLst>\
<a:lnStyleLst>\
<a:ln w=\"6350\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
<a:ln w=\"12700\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
<a:ln w=\"19050\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
</a:lnStyleLst>\
<a:effectStyleLst>\
<a:effectStyle><a:effectLst/></a:effectStyle>\
<a:effectStyle><a:effectLst/></a:effectStyle>\
<a:effectStyle><a:effectLst/></a:effectStyle>\
</a:effectStyleLst>\
<a:bgFillStyleLst>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
</a:bgFillStyleLst>\
</a:fmtScheme>\
</a:themeElements>\
</a:theme>";
