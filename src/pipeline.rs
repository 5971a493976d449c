//! The export run: workbook in, portal files out.

use crate::assets::{copy_manifest, jpeg_data_uri, ManifestCopy};
use crate::changes::{fingerprint, format_timestamp, RecordSet, UpdateState};
use crate::error::{Error, Result};
use crate::export::{export_etalons, export_materiels, tally_by, ETALONS_SHEET, MATERIELS_SHEET};
use crate::forms::{scan_forms, FORMS_URL_PREFIX};
use crate::model::{FormDescriptor, SOURCE_CATEGORY};
use crate::options::{
    ExportOptions, LABEL_NOT_OK_IMAGE, LABEL_OK_IMAGE, MANIFEST_FILE, PAGE_FILE, WORKER_FILE,
};
use crate::render::{
    inject_sources, render_page, render_worker, PageData, Template, WorkerVersion, SW_VERSION,
};
use crate::xlsx::Workbook;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

/// Outcome of one tracked record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetReport {
    /// Number of exported items
    pub count: usize,
    /// Whether the content differs from the previous run
    pub changed: bool,
    /// Timestamp shown on the page
    pub last_changed: String,
    /// Current fingerprint
    pub fingerprint: String,
}

/// Summary of an export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Run timestamp, `DD/MM/YYYY HH:MM`
    pub timestamp: String,
    pub etalons: SetReport,
    pub materiels: SetReport,
    pub constats: SetReport,
    /// Standards per category, most frequent first
    pub categories: Vec<(String, usize)>,
    /// Equipment per site, most frequent first
    pub sites: Vec<(String, usize)>,
    /// Discovered form fragments
    pub forms: Vec<FormDescriptor>,
    /// Source-category standards
    pub sources: usize,
    /// Fragments that received the source list
    pub injected: usize,
    /// Which label images were embedded (conforming, non-conforming)
    pub labels: (bool, bool),
    /// Service worker cache version
    pub worker_version: String,
    /// Written page
    pub page: PathBuf,
    /// Written service worker, if its template was available
    pub worker: Option<PathBuf>,
    pub manifest: ManifestCopy,
    /// Non-fatal problems met during the run
    pub warnings: Vec<String>,
}

impl ExportReport {
    /// Report of one record set.
    pub fn set(&self, set: RecordSet) -> &SetReport {
        match set {
            RecordSet::Etalons => &self.etalons,
            RecordSet::Materiels => &self.materiels,
            RecordSet::Constats => &self.constats,
        }
    }
}

/// Export the workbook and regenerate the portal.
///
/// Fails before writing anything when the workbook or the page template is
/// missing. Later problems with optional inputs are logged and collected in
/// [`ExportReport::warnings`].
pub fn run_export(options: &ExportOptions) -> Result<ExportReport> {
    if !options.workbook.is_file() {
        return Err(Error::MissingInput(options.workbook.clone()));
    }
    let page_template = options.page_template();
    if !page_template.is_file() {
        return Err(Error::MissingTemplate(page_template));
    }
    fs::create_dir_all(&options.output_dir)?;

    let mut warnings = Vec::new();
    let state_path = options.state_path();
    let mut state = UpdateState::load(&state_path);
    let now = options.now.unwrap_or_else(|| Local::now().naive_local());
    let today = now.date();
    let timestamp = format_timestamp(&now);

    // Records
    let workbook = Workbook::open(&options.workbook)?;
    tracing::info!(workbook = %options.workbook.display(), format = %workbook.format(), "workbook opened");
    for sheet in [ETALONS_SHEET, MATERIELS_SHEET] {
        if !workbook.has_sheet(sheet) {
            warnings.push(format!("sheet '{}' not found", sheet));
        }
    }

    let etalons = export_etalons(&workbook, &options.categories, today)?;
    let etalons_report = track(&mut state, RecordSet::Etalons, &etalons, etalons.len(), &now)?;

    let materiels = export_materiels(&workbook, today)?;
    let materiels_report = track(&mut state, RecordSet::Materiels, &materiels, materiels.len(), &now)?;

    // Forms
    let forms_dir = options.forms_path();
    let mut forms = scan_forms(&forms_dir, options.metadata_window)?;
    rebase_urls(&mut forms, &options.forms_dir);
    if forms.is_empty() {
        warnings.push(format!("no form in {}", forms_dir.display()));
    }
    let constats_report = track(&mut state, RecordSet::Constats, &forms, forms.len(), &now)?;

    // Page
    let label_ok = load_label(options, LABEL_OK_IMAGE, &mut warnings);
    let label_not_ok = load_label(options, LABEL_NOT_OK_IMAGE, &mut warnings);

    let template = Template::new(fs::read_to_string(&page_template)?);
    let data = PageData {
        etalons: &etalons,
        materiels: &materiels,
        forms: &forms,
        categories: &options.categories,
        date_etalons: &etalons_report.last_changed,
        date_materiels: &materiels_report.last_changed,
        date_constats: &constats_report.last_changed,
        label_ok: &label_ok,
        label_not_ok: &label_not_ok,
    };
    let page = options.output(PAGE_FILE);
    let html = render_page(&template, &data)?;
    fs::write(&page, &html)?;
    tracing::info!(file = %page.display(), bytes = html.len(), "page written");

    // Fragments
    let injected = inject_sources(&forms_dir, &etalons)?;
    let sources = etalons.iter().filter(|e| e.is_category(SOURCE_CATEGORY)).count();
    if injected > 0 {
        tracing::info!(sources, fragments = injected, "sources injected");
    }

    // Service worker
    let worker_version = WorkerVersion {
        etalons: &etalons_report.fingerprint,
        materiels: &materiels_report.fingerprint,
        constats: &constats_report.fingerprint,
        timestamp: &timestamp,
    }
    .version()?;
    let worker = write_worker(options, &worker_version, &forms, &mut warnings)?;

    let manifest = copy_manifest(&options.asset(MANIFEST_FILE), &options.output(MANIFEST_FILE))?;
    tracing::debug!(?manifest, "manifest");

    state.save(&state_path)?;

    Ok(ExportReport {
        timestamp,
        categories: tally_by(&etalons, |e| e.category.as_str()),
        sites: tally_by(&materiels, |m| m.site.as_str()),
        etalons: etalons_report,
        materiels: materiels_report,
        constats: constats_report,
        forms,
        sources,
        injected,
        labels: (!label_ok.is_empty(), !label_not_ok.is_empty()),
        worker_version,
        page,
        worker,
        manifest,
        warnings,
    })
}

fn track<T: serde::Serialize + ?Sized>(
    state: &mut UpdateState,
    set: RecordSet,
    records: &T,
    count: usize,
    now: &NaiveDateTime,
) -> Result<SetReport> {
    let hash = fingerprint(records)?;
    let changed = state.track(set, &hash, now);
    let last_changed = state
        .last_changed(set)
        .map(str::to_string)
        .unwrap_or_else(|| format_timestamp(now));

    if changed {
        tracing::info!(%set, count, "data changed");
    } else {
        tracing::info!(%set, count, since = %last_changed, "unchanged");
    }

    Ok(SetReport {
        count,
        changed,
        last_changed,
        fingerprint: hash,
    })
}

fn rebase_urls(forms: &mut [FormDescriptor], forms_dir: &str) {
    let prefix = format!("{}/", forms_dir.trim_end_matches('/'));
    if prefix == FORMS_URL_PREFIX {
        return;
    }
    for form in forms {
        form.url = format!("{}{}", prefix, form.filename);
    }
}

fn load_label(options: &ExportOptions, name: &str, warnings: &mut Vec<String>) -> String {
    jpeg_data_uri(&options.asset(name)).unwrap_or_else(|| {
        warnings.push(format!("{} not found, label left empty", name));
        String::new()
    })
}

fn write_worker(
    options: &ExportOptions,
    version: &str,
    forms: &[FormDescriptor],
    warnings: &mut Vec<String>,
) -> Result<Option<PathBuf>> {
    let source = options.worker_template();
    let text = match fs::read_to_string(&source) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(file = %source.display(), error = %e, "service worker template unavailable");
            warnings.push(format!("{} not found, service worker not updated", WORKER_FILE));
            return Ok(None);
        }
    };

    let template = Template::new(text);
    if !template.contains(SW_VERSION) {
        tracing::warn!(file = %source.display(), "service worker template has no version placeholder");
        warnings.push(format!("{} has no %%{}%% placeholder", WORKER_FILE, SW_VERSION));
    }

    let dest = options.output(WORKER_FILE);
    fs::write(&dest, render_worker(&template, version, forms))?;
    tracing::info!(file = %dest.display(), version, forms = forms.len(), "service worker written");
    Ok(Some(dest))
}
