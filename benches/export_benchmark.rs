//! Benchmarks for the export hot paths.
//!
//! Run with: cargo bench
//!
//! Fingerprinting and page rendering both scale with the number of records,
//! which is what grows in practice.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use portail::export::etalons_from_sheet;
use portail::render::{render_page, PageData, Template};
use portail::{fingerprint, CalibrationRecord, CategoryConfig, CellValue, Sheet, SheetRow};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Creates an `Etalons` sheet with the given number of data rows.
fn create_test_sheet(row_count: usize) -> Sheet {
    let categories = ["Source", "Irradiateur", "Débitmètre", "Multimètre"];
    let mut sheet = Sheet::new("Etalons");
    sheet.rows.push(SheetRow::new(1, vec!["ID".into(), "Catégorie".into()]));

    for i in 0..row_count {
        let mut row = SheetRow::new(i as u32 + 2, Vec::new());
        row.set(0, format!("E-{:05}", i).as_str().into());
        row.set(1, categories[i % categories.len()].into());
        row.set(2, "2030-01-01".into());
        row.set(3, "paluel".into());
        row.set(5, CellValue::Number(10958.0 + i as f64));
        row.set(6, "Cs-137".into());
        row.set(8, "3 700,5".into());
        sheet.rows.push(row);
    }
    sheet
}

fn create_records(count: usize) -> Vec<CalibrationRecord> {
    etalons_from_sheet(&create_test_sheet(count), &CategoryConfig::default(), today())
}

fn bench_export_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_rows");
    let categories = CategoryConfig::default();

    for size in [100, 1000, 5000] {
        let sheet = create_test_sheet(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &sheet, |b, sheet| {
            b.iter(|| etalons_from_sheet(black_box(sheet), &categories, today()));
        });
    }

    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    for size in [100, 1000, 5000] {
        let records = create_records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| fingerprint(black_box(records)).unwrap());
        });
    }

    group.finish();
}

fn bench_render_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_page");
    let categories = CategoryConfig::default();
    let template = Template::new(
        "<html><script>var E=%%DATA_ETALONS%%;var M=%%DATA_MATERIELS%%;</script>\
         <p>%%NB_ETALONS%% étalons, mis à jour le %%DATE_ETALONS%%</p></html>",
    );

    for size in [100, 1000, 5000] {
        let records = create_records(size);
        let data = PageData {
            etalons: &records,
            materiels: &[],
            forms: &[],
            categories: &categories,
            date_etalons: "16/10/2026 08:30",
            date_materiels: "16/10/2026 08:30",
            date_constats: "16/10/2026 08:30",
            label_ok: "",
            label_not_ok: "",
        };
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| render_page(black_box(&template), data).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_export_rows, bench_fingerprint, bench_render_page);
criterion_main!(benches);
