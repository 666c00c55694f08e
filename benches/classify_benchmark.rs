//! Benchmarks for pagesift classification performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks classify synthetic pages mixing paragraphs, a
//! field/value table, a list and a vector chart.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pagesift::{
    group_rows, merge_field_rows, BBox, ClassifyOptions, DocumentInput, FieldRow, LayoutClassifier,
    PageInput, TextFragment, VectorPrimitive,
};

fn fragment(text: &str, x: f32, y: f32, size: f32) -> TextFragment {
    let width = text.chars().count() as f32 * size * 0.5;
    TextFragment::new(text, BBox::new(x, y, x + width, y + size), size)
}

/// Creates a synthetic report page.
fn create_test_page(index: usize) -> PageInput {
    let mut page = PageInput::a4();

    page.add_fragment(fragment(&format!("{}. Descripción del evento", index + 1), 72.0, 60.0, 13.0).bold());
    for line in 0..6 {
        page.add_fragment(fragment(
            "La línea de transmisión salió de servicio por actuación de la protección diferencial.",
            72.0,
            90.0 + line as f32 * 13.0,
            10.0,
        ));
    }

    for row in 0..8 {
        let y = 190.0 + row as f32 * 14.0;
        page.add_fragment(fragment(&format!("Campo {}", row), 72.0, y, 9.0));
        page.add_fragment(fragment(&format!("{}.{} kV", 100 + row, row), 300.0, y, 9.0));
    }

    for item in 0..4 {
        page.add_fragment(fragment(&format!("• Medida correctiva número {}", item), 72.0, 330.0 + item as f32 * 13.0, 10.0));
    }

    let step_x = 250.0 / 30.0;
    for j in 0..20 {
        for i in 0..30 {
            let x0 = 150.0 + i as f32 * step_x;
            let y0 = 450.0 + j as f32 * 10.0;
            page.add_primitive(VectorPrimitive::rect(BBox::new(x0, y0, x0 + step_x - 2.0, y0 + 8.0)));
        }
    }

    page.add_fragment(fragment(&format!("Página {} de 100", index + 1), 260.0, 810.0, 8.0));
    page
}

fn create_test_document(page_count: usize) -> DocumentInput {
    DocumentInput::from_pages((0..page_count).map(create_test_page).collect())
}

/// Benchmark row grouping on one page.
fn bench_row_grouping(c: &mut Criterion) {
    let page = create_test_page(0);

    c.bench_function("group_rows", |b| {
        b.iter(|| group_rows(black_box(&page.fragments), 3.0));
    });
}

/// Benchmark document classification at various sizes.
fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    for page_count in [1, 10, 50].iter() {
        let doc = create_test_document(*page_count);

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            let classifier = LayoutClassifier::new(doc.clone());
            b.iter(|| black_box(classifier.classify_all()));
        });

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            let classifier = LayoutClassifier::with_options(doc.clone(), ClassifyOptions::default().sequential());
            b.iter(|| black_box(classifier.classify_all()));
        });
    }

    group.finish();
}

/// Benchmark table-of-contents construction.
fn bench_table_of_contents(c: &mut Criterion) {
    let classifier = LayoutClassifier::new(create_test_document(20));

    c.bench_function("toc_20_pages", |b| {
        b.iter(|| black_box(classifier.build_table_of_contents(12.0, true)));
    });
}

/// Benchmark cell continuation merging.
fn bench_cell_merge(c: &mut Criterion) {
    let rows: Vec<FieldRow> = (0..200)
        .map(|i| {
            if i % 3 == 2 {
                FieldRow::new("y continuación", "del valor anterior")
            } else {
                FieldRow::new(format!("Campo {}", i), "Valor")
            }
        })
        .collect();

    c.bench_function("merge_field_rows", |b| {
        b.iter(|| merge_field_rows(black_box(&rows)));
    });
}

criterion_group!(
    benches,
    bench_row_grouping,
    bench_classification,
    bench_table_of_contents,
    bench_cell_merge,
);
criterion_main!(benches);
