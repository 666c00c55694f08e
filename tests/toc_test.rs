//! Integration tests for table-of-contents construction.

use pagesift::{BBox, DocumentInput, LayoutClassifier, NumberingKind, PageInput, TextFragment};

const MIN_SCORE: f32 = 12.0;

fn fragment(text: &str, x: f32, y: f32, size: f32) -> TextFragment {
    let width = text.chars().count() as f32 * size * 0.5;
    TextFragment::new(text, BBox::new(x, y, x + width, y + size), size)
}

/// Fragment centered on an A4 page.
fn centered(text: &str, y: f32, size: f32) -> TextFragment {
    let width = text.chars().count() as f32 * size * 0.5;
    let x0 = (595.0 - width) / 2.0;
    TextFragment::new(text, BBox::new(x0, y, x0 + width, y + size), size)
}

/// Page with body text at size 10 after the given headings.
fn page_with(headings: Vec<TextFragment>) -> PageInput {
    let mut page = PageInput::a4();
    let mut y = 80.0;
    for heading in headings {
        let mut heading = heading;
        let height = heading.bbox.height();
        heading.bbox = BBox::new(heading.bbox.x0, y, heading.bbox.x1, y + height);
        page.add_fragment(heading);
        y += 30.0;
        page.add_fragment(fragment(
            "Durante la maniobra se registró una caída de tensión en las barras de la subestación.",
            72.0,
            y,
            10.0,
        ));
        y += 40.0;
    }
    page
}

fn toc(pages: Vec<PageInput>, detect_unnumbered: bool) -> Vec<pagesift::TocEntry> {
    LayoutClassifier::new(DocumentInput::from_pages(pages)).build_table_of_contents(MIN_SCORE, detect_unnumbered)
}

#[test]
fn test_hierarchical_heading() {
    let page = page_with(vec![fragment("7.2 Apertura del interruptor", 72.0, 0.0, 12.0)]);
    let entries = toc(vec![page], false);

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.text, "7.2 Apertura del interruptor");
    assert_eq!(entry.numbering, Some(NumberingKind::HierarchicalNumber));
    assert!(entry.score >= MIN_SCORE);
    assert_eq!(entry.level, 2);
    assert_eq!(entry.page, 1);
}

#[test]
fn test_unnumbered_heading_follows_context() {
    let page = page_with(vec![
        fragment("1. Descripción del evento", 72.0, 0.0, 12.0).bold(),
        centered("Resumen ejecutivo", 0.0, 12.0).bold(),
    ]);

    let entries = toc(vec![page.clone()], true);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].level, 1);
    assert_eq!(entries[1].text, "Resumen ejecutivo");
    assert_eq!(entries[1].numbering, None);
    assert_eq!(entries[1].level, 2);

    // Without the flag only numbered headings are kept
    let entries = toc(vec![page], false);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "1. Descripción del evento");
}

#[test]
fn test_levels_never_jump() {
    let pages = vec![
        page_with(vec![
            fragment("1. Antecedentes generales", 72.0, 0.0, 12.0),
            fragment("1.1.1 Alcance del informe", 72.0, 0.0, 12.0),
            fragment("1.1.2 Normativa aplicable", 72.0, 0.0, 12.0),
        ]),
        page_with(vec![
            fragment("2. Análisis de la falla", 72.0, 0.0, 12.0),
            fragment("2.1 Secuencia de eventos", 72.0, 0.0, 12.0),
            fragment("a) Protecciones actuadas", 72.0, 0.0, 12.0),
        ]),
    ];
    let entries = toc(pages, false);

    assert_eq!(entries.len(), 6);
    assert_eq!(entries[1].level, 2);
    assert_eq!(entries[2].level, 3);
    assert_eq!(entries[3].level, 1);
    assert_eq!(entries[3].page, 2);
    for pair in entries.windows(2) {
        assert!(pair[1].level <= pair[0].level + 1, "{:?}", pair);
    }
}

#[test]
fn test_repeated_and_data_rows_dropped() {
    let header = || fragment("1. Informe técnico de falla", 72.0, 0.0, 12.0);
    let pages = vec![
        page_with(vec![header(), fragment("2. Red de Energía del Perú S.A.", 72.0, 0.0, 12.0)]),
        page_with(vec![header(), fragment("3. Conclusiones del análisis", 72.0, 0.0, 12.0)]),
    ];
    let entries = toc(pages, false);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "3. Conclusiones del análisis");
    assert_eq!(entries[0].page, 2);
}

#[test]
fn test_score_threshold() {
    let page = page_with(vec![fragment("7.2 Apertura del interruptor", 72.0, 0.0, 12.0)]);
    let classifier = LayoutClassifier::new(DocumentInput::from_pages(vec![page]));

    assert_eq!(classifier.build_table_of_contents(15.0, false).len(), 1);
    assert!(classifier.build_table_of_contents(15.5, false).is_empty());
}

#[test]
fn test_toc_parallel_matches_sequential() {
    let pages: Vec<PageInput> = (1..=6)
        .map(|n| {
            page_with(vec![
                fragment(&format!("{}. Capítulo número {}", n, n), 72.0, 0.0, 12.0),
                fragment(&format!("{}.1 Sección inicial {}", n, n), 72.0, 0.0, 12.0),
            ])
        })
        .collect();

    let parallel = toc(pages.clone(), false);
    let sequential = LayoutClassifier::with_options(
        DocumentInput::from_pages(pages),
        pagesift::ClassifyOptions::default().sequential(),
    )
    .build_table_of_contents(MIN_SCORE, false);

    assert_eq!(parallel.len(), 12);
    assert_eq!(parallel, sequential);
}
