use pdf_impose::layout::Size;
use pdf_impose::*;
use std::path::{Path, PathBuf};

fn options(schema: Schema) -> ImpositionOptions {
    ImpositionOptions {
        input_files: vec![PathBuf::from("book.pdf")],
        schema,
        ..Default::default()
    }
}

fn paper(paper: PaperSize) -> Size {
    Size::from(paper.dimensions_pt())
}

fn close(a: Size, b: Size) -> bool {
    (a.width - b.width).abs() < 1e-6 && (a.height - b.height).abs() < 1e-6
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validation_no_input_files() {
    let options = ImpositionOptions::default();
    assert!(matches!(options.validate(), Err(ImposeError::Config(_))));
}

#[test]
fn test_validation_defaults_are_valid() {
    for schema in Schema::ALL {
        assert!(options(schema).validate().is_ok(), "{schema}");
    }
}

#[test]
fn test_validation_negative_margins() {
    let mut options = options(Schema::Cards);
    options.imargin = -1.0;
    assert!(options.validate().is_err());

    options.imargin = 0.0;
    options.omargin.top = f64::NAN;
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_signature() {
    let mut cards = options(Schema::Cards);
    cards.layout = Some(Layout::Signature {
        width: 0,
        height: 2,
    });
    assert!(cards.validate().is_err());

    cards.layout = Some(Layout::Signature {
        width: 3,
        height: 5,
    });
    assert!(cards.validate().is_ok());

    let mut zine = options(Schema::OnePageZine);
    zine.layout = Some(Layout::Signature {
        width: 4,
        height: 2,
    });
    assert!(zine.validate().is_err());

    let mut perfect = options(Schema::Perfect);
    perfect.layout = Some(Layout::Signature {
        width: 3,
        height: 2,
    });
    assert!(matches!(
        perfect.validate(),
        Err(ImposeError::IncompatibleFolds { .. })
    ));
}

#[test]
fn test_validation_folds() {
    let mut cards = options(Schema::Cards);
    cards.layout = Some(Layout::Folds("h".to_string()));
    assert!(matches!(cards.validate(), Err(ImposeError::Config(_))));

    let mut saddle = options(Schema::Saddle);
    saddle.layout = Some(Layout::Folds("hv".to_string()));
    assert!(matches!(
        saddle.validate(),
        Err(ImposeError::IncompatibleFolds { .. })
    ));

    saddle.layout = Some(Layout::Folds("hvh".to_string()));
    assert!(saddle.validate().is_ok());
}

#[test]
fn test_validation_schema_specific_options() {
    let mut cards = options(Schema::Cards);
    cards.bind = Bind::Top;
    assert!(cards.validate().is_err());

    let mut perfect = options(Schema::Perfect);
    perfect.creep = Creep::Constant(1.0);
    assert!(perfect.validate().is_err());

    let mut saddle = options(Schema::Saddle);
    saddle.group = Some(2);
    assert!(saddle.validate().is_err());

    let mut hardcover = options(Schema::Hardcover);
    hardcover.bind = Bind::Right;
    hardcover.creep = Creep::Constant(1.0);
    hardcover.group = Some(2);
    assert!(hardcover.validate().is_ok());
}

// =============================================================================
// Schemas and paths
// =============================================================================

#[test]
fn test_schema_names() {
    for schema in Schema::ALL {
        assert_eq!(schema.to_string().parse::<Schema>().unwrap(), schema);
    }
    assert_eq!(" Saddle ".parse::<Schema>().unwrap(), Schema::Saddle);
    assert!(matches!(
        "booklet".parse::<Schema>(),
        Err(ImposeError::Parse(_))
    ));
}

#[test]
fn test_output_path() {
    assert_eq!(
        default_output_path(Path::new("dir/book.pdf")),
        PathBuf::from("dir/book-impose.pdf")
    );
    assert_eq!(
        default_output_path(Path::new("notes")),
        PathBuf::from("notes-impose")
    );

    let mut options = options(Schema::Wire);
    assert_eq!(options.output_path().unwrap(), PathBuf::from("book-impose.pdf"));
    options.output_file = Some(PathBuf::from("out.pdf"));
    assert_eq!(options.output_path().unwrap(), PathBuf::from("out.pdf"));
}

// =============================================================================
// Building impositors
// =============================================================================

#[test]
fn test_build_cards_on_paper() {
    let a6 = paper(PaperSize::A6);
    let impositor = options(Schema::Cards).build(a6, 8).unwrap();

    assert_eq!(impositor.page_multiple(), 8);
    let sheet = impositor.matrixes(8).next().unwrap().pagesize(a6);
    assert!(close(sheet, paper(PaperSize::A4)));
}

#[test]
fn test_build_centers_on_paper() {
    let source = Size::new(200.0, 200.0);
    let impositor = options(Schema::Cards).build(source, 16).unwrap();
    let matrix = impositor.matrixes(16).next().unwrap();

    // A 2x4 grid of 200pt cards, centered on A4
    assert_eq!(matrix.signature(), (2, 4));
    let a4 = paper(PaperSize::A4);
    assert!((matrix.omargin.left - (a4.width - 400.0) / 2.0).abs() < 1e-6);
    assert!((matrix.omargin.top - (a4.height - 800.0) / 2.0).abs() < 1e-6);
    assert!(close(matrix.pagesize(source), a4));
}

#[test]
fn test_build_folds_for_paper() {
    let a6 = paper(PaperSize::A6);
    let impositor = options(Schema::Perfect).build(a6, 8).unwrap();

    // Two A6 pairs on A4: quarto
    assert_eq!(impositor.page_multiple(), 8);
    let matrix = impositor.matrixes(8).next().unwrap();
    assert_eq!(matrix.signature(), (2, 2));
    assert!(close(matrix.pagesize(a6), paper(PaperSize::A4)));
}

#[test]
fn test_build_with_signature_keeps_margins() {
    let mut options = options(Schema::Cards);
    options.layout = Some(Layout::Signature {
        width: 3,
        height: 1,
    });
    options.omargin = Margins::uniform(10.0);
    options.imargin = 4.0;

    let source = Size::new(100.0, 100.0);
    let impositor = options.build(source, 6).unwrap();
    let sheet = impositor.matrixes(6).next().unwrap().pagesize(source);
    assert_eq!(sheet, Size::new(328.0, 120.0));
}

#[test]
fn test_build_signature_for_folded_schema() {
    let mut options = options(Schema::Hardcover);
    options.layout = Some(Layout::Signature {
        width: 4,
        height: 2,
    });
    options.group = Some(2);

    let impositor = options.build(Size::new(100.0, 100.0), 16).unwrap();
    assert_eq!(impositor.page_multiple(), 32);
}

#[test]
fn test_build_zine_without_paper() {
    let source = Size::new(100.0, 150.0);
    let impositor = options(Schema::OnePageZine).build(source, 8).unwrap();

    assert_eq!(impositor.sides_per_sheet(), 1);
    let sheet = impositor.matrixes(8).next().unwrap().pagesize(source);
    assert_eq!(sheet, Size::new(400.0, 300.0));
}

#[test]
fn test_build_zine_on_paper() {
    let a7 = Size::new(paper(PaperSize::A6).height / 2.0, paper(PaperSize::A6).width);
    let mut options = options(Schema::OnePageZine);
    options.layout = Some(Layout::Format(PaperSize::A4));

    // Four A7 columns across landscape A4
    let impositor = options.build(a7, 8).unwrap();
    let sheet = impositor.matrixes(8).next().unwrap().pagesize(a7);
    assert!(close(sheet, paper(PaperSize::A4).swapped()));
}

#[test]
fn test_build_oversize() {
    let result = options(Schema::Wire).build(Size::new(1000.0, 1000.0), 4);
    assert!(matches!(result, Err(ImposeError::Oversize { .. })));
}

// =============================================================================
// Configuration files
// =============================================================================

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let options = ImpositionOptions {
        input_files: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
        output_file: Some(PathBuf::from("out.pdf")),
        schema: Schema::Hardcover,
        layout: Some(Layout::Folds("hvh".to_string())),
        imargin: 5.0,
        omargin: Margins::uniform(12.0),
        last: 1,
        marks: Marks {
            crop: true,
            bind: true,
        },
        bind: Bind::Top,
        creep: Creep::Linear {
            slope: 0.5,
            intercept: 0.25,
        },
        group: Some(3),
    };

    let temp = NamedTempFile::new().unwrap();
    options.save(temp.path()).await.unwrap();
    let loaded = ImpositionOptions::load(temp.path()).await.unwrap();

    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_partial_config() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    let json = r#"{
        "input_files": ["zine.pdf"],
        "schema": "saddle",
        "layout": { "signature": { "width": 2, "height": 2 } }
    }"#;
    tokio::fs::write(temp.path(), json).await.unwrap();

    let loaded = ImpositionOptions::load(temp.path()).await.unwrap();
    assert_eq!(loaded.schema, Schema::Saddle);
    assert_eq!(
        loaded.layout,
        Some(Layout::Signature {
            width: 2,
            height: 2
        })
    );
    assert_eq!(loaded.imargin, 0.0);
    assert!(loaded.validate().is_ok());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_invalid_config() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    tokio::fs::write(temp.path(), r#"{ "schema": "booklet" }"#)
        .await
        .unwrap();

    let result = ImpositionOptions::load(temp.path()).await;
    assert!(matches!(result, Err(ImposeError::Config(_))));
}
