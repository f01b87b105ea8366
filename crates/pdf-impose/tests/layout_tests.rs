use pdf_impose::layout::*;
use pdf_impose::*;

const SOURCE: Size = Size {
    width: 100.0,
    height: 200.0,
};

fn grid(width: usize, height: usize) -> Matrix {
    Matrix::from_fn(width, height, |x, y| Page::new(x * height + y))
}

// =============================================================================
// Matrix
// =============================================================================

#[test]
fn test_stack_shifts_every_number() {
    let matrix = grid(2, 2);
    let stacked = matrix.stack(3).stack(5);

    for coord in matrix.coordinates() {
        assert_eq!(stacked[coord].number, matrix[coord].number + 8);
    }
}

#[test]
fn test_stack_leaves_original_untouched() {
    let matrix = grid(2, 1);
    let mut stacked = matrix.stack(4);
    stacked[(0, 0)].number = 42;

    assert_eq!(matrix[(0, 0)].number, 0);
    assert_eq!(stacked[(1, 0)].number, 5);
}

#[test]
fn test_clone_is_independent() {
    let matrix = grid(2, 2).with_omargin(Margins::uniform(3.0));
    let mut copy = matrix.clone();
    copy[(1, 1)].number = 99;
    copy[(0, 1)].rotate = Rotation::Deg180;
    copy.omargin.left = 50.0;

    assert_eq!(matrix[(1, 1)].number, 3);
    assert_eq!(matrix[(0, 1)].rotate, Rotation::None);
    assert_eq!(matrix.omargin, Margins::uniform(3.0));
    assert_ne!(copy, matrix);
}

#[test]
fn test_stack_matrixes() {
    let numbers: Vec<Vec<usize>> = stack_matrixes(vec![grid(1, 1), grid(1, 1).stack(1)], 3, 2)
        .map(|matrix| matrix.pages().map(|page| page.number).collect())
        .collect();
    assert_eq!(
        numbers,
        vec![vec![0], vec![1], vec![2], vec![3], vec![4], vec![5]]
    );
}

#[test]
fn test_pagesize_plain_grid() {
    let matrix = grid(3, 2);
    assert_eq!(matrix.pagesize(SOURCE), Size::new(300.0, 400.0));
}

#[test]
fn test_pagesize_with_margins() {
    let margins = Margins::new(1.0, 2.0, 3.0, 4.0);
    let matrix = Matrix::from_fn(2, 1, |x, _| Page::new(x).with_margins(margins))
        .with_omargin(Margins::uniform(10.0));

    assert_eq!(matrix.pagesize(SOURCE), Size::new(226.0, 227.0));
}

#[test]
fn test_sideways_pages_swap_footprint() {
    let matrix = Matrix::from_fn(2, 1, |x, _| Page::new(x).with_rotation(Rotation::Deg90));
    assert_eq!(matrix.pagesize(SOURCE), Size::new(400.0, 100.0));
    assert_eq!(matrix.topleft((1, 0), SOURCE), Point::new(200.0, 0.0));
}

#[test]
fn test_topleft_within_sheet() {
    let matrix = Matrix::from_fn(3, 2, |x, y| {
        Page::new(x * 2 + y).with_margins(Margins::new(2.0, 3.0, 4.0, 5.0))
    })
    .with_omargin(Margins::new(7.0, 11.0, 13.0, 17.0));
    let sheet = matrix.pagesize(SOURCE);

    for coord in matrix.coordinates() {
        let topleft = matrix.topleft(coord, SOURCE);
        let footprint = matrix[coord].footprint(SOURCE);
        assert!(topleft.x >= matrix.omargin.left);
        assert!(topleft.y >= matrix.omargin.top);
        assert!(topleft.x + footprint.width <= sheet.width - matrix.omargin.right);
        assert!(topleft.y + footprint.height <= sheet.height - matrix.omargin.bottom);
    }
    assert_eq!(matrix.topleft((0, 0), SOURCE), Point::new(9.0, 17.0));
    assert_eq!(matrix.topleft((1, 1), SOURCE), Point::new(114.0, 226.0));
}

#[test]
fn test_rotated_adds_angle() {
    let matrix = Matrix::from_fn(1, 2, |_, y| {
        Page::new(y).with_rotation(if y == 0 {
            Rotation::Deg180
        } else {
            Rotation::None
        })
    })
    .rotated(Rotation::Deg270);

    assert_eq!(matrix[(0, 0)].rotate, Rotation::Deg90);
    assert_eq!(matrix[(0, 1)].rotate, Rotation::Deg270);
}

#[test]
#[should_panic(expected = "inconsistent imposition matrix")]
fn test_pagesize_rejects_uneven_rows() {
    let matrix = Matrix::from_fn(2, 2, |x, y| {
        let page = Page::new(x * 2 + y);
        if (x, y) == (0, 1) {
            page.with_margins(Margins::new(5.0, 0.0, 0.0, 0.0))
        } else {
            page
        }
    });
    matrix.pagesize(SOURCE);
}

#[test]
#[should_panic(expected = "same height")]
fn test_ragged_matrix_panics() {
    Matrix::new(vec![vec![Page::new(0), Page::new(1)], vec![Page::new(2)]]);
}

#[test]
fn test_get_out_of_bounds() {
    let matrix = grid(2, 3);
    assert_eq!(matrix.get(1, 2).map(|page| page.number), Some(5));
    assert!(matrix.get(2, 0).is_none());
    assert!(matrix.get(0, 3).is_none());
}

// =============================================================================
// Signatures
// =============================================================================

#[test]
fn test_compute_signature_a6_on_a4() {
    let a4 = Size::new(595.0, 842.0);
    let a6 = Size::new(297.5, 421.0);
    let fit = compute_signature(a6, a4).unwrap();
    assert_eq!(fit.signature, (2, 2));
    assert!(!fit.rotated);
}

#[test]
fn test_compute_signature_turns_sheet() {
    let fit = compute_signature(Size::new(100.0, 300.0), Size::new(300.0, 200.0)).unwrap();
    assert_eq!(fit.signature, (2, 1));
    assert!(fit.rotated);
    assert_eq!(fit.oriented(Size::new(300.0, 200.0)), Size::new(200.0, 300.0));
}

#[test]
fn test_compute_signature_oversize() {
    let result = compute_signature(Size::new(100.0, 100.0), Size::new(50.0, 50.0));
    assert!(matches!(result, Err(ImposeError::Oversize { .. })));
}

#[test]
fn test_fit_with_gap() {
    // Three cells of 100 need 320 with a 10 gap
    let fit = fit_with_gap(Size::new(100.0, 100.0), 10.0, Size::new(320.0, 100.0)).unwrap();
    assert_eq!(fit.signature, (3, 1));
    let fit = fit_with_gap(Size::new(100.0, 100.0), 10.0, Size::new(319.0, 100.0)).unwrap();
    assert_eq!(fit.signature, (2, 1));
}

#[test]
fn test_fold_sequences_make_signatures() {
    assert_eq!(folds_signature("h"), (2, 1));
    assert_eq!(folds_signature("vh"), (2, 2));
    assert_eq!(folds_signature("hvh"), (4, 2));

    for (width, height) in [(2, 1), (2, 2), (4, 2), (2, 4), (8, 4)] {
        let folds = signature_to_folds(width, height).unwrap();
        assert!(folds.ends_with('h'));
        assert!(validate_folds(&folds).is_ok());
        assert_eq!(folds_signature(&folds), (width, height));
    }
}

#[test]
fn test_signature_to_folds_rejects_odd_sizes() {
    assert!(signature_to_folds(3, 2).is_err());
    assert!(signature_to_folds(1, 2).is_err());
}

#[test]
fn test_fold_recto_holds_half_the_pages() {
    for folds in ["h", "vh", "hvh", "vvh"] {
        let recto = fold_recto(folds);
        let (width, height) = folds_signature(folds);
        assert_eq!(recto.len(), width);

        let mut numbers: Vec<usize> = recto.into_iter().flatten().collect();
        assert_eq!(numbers.len(), width * height);
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), width * height);
        assert!(numbers.iter().all(|&n| n < 2 * width * height));
    }
}
