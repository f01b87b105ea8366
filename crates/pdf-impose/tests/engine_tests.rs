//! Imposition loop, run against in-memory sources and sinks

use pdf_impose::impose::{Binding, CardsImpositor, OnePageZineImpositor, PerfectImpositor};
use pdf_impose::layout::{Line, Point, Rect, Size};
use pdf_impose::render::{BlankWindow, Reader, Writer};
use pdf_impose::*;

const SOURCE: Size = Size {
    width: 100.0,
    height: 150.0,
};

/// `pages` pages of the same size; a page is its physical index
struct MemoryReader {
    pages: usize,
    blanks: BlankWindow,
}

impl MemoryReader {
    fn new(pages: usize) -> Self {
        Self {
            pages,
            blanks: BlankWindow::default(),
        }
    }
}

impl Reader for MemoryReader {
    type Page = usize;

    fn size(&self) -> Size {
        SOURCE
    }

    fn len(&self) -> usize {
        self.pages + self.blanks.count
    }

    fn get(&self, number: usize) -> Option<usize> {
        self.blanks.resolve(number, self.pages)
    }

    fn set_final_blank_pages(&mut self, count: usize, position: usize) {
        self.blanks = BlankWindow::new(count, position);
    }
}

#[derive(Debug, Default)]
struct RecordedSheet {
    size: Size,
    placed: Vec<(usize, Point, Rotation)>,
    lines: Vec<Line>,
    rects: Vec<Rect>,
}

#[derive(Debug, Default)]
struct Recording {
    sheets: Vec<RecordedSheet>,
    metadata: bool,
}

#[derive(Default)]
struct RecordingWriter {
    recording: Recording,
}

impl Writer<MemoryReader> for RecordingWriter {
    type Output = Recording;

    fn new_page(&mut self, size: Size) -> Result<usize> {
        self.recording.sheets.push(RecordedSheet {
            size,
            ..Default::default()
        });
        Ok(self.recording.sheets.len() - 1)
    }

    fn insert(
        &mut self,
        sheet: usize,
        _reader: &MemoryReader,
        page: &usize,
        topleft: Point,
        rotate: Rotation,
    ) -> Result<()> {
        self.recording.sheets[sheet].placed.push((*page, topleft, rotate));
        Ok(())
    }

    fn draw_line(&mut self, sheet: usize, line: Line) -> Result<()> {
        self.recording.sheets[sheet].lines.push(line);
        Ok(())
    }

    fn draw_rect(&mut self, sheet: usize, rect: Rect) -> Result<()> {
        self.recording.sheets[sheet].rects.push(rect);
        Ok(())
    }

    fn set_metadata(&mut self, _reader: &MemoryReader) -> Result<()> {
        self.recording.metadata = true;
        Ok(())
    }

    fn finish(self) -> Result<Recording> {
        Ok(self.recording)
    }
}

fn run(impositor: &dyn Impositor, pages: usize) -> Result<Recording> {
    impose_pages(impositor, MemoryReader::new(pages), RecordingWriter::default())
}

fn placed_pages(sheet: &RecordedSheet) -> Vec<usize> {
    sheet.placed.iter().map(|(page, _, _)| *page).collect()
}

#[test]
fn test_cards_leave_blank_slots_empty() {
    let cards = CardsImpositor::new(Settings::default(), (2, 1), 0.0);
    let recording = run(&cards, 3).unwrap();

    assert_eq!(recording.sheets.len(), 2);
    assert_eq!(
        recording.sheets[0].placed,
        vec![
            (0, Point::new(0.0, 0.0), Rotation::None),
            (2, Point::new(100.0, 0.0), Rotation::None),
        ]
    );
    // Page 3 is blank
    assert_eq!(
        recording.sheets[1].placed,
        vec![(1, Point::new(100.0, 0.0), Rotation::None)]
    );
    assert!(recording.metadata);
}

#[test]
fn test_output_pages_use_matrix_size() {
    let settings = Settings {
        omargin: Margins::uniform(10.0),
        ..Default::default()
    };
    let cards = CardsImpositor::new(settings, (2, 2), 6.0);
    let recording = run(&cards, 8).unwrap();

    for sheet in &recording.sheets {
        assert_eq!(sheet.size, Size::new(226.0, 326.0));
    }
}

#[test]
fn test_last_pages_stay_at_the_end() {
    let settings = Settings {
        last: 1,
        ..Default::default()
    };
    let saddle = PerfectImpositor::new(settings, Binding::Saddle, "h", 0.0).unwrap();
    let recording = run(&saddle, 5).unwrap();

    // Logical pages 4 to 6 are blank, page 7 is the last source page
    let sides: Vec<Vec<usize>> = recording.sheets.iter().map(placed_pages).collect();
    assert_eq!(sides, vec![vec![4, 0], vec![1], vec![2], vec![3]]);
}

#[test]
fn test_no_padding_needed() {
    let zine = OnePageZineImpositor::new(Settings::default(), 0.0);
    let recording = run(&zine, 8).unwrap();

    assert_eq!(recording.sheets.len(), 1);
    let mut pages = placed_pages(&recording.sheets[0]);
    pages.sort_unstable();
    assert_eq!(pages, (0..8).collect::<Vec<_>>());
}

#[test]
fn test_short_zine() {
    let zine = OnePageZineImpositor::new(Settings::default(), 0.0);
    let recording = run(&zine, 3).unwrap();

    assert_eq!(recording.sheets.len(), 1);
    let mut pages = placed_pages(&recording.sheets[0]);
    pages.sort_unstable();
    assert_eq!(pages, vec![0, 1, 2]);
}

#[test]
fn test_empty_source() {
    let cards = CardsImpositor::new(Settings::default(), (1, 1), 0.0);
    let result = run(&cards, 0);
    assert!(matches!(result, Err(ImposeError::NoPages)));
}

#[test]
fn test_marks_are_drawn_on_request() {
    let settings = Settings {
        omargin: Margins::uniform(20.0),
        marks: Marks {
            crop: true,
            bind: true,
        },
        ..Default::default()
    };
    let impositor = PerfectImpositor::new(settings, Binding::Perfect, "h", 0.0).unwrap();
    let recording = run(&impositor, 8).unwrap();

    assert_eq!(recording.sheets.len(), 4);
    for (number, sheet) in recording.sheets.iter().enumerate() {
        assert!(!sheet.lines.is_empty());
        // Crop lines stay in the output margins
        for line in &sheet.lines {
            for point in [line.from, line.to] {
                let in_margin = point.x <= 20.0
                    || point.x >= sheet.size.width - 20.0
                    || point.y <= 20.0
                    || point.y >= sheet.size.height - 20.0;
                assert!(in_margin, "{line:?}");
            }
        }
        assert_eq!(sheet.rects.len(), if number % 2 == 0 { 1 } else { 0 });
    }
}

#[test]
fn test_no_marks_by_default() {
    let settings = Settings {
        omargin: Margins::uniform(20.0),
        ..Default::default()
    };
    let impositor = PerfectImpositor::new(settings, Binding::Perfect, "h", 0.0).unwrap();
    let recording = run(&impositor, 8).unwrap();

    assert!(
        recording
            .sheets
            .iter()
            .all(|sheet| sheet.lines.is_empty() && sheet.rects.is_empty())
    );
}

#[test]
fn test_crop_marks_alone() {
    let settings = Settings {
        omargin: Margins::uniform(20.0),
        marks: Marks {
            crop: true,
            bind: false,
        },
        ..Default::default()
    };
    let impositor = PerfectImpositor::new(settings, Binding::Perfect, "h", 0.0).unwrap();
    let recording = run(&impositor, 8).unwrap();

    for sheet in &recording.sheets {
        assert!(!sheet.lines.is_empty());
        assert!(sheet.rects.is_empty());
    }
}
