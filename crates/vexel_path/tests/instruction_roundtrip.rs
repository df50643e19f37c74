//! Round-trip law: every constructor-produced path survives
//! serialize -> parse with its command stream intact.

use std::f32::consts::PI;
use vexel_core::{Point, Rect};
use vexel_path::{CornerRadius, Path, PathBuilder};

fn assert_round_trips(path: &Path) {
    let text = path.to_instructions();
    let reparsed = Path::from_instructions(&text).unwrap_or_else(|e| {
        panic!("failed to reparse {text:?}: {e}");
    });
    assert_eq!(&reparsed, path, "round trip changed path for {text:?}");
}

#[test]
fn test_constructor_paths_round_trip() {
    let paths = [
        Path::new(),
        Path::rect(Rect::new(10.0, 10.0, 20.0, 10.0)),
        Path::rounded_rect(Rect::new(0.0, 0.0, 100.0, 50.0), CornerRadius::uniform(8.0)),
        Path::rounded_rect(
            Rect::new(-5.5, 2.25, 30.0, 30.0),
            CornerRadius::new(1.0, 2.0, 3.0, 4.0),
        ),
        Path::ellipse(Point::new(50.0, 50.0), Point::new(30.0, 20.0)),
        Path::circle(Point::new(-10.0, -10.0), 5.0),
        Path::line(Point::new(0.0, 0.0), Point::new(12.5, -7.25)),
        Path::polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(20.0, -5.0),
        ])
        .unwrap(),
        Path::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.66),
        ])
        .unwrap(),
        Path::arc(Point::new(10.0, 10.0), Point::new(8.0, 8.0), 0.3, 2.0),
        Path::sector(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 0.0, PI / 3.0),
        Path::segment(Point::new(5.0, 5.0), Point::new(4.0, 6.0), -0.5, PI),
    ];

    for path in &paths {
        assert_round_trips(path);
    }
}

#[test]
fn test_builder_paths_round_trip() {
    let path = PathBuilder::new()
        .move_to(1.0, 2.0)
        .line_to(3.0, 4.0)
        .quad_to(5.0, 6.0, 7.0, 8.0)
        .cubic_to(9.0, 10.0, 11.0, 12.0, 13.0, 14.0)
        .close()
        .move_to(-1.0, -2.0)
        .line_to(-3.0, -4.0)
        .build();
    assert_round_trips(&path);
}

#[test]
fn test_parsed_text_round_trips_geometrically() {
    // Relative and shorthand forms canonicalize to absolute commands but
    // the second pass is a fixed point
    let sources = [
        "M10,10 L20,20 L30 10 Z",
        "m1 1 l2 0 q1 1 2 0 t2 0 c1 1 2 2 3 0 s1 -1 2 0 z",
        "M0 0 H10 V10 H0 Z",
        "M0 0 A5 5 0 1 0 10 0 Z",
        "M0 0 10 10 20 0",
    ];
    for source in sources {
        let first = Path::from_instructions(source).unwrap();
        let text = first.to_instructions();
        let second = Path::from_instructions(&text).unwrap();
        assert_eq!(first, second, "not a fixed point for {source:?}");
        assert_eq!(second.to_instructions(), text);
    }
}

#[test]
fn test_instruction_example_bounds() {
    let path = Path::from_instructions("M10,10 L20,20 L30 10 Z").unwrap();
    let text = path.to_instructions();
    let reparsed = Path::from_instructions(&text).unwrap();
    assert_eq!(reparsed.commands().len(), 4);
    assert_eq!(reparsed.bounds(), Rect::from_edges(10.0, 10.0, 30.0, 20.0));
}
