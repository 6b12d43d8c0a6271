use crate::map::{FormatCause, InvalidNetworkFormat, NetworkError, SensorKind, TrafficSignal};
use crate::tests::{TestCtx, DEMO};
use crate::{load, LoadError, Network};

const DEMO_CANONICAL: &str = "4\n5\n2\nA:5:B,C\nB\nC\nD\nB:A:60:1:50\nPP:20:3,4,5\nC:A:40:0\nA:B:60:2\nSC:50:40,35,55\nVC:15:10,12,11\nA:D:80:0:80\nD:C:30:0\n";

fn parse_err(text: &str) -> InvalidNetworkFormat {
    match Network::parse(text) {
        Ok(n) => panic!("parsed {:?} into\n{}", text, n),
        Err(e) => e,
    }
}

#[test]
fn demo_network() {
    let n: Network = DEMO.parse().unwrap();
    assert_eq!(n.serialize(), DEMO_CANONICAL);

    assert_eq!(n.yellow_time(), 2);
    assert_eq!(n.incoming("A").unwrap(), vec!["B", "C"]);
    assert_eq!(n.route("B", "A").unwrap().speed(), 50);
    assert_eq!(n.route("B", "A").unwrap().signal(), Some(TrafficSignal::GREEN));
    assert_eq!(n.route("C", "A").unwrap().signal(), Some(TrafficSignal::RED));
    assert!(n.route("A", "B").unwrap().has_sensor(SensorKind::SpeedCamera));

    // PP 3/20 -> 15, SC 100 - 40*100/50 -> 20 and VC 100 - 10*100/15 -> 34
    assert_eq!(n.congestion("B", "A"), Ok(15));
    assert_eq!(n.congestion("A", "B"), Ok(27));

    let canonical = Network::parse(DEMO_CANONICAL).unwrap();
    assert!(canonical.same_content(&n));
}

#[test]
fn two_intersections_one_route() {
    let mut t = TestCtx::new();
    t.intersections(&["A", "B"]);
    t.n.connect("A", "B", 40).unwrap();
    assert_eq!(t.n.serialize(), "2\n1\n1\nA\nB\nA:B:40:0\n");
    t.check_roundtrip();
}

#[test]
fn comments_and_carriage_returns() {
    let n = Network::parse("; header\r\n1\r\n0\r\n1\r\n;x\r\nA\r\n").unwrap();
    assert_eq!(n.serialize(), "1\n0\n1\nA\n");
}

#[test]
fn trailing_newlines() {
    assert!(Network::parse("0\n0\n1").is_ok());
    assert!(Network::parse("0\n0\n1\n").is_ok());
    assert!(Network::parse("0\n0\n1\n\n").is_ok());

    let e = parse_err("0\n0\n1\n\n\n");
    assert_eq!(e.line, 6);
    assert!(matches!(e.cause, FormatCause::TrailingNewlines(3)));
}

#[test]
fn bad_header() {
    let e = parse_err("");
    assert!(matches!(e.cause, FormatCause::Missing(_)));

    let e = parse_err("0\n0\n");
    assert!(matches!(e.cause, FormatCause::Missing("yellow time")));

    let e = parse_err("x\n0\n1\n");
    assert_eq!(e.line, 1);
    assert!(matches!(e.cause, FormatCause::NotANumber { .. }));

    let e = parse_err("-1\n0\n1\n");
    assert_eq!(e.line, 1);
    assert!(matches!(e.cause, FormatCause::OutOfRange { value: -1, .. }));

    let e = parse_err("0\n0\n0\n");
    assert_eq!(e.line, 3);
    assert!(matches!(e.cause, FormatCause::OutOfRange { min: 1, .. }));
}

#[test]
fn intersection_count_mismatch() {
    let e = parse_err("2\n0\n1\nA\n");
    assert!(matches!(
        e.cause,
        FormatCause::CountMismatch {
            what: "intersections",
            declared: 2,
            found: 1
        }
    ));

    let e = parse_err("1\n0\n1\nA\nB\n");
    assert!(matches!(
        e.cause,
        FormatCause::CountMismatch {
            declared: 1,
            found: 2,
            ..
        }
    ));
}

#[test]
fn route_count_mismatch() {
    let e = parse_err("2\n2\n1\nA\nB\nA:B:10:0\n");
    assert!(matches!(
        e.cause,
        FormatCause::CountMismatch {
            what: "routes",
            declared: 2,
            found: 1
        }
    ));
}

#[test]
fn bad_intersections() {
    let e = parse_err("1\n0\n1\nPP\n");
    assert_eq!(e.line, 4);
    assert!(matches!(e.cause, FormatCause::ReservedId(ref id) if id == "PP"));

    let e = parse_err("2\n0\n1\nA\nA\n");
    assert_eq!(e.line, 5);
    assert!(matches!(
        e.cause,
        FormatCause::Network(NetworkError::DuplicateId(_))
    ));
}

#[test]
fn bad_routes() {
    let e = parse_err("1\n1\n1\nA\nA:B:10:0\n");
    assert_eq!(e.line, 5);
    assert!(matches!(e.cause, FormatCause::UnknownIntersection(ref id) if id == "B"));

    let e = parse_err("2\n2\n1\nA\nB\nA:B:10:0\nA:B:20:0\n");
    assert_eq!(e.line, 7);
    assert!(matches!(e.cause, FormatCause::DuplicateRoute(ref r) if r == "A:B"));

    let e = parse_err("2\n1\n1\nA\nB\nA::10:0\n");
    assert_eq!(e.line, 6);
    assert!(matches!(e.cause, FormatCause::EmptyField));

    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:0:5:6\n");
    assert!(matches!(e.cause, FormatCause::FieldCount { found: 6, .. }));

    let e = parse_err("2\n1\n1\nA\nB\nA:B:fast:0\n");
    assert!(matches!(
        e.cause,
        FormatCause::NotANumber {
            field: "default speed",
            ..
        }
    ));

    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:0:-5\n");
    assert!(matches!(e.cause, FormatCause::OutOfRange { value: -5, .. }));
}

#[test]
fn self_loops_are_allowed() {
    let n = Network::parse("1\n1\n1\nA\nA:A:10:0\n").unwrap();
    assert_eq!(n.incoming("A").unwrap(), vec!["A"]);
}

#[test]
fn bad_sensors() {
    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:1\nXX:5:1\n");
    assert_eq!(e.line, 7);
    assert!(matches!(e.cause, FormatCause::UnknownSensorKind(ref k) if k == "XX"));

    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:2\nPP:5:1\nPP:6:2\n");
    assert_eq!(e.line, 8);
    assert!(matches!(
        e.cause,
        FormatCause::Network(NetworkError::DuplicateSensor(_, SensorKind::PressurePad))
    ));

    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:1\nPP:0:1\n");
    assert_eq!(e.line, 7);
    assert!(matches!(
        e.cause,
        FormatCause::OutOfRange {
            field: "sensor threshold",
            ..
        }
    ));

    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:1\nVC:5:1,-2\n");
    assert!(matches!(e.cause, FormatCause::OutOfRange { value: -2, .. }));

    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:1\nVC:5:1,,2\n");
    assert!(matches!(e.cause, FormatCause::EmptyField));
}

#[test]
fn sensor_count() {
    // too few, another route follows
    let e = parse_err("2\n2\n1\nA\nB\nA:B:10:2\nPP:5:1\nB:A:10:0\n");
    assert_eq!(e.line, 8);
    assert!(matches!(
        e.cause,
        FormatCause::SensorCount {
            declared: 2,
            found: 1,
            ..
        }
    ));

    // too few, end of file
    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:1\n");
    assert_eq!(e.line, 6);
    assert!(matches!(
        e.cause,
        FormatCause::SensorCount {
            declared: 1,
            found: 0,
            ..
        }
    ));

    // too many
    let e = parse_err("2\n1\n1\nA\nB\nA:B:10:1\nPP:5:1\nVC:5:1\n");
    assert_eq!(e.line, 8);
    assert!(matches!(
        e.cause,
        FormatCause::SensorCount {
            ref route,
            declared: 1,
            found: 2,
        } if route == "A:B"
    ));
}

#[test]
fn bad_lights() {
    let e = parse_err("2\n1\n3\nA:3:B\nB\nB:A:10:0\n");
    assert_eq!(e.line, 4);
    assert!(matches!(
        e.cause,
        FormatCause::OutOfRange {
            value: 3,
            min: 4,
            ..
        }
    ));

    let e = parse_err("3\n2\n1\nA:5:B\nB\nC\nB:A:10:0\nC:A:10:0\n");
    assert_eq!(e.line, 4);
    assert!(matches!(
        e.cause,
        FormatCause::Network(NetworkError::InvalidOrder(_))
    ));

    let e = parse_err("2\n1\n1\nA:5:B,\nB\nB:A:10:0\n");
    assert!(matches!(e.cause, FormatCause::EmptyField));

    // lights on an intersection nothing enters
    let e = parse_err("1\n0\n1\nA:5:B\n");
    assert!(matches!(
        e.cause,
        FormatCause::Network(NetworkError::InvalidOrder(_))
    ));
}

#[test]
fn error_messages() {
    let e = parse_err("1\n1\n1\nA\nA:B:10:0\n");
    assert_eq!(
        e.to_string(),
        "malformed network at line 5: unknown intersection \"B\""
    );
}

#[test]
fn save_then_load() {
    let n: Network = DEMO.parse().unwrap();
    let path = std::env::temp_dir().join(format!("traffic_demo_{}.txt", std::process::id()));

    n.save(&path).unwrap();
    let loaded = load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(loaded.same_content(&n));
    assert_eq!(loaded.serialize(), DEMO_CANONICAL);
}

#[test]
fn load_missing_file() {
    let path = std::env::temp_dir().join("traffic_this_file_does_not_exist.txt");
    assert!(matches!(load(path), Err(LoadError::Io(_))));
}
