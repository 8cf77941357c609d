//! Driver-level tests: statuses, encodings, trimming and residue detection.

use mensura_core::{convert, Unit, UnitSystem};
use mensura_parse::{parse, parse_bytes, Encoding, Error, Status};

fn si() -> &'static UnitSystem {
    UnitSystem::si()
}

#[test]
fn empty_input_is_dimensionless_one() {
    assert_eq!(parse(si(), "").unwrap(), Unit::one());
    assert_eq!(parse(si(), "   ").unwrap(), Unit::one());
}

#[test]
fn trimming_is_idempotent() {
    for spec in ["kg m s-2", "celsius @ 273.15", "m/s"] {
        assert_eq!(
            parse(si(), &format!("  {spec}\t")).unwrap(),
            parse(si(), spec).unwrap(),
            "for {spec:?}"
        );
    }
}

#[test]
fn a_third_of_a_second_in_milliseconds() {
    let third = parse(si(), "(1/3) s").unwrap();
    let ms = parse(si(), "ms").unwrap();
    let v = convert(1.0, &third, &ms).unwrap();
    assert!((v - 333.333).abs() < 1e-3, "got {v}");
}

#[test]
fn forbidden_numeric_literals_are_syntax_errors() {
    for spec in ["nan", "+inf", "Infinity", "nan m"] {
        match parse(si(), spec) {
            Err(err @ Error::Syntax(_)) => {
                assert_eq!(err.status(), Status::Syntax);
                assert!(err.to_string().contains("not allowed"), "for {spec:?}: {err}");
            }
            other => panic!("expected syntax error for {spec:?}, got {other:?}"),
        }
    }
}

#[test]
fn unresolvable_identifiers_are_unknown() {
    for spec in ["pico second", "furlong", "kkm"] {
        match parse(si(), spec) {
            Err(err @ Error::Unknown(_)) => {
                assert_eq!(err.status(), Status::Unknown);
                assert!(
                    err.to_string().contains("Don't recognize"),
                    "for {spec:?}: {err}"
                );
            }
            other => panic!("expected unknown-identifier error for {spec:?}, got {other:?}"),
        }
    }
}

#[test]
fn timestamp_on_a_length_unit_is_syntax() {
    match parse(si(), "m since 2000") {
        Err(err) => assert_eq!(err.status(), Status::Syntax),
        Ok(_) => panic!("expected failure"),
    }
}

#[test]
fn residual_input_is_reported_with_a_snippet() {
    match parse(si(), "m^2^3") {
        Err(Error::Syntax(message)) => {
            assert!(message.contains("Unexpected text after unit specification"));
            assert!(message.contains("^3"));
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
    // DATE GMT without a clock is not a timestamp production
    match parse(si(), "seconds since 2000-01-01 GMT") {
        Err(Error::Syntax(message)) => {
            assert!(message.contains("Unexpected text"));
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn long_residue_is_truncated() {
    let spec = format!("m^2^3 {}", "kg ".repeat(30));
    match parse(si(), &spec) {
        Err(Error::Syntax(message)) => assert!(message.contains("...")),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn one_stray_trailing_paren_is_tolerated() {
    assert_eq!(parse(si(), "m)").unwrap(), parse(si(), "m").unwrap());
    assert!(parse(si(), "m))").is_err());
    assert!(parse(si(), "m)x").is_err());
}

#[test]
fn latin1_input_round_trips_through_the_transcoder() {
    let micrograms = parse_bytes(si(), b"\xB5g", Encoding::Latin1).unwrap();
    assert_eq!(micrograms, parse(si(), "\u{B5}g").unwrap());

    let celsius = parse_bytes(si(), b"\xB0C @ 273.15", Encoding::Latin1).unwrap();
    assert_eq!(celsius, parse(si(), "\u{B0}C @ 273.15").unwrap());

    // NBSP trims only for Latin-1 input
    assert!(parse_bytes(si(), b"\xA0m\xA0", Encoding::Latin1).is_ok());
}

#[test]
fn utf8_bytes_are_validated() {
    let err = parse_bytes(si(), &[0xFF, 0xFE], Encoding::Utf8).unwrap_err();
    assert_eq!(err.status(), Status::BadArg);
}

#[test]
fn negative_zero_timezone_is_syntax() {
    assert!(parse(si(), "seconds since 2000-01-01 00:00 -00:00").is_err());
    assert!(parse(si(), "seconds since 2000-01-01 00:00 +00:00").is_ok());
}

#[test]
fn leap_second_is_only_valid_at_midnight_rollover() {
    assert!(parse(si(), "seconds since 2000-01-01 23:59:60").is_ok());
    match parse(si(), "seconds since 2000-01-01 12:00:60") {
        Err(err) => assert_eq!(err.status(), Status::Syntax),
        Ok(_) => panic!("expected failure"),
    }
    // only exactly 60 is the leap second; fractions past it are out of range
    match parse(si(), "seconds since 2000-01-01 23:59:60.5") {
        Err(err) => assert_eq!(err.status(), Status::Syntax),
        Ok(_) => panic!("expected failure"),
    }
}

#[test]
fn double_shift_is_syntax() {
    assert!(parse(si(), "kg @ @ 20").is_err());
    assert!(parse(si(), "since").is_err());
}

#[test]
fn convertibility_of_parsed_products() {
    let force = parse(si(), "kg m s-2").unwrap();
    let newton = si().unit_by_symbol("N").unwrap();
    assert!(force.convertible_to(&newton));
    assert!(!force.convertible_to(&si().unit_by_name("joule").unwrap()));
}
