//! Custom assertion macros
//!
//! Assertions shared by the broker and HTTP suites, with messages that show
//! the offending value.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a result is an error, optionally of a given pattern
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok");
    };
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => panic!("Expected different error variant, got: {:?}", e),
        }
    };
}

/// Assert that a subscribe response carries exactly these event ids, in order
#[macro_export]
macro_rules! assert_event_ids {
    ($response:expr, $expected:expr) => {
        let actual: Vec<uuid::Uuid> = $response.events().iter().map(|event| event.id).collect();
        let expected: Vec<uuid::Uuid> = $expected.iter().map(|event| event.id).collect();
        pretty_assertions::assert_eq!(actual, expected, "status was {}", $response.status());
    };
}

/// Assert that an elapsed duration stays under a bound
#[macro_export]
macro_rules! assert_within {
    ($elapsed:expr, $bound:expr) => {
        assert!(
            $elapsed < $bound,
            "Took {:?}, expected less than {:?}",
            $elapsed,
            $bound
        );
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
