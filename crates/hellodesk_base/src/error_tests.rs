/* 📖 # Why use a separate file for these error tests?

Span traces record source locations. Keeping the tests out of error.rs means edits to the
error module do not shift the locations the assertions look at.
*/

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{DeskError, DeskResult, ResultExt};
    use expect_test::expect;
    use std::error::Error;
    use std::io;
    use std::path::PathBuf;
    use tracing::span;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    // 📖 # Why set up a subscriber in the test?
    // SpanTrace::capture() requires an active subscriber with an ErrorLayer.
    // `try_init()` tolerates tests racing to install it.
    fn setup_tracing_subscriber() {
        let _ = tracing_subscriber::registry()
            .with(ErrorLayer::default())
            .try_init();
    }

    #[test]
    fn test_conflict_and_not_found_kinds() {
        let conflict = DeskError::conflict("Email already exists");
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
        assert_eq!(conflict.to_string(), "Email already exists");

        let missing = DeskError::not_found("User not found");
        assert!(missing.is_not_found());
        match missing.kind() {
            ErrorKind::NotFound { message } => assert_eq!(message, "User not found"),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_error_display_with_multiple_contexts() {
        let error = DeskError::message("root error")
            .context("first")
            .context("second");
        assert_eq!(error.to_string(), "first: second: root error");
    }

    #[test]
    fn test_parse_error_display() {
        let error = DeskError::parse("expected `=` at line 3");
        assert_eq!(error.to_string(), "Parse error: expected `=` at line 3");
    }

    #[test]
    fn test_error_display_file_error() {
        let error = DeskError::new(ErrorKind::FileError {
            path: PathBuf::from("/tmp/hellodesk.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        });
        let display = error.to_string();
        assert!(display.contains("/tmp/hellodesk.toml"));
        assert!(display.contains("not found"));
        assert!(error.source().is_some());
        assert_eq!(error.root_cause().to_string(), "not found");
    }

    #[test]
    fn test_caused_by_is_source() {
        let error = DeskError::message("outer").caused_by(DeskError::message("inner"));
        assert_eq!(error.source().map(|e| e.to_string()), Some("inner".into()));
        assert_eq!(error.root_cause().to_string(), "inner");
    }

    #[test]
    fn test_result_ext_chaining() {
        let result: DeskResult<i32> = Err(Box::new(DeskError::message("root")));
        let err = result
            .context("step 1")
            .with_context(|| "step 2".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "step 1: step 2: root");
    }

    #[test]
    fn test_result_ext_success_untouched() {
        let result: DeskResult<i32> = Ok(42);
        assert_eq!(result.context("unused").unwrap(), 42);
    }

    #[test]
    fn test_err_and_bail_macros() {
        fn fails(port: u16) -> DeskResult<()> {
            crate::bail!("port {} is taken", port)
        }
        let error = fails(8000).unwrap_err();
        assert_eq!(error.to_string(), "port 8000 is taken");

        let boxed: Box<DeskError> = crate::err!("value {}", 7);
        assert_eq!(boxed.to_string(), "value 7");
    }

    #[test]
    fn test_debug_tree_without_spans() {
        let inner = DeskError::message("inner error").context("inner context");
        let outer = DeskError::message("outer error")
            .context("outer context")
            .caused_by(inner);

        expect![[r#"
            outer error
            ├─ outer context
            └─ cause: inner error
               └─ inner context

        "#]]
        .assert_debug_eq(&outer);
    }

    #[test]
    fn test_debug_includes_span_trace() {
        setup_tracing_subscriber();

        let operation_span = span!(tracing::Level::INFO, "create_user", user_email = "a@b.io");
        let _guard = operation_span.enter();

        let error = DeskError::conflict("Email already exists").context("creating user");
        let debug = format!("{:?}", error);

        assert!(debug.starts_with("Email already exists\n└─ creating user\n"));
        assert!(debug.contains("Trace:"));
        assert!(debug.contains("create_user"));
    }
}
