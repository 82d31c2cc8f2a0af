use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CardreelError::invalid_request("x")
            .to_string()
            .contains("invalid request:")
    );
    assert!(
        CardreelError::workspace("x")
            .to_string()
            .contains("workspace error:")
    );
    assert!(
        CardreelError::render(3, "x")
            .to_string()
            .contains("render error: slide 3:")
    );
    assert!(
        CardreelError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        CardreelError::read_back("x")
            .to_string()
            .contains("read-back error:")
    );
    assert!(
        CardreelError::config("x")
            .to_string()
            .contains("configuration error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CardreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.code(), ErrorCode::Internal);
}

#[test]
fn only_invalid_request_is_a_bad_request() {
    assert_eq!(
        CardreelError::invalid_request("no cards").class(),
        ErrorClass::BadRequest
    );
    for err in [
        CardreelError::workspace("x"),
        CardreelError::render(0, "x"),
        CardreelError::encode("x"),
        CardreelError::read_back("x"),
        CardreelError::config("x"),
    ] {
        assert_eq!(err.class(), ErrorClass::GenerationFailed, "{err}");
        assert_eq!(err.class().http_status(), 500);
        assert_eq!(err.public_message(), "Failed to generate the video.");
    }
    assert_eq!(ErrorClass::BadRequest.http_status(), 400);
}

#[test]
fn codes_distinguish_failure_sources() {
    assert_eq!(CardreelError::encode("x").code().as_str(), "encode");
    assert_eq!(CardreelError::read_back("x").code().as_str(), "read_back");
    assert_eq!(CardreelError::render(1, "x").code().as_str(), "render");
    assert_eq!(CardreelError::workspace("x").code().as_str(), "workspace");
    assert_eq!(
        CardreelError::invalid_request("x").code().as_str(),
        "invalid_request"
    );
}

#[test]
fn public_message_hides_diagnostics() {
    let err = CardreelError::encode("ffmpeg exited with status 1: Invalid data found");
    assert!(!err.public_message().contains("ffmpeg"));
}
