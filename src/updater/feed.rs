use std::time::Duration;

use crate::fetch;

pub const FEED_TIMEOUT: Duration = Duration::from_secs(15);

const TAG_OPEN: &str = "<sparkle:version>";
const TAG_CLOSE: &str = "</sparkle:version>";

/// Fetch the appcast and pull the remote build number out of it. Transport
/// failures, error statuses, and an unparsable document all collapse into the
/// same error path.
pub fn fetch_remote_build(url: &str) -> Result<u32, String> {
    let document = fetch::fetch_text(url, FEED_TIMEOUT)?;

    parse_build(&document).ok_or_else(|| format!("no usable {TAG_OPEN} tag in the appcast"))
}

/// Narrow scan for exactly one integer inside the version tag. Anything that
/// is not a clean integer is a parse miss, never a partial value.
pub fn parse_build(document: &str) -> Option<u32> {
    let start = document.find(TAG_OPEN)? + TAG_OPEN.len();
    let rest = &document[start..];
    let end = rest.find(TAG_CLOSE)?;

    rest[..end].trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use proptest::prelude::*;

    #[test]
    fn parses_build_from_appcast_item() {
        let doc = r#"<rss><channel><item>
            <title>Lumen 2.4</title>
            <sparkle:version>128</sparkle:version>
        </item></channel></rss>"#;

        assert_eq!(parse_build(doc), Some(128));
    }

    #[test]
    fn parses_build_with_surrounding_whitespace() {
        assert_eq!(
            parse_build("<sparkle:version>  42 </sparkle:version>"),
            Some(42)
        );
    }

    #[test]
    fn first_occurrence_wins() {
        let doc = "<sparkle:version>10</sparkle:version><sparkle:version>20</sparkle:version>";

        assert_eq!(parse_build(doc), Some(10));
    }

    #[test]
    fn missing_tag_is_a_miss() {
        assert_eq!(parse_build("<rss><channel></channel></rss>"), None);
    }

    #[test]
    fn unterminated_tag_is_a_miss() {
        assert_eq!(parse_build("<sparkle:version>42"), None);
    }

    #[test]
    fn non_numeric_payload_is_a_miss() {
        assert_eq!(parse_build("<sparkle:version>2.4.0</sparkle:version>"), None);
    }

    #[test]
    fn empty_payload_is_a_miss() {
        assert_eq!(parse_build("<sparkle:version></sparkle:version>"), None);
    }

    #[test]
    fn fetch_reads_build_over_http() {
        let url = testutil::http_stub(vec![
            "<item><sparkle:version>77</sparkle:version></item>".to_string(),
        ]);

        assert_eq!(fetch_remote_build(&url), Ok(77));
    }

    #[test]
    fn fetch_fails_on_connection_refused() {
        let url = testutil::refused_url();

        assert!(fetch_remote_build(&url).is_err());
    }

    #[test]
    fn fetch_fails_on_error_status() {
        let url = testutil::http_stub_with_status(500, "oops");

        assert!(fetch_remote_build(&url).is_err());
    }

    #[test]
    fn fetch_fails_on_unparsable_document() {
        let url = testutil::http_stub(vec!["<html>maintenance page</html>".to_string()]);

        let err = fetch_remote_build(&url).unwrap_err();

        assert!(err.contains("sparkle:version"));
    }

    proptest! {
        #[test]
        fn any_build_number_roundtrips(build in any::<u32>()) {
            let doc = format!("<item><sparkle:version>{build}</sparkle:version></item>");
            prop_assert_eq!(parse_build(&doc), Some(build));
        }
    }
}
