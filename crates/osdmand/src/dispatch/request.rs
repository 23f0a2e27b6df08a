//! Parsing of `domain/verb` trigger payloads.

use super::TriggerParseError;

/// A parsed trigger naming a configured domain and verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRequest<'a> {
    domain: &'a str,
    verb: &'a str,
}

impl<'a> TriggerRequest<'a> {
    /// Parses a raw datagram payload.
    ///
    /// Surrounding whitespace is ignored. The payload splits on the first `/`
    /// only, so the verb may itself contain `/`.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerParseError`] when the payload is not UTF-8, lacks a
    /// separator, or has an empty domain or verb.
    pub fn parse(payload: &'a [u8]) -> Result<Self, TriggerParseError> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| TriggerParseError::NotUtf8)?
            .trim();
        let (domain, verb) = text
            .split_once('/')
            .ok_or_else(|| TriggerParseError::MissingSeparator {
                payload: text.to_owned(),
            })?;
        if domain.is_empty() || verb.is_empty() {
            return Err(TriggerParseError::EmptySegment {
                payload: text.to_owned(),
            });
        }
        Ok(Self { domain, verb })
    }

    /// Domain name.
    #[must_use]
    pub const fn domain(&self) -> &'a str {
        self.domain
    }

    /// Verb name.
    #[must_use]
    pub const fn verb(&self) -> &'a str {
        self.verb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"volume/up", "volume", "up")]
    #[case(b"  volume/up\n", "volume", "up")]
    #[case(b"media/seek/+5", "media", "seek/+5")]
    fn splits_on_first_separator(
        #[case] payload: &[u8],
        #[case] domain: &str,
        #[case] verb: &str,
    ) {
        let request = TriggerRequest::parse(payload).expect("payload should parse");
        assert_eq!(request.domain(), domain);
        assert_eq!(request.verb(), verb);
    }

    #[rstest]
    #[case(b"volume")]
    #[case(b"")]
    #[case(b"   ")]
    fn rejects_missing_separator(#[case] payload: &[u8]) {
        assert!(matches!(
            TriggerRequest::parse(payload),
            Err(TriggerParseError::MissingSeparator { .. })
        ));
    }

    #[rstest]
    #[case(b"/up")]
    #[case(b"volume/")]
    #[case(b"/")]
    fn rejects_empty_segments(#[case] payload: &[u8]) {
        assert!(matches!(
            TriggerRequest::parse(payload),
            Err(TriggerParseError::EmptySegment { .. })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(
            TriggerRequest::parse(&[0xff, b'/', b'u']),
            Err(TriggerParseError::NotUtf8)
        );
    }
}
