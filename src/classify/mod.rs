//! Transaction classification for reassembled message bodies.
//!
//! Classification is a deliberately coarse substring check: a message is a
//! transaction notification when it contains at least one configured marker.
//! The marker set is runtime configuration, not a compiled constant, so
//! deployments can tune recall without touching this module. Matching favours
//! recall over precision; promotional messages using the marker words are an
//! accepted false-positive class.

/// Markers used when a deployment supplies none of its own.
pub const DEFAULT_MARKERS: [&str; 4] = ["UPI", "debited", "credited", "A/C"];

/// Outcome of classifying one message body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationVerdict {
    matched: Vec<String>,
}

impl ClassificationVerdict {
    /// Whether at least one marker matched.
    #[must_use]
    pub fn is_transaction(&self) -> bool { !self.matched.is_empty() }

    /// The markers found in the body, in configuration order.
    #[must_use]
    pub fn matched_markers(&self) -> &[String] { &self.matched }
}

/// Case-sensitive substring classifier over a configurable marker set.
///
/// # Examples
///
/// ```
/// use smsgate::classify::TransactionClassifier;
///
/// let classifier = TransactionClassifier::default();
/// let verdict = classifier.classify("Rs.500 debited from A/C XX1234");
/// assert!(verdict.is_transaction());
/// ```
#[derive(Clone, Debug)]
pub struct TransactionClassifier {
    markers: Vec<String>,
}

impl TransactionClassifier {
    /// Build a classifier from a marker set, discarding empty markers.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|marker| !marker.is_empty())
                .collect(),
        }
    }

    /// The configured marker set.
    #[must_use]
    pub fn markers(&self) -> &[String] { &self.markers }

    /// Classify a complete message body.
    ///
    /// Matching is case-sensitive; no negative-marker suppression is applied.
    #[must_use]
    pub fn classify(&self, text: &str) -> ClassificationVerdict {
        ClassificationVerdict {
            matched: self
                .markers
                .iter()
                .filter(|marker| text.contains(marker.as_str()))
                .cloned()
                .collect(),
        }
    }
}

impl Default for TransactionClassifier {
    fn default() -> Self { Self::new(DEFAULT_MARKERS) }
}
